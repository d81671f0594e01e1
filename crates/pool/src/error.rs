//! Pool errors.

use core::fmt;

/// Why a pool could not be created or refused a job.
///
/// None of these are fatal to a hash computation: callers fall back to
/// running the work on their own thread.
#[derive(Debug)]
#[non_exhaustive]
pub enum PoolError {
  /// Worker count outside `1..=MAX_WORKERS`.
  InvalidWorkerCount(usize),
  /// The bounded job queue is at capacity.
  QueueFull { capacity: usize },
  /// The pool is shutting down or has no workers.
  Unavailable,
  /// The OS refused to start a worker thread.
  Spawn(std::io::Error),
}

impl fmt::Display for PoolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::InvalidWorkerCount(n) => write!(f, "invalid worker count {n} (expected 1..={})", crate::MAX_WORKERS),
      Self::QueueFull { capacity } => write!(f, "job queue full ({capacity} pending)"),
      Self::Unavailable => f.write_str("thread pool unavailable"),
      Self::Spawn(_) => f.write_str("failed to spawn worker thread"),
    }
  }
}

impl std::error::Error for PoolError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Spawn(e) => Some(e),
      _ => None,
    }
  }
}

impl From<std::io::Error> for PoolError {
  fn from(e: std::io::Error) -> Self {
    Self::Spawn(e)
  }
}

#[cfg(test)]
mod tests {
  use std::error::Error as _;

  use super::*;

  #[test]
  fn display_messages() {
    assert_eq!(
      PoolError::InvalidWorkerCount(0).to_string(),
      "invalid worker count 0 (expected 1..=64)"
    );
    assert_eq!(
      PoolError::QueueFull { capacity: 256 }.to_string(),
      "job queue full (256 pending)"
    );
    assert_eq!(PoolError::Unavailable.to_string(), "thread pool unavailable");
  }

  #[test]
  fn spawn_exposes_source() {
    let err = PoolError::from(std::io::Error::other("no threads"));
    assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("no threads"));
    assert!(PoolError::Unavailable.source().is_none());
  }
}
