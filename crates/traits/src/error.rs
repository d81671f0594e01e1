//! Error types shared by stateful hashers.
//!
//! Both errors are plain data: no allocation, no source chain. Individual
//! crates wrap them in richer enums where they need more variants.

use core::fmt;

/// An operation was invoked in a phase that does not accept it.
///
/// Returned by phase-checked hashers (absorb, finalize, squeeze) when the
/// call order is wrong. The hasher state is left exactly as it was.
///
/// # Examples
///
/// ```
/// use traits::SequenceError;
///
/// let err = SequenceError::new("update", "squeezing");
/// assert_eq!(err.operation(), "update");
/// assert_eq!(err.to_string(), "`update` is not valid in the squeezing phase");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct SequenceError {
  operation: &'static str,
  phase: &'static str,
}

impl SequenceError {
  #[inline]
  #[must_use]
  pub const fn new(operation: &'static str, phase: &'static str) -> Self {
    Self { operation, phase }
  }

  /// Name of the rejected operation.
  #[inline]
  #[must_use]
  pub const fn operation(&self) -> &'static str {
    self.operation
  }

  /// Name of the phase the hasher was in.
  #[inline]
  #[must_use]
  pub const fn phase(&self) -> &'static str {
    self.phase
  }
}

impl fmt::Display for SequenceError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "`{}` is not valid in the {} phase", self.operation, self.phase)
  }
}

impl core::error::Error for SequenceError {}

/// A caller-provided output buffer does not match the length fixed up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct OutputLengthError {
  expected: usize,
  actual: usize,
}

impl OutputLengthError {
  #[inline]
  #[must_use]
  pub const fn new(expected: usize, actual: usize) -> Self {
    Self { expected, actual }
  }

  #[inline]
  #[must_use]
  pub const fn expected(&self) -> usize {
    self.expected
  }

  #[inline]
  #[must_use]
  pub const fn actual(&self) -> usize {
    self.actual
  }
}

impl fmt::Display for OutputLengthError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "output buffer holds {} bytes, expected {}", self.actual, self.expected)
  }
}

impl core::error::Error for OutputLengthError {}

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::{format, string::ToString};

  use super::*;

  #[test]
  fn sequence_display_names_operation_and_phase() {
    let err = SequenceError::new("squeeze", "absorbing");
    assert_eq!(err.to_string(), "`squeeze` is not valid in the absorbing phase");
    assert_eq!(err.phase(), "absorbing");
  }

  #[test]
  fn output_length_display() {
    let err = OutputLengthError::new(32, 16);
    assert_eq!(err.to_string(), "output buffer holds 16 bytes, expected 32");
    assert_eq!((err.expected(), err.actual()), (32, 16));
  }

  #[test]
  fn debug_impl() {
    let dbg = format!("{:?}", OutputLengthError::new(1, 2));
    assert_eq!(dbg, "OutputLengthError { expected: 1, actual: 2 }");
  }

  #[test]
  fn trait_bounds() {
    fn assert_send_sync<T: Send + Sync + Copy + core::error::Error>() {}

    assert_send_sync::<SequenceError>();
    assert_send_sync::<OutputLengthError>();
  }

  #[test]
  fn error_trait_has_no_source() {
    use core::error::Error;

    assert!(SequenceError::new("a", "b").source().is_none());
    assert!(OutputLengthError::new(0, 0).source().is_none());
  }
}
