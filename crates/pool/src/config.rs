//! Pool runtime configuration (env overrides + tuned defaults).
//!
//! Knobs:
//! - `KTWELVE_THREADS`: worker count for [`default_pool`](crate::default_pool)
//! - `KTWELVE_PARALLEL_MIN_BYTES`: input size below which work stays on the caller

use std::sync::OnceLock;

use crate::MAX_WORKERS;

/// Effective pool configuration (after applying overrides).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
  /// Worker threads for the default pool, in `1..=MAX_WORKERS`.
  pub threads: usize,
  /// Minimum input size for parallel dispatch.
  pub min_input_size: usize,
}

#[derive(Clone, Copy, Debug, Default)]
struct Overrides {
  threads: Option<usize>,
  min_input_size: Option<usize>,
}

fn parse_usize(name: &str) -> Option<usize> {
  let value = std::env::var(name).ok()?;
  let value = value.trim();
  if value.is_empty() {
    return None;
  }
  value.parse::<usize>().ok()
}

fn read_env_overrides() -> Overrides {
  Overrides {
    threads: parse_usize("KTWELVE_THREADS"),
    min_input_size: parse_usize("KTWELVE_PARALLEL_MIN_BYTES"),
  }
}

fn overrides() -> Overrides {
  static OVERRIDES: OnceLock<Overrides> = OnceLock::new();
  *OVERRIDES.get_or_init(read_env_overrides)
}

#[inline]
#[must_use]
fn clamp_threads(n: usize) -> usize {
  n.clamp(1, MAX_WORKERS)
}

/// Get the effective pool configuration for this process.
#[must_use]
pub fn get() -> PoolConfig {
  let ov = overrides();
  let detected = std::thread::available_parallelism().map_or(1, core::num::NonZero::get);

  PoolConfig {
    threads: clamp_threads(ov.threads.unwrap_or(detected)),
    min_input_size: ov.min_input_size.unwrap_or(platform::tune().parallel_min_bytes),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn threads_are_clamped() {
    assert_eq!(clamp_threads(0), 1);
    assert_eq!(clamp_threads(8), 8);
    assert_eq!(clamp_threads(1000), MAX_WORKERS);
  }

  #[test]
  fn get_is_in_range() {
    let cfg = get();
    assert!((1..=MAX_WORKERS).contains(&cfg.threads));
  }
}
