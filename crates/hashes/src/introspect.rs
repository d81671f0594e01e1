//! Dispatch introspection: which leaf kernel and parallel threshold apply here.
//!
//! # Examples
//!
//! ```
//! use hashes::{DispatchInfo, crypto::Kt128};
//!
//! let info = DispatchInfo::current();
//! println!("{info}");
//! println!("KT128 leaves: {}", Kt128::new(32).kernel_name());
//! ```

use core::fmt;

use crate::crypto::kangaroo::{LeafKernelId, config};

/// Detected platform plus the tree-hash choices derived from it.
#[derive(Clone, Copy)]
pub struct DispatchInfo {
  platform: platform::Description,
  leaf_kernel: LeafKernelId,
  parallel_min_bytes: usize,
}

impl DispatchInfo {
  /// Dispatch info for the current platform (cached after the first call).
  #[inline]
  #[must_use]
  pub fn current() -> Self {
    let cfg = config::get();
    Self {
      platform: platform::describe(),
      leaf_kernel: cfg.leaf_kernel,
      parallel_min_bytes: parallel_min_bytes(cfg.tune.parallel_min_bytes),
    }
  }

  #[inline]
  #[must_use]
  pub fn platform(&self) -> platform::Description {
    self.platform
  }

  /// Kernel new hashers start with.
  #[inline]
  #[must_use]
  pub fn leaf_kernel(&self) -> LeafKernelId {
    self.leaf_kernel
  }

  /// Smallest run of whole leaves handed to the default pool.
  #[inline]
  #[must_use]
  pub fn parallel_min_bytes(&self) -> usize {
    self.parallel_min_bytes
  }
}

#[cfg(feature = "std")]
fn parallel_min_bytes(_tuned: usize) -> usize {
  pool::config::get().min_input_size
}

#[cfg(not(feature = "std"))]
fn parallel_min_bytes(tuned: usize) -> usize {
  tuned
}

impl fmt::Display for DispatchInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} leaf={} parallel>={}B",
      self.platform,
      self.leaf_kernel.as_str(),
      self.parallel_min_bytes
    )
  }
}

impl fmt::Debug for DispatchInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DispatchInfo")
      .field("platform", &format_args!("{}", self.platform))
      .field("leaf_kernel", &self.leaf_kernel.as_str())
      .field("parallel_min_bytes", &self.parallel_min_bytes)
      .finish()
  }
}
