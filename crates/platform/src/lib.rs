//! CPU detection, capabilities, and tuning for ktwelve.
//!
//! This crate is the **single source of truth** for CPU feature detection
//! across the workspace. Hashers never probe the CPU themselves; they ask
//! for the cached descriptor and pick a kernel from it.
//!
//! # Core Types
//!
//! - [`Caps`]: What instructions can run on this machine (capabilities)
//! - [`Tune`]: What strategies are worthwhile on this machine (tuning hints)
//!
//! # Main Entry Point
//!
//! ```
//! let (caps, tune) = platform::get();
//!
//! if caps.has(platform::caps::x86::X4_READY) {
//!   assert!(tune.leaf_lanes >= 4);
//! }
//! ```
//!
//! # Design
//!
//! 1. **Computed once**: Runtime detection is cached in `OnceLock` (std) or a
//!    write-once atomic cell (no_std).
//! 2. **Immutable by default**: The only way to change the answer is
//!    [`set_caps_override`], which is lock-protected.
//! 3. **Miri-safe**: Under Miri, always returns portable-only caps.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

// ─────────────────────────────────────────────────────────────────────────────
// Core modules
// ─────────────────────────────────────────────────────────────────────────────

pub mod caps;
mod detect;
pub mod tune;

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

use core::fmt;

pub use caps::{Arch, Caps};
pub use tune::{Tune, TuneKind};

/// Get detected CPU capabilities and tuning hints.
///
/// If an override is active it wins over detection.
#[inline]
#[must_use]
pub fn get() -> (Caps, Tune) {
  detect::get()
}

/// Get just the CPU capabilities.
#[inline]
#[must_use]
pub fn caps() -> Caps {
  detect::caps()
}

/// Get just the tuning hints.
#[inline]
#[must_use]
pub fn tune() -> Tune {
  detect::tune()
}

/// Detect without touching the cache.
#[inline]
#[must_use]
pub fn detect_uncached() -> (Caps, Tune) {
  detect::detect_uncached()
}

/// Initialize with user-supplied capabilities.
///
/// Call this before the first [`get()`] to bypass runtime detection, e.g. on
/// bare metal where the CPU is known at deployment. Returns `false` if the
/// cache was already populated.
///
/// ```
/// use platform::{Caps, Tune};
///
/// // Either we seeded the cache, or detection ran first; both are valid.
/// let seeded = platform::init_with_caps(Caps::NONE, Tune::PORTABLE);
/// if seeded {
///   assert_eq!(platform::tune(), Tune::PORTABLE);
/// }
/// ```
#[inline]
pub fn init_with_caps(caps: Caps, tune: Tune) -> bool {
  detect::init_with_caps(caps, tune)
}

/// Set or clear the capabilities override.
///
/// When set, [`get()`] returns the override instead of the cached value.
/// Pass `None` to resume normal behaviour.
///
/// ```
/// use platform::{Caps, Tune};
///
/// platform::set_caps_override(Some((Caps::NONE, Tune::PORTABLE)));
/// assert_eq!(platform::tune().leaf_lanes, 1);
/// platform::set_caps_override(None);
/// ```
#[cfg(feature = "std")]
#[inline]
pub fn set_caps_override(value: Option<(Caps, Tune)>) {
  detect::set_caps_override(value);
}

/// Check if an override is currently set.
#[inline]
#[must_use]
pub fn has_override() -> bool {
  detect::has_override()
}

// ─────────────────────────────────────────────────────────────────────────────
// Description
// ─────────────────────────────────────────────────────────────────────────────

/// Human-readable snapshot of what dispatch sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Description {
  pub arch: Arch,
  pub caps: Caps,
  pub tune: Tune,
}

impl fmt::Display for Description {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Caps({}, {}) ({})", self.arch, self.caps, self.tune)
  }
}

/// Describe the current platform.
#[inline]
#[must_use]
pub fn describe() -> Description {
  let (caps, tune) = get();
  Description {
    arch: Arch::current(),
    caps,
    tune,
  }
}

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::format;

  use super::*;

  #[test]
  fn convenience_functions_agree_with_get() {
    let (caps, tune) = get();
    assert_eq!(caps, self::caps());
    assert_eq!(tune, self::tune());
  }

  #[test]
  fn describe_mentions_arch() {
    let d = describe();
    let s = format!("{d}");
    assert!(s.starts_with("Caps("));
    assert!(s.contains(d.arch.name()));
  }
}
