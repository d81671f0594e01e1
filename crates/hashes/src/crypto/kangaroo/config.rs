//! Tree-hash runtime configuration (overrides + tuned defaults).
//!
//! This module centralizes leaf-kernel selection:
//! - the kernel width preferred by the platform tuning
//! - an optional forced kernel via `KTWELVE_FORCE`
//!
//! Every kernel is portable, so a forced choice is always honoured.

use platform::Tune;

use super::kernels::LeafKernelId;

/// Forced leaf-kernel selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KtForce {
  /// Use the width suggested by platform tuning.
  #[default]
  Auto,
  /// One leaf at a time.
  Portable,
  /// Two leaves in lock-step.
  X2,
  /// Four leaves in lock-step.
  X4,
  /// Eight leaves in lock-step.
  X8,
}

impl KtForce {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Auto => "auto",
      Self::Portable => "portable",
      Self::X2 => "x2",
      Self::X4 => "x4",
      Self::X8 => "x8",
    }
  }
}

/// Full tree-hash runtime configuration (after applying overrides).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KtConfig {
  /// Force mode requested via env.
  pub requested_force: KtForce,
  /// Kernel that new hashers start with.
  pub leaf_kernel: LeafKernelId,
  /// Tuning the choice was derived from.
  pub tune: Tune,
}

#[derive(Clone, Copy, Debug, Default)]
struct Overrides {
  force: KtForce,
}

#[cfg(feature = "std")]
fn parse_force(value: &str) -> Option<KtForce> {
  let value = value.trim();
  if value.is_empty() {
    return None;
  }

  if value.eq_ignore_ascii_case("auto") {
    return Some(KtForce::Auto);
  }
  if value.eq_ignore_ascii_case("portable") || value.eq_ignore_ascii_case("scalar") || value.eq_ignore_ascii_case("x1")
  {
    return Some(KtForce::Portable);
  }
  if value.eq_ignore_ascii_case("x2") {
    return Some(KtForce::X2);
  }
  if value.eq_ignore_ascii_case("x4") {
    return Some(KtForce::X4);
  }
  if value.eq_ignore_ascii_case("x8") {
    return Some(KtForce::X8);
  }

  None
}

#[cfg(feature = "std")]
fn read_env_overrides() -> Overrides {
  let force = std::env::var("KTWELVE_FORCE").ok().as_deref().and_then(parse_force);
  if let Some(force) = force {
    tracing::debug!(force = force.as_str(), "leaf kernel forced via KTWELVE_FORCE");
  }
  Overrides {
    force: force.unwrap_or_default(),
  }
}

#[cfg(feature = "std")]
fn overrides() -> Overrides {
  use std::sync::OnceLock;
  static OVERRIDES: OnceLock<Overrides> = OnceLock::new();
  *OVERRIDES.get_or_init(read_env_overrides)
}

#[cfg(not(feature = "std"))]
fn overrides() -> Overrides {
  Overrides::default()
}

#[inline]
#[must_use]
fn kernel_for(force: KtForce, tune: Tune) -> LeafKernelId {
  match force {
    KtForce::Auto => LeafKernelId::for_lanes(tune.leaf_lanes),
    KtForce::Portable => LeafKernelId::Portable,
    KtForce::X2 => LeafKernelId::Interleave2,
    KtForce::X4 => LeafKernelId::Interleave4,
    KtForce::X8 => LeafKernelId::Interleave8,
  }
}

/// Get the effective tree-hash configuration for the current platform.
#[inline]
#[must_use]
pub fn get() -> KtConfig {
  let tune = platform::tune();
  let requested_force = overrides().force;
  KtConfig {
    requested_force,
    leaf_kernel: kernel_for(requested_force, tune),
    tune,
  }
}
