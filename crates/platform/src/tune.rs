//! Capability-derived tuning hints.
//!
//! `Tune` answers: "What should I *prefer* on this machine?"
//!
//! Unlike [`Caps`](crate::Caps) (what is *possible*), `Tune` describes what
//! is *worthwhile*:
//!
//! - how many leaves to hash in lock-step on one core
//! - how much input justifies handing work to a thread pool
//!
//! Presets are named after the hardware they were tuned for, but a preset
//! never enables instructions: it only picks a grouping width for the
//! portable leaf kernels.

use core::fmt;

use crate::caps::{Caps, aarch64, x86};

/// Identifies which tuning preset is in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TuneKind {
  Custom = 0,
  Portable,
  X86Sse,
  X86Avx2,
  X86Avx512,
  Aarch64Neon,
  Aarch64Sha3,
}

impl TuneKind {
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Custom => "Custom",
      Self::Portable => "Portable",
      Self::X86Sse => "x86_64 SSE",
      Self::X86Avx2 => "x86_64 AVX2",
      Self::X86Avx512 => "x86_64 AVX-512",
      Self::Aarch64Neon => "AArch64 NEON",
      Self::Aarch64Sha3 => "AArch64 SHA3",
    }
  }

  #[must_use]
  pub(crate) const fn from_u8(v: u8) -> Self {
    match v {
      1 => Self::Portable,
      2 => Self::X86Sse,
      3 => Self::X86Avx2,
      4 => Self::X86Avx512,
      5 => Self::Aarch64Neon,
      6 => Self::Aarch64Sha3,
      _ => Self::Custom,
    }
  }
}

/// Tuning hints for leaf hashing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tune {
  pub kind: TuneKind,
  /// Preferred number of leaves hashed in lock-step (1, 2, 4 or 8).
  pub leaf_lanes: u8,
  /// Inputs shorter than this stay on the calling thread.
  pub parallel_min_bytes: usize,
}

/// Default threshold below which pool dispatch costs more than it saves.
pub const DEFAULT_PARALLEL_MIN_BYTES: usize = 2 * 1024 * 1024;

impl Tune {
  pub const PORTABLE: Self = Self {
    kind: TuneKind::Portable,
    leaf_lanes: 1,
    parallel_min_bytes: DEFAULT_PARALLEL_MIN_BYTES,
  };

  pub const X86_SSE: Self = Self {
    kind: TuneKind::X86Sse,
    leaf_lanes: 2,
    parallel_min_bytes: DEFAULT_PARALLEL_MIN_BYTES,
  };

  pub const X86_AVX2: Self = Self {
    kind: TuneKind::X86Avx2,
    leaf_lanes: 4,
    parallel_min_bytes: DEFAULT_PARALLEL_MIN_BYTES,
  };

  pub const X86_AVX512: Self = Self {
    kind: TuneKind::X86Avx512,
    leaf_lanes: 8,
    parallel_min_bytes: DEFAULT_PARALLEL_MIN_BYTES,
  };

  pub const AARCH64_NEON: Self = Self {
    kind: TuneKind::Aarch64Neon,
    leaf_lanes: 2,
    parallel_min_bytes: DEFAULT_PARALLEL_MIN_BYTES,
  };

  pub const AARCH64_SHA3: Self = Self {
    kind: TuneKind::Aarch64Sha3,
    leaf_lanes: 2,
    parallel_min_bytes: DEFAULT_PARALLEL_MIN_BYTES / 2,
  };

  /// Pick the preset matching the widest capability set present.
  #[must_use]
  pub const fn for_caps(caps: Caps) -> Self {
    if caps.has(x86::X8_READY) {
      Self::X86_AVX512
    } else if caps.has(x86::X4_READY) {
      Self::X86_AVX2
    } else if caps.has(x86::X2_READY) {
      Self::X86_SSE
    } else if caps.has(aarch64::SHA3_READY) {
      Self::AARCH64_SHA3
    } else if caps.has(aarch64::X2_READY) {
      Self::AARCH64_NEON
    } else {
      Self::PORTABLE
    }
  }

  #[inline]
  #[must_use]
  pub const fn name(self) -> &'static str {
    self.kind.name()
  }
}

impl Default for Tune {
  fn default() -> Self {
    Self::PORTABLE
  }
}

impl fmt::Display for Tune {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} x{}", self.name(), self.leaf_lanes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn presets_pick_widest() {
    assert_eq!(Tune::for_caps(Caps::NONE), Tune::PORTABLE);
    assert_eq!(Tune::for_caps(x86::X2_READY | x86::X4_READY), Tune::X86_AVX2);
    assert_eq!(
      Tune::for_caps(x86::X2_READY | x86::X4_READY | x86::X8_READY).leaf_lanes,
      8
    );
    assert_eq!(Tune::for_caps(aarch64::SHA3_READY), Tune::AARCH64_SHA3);
  }

  #[test]
  fn lanes_are_powers_of_two() {
    for t in [
      Tune::PORTABLE,
      Tune::X86_SSE,
      Tune::X86_AVX2,
      Tune::X86_AVX512,
      Tune::AARCH64_NEON,
      Tune::AARCH64_SHA3,
    ] {
      assert!(t.leaf_lanes.is_power_of_two() && t.leaf_lanes <= 8, "{}", t.name());
      assert!(t.parallel_min_bytes > 0);
    }
  }

  #[test]
  fn kind_roundtrips_through_u8() {
    for k in [TuneKind::Portable, TuneKind::X86Avx2, TuneKind::Aarch64Sha3] {
      assert_eq!(TuneKind::from_u8(k as u8), k);
    }
    assert_eq!(TuneKind::from_u8(200), TuneKind::Custom);
  }
}
