//! CPU capability representation.
//!
//! This module answers the question: "What instructions can I legally run on
//! this machine?"
//!
//! # Bit Layout
//!
//! [`Caps`] is a 64-bit bitset.
//!
//! - Bits 0-31: x86_64 features
//! - Bits 32-63: aarch64 features
//!
//! Only the features used to pick a leaf grouping width are tracked. No
//! kernel executes these instructions directly: every kernel is portable
//! Rust, and a detected feature only selects a [`Tune`](crate::Tune) preset.

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Core Capability Type
// ─────────────────────────────────────────────────────────────────────────────

/// CPU capabilities: a 64-bit feature bitset.
///
/// Use [`has()`](Caps::has) to check if required features are available.
/// `Caps` is `Copy`, `Send`, and `Sync`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Caps(u64);

impl Caps {
  /// No capabilities (portable code only).
  pub const NONE: Self = Self(0);

  /// Create capabilities from a raw bit pattern.
  #[inline]
  #[must_use]
  pub const fn from_raw(bits: u64) -> Self {
    Self(bits)
  }

  #[inline]
  #[must_use]
  pub const fn as_raw(self) -> u64 {
    self.0
  }

  /// Returns `true` if every bit of `required` is present.
  ///
  /// `Caps::NONE` is always satisfied.
  #[inline]
  #[must_use]
  pub const fn has(self, required: Self) -> bool {
    self.0 & required.0 == required.0
  }

  #[inline]
  #[must_use]
  pub const fn union(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }

  #[inline]
  #[must_use]
  pub const fn intersection(self, other: Self) -> Self {
    Self(self.0 & other.0)
  }

  #[inline]
  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.0 == 0
  }

  #[inline]
  #[must_use]
  pub const fn count(self) -> u32 {
    self.0.count_ones()
  }

  /// Single-bit capability.
  #[inline]
  #[must_use]
  pub const fn bit(bit: u8) -> Self {
    Self(1u64 << (bit & 63))
  }

  /// Iterate over the names of the features present in `self`.
  pub fn names(self) -> impl Iterator<Item = &'static str> {
    NAMES.iter().filter(move |(c, _)| self.has(*c)).map(|(_, n)| *n)
  }
}

impl core::ops::BitOr for Caps {
  type Output = Self;

  #[inline]
  fn bitor(self, rhs: Self) -> Self {
    self.union(rhs)
  }
}

impl core::ops::BitAnd for Caps {
  type Output = Self;

  #[inline]
  fn bitand(self, rhs: Self) -> Self {
    self.intersection(rhs)
  }
}

impl core::ops::BitOrAssign for Caps {
  #[inline]
  fn bitor_assign(&mut self, rhs: Self) {
    self.0 |= rhs.0;
  }
}

impl fmt::Debug for Caps {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.names()).finish()
  }
}

impl fmt::Display for Caps {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("[")?;
    for (i, name) in self.names().enumerate() {
      if i != 0 {
        f.write_str(", ")?;
      }
      f.write_str(name)?;
    }
    f.write_str("]")
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Architecture
// ─────────────────────────────────────────────────────────────────────────────

/// Target architecture enumeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Arch {
  X86_64,
  Aarch64,
  Wasm32,
  #[default]
  Other,
}

impl Arch {
  /// Get the architecture for the current compilation target.
  #[inline]
  #[must_use]
  pub const fn current() -> Self {
    if cfg!(target_arch = "x86_64") {
      Self::X86_64
    } else if cfg!(target_arch = "aarch64") {
      Self::Aarch64
    } else if cfg!(target_arch = "wasm32") {
      Self::Wasm32
    } else {
      Self::Other
    }
  }

  #[inline]
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
      Self::Wasm32 => "wasm32",
      Self::Other => "other",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// x86_64 Features (bits 0-31)
// ─────────────────────────────────────────────────────────────────────────────

/// x86_64 CPU features.
pub mod x86 {
  use super::Caps;

  pub const SSE2: Caps = Caps::bit(0);
  pub const SSSE3: Caps = Caps::bit(1);
  pub const AVX: Caps = Caps::bit(2);
  pub const AVX2: Caps = Caps::bit(3);
  pub const BMI2: Caps = Caps::bit(4);
  pub const AVX512F: Caps = Caps::bit(5);
  pub const AVX512VL: Caps = Caps::bit(6);

  /// Two 64-bit lanes per register (two leaves in lock-step).
  pub const X2_READY: Caps = Caps::from_raw(SSE2.as_raw() | SSSE3.as_raw());
  /// Four lanes per register.
  pub const X4_READY: Caps = Caps::from_raw(AVX.as_raw() | AVX2.as_raw());
  /// Eight lanes per register, with `vprolq` for the ρ rotations.
  pub const X8_READY: Caps = Caps::from_raw(AVX512F.as_raw() | AVX512VL.as_raw());
}

// ─────────────────────────────────────────────────────────────────────────────
// aarch64 Features (bits 32-63)
// ─────────────────────────────────────────────────────────────────────────────

/// aarch64 CPU features.
pub mod aarch64 {
  use super::Caps;

  pub const NEON: Caps = Caps::bit(32); // Baseline on AArch64
  pub const SHA3: Caps = Caps::bit(33); // EOR3, RAX1, XAR, BCAX
  pub const SVE2: Caps = Caps::bit(34);

  pub const X2_READY: Caps = NEON;
  pub const SHA3_READY: Caps = Caps::from_raw(NEON.as_raw() | SHA3.as_raw());
}

const NAMES: &[(Caps, &str)] = &[
  (x86::SSE2, "SSE2"),
  (x86::SSSE3, "SSSE3"),
  (x86::AVX, "AVX"),
  (x86::AVX2, "AVX2"),
  (x86::BMI2, "BMI2"),
  (x86::AVX512F, "AVX512F"),
  (x86::AVX512VL, "AVX512VL"),
  (aarch64::NEON, "NEON"),
  (aarch64::SHA3, "SHA3"),
  (aarch64::SVE2, "SVE2"),
];
