//! Capability detection, caching, and overrides.
//!
//! - Runtime detection via `std::arch` feature macros (std)
//! - Compile-time detection via `cfg!(target_feature)` (no_std)
//! - Caching (via `OnceLock` with `std`, a write-once atomic cell without)
//! - User overrides for testing and embedded targets

use core::sync::atomic::{AtomicBool, Ordering};

use crate::{caps::Caps, tune::Tune};

// ─────────────────────────────────────────────────────────────────────────────
// no_std cache: write-once cell built from atomics
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(not(feature = "std"))]
mod cache {
  use core::sync::atomic::{AtomicU8, AtomicU32, AtomicUsize, Ordering};

  use crate::{
    caps::Caps,
    tune::{Tune, TuneKind},
  };

  const UNINIT: u8 = 0;
  const BUSY: u8 = 1;
  const READY: u8 = 2;

  static STATE: AtomicU8 = AtomicU8::new(UNINIT);
  static BITS_LO: AtomicU32 = AtomicU32::new(0);
  static BITS_HI: AtomicU32 = AtomicU32::new(0);
  static KIND: AtomicU8 = AtomicU8::new(0);
  static LANES: AtomicU8 = AtomicU8::new(1);
  static MIN_BYTES: AtomicUsize = AtomicUsize::new(0);

  fn load() -> (Caps, Tune) {
    let lo = BITS_LO.load(Ordering::Relaxed) as u64;
    let hi = BITS_HI.load(Ordering::Relaxed) as u64;
    let tune = Tune {
      kind: TuneKind::from_u8(KIND.load(Ordering::Relaxed)),
      leaf_lanes: LANES.load(Ordering::Relaxed),
      parallel_min_bytes: MIN_BYTES.load(Ordering::Relaxed),
    };
    (Caps::from_raw(lo | (hi << 32)), tune)
  }

  /// Store `value` if nothing has been stored yet. First writer wins.
  pub fn publish((caps, tune): (Caps, Tune)) -> bool {
    if STATE
      .compare_exchange(UNINIT, BUSY, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      return false;
    }
    let raw = caps.as_raw();
    BITS_LO.store(raw as u32, Ordering::Relaxed);
    BITS_HI.store((raw >> 32) as u32, Ordering::Relaxed);
    KIND.store(tune.kind as u8, Ordering::Relaxed);
    LANES.store(tune.leaf_lanes, Ordering::Relaxed);
    MIN_BYTES.store(tune.parallel_min_bytes, Ordering::Relaxed);
    STATE.store(READY, Ordering::Release);
    true
  }

  pub fn get_or_init(f: fn() -> (Caps, Tune)) -> (Caps, Tune) {
    if STATE.load(Ordering::Acquire) == READY {
      return load();
    }
    let value = f();
    publish(value);
    if STATE.load(Ordering::Acquire) == READY { load() } else { value }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Overrides
// ─────────────────────────────────────────────────────────────────────────────

static OVERRIDE_SET: AtomicBool = AtomicBool::new(false);

#[cfg(feature = "std")]
static OVERRIDE: std::sync::RwLock<Option<(Caps, Tune)>> = std::sync::RwLock::new(None);

#[cfg(feature = "std")]
static CACHED: std::sync::OnceLock<(Caps, Tune)> = std::sync::OnceLock::new();

/// Seed the cache with user-supplied values. Returns `false` if detection
/// already ran (or another seed won), in which case nothing changes.
pub fn init_with_caps(caps: Caps, tune: Tune) -> bool {
  #[cfg(feature = "std")]
  {
    CACHED.set((caps, tune)).is_ok()
  }
  #[cfg(not(feature = "std"))]
  {
    cache::publish((caps, tune))
  }
}

#[cfg(feature = "std")]
pub fn set_caps_override(value: Option<(Caps, Tune)>) {
  let mut slot = OVERRIDE.write().unwrap_or_else(std::sync::PoisonError::into_inner);
  *slot = value;
  OVERRIDE_SET.store(value.is_some(), Ordering::Release);
}

#[inline]
pub fn has_override() -> bool {
  OVERRIDE_SET.load(Ordering::Acquire)
}

#[inline]
fn get_override() -> Option<(Caps, Tune)> {
  if !OVERRIDE_SET.load(Ordering::Acquire) {
    return None;
  }
  #[cfg(feature = "std")]
  {
    *OVERRIDE.read().unwrap_or_else(std::sync::PoisonError::into_inner)
  }
  #[cfg(not(feature = "std"))]
  {
    None
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry points
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
pub fn get() -> (Caps, Tune) {
  if let Some(result) = get_override() {
    return result;
  }

  #[cfg(feature = "std")]
  {
    *CACHED.get_or_init(detect_uncached)
  }

  #[cfg(not(feature = "std"))]
  {
    cache::get_or_init(detect_uncached)
  }
}

#[inline]
pub fn caps() -> Caps {
  get().0
}

#[inline]
pub fn tune() -> Tune {
  get().1
}

/// Detect capabilities without caching.
///
/// Under Miri, always returns portable-only capabilities.
#[must_use]
pub fn detect_uncached() -> (Caps, Tune) {
  if cfg!(miri) {
    return (Caps::NONE, Tune::PORTABLE);
  }
  let caps = runtime_caps().union(compile_time_caps());
  (caps, Tune::for_caps(caps))
}

// ─────────────────────────────────────────────────────────────────────────────
// Detection
// ─────────────────────────────────────────────────────────────────────────────

const fn compile_time_caps() -> Caps {
  use crate::caps::{aarch64, x86};

  let mut bits = 0u64;
  if cfg!(all(target_arch = "x86_64", target_feature = "sse2")) {
    bits |= x86::SSE2.as_raw();
  }
  if cfg!(all(target_arch = "x86_64", target_feature = "ssse3")) {
    bits |= x86::SSSE3.as_raw();
  }
  if cfg!(all(target_arch = "x86_64", target_feature = "avx")) {
    bits |= x86::AVX.as_raw();
  }
  if cfg!(all(target_arch = "x86_64", target_feature = "avx2")) {
    bits |= x86::AVX2.as_raw();
  }
  if cfg!(all(target_arch = "x86_64", target_feature = "bmi2")) {
    bits |= x86::BMI2.as_raw();
  }
  if cfg!(all(target_arch = "x86_64", target_feature = "avx512f")) {
    bits |= x86::AVX512F.as_raw();
  }
  if cfg!(all(target_arch = "x86_64", target_feature = "avx512vl")) {
    bits |= x86::AVX512VL.as_raw();
  }
  if cfg!(all(target_arch = "aarch64", target_feature = "neon")) {
    bits |= aarch64::NEON.as_raw();
  }
  if cfg!(all(target_arch = "aarch64", target_feature = "sha3")) {
    bits |= aarch64::SHA3.as_raw();
  }
  Caps::from_raw(bits)
}

#[cfg(all(target_arch = "x86_64", feature = "std"))]
fn runtime_caps() -> Caps {
  use crate::caps::x86;

  let mut caps = Caps::NONE;
  if std::arch::is_x86_feature_detected!("sse2") {
    caps |= x86::SSE2;
  }
  if std::arch::is_x86_feature_detected!("ssse3") {
    caps |= x86::SSSE3;
  }
  if std::arch::is_x86_feature_detected!("avx") {
    caps |= x86::AVX;
  }
  if std::arch::is_x86_feature_detected!("avx2") {
    caps |= x86::AVX2;
  }
  if std::arch::is_x86_feature_detected!("bmi2") {
    caps |= x86::BMI2;
  }
  if std::arch::is_x86_feature_detected!("avx512f") {
    caps |= x86::AVX512F;
  }
  if std::arch::is_x86_feature_detected!("avx512vl") {
    caps |= x86::AVX512VL;
  }
  caps
}

#[cfg(all(target_arch = "aarch64", feature = "std"))]
fn runtime_caps() -> Caps {
  use crate::caps::aarch64;

  let mut caps = aarch64::NEON;
  if std::arch::is_aarch64_feature_detected!("sha3") {
    caps |= aarch64::SHA3;
  }
  if std::arch::is_aarch64_feature_detected!("sve2") {
    caps |= aarch64::SVE2;
  }
  caps
}

#[cfg(not(all(any(target_arch = "x86_64", target_arch = "aarch64"), feature = "std")))]
fn runtime_caps() -> Caps {
  Caps::NONE
}
