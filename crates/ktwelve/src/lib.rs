//! KangarooTwelve tree hashing over TurboSHAKE, with optional thread-pool parallelism.
//!
//! `ktwelve` re-exports the workspace crates behind one dependency: the
//! KT128/KT256 hashers, the TurboSHAKE XOFs, the batch pools, and dispatch
//! introspection.
//!
//! # Quick Start
//!
//! ```
//! use ktwelve::Kt128;
//!
//! // One-shot computation
//! let mut digest = [0u8; 32];
//! Kt128::hash(b"", &mut digest, b"").unwrap();
//! assert_eq!(digest[..4], [0x1a, 0xc2, 0xd4, 0x50]);
//!
//! // Streaming input, streaming output
//! let mut h = Kt128::new(0);
//! h.update(b"hello ").unwrap();
//! h.update(b"world").unwrap();
//! h.finalize(b"", None).unwrap();
//! let mut out = [0u8; 100];
//! h.squeeze(&mut out).unwrap();
//! ```
//!
//! # Parallel hashing
//!
//! ```
//! # #[cfg(feature = "std")] {
//! use std::sync::Arc;
//!
//! use ktwelve::{Kt256, WorkerPool};
//!
//! let pool = Arc::new(WorkerPool::new(4).unwrap().with_min_input_size(0));
//! let data = vec![0x5Au8; 1 << 20];
//!
//! let mut pooled = Kt256::with_pool(64, pool);
//! pooled.update(&data).unwrap();
//! let mut a = [0u8; 64];
//! pooled.finalize(b"", Some(&mut a)).unwrap();
//!
//! let mut b = [0u8; 64];
//! Kt256::hash(&data, &mut b, b"").unwrap();
//! assert_eq!(a, b);
//! # }
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std` | Yes | Runtime CPU detection, env configuration, thread pools, `tracing` events |
//!
//! ## `no_std` Usage
//!
//! ```toml
//! [dependencies]
//! ktwelve = { version = "0.1", default-features = false }
//! ```
//!
//! Without `std`, hashing is sequential and kernel tuning uses compile-time
//! feature detection only.
#![cfg_attr(not(feature = "std"), no_std)]

// =============================================================================
// Tree hash
// =============================================================================

pub use hashes::crypto::{
  // KangarooTwelve
  Kt128,
  Kt256,
  KtError,
  KtReader,
  Phase,
  // TurboSHAKE
  InvalidDomainSeparation,
  Security,
  TurboShake128,
  TurboShake128Xof,
  TurboShake256,
  TurboShake256Xof,
  kangaroo::{CHUNK_SIZE, LeafKernelId, length_encode},
};
pub use hashes::{DispatchInfo, crypto};

// =============================================================================
// Traits & errors
// =============================================================================

#[cfg(feature = "std")]
pub use traits::io::XofReader;
pub use traits::{OutputLengthError, SequenceError, Xof};

// =============================================================================
// Thread pools
// =============================================================================

#[cfg(feature = "std")]
pub use pool::{BatchPool, PoolError, SequentialPool, WorkerPool, default_pool};

/// Detected platform capabilities and tuning.
#[inline]
#[must_use]
pub fn platform_describe() -> platform::Description {
  platform::describe()
}
