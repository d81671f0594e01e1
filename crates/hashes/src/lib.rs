//! KangarooTwelve (KT128 / KT256) and TurboSHAKE extendable-output hashing.
//!
//! The core is `no_std`. With the `std` feature (default), long inputs can be
//! spread over a [`pool::BatchPool`] with identical output.
//!
//! # Modules
//!
//! - [`crypto`] - Tree hash, sponge and the Keccak-p[1600, 12] permutation.
//! - [`DispatchInfo`] - Which leaf kernel and thresholds apply on this machine.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod crypto;
mod introspect;

pub use introspect::DispatchInfo;
pub use traits::Xof;
