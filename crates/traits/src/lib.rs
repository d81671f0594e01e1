//! Core traits for the ktwelve workspace.
//!
//! This crate provides the small vocabulary shared by every hasher in the
//! workspace. It is `no_std` compatible and has zero dependencies.
//!
//! # Traits
//!
//! | Trait | Purpose | Examples |
//! |-------|---------|----------|
//! | [`Xof`] | Extendable-output readers | TurboSHAKE128, KT128, KT256 |
//!
//! # Error Types
//!
//! - [`SequenceError`] - An operation was called in a phase that does not accept it
//! - [`OutputLengthError`] - A caller buffer does not match the length fixed at construction
//!
//! # Fallibility Discipline
//!
//! This crate denies `unwrap`, `expect`, and indexing in non-test code to ensure
//! all error paths are handled explicitly.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod error;
#[cfg(feature = "std")]
pub mod io;
mod xof;

pub use error::{OutputLengthError, SequenceError};
pub use xof::Xof;
