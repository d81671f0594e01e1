//! KangarooTwelve: a tree hash over TurboSHAKE.
//!
//! The message is cut into 8 KiB leaves. The first leaf is absorbed directly
//! into the final node; every later leaf is hashed on its own into a chaining
//! value, and the chaining values follow the first leaf in the final node.
//! Whole leaves are independent, so long inputs can be spread over a
//! [`BatchPool`](pool::BatchPool) without changing the output.
//!
//! # Phases
//!
//! ```text
//! Absorbing ──finalize (fixed length)──▶ Finalized
//!     │
//!     └──────finalize (streaming)──────▶ Squeezing ──squeeze──▶ Squeezing
//! ```
//!
//! Calls that do not fit the current phase fail with [`KtError::Sequence`]
//! and leave the hasher untouched.
//!
//! # Examples
//!
//! ```
//! use hashes::crypto::{Kt128, kangaroo::Phase};
//!
//! // One-shot.
//! let mut digest = [0u8; 32];
//! Kt128::hash(b"message", &mut digest, b"").unwrap();
//!
//! // Incremental, fixed output length.
//! let mut h = Kt128::new(32);
//! h.update(b"mess").unwrap();
//! h.update(b"age").unwrap();
//! let mut out = [0u8; 32];
//! h.finalize(b"", Some(&mut out)).unwrap();
//! assert_eq!(out, digest);
//! assert_eq!(h.phase(), Phase::Finalized);
//!
//! // Streaming output.
//! let mut h = Kt128::new(0);
//! h.update(b"message").unwrap();
//! h.finalize(b"", None).unwrap();
//! let mut head = [0u8; 16];
//! let mut tail = [0u8; 16];
//! h.squeeze(&mut head).unwrap();
//! h.squeeze(&mut tail).unwrap();
//! assert_eq!(head, digest[..16]);
//! assert_eq!(tail, digest[16..]);
//! ```

#![allow(clippy::indexing_slicing)] // Slice bounds are clamped to CHUNK_SIZE and the fixed CV buffers

pub mod config;
mod kernels;
#[cfg(feature = "std")]
pub mod parallel;


#[cfg(feature = "std")]
extern crate alloc;

#[cfg(feature = "std")]
use alloc::{sync::Arc, vec};
use core::fmt;

pub use kernels::{ALL as ALL_KERNELS, LeafKernelId, id_from_name};
#[cfg(feature = "std")]
use pool::BatchPool;
use traits::{OutputLengthError, SequenceError, Xof};

use self::kernels::hash_leaves;
use super::turboshake::{FinalNode, LeafNode, Security, Sponge as _};

/// Size of one leaf in bytes.
pub const CHUNK_SIZE: usize = 8192;

/// Final node delimiter when chaining values were absorbed.
const FINAL_WITH_CHILDREN: u8 = 0x06;

/// Final node delimiter when the whole input fit in the first leaf.
const FINAL_NO_CHILDREN: u8 = 0x07;

/// Trailer after the chaining-value count.
const CHILDREN_TRAILER: [u8; 2] = [0xFF, 0xFF];

/// Leaves hashed per sequential group; matches the widest kernel.
const SEQUENTIAL_GROUP: usize = 8;

/// Largest chaining value (KT256).
const MAX_CV_LEN: usize = 64;

// ─────────────────────────────────────────────────────────────────────────────
// Length encoding
// ─────────────────────────────────────────────────────────────────────────────

/// Encode `value` as its minimal big-endian bytes followed by their count.
///
/// Zero encodes as the single byte `0x00`.
///
/// ```
/// use hashes::crypto::kangaroo::length_encode;
///
/// let mut buf = [0u8; 9];
/// assert_eq!(length_encode(0, &mut buf), &[0x00]);
/// assert_eq!(length_encode(0x1234, &mut buf), &[0x12, 0x34, 0x02]);
/// ```
#[inline]
pub fn length_encode(value: u64, buf: &mut [u8; 9]) -> &[u8] {
  buf[..8].copy_from_slice(&value.to_be_bytes());
  let skip = buf[..8].iter().take_while(|&&b| b == 0).count();
  buf[8] = (8 - skip) as u8;
  &buf[skip..]
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase & errors
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle phase of a tree hasher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
  /// Accepting message bytes.
  Absorbing,
  /// Fixed-length output produced; nothing further is accepted.
  Finalized,
  /// Streaming output on demand.
  Squeezing,
}

impl Phase {
  #[inline]
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Absorbing => "absorbing",
      Self::Finalized => "finalized",
      Self::Squeezing => "squeezing",
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Errors returned by the tree hashers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum KtError {
  /// Operation called in the wrong phase.
  Sequence(SequenceError),
  /// One-shot hashing asked for zero bytes of output.
  ZeroOutputLength,
  /// Output buffer does not match the fixed output length.
  OutputLength(OutputLengthError),
}

impl fmt::Display for KtError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Sequence(e) => write!(f, "sequence error: {e}"),
      Self::ZeroOutputLength => f.write_str("output length must be non-zero"),
      Self::OutputLength(e) => write!(f, "output length error: {e}"),
    }
  }
}

impl core::error::Error for KtError {
  fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
    match self {
      Self::Sequence(e) => Some(e),
      Self::OutputLength(e) => Some(e),
      Self::ZeroOutputLength => None,
    }
  }
}

impl From<SequenceError> for KtError {
  #[inline]
  fn from(e: SequenceError) -> Self {
    Self::Sequence(e)
  }
}

impl From<OutputLengthError> for KtError {
  #[inline]
  fn from(e: OutputLengthError) -> Self {
    Self::OutputLength(e)
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tree state
// ─────────────────────────────────────────────────────────────────────────────

/// Security-generic tree hasher behind [`Kt128`] and [`Kt256`].
#[derive(Clone)]
struct Tree {
  security: Security,
  /// First leaf's message bytes, then chaining values.
  final_node: FinalNode,
  /// Open leaf after the first; meaningful while `block_number > 0`.
  queue_node: LeafNode,
  /// Zero selects streaming output.
  fixed_output_len: usize,
  /// One more than the number of chaining values absorbed, once the first leaf closes.
  block_number: u64,
  /// Bytes in the open leaf (`final_node` while `block_number == 0`, else `queue_node`).
  queue_absorbed_len: usize,
  phase: Phase,
  kernel: LeafKernelId,
  #[cfg(feature = "std")]
  pool: Option<Arc<dyn BatchPool>>,
}

impl Tree {
  fn new(security: Security, output_len: usize) -> Self {
    Self {
      security,
      final_node: FinalNode::new(security),
      queue_node: LeafNode::new(security),
      fixed_output_len: output_len,
      block_number: 0,
      queue_absorbed_len: 0,
      phase: Phase::Absorbing,
      kernel: config::get().leaf_kernel,
      #[cfg(feature = "std")]
      pool: None,
    }
  }

  #[inline]
  fn expect_phase(&self, expected: Phase, operation: &'static str) -> Result<(), KtError> {
    if self.phase == expected {
      Ok(())
    } else {
      Err(SequenceError::new(operation, self.phase.as_str()).into())
    }
  }

  fn update(&mut self, input: &[u8]) -> Result<(), KtError> {
    self.expect_phase(Phase::Absorbing, "update")?;
    self.absorb_message(input);
    Ok(())
  }

  fn absorb_message(&mut self, mut input: &[u8]) {
    if self.block_number == 0 {
      let take = core::cmp::min(CHUNK_SIZE - self.queue_absorbed_len, input.len());
      self.final_node.absorb(&input[..take]);
      self.queue_absorbed_len += take;
      input = &input[take..];
      if input.is_empty() {
        return;
      }
      // The first leaf is full and more data follows.
      self.final_node.close_first_leaf();
      self.block_number = 1;
      self.queue_absorbed_len = 0;
    }

    if self.queue_absorbed_len != 0 {
      let take = core::cmp::min(CHUNK_SIZE - self.queue_absorbed_len, input.len());
      self.queue_node.absorb(&input[..take]);
      self.queue_absorbed_len += take;
      input = &input[take..];
      if self.queue_absorbed_len < CHUNK_SIZE {
        return;
      }
      self.finish_queue_leaf();
    }

    let whole = input.len() - input.len() % CHUNK_SIZE;
    let (leaves, rest) = input.split_at(whole);
    self.absorb_leaves(leaves);

    if !rest.is_empty() {
      self.queue_node = LeafNode::new(self.security);
      self.queue_node.absorb(rest);
      self.queue_absorbed_len = rest.len();
    }
  }

  /// Close the open leaf and fold its chaining value into the final node.
  fn finish_queue_leaf(&mut self) {
    let leaf = core::mem::replace(&mut self.queue_node, LeafNode::new(self.security));
    let mut cv = [0u8; MAX_CV_LEN];
    let cv = &mut cv[..self.security.capacity()];
    leaf.chaining_value(cv);
    self.final_node.absorb(cv);
    self.block_number += 1;
    self.queue_absorbed_len = 0;
  }

  /// Hash whole leaves and absorb their chaining values in order.
  fn absorb_leaves(&mut self, leaves: &[u8]) {
    if leaves.is_empty() {
      return;
    }

    #[cfg(feature = "std")]
    if let Some(pool) = self.pool.clone()
      && leaves.len() >= pool.min_input_size()
    {
      self.absorb_leaves_pooled(pool.as_ref(), leaves);
      return;
    }

    self.absorb_leaves_sequential(leaves);
  }

  fn absorb_leaves_sequential(&mut self, leaves: &[u8]) {
    let cv_len = self.security.capacity();
    let mut buf = [0u8; SEQUENTIAL_GROUP * MAX_CV_LEN];
    for group in leaves.chunks(SEQUENTIAL_GROUP * CHUNK_SIZE) {
      let count = group.len() / CHUNK_SIZE;
      let cvs = &mut buf[..count * cv_len];
      hash_leaves(self.kernel, self.security, group, cvs);
      self.final_node.absorb(cvs);
      self.block_number += count as u64;
    }
  }

  #[cfg(feature = "std")]
  fn absorb_leaves_pooled(&mut self, pool: &dyn BatchPool, leaves: &[u8]) {
    let cv_len = self.security.capacity();
    let total = leaves.len() / CHUNK_SIZE;
    let mut buf = vec![0u8; total.min(parallel::MAX_BATCH_LEAVES) * cv_len];
    for batch in leaves.chunks(parallel::MAX_BATCH_LEAVES * CHUNK_SIZE) {
      let count = batch.len() / CHUNK_SIZE;
      let cvs = &mut buf[..count * cv_len];
      if let Err(error) = parallel::process_leaves(pool, self.kernel, self.security, batch, cvs) {
        tracing::warn!(%error, leaves = count, "parallel leaf batch failed, hashing sequentially");
        hash_leaves(self.kernel, self.security, batch, cvs);
      }
      self.final_node.absorb(cvs);
      self.block_number += count as u64;
    }
  }

  fn finalize(&mut self, customization: &[u8], out: Option<&mut [u8]>) -> Result<(), KtError> {
    self.expect_phase(Phase::Absorbing, "finalize")?;
    if self.fixed_output_len != 0 {
      let actual = out.as_deref().map_or(0, <[u8]>::len);
      if actual != self.fixed_output_len {
        return Err(OutputLengthError::new(self.fixed_output_len, actual).into());
      }
    }

    let mut enc = [0u8; 9];
    self.absorb_message(customization);
    self.absorb_message(length_encode(customization.len() as u64, &mut enc));

    let delimiter = if self.block_number == 0 {
      FINAL_NO_CHILDREN
    } else {
      if self.queue_absorbed_len != 0 {
        self.finish_queue_leaf();
      }
      self.block_number -= 1;
      self.final_node.absorb(length_encode(self.block_number, &mut enc));
      self.final_node.absorb(&CHILDREN_TRAILER);
      FINAL_WITH_CHILDREN
    };
    self.final_node.absorb_domain_separation(delimiter);

    self.phase = if self.fixed_output_len != 0 {
      Phase::Finalized
    } else {
      Phase::Squeezing
    };
    if let Some(out) = out {
      self.final_node.squeeze(out);
    }
    Ok(())
  }

  fn squeeze(&mut self, out: &mut [u8]) -> Result<(), KtError> {
    self.expect_phase(Phase::Squeezing, "squeeze")?;
    self.final_node.squeeze(out);
    Ok(())
  }
}

impl fmt::Debug for Tree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut d = f.debug_struct("KangarooTwelve");
    d.field("security", &self.security.bits())
      .field("phase", &self.phase)
      .field("fixed_output_len", &self.fixed_output_len)
      .field("block_number", &self.block_number)
      .field("queue_absorbed_len", &self.queue_absorbed_len)
      .field("kernel", &self.kernel.as_str());
    #[cfg(feature = "std")]
    d.field("pool_workers", &self.pool.as_ref().map(|p| p.workers()));
    d.finish_non_exhaustive()
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output reader
// ─────────────────────────────────────────────────────────────────────────────

/// Streaming output of a finalized tree hash.
#[derive(Clone, Debug)]
pub struct KtReader {
  node: FinalNode,
}

impl Xof for KtReader {
  #[inline]
  fn squeeze(&mut self, out: &mut [u8]) {
    self.node.squeeze(out);
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public hashers
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! kangaroo_twelve {
  ($(#[$meta:meta])* $name:ident, $security:expr) => {
    $(#[$meta])*
    #[derive(Clone, Debug)]
    pub struct $name {
      tree: Tree,
    }

    impl $name {
      /// Chaining value length in bytes.
      pub const CV_LEN: usize = $security.capacity();

      /// Start a hasher. `output_len == 0` selects streaming output.
      #[must_use]
      pub fn new(output_len: usize) -> Self {
        Self {
          tree: Tree::new($security, output_len),
        }
      }

      /// Start a hasher that spreads whole leaves over `pool`.
      #[cfg(feature = "std")]
      #[must_use]
      pub fn with_pool(output_len: usize, pool: Arc<dyn BatchPool>) -> Self {
        let mut h = Self::new(output_len);
        h.tree.pool = Some(pool);
        h
      }

      /// Start a hasher on the process-wide [`pool::default_pool`].
      #[cfg(feature = "std")]
      #[must_use]
      pub fn with_default_pool(output_len: usize) -> Self {
        Self::with_pool(output_len, pool::default_pool())
      }

      /// Override the leaf kernel. Every kernel yields the same output.
      #[must_use]
      pub fn with_kernel(mut self, kernel: LeafKernelId) -> Self {
        self.tree.kernel = kernel;
        self
      }

      /// One-shot: hash `input` under `customization` into `out`.
      ///
      /// # Errors
      ///
      /// [`KtError::ZeroOutputLength`] if `out` is empty.
      pub fn hash(input: &[u8], out: &mut [u8], customization: &[u8]) -> Result<(), KtError> {
        if out.is_empty() {
          return Err(KtError::ZeroOutputLength);
        }
        let mut h = Self::new(out.len());
        h.update(input)?;
        h.finalize(customization, Some(out))
      }

      /// One-shot hashing on the default pool.
      ///
      /// # Errors
      ///
      /// [`KtError::ZeroOutputLength`] if `out` is empty.
      #[cfg(feature = "std")]
      pub fn hash_parallel(input: &[u8], out: &mut [u8], customization: &[u8]) -> Result<(), KtError> {
        if out.is_empty() {
          return Err(KtError::ZeroOutputLength);
        }
        let mut h = Self::with_default_pool(out.len());
        h.update(input)?;
        h.finalize(customization, Some(out))
      }

      /// Absorb more message bytes.
      ///
      /// # Errors
      ///
      /// [`KtError::Sequence`] unless absorbing.
      #[inline]
      pub fn update(&mut self, input: &[u8]) -> Result<(), KtError> {
        self.tree.update(input)
      }

      /// Absorb `customization` and close the tree.
      ///
      /// With a fixed output length, `out` must be exactly that long and
      /// receives the digest. In streaming mode `out` is optional and, when
      /// given, receives the first output bytes.
      ///
      /// # Errors
      ///
      /// [`KtError::Sequence`] unless absorbing, [`KtError::OutputLength`] if a
      /// fixed-length hasher gets a missing or mis-sized buffer. The hasher is
      /// unchanged on error.
      pub fn finalize(&mut self, customization: &[u8], out: Option<&mut [u8]>) -> Result<(), KtError> {
        self.tree.finalize(customization, out)
      }

      /// Produce the next `out.len()` output bytes.
      ///
      /// # Errors
      ///
      /// [`KtError::Sequence`] unless streaming output was finalized.
      #[inline]
      pub fn squeeze(&mut self, out: &mut [u8]) -> Result<(), KtError> {
        self.tree.squeeze(out)
      }

      /// Turn a streaming hasher into an [`Xof`] reader.
      ///
      /// # Errors
      ///
      /// [`KtError::Sequence`] unless in the squeezing phase.
      pub fn into_reader(self) -> Result<KtReader, KtError> {
        self.tree.expect_phase(Phase::Squeezing, "into_reader")?;
        Ok(KtReader {
          node: self.tree.final_node,
        })
      }

      #[inline]
      #[must_use]
      pub const fn phase(&self) -> Phase {
        self.tree.phase
      }

      /// Name of the leaf kernel this hasher uses.
      #[inline]
      #[must_use]
      pub const fn kernel_name(&self) -> &'static str {
        self.tree.kernel.as_str()
      }

      #[inline]
      #[must_use]
      pub const fn kernel(&self) -> LeafKernelId {
        self.tree.kernel
      }
    }

    impl Default for $name {
      /// A streaming hasher.
      #[inline]
      fn default() -> Self {
        Self::new(0)
      }
    }
  };
}

kangaroo_twelve!(
  /// KangarooTwelve at 128-bit security (KT128), over TurboSHAKE128.
  Kt128,
  Security::Bits128
);

kangaroo_twelve!(
  /// KangarooTwelve at 256-bit security (KT256), over TurboSHAKE256.
  Kt256,
  Security::Bits256
);
