//! Leaf kernels: hash whole leaves into chaining values, 1, 2, 4 or 8 at a time.
//!
//! Wider kernels absorb the same block offset of every leaf, then permute the
//! group with [`keccak_p1600_12_xn`], which runs the scalar permutation once
//! per state. All kernels are portable Rust and only differ in how leaves are
//! grouped. Every kernel yields the same chaining values as the scalar sponge
//! path.

#![allow(clippy::indexing_slicing)] // Leaf slices are exact multiples of CHUNK_SIZE

use super::CHUNK_SIZE;
use crate::crypto::{
  keccak::{KeccakState, keccak_p1600_12_xn},
  turboshake::{LeafNode, Security, Sponge as _},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LeafKernelId {
  Portable = 0,
  Interleave2,
  Interleave4,
  Interleave8,
}

pub const ALL: &[LeafKernelId] = &[
  LeafKernelId::Portable,
  LeafKernelId::Interleave2,
  LeafKernelId::Interleave4,
  LeafKernelId::Interleave8,
];

impl LeafKernelId {
  #[inline]
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Portable => "portable",
      Self::Interleave2 => "portable/x2",
      Self::Interleave4 => "portable/x4",
      Self::Interleave8 => "portable/x8",
    }
  }

  /// Leaves hashed per kernel call.
  #[inline]
  #[must_use]
  pub const fn lanes(self) -> usize {
    match self {
      Self::Portable => 1,
      Self::Interleave2 => 2,
      Self::Interleave4 => 4,
      Self::Interleave8 => 8,
    }
  }

  /// Widest kernel that does not exceed `lanes`.
  #[inline]
  #[must_use]
  pub const fn for_lanes(lanes: u8) -> Self {
    match lanes {
      0 | 1 => Self::Portable,
      2 | 3 => Self::Interleave2,
      4..=7 => Self::Interleave4,
      _ => Self::Interleave8,
    }
  }

  /// Next narrower kernel, used for the leftover leaves of a run.
  #[inline]
  #[must_use]
  pub(crate) const fn narrower(self) -> Option<Self> {
    match self {
      Self::Portable => None,
      Self::Interleave2 => Some(Self::Portable),
      Self::Interleave4 => Some(Self::Interleave2),
      Self::Interleave8 => Some(Self::Interleave4),
    }
  }
}

#[must_use]
pub fn id_from_name(name: &str) -> Option<LeafKernelId> {
  ALL.iter().copied().find(|id| id.as_str() == name)
}

pub(crate) type LeafFn = fn(Security, &[u8], &mut [u8]);

#[must_use]
pub(crate) fn leaf_fn(id: LeafKernelId) -> LeafFn {
  match id {
    LeafKernelId::Portable => leaves_portable,
    LeafKernelId::Interleave2 => leaves_interleaved::<2>,
    LeafKernelId::Interleave4 => leaves_interleaved::<4>,
    LeafKernelId::Interleave8 => leaves_interleaved::<8>,
  }
}

fn leaves_portable(security: Security, leaves: &[u8], cvs: &mut [u8]) {
  for (leaf, cv) in leaves
    .chunks_exact(CHUNK_SIZE)
    .zip(cvs.chunks_exact_mut(security.capacity()))
  {
    let mut node = LeafNode::new(security);
    node.absorb(leaf);
    node.chaining_value(cv);
  }
}

fn leaves_interleaved<const N: usize>(security: Security, leaves: &[u8], cvs: &mut [u8]) {
  debug_assert_eq!(leaves.len(), N * CHUNK_SIZE);
  debug_assert_eq!(cvs.len(), N * security.capacity());

  let rate = security.rate();
  let whole = CHUNK_SIZE - CHUNK_SIZE % rate;
  let mut states = [KeccakState::new(); N];

  let mut offset = 0usize;
  while offset < whole {
    for (st, leaf) in states.iter_mut().zip(leaves.chunks_exact(CHUNK_SIZE)) {
      st.xor_block(&leaf[offset..offset + rate]);
    }
    keccak_p1600_12_xn(&mut states);
    offset += rate;
  }

  for ((st, leaf), cv) in states
    .into_iter()
    .zip(leaves.chunks_exact(CHUNK_SIZE))
    .zip(cvs.chunks_exact_mut(security.capacity()))
  {
    let mut node = LeafNode::resume(security, st);
    node.absorb(&leaf[whole..]);
    node.chaining_value(cv);
  }
}

/// Hash a run of whole leaves into consecutive chaining-value slots.
///
/// `leaves.len()` must be a multiple of [`CHUNK_SIZE`] and `cvs` must hold one
/// `security.capacity()`-byte slot per leaf. Leaves beyond the last full group
/// of `kernel.lanes()` go through narrower kernels.
pub(crate) fn hash_leaves(kernel: LeafKernelId, security: Security, mut leaves: &[u8], mut cvs: &mut [u8]) {
  debug_assert_eq!(leaves.len() % CHUNK_SIZE, 0);
  debug_assert_eq!(leaves.len() / CHUNK_SIZE * security.capacity(), cvs.len());

  let cv_len = security.capacity();
  let mut next = Some(kernel);
  while let Some(id) = next {
    let lanes = id.lanes();
    let f = leaf_fn(id);
    while leaves.len() >= lanes * CHUNK_SIZE {
      let (now, rest) = leaves.split_at(lanes * CHUNK_SIZE);
      let (out, out_rest) = core::mem::take(&mut cvs).split_at_mut(lanes * cv_len);
      f(security, now, out);
      leaves = rest;
      cvs = out_rest;
    }
    next = id.narrower();
  }
}
