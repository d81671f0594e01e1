//! Parallel chunk processor: spread a run of whole leaves over a batch pool.
//!
//! The run is cut into contiguous sub-ranges of nearly equal size, one job per
//! range. Each job reads only its own leaves and writes only its own
//! chaining-value slots, so the pool's "all finished" barrier is the only
//! synchronization needed.

extern crate alloc;

use alloc::{boxed::Box, vec::Vec};

use pool::{BatchPool, PoolError, ScopedJob};

use super::{
  CHUNK_SIZE,
  kernels::{LeafKernelId, hash_leaves},
};
use crate::crypto::turboshake::Security;

/// Fewer leaves than this per job cost more to dispatch than to hash.
pub const MIN_LEAVES_PER_THREAD: usize = 4;

/// Upper bound on jobs per batch.
pub const MAX_THREADS: usize = 64;

/// Leaves handed to one dispatch; bounds the chaining-value buffer.
pub const MAX_BATCH_LEAVES: usize = 4096;

/// Number of jobs to split `leaves` into for a pool with `workers` workers.
#[inline]
#[must_use]
pub(crate) fn threads_to_use(leaves: usize, workers: usize) -> usize {
  (leaves / MIN_LEAVES_PER_THREAD).min(workers).min(MAX_THREADS).max(1)
}

/// Sizes of `parts` contiguous ranges covering `total` items; the first
/// `total % parts` ranges take one extra item.
pub(crate) fn partition(total: usize, parts: usize) -> impl Iterator<Item = usize> {
  let parts = parts.max(1);
  let base = total / parts;
  let extra = total % parts;
  (0..parts).map(move |i| base + usize::from(i < extra))
}

/// Hash the whole leaves in `input` into `cvs` using `pool`.
///
/// With a single job the work runs on the calling thread and the pool is not
/// touched. On error some slots may be unwritten; the caller recomputes them.
pub(crate) fn process_leaves(
  pool: &dyn BatchPool,
  kernel: LeafKernelId,
  security: Security,
  input: &[u8],
  cvs: &mut [u8],
) -> Result<(), PoolError> {
  let leaves = input.len() / CHUNK_SIZE;
  let threads = threads_to_use(leaves, pool.workers());
  if threads == 1 {
    hash_leaves(kernel, security, input, cvs);
    return Ok(());
  }

  let cv_len = security.capacity();
  let mut input = input;
  let mut cvs = cvs;
  let mut jobs: Vec<ScopedJob<'_>> = Vec::with_capacity(threads);
  for count in partition(leaves, threads) {
    let (job_in, in_rest) = input.split_at(count * CHUNK_SIZE);
    let (job_out, out_rest) = core::mem::take(&mut cvs).split_at_mut(count * cv_len);
    jobs.push(Box::new(move || hash_leaves(kernel, security, job_in, job_out)));
    input = in_rest;
    cvs = out_rest;
  }

  tracing::trace!(leaves, threads, kernel = kernel.as_str(), "dispatching leaf batch");
  pool.run_scoped(jobs)
}

#[cfg(test)]
mod tests {
  use alloc::{sync::Arc, vec};

  use pool::{SequentialPool, WorkerPool};

  use super::*;

  #[test]
  fn thread_count_bounds() {
    assert_eq!(threads_to_use(0, 8), 1);
    assert_eq!(threads_to_use(7, 8), 1);
    assert_eq!(threads_to_use(8, 8), 2);
    assert_eq!(threads_to_use(1000, 8), 8);
    assert_eq!(threads_to_use(10_000, 200), MAX_THREADS);
  }

  #[test]
  fn partition_front_loads_remainder() {
    assert_eq!(partition(10, 3).collect::<Vec<_>>(), [4, 3, 3]);
    assert_eq!(partition(9, 3).collect::<Vec<_>>(), [3, 3, 3]);
    assert_eq!(partition(2, 4).collect::<Vec<_>>(), [1, 1, 0, 0]);
    assert_eq!(partition(5, 0).collect::<Vec<_>>(), [5]);
  }

  fn sequential_cvs(security: Security, input: &[u8]) -> Vec<u8> {
    let mut cvs = vec![0u8; input.len() / CHUNK_SIZE * security.capacity()];
    hash_leaves(LeafKernelId::Portable, security, input, &mut cvs);
    cvs
  }

  #[test]
  fn pooled_matches_sequential() {
    let input: Vec<u8> = (0..37 * CHUNK_SIZE).map(|i| (i % 253) as u8).collect();
    let pools: [Arc<dyn BatchPool>; 2] = [
      Arc::new(WorkerPool::new(3).unwrap()),
      Arc::new(SequentialPool::new().with_virtual_workers(5)),
    ];
    for security in [Security::Bits128, Security::Bits256] {
      let expected = sequential_cvs(security, &input);
      for pool in &pools {
        let mut cvs = vec![0u8; expected.len()];
        process_leaves(pool.as_ref(), LeafKernelId::Interleave4, security, &input, &mut cvs).unwrap();
        assert_eq!(cvs, expected);
      }
    }
  }

  #[test]
  fn queue_full_is_surfaced() {
    let input = vec![7u8; 16 * CHUNK_SIZE];
    let pool = SequentialPool::new().with_virtual_workers(4).with_queue_capacity(2);
    let mut cvs = vec![0u8; 16 * 32];
    let err = process_leaves(&pool, LeafKernelId::Portable, Security::Bits128, &input, &mut cvs).unwrap_err();
    assert!(matches!(err, PoolError::QueueFull { .. }));
  }
}
