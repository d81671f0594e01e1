//! Fuzz target: pooled and sequential leaf hashing must agree.
//!
//! The input is stretched to several leaves so the pool path is taken.

#![no_main]

use std::sync::{Arc, OnceLock};

use arbitrary::Arbitrary;
use hashes::crypto::{Kt128, kangaroo::CHUNK_SIZE};
use libfuzzer_sys::fuzz_target;
use pool::{BatchPool, SequentialPool, WorkerPool};

#[derive(Arbitrary, Debug)]
struct Input {
  seed: Vec<u8>,
  /// Number of whole leaves past the first (kept small)
  leaves: u8,
  tail: u16,
  /// Split point for the two update calls
  split: u32,
  queue_capacity: u8,
}

fn worker_pool() -> Arc<dyn BatchPool> {
  static POOL: OnceLock<Arc<dyn BatchPool>> = OnceLock::new();
  Arc::clone(POOL.get_or_init(|| Arc::new(WorkerPool::new(4).unwrap().with_min_input_size(0))))
}

fuzz_target!(|input: Input| {
  if input.seed.is_empty() {
    return;
  }
  let len = (1 + (input.leaves % 40) as usize) * CHUNK_SIZE + (input.tail as usize % CHUNK_SIZE);
  let data: Vec<u8> = input.seed.iter().copied().cycle().take(len).collect();

  let mut expected = [0u8; 32];
  Kt128::hash(&data, &mut expected, b"").unwrap();

  let sequential: Arc<dyn BatchPool> = Arc::new(
    SequentialPool::new()
      .with_virtual_workers(8)
      .with_queue_capacity(input.queue_capacity as usize)
      .with_min_input_size(0),
  );

  let split = input.split as usize % (data.len() + 1);
  for pool in [worker_pool(), sequential] {
    let mut h = Kt128::with_pool(32, pool);
    h.update(&data[..split]).unwrap();
    h.update(&data[split..]).unwrap();
    let mut actual = [0u8; 32];
    h.finalize(b"", Some(&mut actual)).unwrap();
    assert_eq!(actual, expected, "pooled digest mismatch (len={len}, split={split})");
  }
});
