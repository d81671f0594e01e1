//! Pool injection: caller-supplied backends, fallback, and reuse.

use std::{
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  thread,
};

use hashes::crypto::{Kt128, Kt256, kangaroo::CHUNK_SIZE};
use pool::{BatchPool, Job, PoolError, SequentialPool};

fn message(len: usize) -> Vec<u8> {
  (0..len).map(|i| (i % 253) as u8 ^ (i >> 13) as u8).collect()
}

fn kt128_with(pool: Arc<dyn BatchPool>, data: &[u8]) -> [u8; 32] {
  let mut h = Kt128::with_pool(32, pool);
  h.update(data).unwrap();
  let mut out = [0u8; 32];
  h.finalize(b"", Some(&mut out)).unwrap();
  out
}

fn kt128(data: &[u8]) -> [u8; 32] {
  let mut out = [0u8; 32];
  Kt128::hash(data, &mut out, b"").unwrap();
  out
}

/// A backend that starts one OS thread per job and joins them in the
/// submitter's `wait_all`.
struct ThreadPerJob {
  handles: Mutex<Vec<(thread::ThreadId, thread::JoinHandle<()>)>>,
  submitted: AtomicUsize,
}

impl ThreadPerJob {
  fn new() -> Self {
    Self {
      handles: Mutex::new(Vec::new()),
      submitted: AtomicUsize::new(0),
    }
  }
}

// SAFETY: `wait_all` joins every thread the calling thread started through
// `submit`, so each of its accepted jobs has finished before it returns.
// `submit` never rejects a job.
unsafe impl BatchPool for ThreadPerJob {
  fn workers(&self) -> usize {
    6
  }

  fn min_input_size(&self) -> usize {
    0
  }

  fn submit(&self, job: Job) -> Result<(), PoolError> {
    self.submitted.fetch_add(1, Ordering::Relaxed);
    let owner = thread::current().id();
    self.handles.lock().unwrap().push((owner, thread::spawn(job)));
    Ok(())
  }

  fn wait_all(&self) {
    let me = thread::current().id();
    let mine: Vec<_> = {
      let mut handles = self.handles.lock().unwrap();
      let (mine, others) = std::mem::take(&mut *handles).into_iter().partition(|(id, _)| *id == me);
      *handles = others;
      mine
    };
    for (_, handle) in mine {
      handle.join().unwrap();
    }
  }
}

/// A backend that refuses every job.
struct Refusing;

// SAFETY: no job is ever accepted; rejected jobs are dropped in `submit`.
unsafe impl BatchPool for Refusing {
  fn workers(&self) -> usize {
    8
  }

  fn min_input_size(&self) -> usize {
    0
  }

  fn submit(&self, job: Job) -> Result<(), PoolError> {
    drop(job);
    Err(PoolError::Unavailable)
  }

  fn wait_all(&self) {}
}

#[test]
fn caller_supplied_backend_is_used() {
  let data = message(64 * CHUNK_SIZE + 100);
  let pool = Arc::new(ThreadPerJob::new());
  assert_eq!(kt128_with(pool.clone(), &data), kt128(&data));
  assert!(pool.submitted.load(Ordering::Relaxed) > 1);
}

#[test]
fn refused_jobs_fall_back_to_sequential() {
  let data = message(40 * CHUNK_SIZE + 7);
  assert_eq!(kt128_with(Arc::new(Refusing), &data), kt128(&data));
}

#[test]
fn queue_full_falls_back_to_sequential() {
  let data = message(80 * CHUNK_SIZE);
  let pool = SequentialPool::new()
    .with_virtual_workers(16)
    .with_queue_capacity(2)
    .with_min_input_size(0);
  assert_eq!(kt128_with(Arc::new(pool), &data), kt128(&data));
}

#[test]
fn small_inputs_skip_the_pool() {
  let data = message(10 * CHUNK_SIZE);
  let pool = Arc::new(ThreadPerJob::new());
  let mut h = Kt256::with_pool(64, pool.clone());
  // Leaves arrive one at a time, so no run of whole leaves reaches the pool
  // with enough work for more than one job.
  for piece in data.chunks(CHUNK_SIZE) {
    h.update(piece).unwrap();
  }
  let mut got = [0u8; 64];
  h.finalize(b"", Some(&mut got)).unwrap();

  let mut want = [0u8; 64];
  Kt256::hash(&data, &mut want, b"").unwrap();
  assert_eq!(got, want);
  assert_eq!(pool.submitted.load(Ordering::Relaxed), 0);
}

#[test]
fn one_pool_serves_many_sessions() {
  let pool: Arc<dyn BatchPool> = Arc::new(pool::WorkerPool::new(4).unwrap().with_min_input_size(0));
  for leaves in [0usize, 1, 9, 33, 70] {
    let data = message(leaves * CHUNK_SIZE + leaves);
    assert_eq!(kt128_with(Arc::clone(&pool), &data), kt128(&data), "leaves={leaves}");
  }
}

#[test]
fn default_pool_matches_sequential() {
  let data = message(300 * CHUNK_SIZE + 3);
  let mut h = Kt128::with_default_pool(32);
  h.update(&data).unwrap();
  let mut got = [0u8; 32];
  h.finalize(b"", Some(&mut got)).unwrap();
  assert_eq!(got, kt128(&data));
}

#[test]
fn concurrent_sessions_share_one_pool() {
  let pools: [Arc<dyn BatchPool>; 3] = [
    Arc::new(pool::WorkerPool::new(3).unwrap().with_min_input_size(0)),
    Arc::new(SequentialPool::new().with_virtual_workers(4).with_min_input_size(0)),
    Arc::new(ThreadPerJob::new()),
  ];
  for shared in pools {
    let sessions: Vec<_> = (0..6usize)
      .map(|s| {
        let shared = Arc::clone(&shared);
        thread::spawn(move || {
          let data = message((20 + 7 * s) * CHUNK_SIZE + s);
          for _ in 0..4 {
            assert_eq!(kt128_with(Arc::clone(&shared), &data), kt128(&data), "session={s}");
          }
        })
      })
      .collect();
    for session in sessions {
      session.join().unwrap();
    }
  }
}
