//! Batch thread pools for leaf-parallel hashing.
//!
//! A pool accepts a batch of independent jobs, runs them, and returns from
//! [`BatchPool::wait_all`] once every one has finished. Pools are long-lived:
//! create one, then reuse it across many hashing sessions.
//!
//! A pool may be shared between threads. Each thread's submissions form its
//! own batch: `wait_all` covers only the jobs the calling thread submitted.
//!
//! # Backends
//!
//! | Backend | Execution | Use |
//! |---------|-----------|-----|
//! | [`WorkerPool`] | Fixed set of OS threads pulling from a bounded queue | Default on hosted targets |
//! | [`SequentialPool`] | Jobs run in submission order inside `wait_all` | No threads, deterministic tests |
//!
//! Callers may also bring their own backend by implementing [`BatchPool`].
//!
//! # Borrowing jobs
//!
//! [`BatchPool::run_scoped`] submits jobs that borrow from the caller's stack
//! (input leaves, output slots) and blocks until all of them are done, in the
//! spirit of `std::thread::scope`.
//!
//! ```
//! use pool::{BatchPool, WorkerPool};
//!
//! let pool = WorkerPool::new(2).unwrap();
//! let mut out = [0u64; 4];
//! let jobs = out
//!   .iter_mut()
//!   .enumerate()
//!   .map(|(i, slot)| Box::new(move || *slot = (i as u64) * 10) as pool::ScopedJob<'_>)
//!   .collect();
//! pool.run_scoped(jobs).unwrap();
//! assert_eq!(out, [0, 10, 20, 30]);
//! ```
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]

pub mod config;
mod error;
mod sequential;
mod worker;

use std::sync::{Arc, OnceLock};

pub use error::PoolError;
pub use sequential::SequentialPool;
pub use worker::WorkerPool;

/// Largest worker count a pool accepts.
pub const MAX_WORKERS: usize = 64;

/// Default bound on jobs pending in one pool.
pub const MAX_JOBS: usize = 256;

/// Inputs below this many bytes are not worth dispatching.
pub const DEFAULT_MIN_INPUT_SIZE: usize = 2 * 1024 * 1024;

/// A job that owns everything it touches.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A job that may borrow data living at least as long as `'scope`.
pub type ScopedJob<'scope> = Box<dyn FnOnce() + Send + 'scope>;

/// The batch pool contract: create, submit, wait, destroy.
///
/// Creation is the implementor's constructor and destruction is `Drop`.
///
/// # Safety
///
/// [`run_scoped`](BatchPool::run_scoped) lends borrowed data to jobs and
/// relies on the following, which implementors must uphold:
///
/// - `wait_all` returns (or unwinds) only after every job the calling thread
///   got accepted by `submit` since its previous `wait_all` has finished
///   running or has been dropped. This holds while other threads share the
///   pool and call `submit` or `wait_all` concurrently.
/// - a job rejected by `submit` is dropped before `submit` returns.
pub unsafe trait BatchPool: Send + Sync {
  /// Number of jobs this pool can run at the same time.
  fn workers(&self) -> usize;

  /// Inputs below this many bytes should be hashed on the calling thread.
  fn min_input_size(&self) -> usize {
    DEFAULT_MIN_INPUT_SIZE
  }

  /// Queue a job. Fails without blocking if the pool cannot take it.
  fn submit(&self, job: Job) -> Result<(), PoolError>;

  /// Block until every job this thread submitted since its last call has
  /// finished.
  ///
  /// If one of those jobs panicked, the panic is resumed here after the batch
  /// drains.
  fn wait_all(&self);

  /// Submit `jobs`, then wait for all of them.
  ///
  /// On error, jobs submitted before the failure have still completed when
  /// this returns; the remaining jobs are dropped unrun.
  fn run_scoped<'scope>(&self, jobs: Vec<ScopedJob<'scope>>) -> Result<(), PoolError> {
    run_scoped(self, jobs)
  }
}

/// Waits on drop so borrowed jobs never outlive the scope, even on unwind.
struct WaitGuard<'a, P: BatchPool + ?Sized>(&'a P);

impl<P: BatchPool + ?Sized> Drop for WaitGuard<'_, P> {
  fn drop(&mut self) {
    self.0.wait_all();
  }
}

fn run_scoped<'scope, P: BatchPool + ?Sized>(pool: &P, jobs: Vec<ScopedJob<'scope>>) -> Result<(), PoolError> {
  let guard = WaitGuard(pool);
  let mut result = Ok(());
  for job in jobs {
    // SAFETY: `guard` calls `wait_all` on this same thread before this
    // function returns or unwinds, and the trait contract guarantees every
    // job this thread got accepted has finished by then, so no job outlives
    // the `'scope` borrows it holds.
    // Rejected jobs are dropped inside `submit`, also within `'scope`.
    let job = unsafe { core::mem::transmute::<ScopedJob<'scope>, Job>(job) };
    if let Err(e) = pool.submit(job) {
      result = Err(e);
      break;
    }
  }
  drop(guard);
  result
}

/// The process-wide default pool.
///
/// Built on first use: a [`WorkerPool`] sized to the available parallelism
/// (or `KTWELVE_THREADS`), or a [`SequentialPool`] when only one thread is
/// available or threads cannot be spawned.
#[must_use]
pub fn default_pool() -> Arc<dyn BatchPool> {
  static DEFAULT: OnceLock<Arc<dyn BatchPool>> = OnceLock::new();
  Arc::clone(DEFAULT.get_or_init(build_default))
}

fn build_default() -> Arc<dyn BatchPool> {
  let cfg = config::get();
  if cfg.threads > 1 {
    match WorkerPool::new(cfg.threads) {
      Ok(pool) => {
        tracing::info!(workers = cfg.threads, "default pool: concurrent");
        return Arc::new(pool.with_min_input_size(cfg.min_input_size));
      }
      Err(error) => {
        tracing::warn!(%error, "default pool: falling back to sequential");
      }
    }
  } else {
    tracing::info!("default pool: sequential");
  }
  Arc::new(SequentialPool::new().with_min_input_size(cfg.min_input_size))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_pool_is_shared() {
    let a = default_pool();
    let b = default_pool();
    assert!(Arc::ptr_eq(&a, &b));
    assert!((1..=MAX_WORKERS).contains(&a.workers()));
  }

  #[test]
  fn run_scoped_through_dyn() {
    let pool: Arc<dyn BatchPool> = Arc::new(SequentialPool::new());
    let mut hits = [false; 3];
    let jobs = hits.iter_mut().map(|h| Box::new(move || *h = true) as ScopedJob<'_>).collect();
    pool.run_scoped(jobs).unwrap();
    assert_eq!(hits, [true; 3]);
  }
}
