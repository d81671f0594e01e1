//! Sequential backend: record jobs, run them in order inside `wait_all`.

use std::{
  sync::{Mutex, PoisonError},
  thread::{self, ThreadId},
};

use crate::{BatchPool, DEFAULT_MIN_INPUT_SIZE, Job, MAX_JOBS, MAX_WORKERS, PoolError};

/// A pool without threads.
///
/// Jobs are queued by `submit` and executed one by one, in submission order,
/// when the submitting thread calls `wait_all`. A shared pool never runs one
/// thread's jobs inside another thread's `wait_all`. Useful on targets
/// without threads and for deterministic tests.
///
/// By default it reports a single worker, so callers that size batches by
/// [`workers`](BatchPool::workers) run their work inline.
/// [`with_virtual_workers`](Self::with_virtual_workers) makes it report more,
/// which exercises batch partitioning without any concurrency.
pub struct SequentialPool {
  jobs: Mutex<Vec<(ThreadId, Job)>>,
  virtual_workers: usize,
  capacity: usize,
  min_input_size: usize,
}

impl SequentialPool {
  #[must_use]
  pub fn new() -> Self {
    Self {
      jobs: Mutex::new(Vec::new()),
      virtual_workers: 1,
      capacity: MAX_JOBS,
      min_input_size: DEFAULT_MIN_INPUT_SIZE,
    }
  }

  /// Report `workers` (clamped to `1..=MAX_WORKERS`) from [`BatchPool::workers`].
  #[must_use]
  pub fn with_virtual_workers(mut self, workers: usize) -> Self {
    self.virtual_workers = workers.clamp(1, MAX_WORKERS);
    self
  }

  #[must_use]
  pub fn with_min_input_size(mut self, bytes: usize) -> Self {
    self.min_input_size = bytes;
    self
  }

  #[must_use]
  pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
    self.capacity = capacity.max(1);
    self
  }

  /// Jobs recorded by any thread and waiting for `wait_all`.
  #[must_use]
  pub fn pending(&self) -> usize {
    self.jobs.lock().unwrap_or_else(PoisonError::into_inner).len()
  }
}

impl Default for SequentialPool {
  fn default() -> Self {
    Self::new()
  }
}

// SAFETY: jobs are tagged with their submitter and only that thread's
// `wait_all` removes and runs them, to completion, before returning. If one
// panics, the jobs after it are dropped during unwinding, before `wait_all`
// exits.
unsafe impl BatchPool for SequentialPool {
  #[inline]
  fn workers(&self) -> usize {
    self.virtual_workers
  }

  #[inline]
  fn min_input_size(&self) -> usize {
    self.min_input_size
  }

  fn submit(&self, job: Job) -> Result<(), PoolError> {
    let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
    if jobs.len() >= self.capacity {
      return Err(PoolError::QueueFull {
        capacity: self.capacity,
      });
    }
    jobs.push((thread::current().id(), job));
    Ok(())
  }

  fn wait_all(&self) {
    let me = thread::current().id();
    let batch: Vec<Job> = {
      let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
      let (mine, others): (Vec<_>, Vec<_>) = core::mem::take(&mut *jobs).into_iter().partition(|(id, _)| *id == me);
      *jobs = others;
      mine.into_iter().map(|(_, job)| job).collect()
    };
    for job in batch {
      job();
    }
  }
}

impl core::fmt::Debug for SequentialPool {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("SequentialPool")
      .field("virtual_workers", &self.virtual_workers)
      .field("capacity", &self.capacity)
      .field("min_input_size", &self.min_input_size)
      .finish_non_exhaustive()
  }
}
