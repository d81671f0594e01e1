//! Concurrent backend: long-lived workers on a bounded, condvar-signalled queue.

use std::{
  any::Any,
  collections::{HashMap, VecDeque},
  panic::{self, AssertUnwindSafe},
  sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
  thread::{self, JoinHandle, ThreadId},
};

use crate::{BatchPool, DEFAULT_MIN_INPUT_SIZE, Job, MAX_JOBS, MAX_WORKERS, PoolError};

/// Outstanding work of one submitting thread.
#[derive(Default)]
struct Batch {
  outstanding: usize,
  panic: Option<Box<dyn Any + Send>>,
}

struct Queue {
  jobs: VecDeque<(ThreadId, Job)>,
  /// Keyed by the thread that called `submit`.
  batches: HashMap<ThreadId, Batch>,
  /// Jobs picked up by a worker.
  grabbed: u64,
  /// Jobs that ran to completion (or panicked).
  finished: u64,
  shutdown: bool,
}

struct Shared {
  queue: Mutex<Queue>,
  work_available: Condvar,
  work_complete: Condvar,
}

impl Shared {
  fn lock(&self) -> MutexGuard<'_, Queue> {
    // Jobs never run under the lock, so poisoning cannot leave it inconsistent.
    self.queue.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// A fixed set of worker threads fed from a bounded job queue.
///
/// Workers sleep on a condition variable while the queue is empty and wake on
/// submission or shutdown. Dropping the pool drains queued jobs, then joins
/// every worker.
///
/// One pool may be shared by many hashing sessions on different threads.
/// Completion and job panics are tracked per submitting thread, so `wait_all`
/// waits only for the caller's own jobs and never resumes another session's
/// panic.
pub struct WorkerPool {
  shared: Arc<Shared>,
  handles: Vec<JoinHandle<()>>,
  capacity: usize,
  min_input_size: usize,
}

impl WorkerPool {
  /// Start `workers` threads (`1..=MAX_WORKERS`).
  pub fn new(workers: usize) -> Result<Self, PoolError> {
    if !(1..=MAX_WORKERS).contains(&workers) {
      return Err(PoolError::InvalidWorkerCount(workers));
    }

    let shared = Arc::new(Shared {
      queue: Mutex::new(Queue {
        jobs: VecDeque::with_capacity(MAX_JOBS),
        batches: HashMap::new(),
        grabbed: 0,
        finished: 0,
        shutdown: false,
      }),
      work_available: Condvar::new(),
      work_complete: Condvar::new(),
    });

    let mut pool = Self {
      shared,
      handles: Vec::with_capacity(workers),
      capacity: MAX_JOBS,
      min_input_size: DEFAULT_MIN_INPUT_SIZE,
    };

    for i in 0..workers {
      let shared = Arc::clone(&pool.shared);
      // On error `pool` drops here, which shuts down the workers already started.
      let handle = thread::Builder::new()
        .name(format!("ktwelve-worker-{i}"))
        .spawn(move || worker_loop(&shared))?;
      pool.handles.push(handle);
    }

    tracing::debug!(workers, capacity = pool.capacity, "worker pool started");
    Ok(pool)
  }

  #[must_use]
  pub fn with_min_input_size(mut self, bytes: usize) -> Self {
    self.min_input_size = bytes;
    self
  }

  /// Bound on pending jobs; `submit` fails with `QueueFull` beyond it.
  #[must_use]
  pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
    self.capacity = capacity.max(1);
    self
  }

  #[inline]
  #[must_use]
  pub fn queue_capacity(&self) -> usize {
    self.capacity
  }

  /// Jobs queued but not yet picked up by a worker.
  #[must_use]
  pub fn pending(&self) -> usize {
    self.shared.lock().jobs.len()
  }

  /// Jobs currently executing on a worker.
  #[must_use]
  pub fn running(&self) -> usize {
    let q = self.shared.lock();
    usize::try_from(q.grabbed - q.finished).unwrap_or(usize::MAX)
  }
}

fn worker_loop(shared: &Shared) {
  loop {
    let (owner, job) = {
      let mut q = shared.lock();
      loop {
        if let Some(entry) = q.jobs.pop_front() {
          q.grabbed += 1;
          break entry;
        }
        if q.shutdown {
          return;
        }
        q = shared.work_available.wait(q).unwrap_or_else(PoisonError::into_inner);
      }
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(job));

    let mut q = shared.lock();
    q.finished += 1;
    let Some(batch) = q.batches.get_mut(&owner) else {
      continue;
    };
    batch.outstanding -= 1;
    if let Err(payload) = outcome {
      batch.panic.get_or_insert(payload);
    }
    if batch.outstanding == 0 {
      shared.work_complete.notify_all();
    }
  }
}

// SAFETY: every accepted job is counted in its submitter's batch before
// `submit` returns, and only the worker that ran it decrements the count.
// `wait_all` blocks until the calling thread's count is zero. A rejected job
// is dropped inside `submit`.
unsafe impl BatchPool for WorkerPool {
  #[inline]
  fn workers(&self) -> usize {
    self.handles.len()
  }

  #[inline]
  fn min_input_size(&self) -> usize {
    self.min_input_size
  }

  fn submit(&self, job: Job) -> Result<(), PoolError> {
    let mut q = self.shared.lock();
    if q.shutdown || self.handles.is_empty() {
      return Err(PoolError::Unavailable);
    }
    if q.jobs.len() >= self.capacity {
      tracing::trace!(capacity = self.capacity, "job queue full");
      return Err(PoolError::QueueFull {
        capacity: self.capacity,
      });
    }
    let owner = thread::current().id();
    q.batches.entry(owner).or_default().outstanding += 1;
    q.jobs.push_back((owner, job));
    drop(q);
    self.shared.work_available.notify_one();
    Ok(())
  }

  fn wait_all(&self) {
    let me = thread::current().id();
    let mut q = self.shared.lock();
    while q.batches.get(&me).is_some_and(|b| b.outstanding > 0) {
      q = self.shared.work_complete.wait(q).unwrap_or_else(PoisonError::into_inner);
    }
    let panic = q.batches.remove(&me).and_then(|b| b.panic);
    drop(q);
    if let Some(payload) = panic {
      panic::resume_unwind(payload);
    }
  }
}

impl Drop for WorkerPool {
  fn drop(&mut self) {
    self.shared.lock().shutdown = true;
    self.shared.work_available.notify_all();
    for handle in self.handles.drain(..) {
      // Workers catch job panics, so a join error is not expected.
      let _ = handle.join();
    }
    tracing::debug!("worker pool stopped");
  }
}

impl core::fmt::Debug for WorkerPool {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("WorkerPool")
      .field("workers", &self.handles.len())
      .field("capacity", &self.capacity)
      .field("min_input_size", &self.min_input_size)
      .finish_non_exhaustive()
  }
}
