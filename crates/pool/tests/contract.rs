use std::{
  sync::{
    Arc, Barrier,
    atomic::{AtomicUsize, Ordering},
  },
  thread,
  time::Duration,
};

use pool::{BatchPool, MAX_JOBS, PoolError, ScopedJob, SequentialPool, WorkerPool};
use proptest::prelude::*;

/// Submit `n` counting jobs, wait, and return how often each one ran.
fn run_counted(pool: &dyn BatchPool, n: usize) -> Vec<usize> {
  let hits: Arc<Vec<AtomicUsize>> = Arc::new((0..n).map(|_| AtomicUsize::new(0)).collect());
  for i in 0..n {
    let hits = Arc::clone(&hits);
    pool
      .submit(Box::new(move || {
        hits[i].fetch_add(1, Ordering::Relaxed);
      }))
      .unwrap();
  }
  pool.wait_all();
  hits.iter().map(|h| h.load(Ordering::Relaxed)).collect()
}

fn backends() -> Vec<Box<dyn BatchPool>> {
  vec![
    Box::new(WorkerPool::new(1).unwrap()),
    Box::new(WorkerPool::new(4).unwrap()),
    Box::new(SequentialPool::new()),
    Box::new(SequentialPool::new().with_virtual_workers(8)),
  ]
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(32))]

  #[test]
  fn every_job_runs_exactly_once(batches in proptest::collection::vec(0usize..=MAX_JOBS, 1..6)) {
    for pool in backends() {
      for &n in &batches {
        let counts = run_counted(pool.as_ref(), n);
        prop_assert!(counts.iter().all(|&c| c == 1), "counts={counts:?}");
      }
    }
  }

  #[test]
  fn scoped_jobs_fill_disjoint_slots(n in 0usize..200, seed in any::<u64>()) {
    for pool in backends() {
      let mut out = vec![0u64; n];
      let jobs: Vec<ScopedJob<'_>> = out
        .iter_mut()
        .enumerate()
        .map(|(i, slot)| Box::new(move || *slot = seed ^ (i as u64)) as ScopedJob<'_>)
        .collect();
      pool.run_scoped(jobs).unwrap();
      for (i, v) in out.iter().enumerate() {
        prop_assert_eq!(*v, seed ^ (i as u64));
      }
    }
  }
}

#[test]
fn run_scoped_reports_queue_full_after_draining() {
  let pool = SequentialPool::new().with_queue_capacity(4);
  let ran = AtomicUsize::new(0);
  let jobs: Vec<ScopedJob<'_>> = (0..6)
    .map(|_| {
      let ran = &ran;
      Box::new(move || {
        ran.fetch_add(1, Ordering::Relaxed);
      }) as ScopedJob<'_>
    })
    .collect();

  let err = pool.run_scoped(jobs).unwrap_err();
  assert!(matches!(err, PoolError::QueueFull { capacity: 4 }));
  // The accepted prefix still ran before `run_scoped` returned.
  assert_eq!(ran.load(Ordering::Relaxed), 4);
  assert_eq!(pool.pending(), 0);
}

#[test]
fn pool_is_reusable_across_batches() {
  let pool = WorkerPool::new(3).unwrap();
  for n in [1usize, 7, 64, 0, 255] {
    assert_eq!(run_counted(&pool, n), vec![1; n]);
  }
}

fn shared_backends() -> Vec<Arc<dyn BatchPool>> {
  vec![
    Arc::new(WorkerPool::new(1).unwrap()),
    Arc::new(WorkerPool::new(4).unwrap()),
    Arc::new(SequentialPool::new()),
    Arc::new(SequentialPool::new().with_virtual_workers(8)),
  ]
}

#[test]
fn threads_sharing_a_pool_wait_for_their_own_jobs() {
  const THREADS: usize = 4;
  const JOBS: usize = 12;

  for pool in shared_backends() {
    let barrier = Arc::new(Barrier::new(THREADS));
    let sessions: Vec<_> = (0..THREADS)
      .map(|t| {
        let pool = Arc::clone(&pool);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
          barrier.wait();
          for round in 0..5 {
            // Owned jobs through `submit` + `wait_all`.
            let done = Arc::new(AtomicUsize::new(0));
            for j in 0..JOBS {
              let done = Arc::clone(&done);
              pool
                .submit(Box::new(move || {
                  if j % 4 == 0 {
                    thread::sleep(Duration::from_millis(2));
                  }
                  done.fetch_add(1, Ordering::SeqCst);
                }))
                .unwrap();
            }
            pool.wait_all();
            assert_eq!(done.load(Ordering::SeqCst), JOBS, "thread={t} round={round}");

            // Borrowing jobs through `run_scoped`.
            let mut out = [0usize; JOBS];
            let jobs: Vec<ScopedJob<'_>> = out
              .iter_mut()
              .enumerate()
              .map(|(j, slot)| {
                Box::new(move || {
                  if j % 3 == 0 {
                    thread::sleep(Duration::from_millis(1));
                  }
                  *slot = t * 1000 + round * 100 + j;
                }) as ScopedJob<'_>
              })
              .collect();
            pool.run_scoped(jobs).unwrap();
            for (j, v) in out.iter().enumerate() {
              assert_eq!(*v, t * 1000 + round * 100 + j, "thread={t} round={round}");
            }
          }
        })
      })
      .collect();
    for session in sessions {
      session.join().unwrap();
    }
  }
}
