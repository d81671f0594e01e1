use std::{hint::black_box, sync::Arc};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use hashes::crypto::{
  Kt128, Kt256, TurboShake128,
  kangaroo::{ALL_KERNELS, CHUNK_SIZE},
};
use pool::{BatchPool, WorkerPool};

mod common;

fn oneshot(c: &mut Criterion) {
  let inputs = common::sized_inputs();
  let mut group = c.benchmark_group("ktwelve/oneshot");

  for (len, data) in &inputs {
    common::set_throughput(&mut group, *len);

    group.bench_with_input(BenchmarkId::new("kt128", len), data, |b, d| {
      let mut out = [0u8; 32];
      b.iter(|| {
        Kt128::hash(black_box(d), &mut out, b"").unwrap();
        black_box(out)
      })
    });
    group.bench_with_input(BenchmarkId::new("kt256", len), data, |b, d| {
      let mut out = [0u8; 64];
      b.iter(|| {
        Kt256::hash(black_box(d), &mut out, b"").unwrap();
        black_box(out)
      })
    });
    group.bench_with_input(BenchmarkId::new("turboshake128", len), data, |b, d| {
      let mut out = [0u8; 32];
      b.iter(|| {
        TurboShake128::hash_into(black_box(d), TurboShake128::DEFAULT_DOMAIN, &mut out).unwrap();
        black_box(out)
      })
    });
  }

  group.finish();
}

fn streaming(c: &mut Criterion) {
  let mut group = c.benchmark_group("ktwelve/streaming");
  let data = common::pseudo_random_bytes(1024 * 1024, 0x5EED);
  group.throughput(Throughput::Bytes(data.len() as u64));

  for piece in [64usize, 1000, CHUNK_SIZE, 64 * 1024] {
    group.bench_function(BenchmarkId::new("kt128-update", piece), |b| {
      b.iter(|| {
        let mut h = Kt128::new(32);
        for chunk in black_box(&data).chunks(piece) {
          h.update(chunk).unwrap();
        }
        let mut out = [0u8; 32];
        h.finalize(b"", Some(&mut out)).unwrap();
        black_box(out)
      })
    });
  }

  group.bench_function("kt128-squeeze-64KiB", |b| {
    let mut out = vec![0u8; 64 * 1024];
    b.iter(|| {
      let mut h = Kt128::new(0);
      h.update(b"seed").unwrap();
      h.finalize(b"", None).unwrap();
      h.squeeze(&mut out).unwrap();
      black_box(out[0])
    })
  });

  group.finish();
}

fn pooled(c: &mut Criterion) {
  let mut group = c.benchmark_group("ktwelve/pooled");
  group.sample_size(20);
  let data = common::pseudo_random_bytes(32 * 1024 * 1024, 0xBEEF);
  group.throughput(Throughput::Bytes(data.len() as u64));

  let workers = std::thread::available_parallelism().map_or(4, |n| n.get()).min(pool::MAX_WORKERS);
  let pool: Arc<dyn BatchPool> = Arc::new(WorkerPool::new(workers).unwrap());

  group.bench_function("kt128/sequential", |b| {
    let mut out = [0u8; 32];
    b.iter(|| {
      Kt128::hash(black_box(&data), &mut out, b"").unwrap();
      black_box(out)
    })
  });
  group.bench_function(BenchmarkId::new("kt128/pool", workers), |b| {
    b.iter(|| {
      let mut h = Kt128::with_pool(32, Arc::clone(&pool));
      h.update(black_box(&data)).unwrap();
      let mut out = [0u8; 32];
      h.finalize(b"", Some(&mut out)).unwrap();
      black_box(out)
    })
  });

  group.finish();
}

fn leaf_kernels(c: &mut Criterion) {
  let mut group = c.benchmark_group("ktwelve/leaf-kernels");
  let data = common::pseudo_random_bytes(65 * CHUNK_SIZE, 0x1EAF);
  group.throughput(Throughput::Bytes(data.len() as u64));

  for &kernel in ALL_KERNELS {
    group.bench_function(kernel.as_str(), |b| {
      b.iter(|| {
        let mut h = Kt128::new(32).with_kernel(kernel);
        h.update(black_box(&data)).unwrap();
        let mut out = [0u8; 32];
        h.finalize(b"", Some(&mut out)).unwrap();
        black_box(out)
      })
    });
  }

  group.finish();
}

criterion_group!(benches, oneshot, streaming, pooled, leaf_kernels);
criterion_main!(benches);
