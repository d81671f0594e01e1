use core::hint::black_box;

use hashes::crypto::kangaroo::CHUNK_SIZE as LEAF;

/// Deterministic filler for benchmark messages (splitmix64, not cryptographic).
pub fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
  let mut state = seed;
  let mut out = Vec::with_capacity(len + 8);
  while out.len() < len {
    state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    out.extend_from_slice(&(z ^ (z >> 31)).to_le_bytes());
  }
  out.truncate(len);
  black_box(&out);
  out
}

/// Message lengths that exercise each shape of the tree:
/// single node, first leaf boundary, a few leaves, and enough leaves for the
/// pool threshold.
pub fn sized_inputs() -> Vec<(usize, Vec<u8>)> {
  let sizes = [
    0usize,
    64,
    LEAF - 1,
    LEAF + 1,
    8 * LEAF,
    128 * LEAF,
    2048 * LEAF,
  ];
  sizes
    .into_iter()
    .map(|len| (len, pseudo_random_bytes(len, 0x4B54_3132)))
    .collect()
}

/// Bytes per second for messages, one hash per iteration for the empty one.
pub fn set_throughput(group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>, len: usize) {
  let throughput = match len {
    0 => criterion::Throughput::Elements(1),
    n => criterion::Throughput::Bytes(n as u64),
  };
  group.throughput(throughput);
}
