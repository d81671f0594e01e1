//! Keccak-p[1600, 12] permutation and its byte-addressed state (internal).
//!
//! TurboSHAKE and the tree hash built on it only need a handful of state
//! operations: XOR bytes in at an offset, permute, read bytes out at an
//! offset, and a fast loop for whole rate-sized blocks.

#![allow(clippy::indexing_slicing)] // Keccak state is fixed-size; offsets are bounded by the rate

/// Keccak-p[1600] round count used by TurboSHAKE.
pub(crate) const ROUNDS: usize = 12;

/// Width of the permutation in bytes.
pub(crate) const WIDTH: usize = 200;

// Round constants: the last 12 of Keccak-f[1600].
const RC: [u64; ROUNDS] = [
  0x0000_0000_8000_808b,
  0x8000_0000_0000_008b,
  0x8000_0000_0000_8089,
  0x8000_0000_0000_8003,
  0x8000_0000_0000_8002,
  0x8000_0000_0000_0080,
  0x0000_0000_0000_800a,
  0x8000_0000_8000_000a,
  0x8000_0000_8000_8081,
  0x8000_0000_0000_8080,
  0x0000_0000_8000_0001,
  0x8000_0000_8000_8008,
];

#[inline(always)]
pub(crate) fn keccak_p1600_12(state: &mut [u64; 25]) {
  let mut a0 = state[0];
  let mut a1 = state[1];
  let mut a2 = state[2];
  let mut a3 = state[3];
  let mut a4 = state[4];
  let mut a5 = state[5];
  let mut a6 = state[6];
  let mut a7 = state[7];
  let mut a8 = state[8];
  let mut a9 = state[9];
  let mut a10 = state[10];
  let mut a11 = state[11];
  let mut a12 = state[12];
  let mut a13 = state[13];
  let mut a14 = state[14];
  let mut a15 = state[15];
  let mut a16 = state[16];
  let mut a17 = state[17];
  let mut a18 = state[18];
  let mut a19 = state[19];
  let mut a20 = state[20];
  let mut a21 = state[21];
  let mut a22 = state[22];
  let mut a23 = state[23];
  let mut a24 = state[24];

  macro_rules! round {
    ($rc:expr) => {{
      // θ
      let c0 = a0 ^ a5 ^ a10 ^ a15 ^ a20;
      let c1 = a1 ^ a6 ^ a11 ^ a16 ^ a21;
      let c2 = a2 ^ a7 ^ a12 ^ a17 ^ a22;
      let c3 = a3 ^ a8 ^ a13 ^ a18 ^ a23;
      let c4 = a4 ^ a9 ^ a14 ^ a19 ^ a24;

      let d0 = c4 ^ c1.rotate_left(1);
      let d1 = c0 ^ c2.rotate_left(1);
      let d2 = c1 ^ c3.rotate_left(1);
      let d3 = c2 ^ c4.rotate_left(1);
      let d4 = c3 ^ c0.rotate_left(1);

      a0 ^= d0;
      a5 ^= d0;
      a10 ^= d0;
      a15 ^= d0;
      a20 ^= d0;

      a1 ^= d1;
      a6 ^= d1;
      a11 ^= d1;
      a16 ^= d1;
      a21 ^= d1;

      a2 ^= d2;
      a7 ^= d2;
      a12 ^= d2;
      a17 ^= d2;
      a22 ^= d2;

      a3 ^= d3;
      a8 ^= d3;
      a13 ^= d3;
      a18 ^= d3;
      a23 ^= d3;

      a4 ^= d4;
      a9 ^= d4;
      a14 ^= d4;
      a19 ^= d4;
      a24 ^= d4;

      // ρ + π
      let b0 = a0;
      let b10 = a1.rotate_left(1);
      let b20 = a2.rotate_left(62);
      let b5 = a3.rotate_left(28);
      let b15 = a4.rotate_left(27);

      let b16 = a5.rotate_left(36);
      let b1 = a6.rotate_left(44);
      let b11 = a7.rotate_left(6);
      let b21 = a8.rotate_left(55);
      let b6 = a9.rotate_left(20);

      let b7 = a10.rotate_left(3);
      let b17 = a11.rotate_left(10);
      let b2 = a12.rotate_left(43);
      let b12 = a13.rotate_left(25);
      let b22 = a14.rotate_left(39);

      let b23 = a15.rotate_left(41);
      let b8 = a16.rotate_left(45);
      let b18 = a17.rotate_left(15);
      let b3 = a18.rotate_left(21);
      let b13 = a19.rotate_left(8);

      let b14 = a20.rotate_left(18);
      let b24 = a21.rotate_left(2);
      let b9 = a22.rotate_left(61);
      let b19 = a23.rotate_left(56);
      let b4 = a24.rotate_left(14);

      // χ
      a0 = b0 ^ ((!b1) & b2);
      a1 = b1 ^ ((!b2) & b3);
      a2 = b2 ^ ((!b3) & b4);
      a3 = b3 ^ ((!b4) & b0);
      a4 = b4 ^ ((!b0) & b1);

      a5 = b5 ^ ((!b6) & b7);
      a6 = b6 ^ ((!b7) & b8);
      a7 = b7 ^ ((!b8) & b9);
      a8 = b8 ^ ((!b9) & b5);
      a9 = b9 ^ ((!b5) & b6);

      a10 = b10 ^ ((!b11) & b12);
      a11 = b11 ^ ((!b12) & b13);
      a12 = b12 ^ ((!b13) & b14);
      a13 = b13 ^ ((!b14) & b10);
      a14 = b14 ^ ((!b10) & b11);

      a15 = b15 ^ ((!b16) & b17);
      a16 = b16 ^ ((!b17) & b18);
      a17 = b17 ^ ((!b18) & b19);
      a18 = b18 ^ ((!b19) & b15);
      a19 = b19 ^ ((!b15) & b16);

      a20 = b20 ^ ((!b21) & b22);
      a21 = b21 ^ ((!b22) & b23);
      a22 = b22 ^ ((!b23) & b24);
      a23 = b23 ^ ((!b24) & b20);
      a24 = b24 ^ ((!b20) & b21);

      // ι
      a0 ^= $rc;
    }};
  }

  round!(RC[0]);
  round!(RC[1]);
  round!(RC[2]);
  round!(RC[3]);
  round!(RC[4]);
  round!(RC[5]);
  round!(RC[6]);
  round!(RC[7]);
  round!(RC[8]);
  round!(RC[9]);
  round!(RC[10]);
  round!(RC[11]);

  state[0] = a0;
  state[1] = a1;
  state[2] = a2;
  state[3] = a3;
  state[4] = a4;
  state[5] = a5;
  state[6] = a6;
  state[7] = a7;
  state[8] = a8;
  state[9] = a9;
  state[10] = a10;
  state[11] = a11;
  state[12] = a12;
  state[13] = a13;
  state[14] = a14;
  state[15] = a15;
  state[16] = a16;
  state[17] = a17;
  state[18] = a18;
  state[19] = a19;
  state[20] = a20;
  state[21] = a21;
  state[22] = a22;
  state[23] = a23;
  state[24] = a24;
}

/// Permute `N` independent states back to back.
///
/// A plain loop over the scalar permutation. Lanes are not packed into vector
/// registers; any overlap between states comes from the compiler after
/// inlining, not from this code.
#[inline(always)]
pub(crate) fn keccak_p1600_12_xn<const N: usize>(states: &mut [KeccakState; N]) {
  for st in states.iter_mut() {
    keccak_p1600_12(&mut st.lanes);
  }
}

/// 1600-bit permutation state addressed as bytes in little-endian lane order.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct KeccakState {
  lanes: [u64; 25],
}

impl Default for KeccakState {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl KeccakState {
  #[inline]
  pub(crate) const fn new() -> Self {
    Self { lanes: [0u64; 25] }
  }

  #[inline(always)]
  pub(crate) fn permute(&mut self) {
    keccak_p1600_12(&mut self.lanes);
  }

  #[inline(always)]
  pub(crate) fn add_byte(&mut self, byte: u8, offset: usize) {
    debug_assert!(offset < WIDTH);
    self.lanes[offset / 8] ^= u64::from(byte) << (8 * (offset % 8));
  }

  /// XOR `data` into the state starting at byte `offset`.
  pub(crate) fn add_bytes(&mut self, mut data: &[u8], mut offset: usize) {
    debug_assert!(offset + data.len() <= WIDTH);

    while offset % 8 != 0 {
      let Some((&b, rest)) = data.split_first() else {
        return;
      };
      self.add_byte(b, offset);
      offset += 1;
      data = rest;
    }

    let (words, tail) = data.as_chunks::<8>();
    for (lane, word) in self.lanes[offset / 8..].iter_mut().zip(words) {
      *lane ^= u64::from_le_bytes(*word);
    }
    offset += words.len() * 8;

    for (i, &b) in tail.iter().enumerate() {
      self.add_byte(b, offset + i);
    }
  }

  /// Copy state bytes starting at `offset` into `out`.
  pub(crate) fn extract_bytes(&self, out: &mut [u8], offset: usize) {
    debug_assert!(offset + out.len() <= WIDTH);
    for (i, dst) in out.iter_mut().enumerate() {
      let pos = offset + i;
      *dst = (self.lanes[pos / 8] >> (8 * (pos % 8))) as u8;
    }
  }

  /// XOR one whole block at offset 0 without permuting.
  #[inline(always)]
  pub(crate) fn xor_block(&mut self, block: &[u8]) {
    debug_assert!(block.len() % 8 == 0 && block.len() <= WIDTH);
    let (words, _) = block.as_chunks::<8>();
    for (lane, word) in self.lanes.iter_mut().zip(words) {
      *lane ^= u64::from_le_bytes(*word);
    }
  }

  /// Absorb as many whole `rate`-byte blocks of `data` as it holds, permuting
  /// after each. Returns the number of bytes consumed.
  ///
  /// The state must be block-aligned (nothing partially absorbed).
  pub(crate) fn absorb_blocks(&mut self, rate: usize, data: &[u8]) -> usize {
    debug_assert!(rate % 8 == 0 && rate > 0 && rate < WIDTH);
    let mut consumed = 0usize;
    for block in data.chunks_exact(rate) {
      self.xor_block(block);
      self.permute();
      consumed += rate;
    }
    consumed
  }
}

impl core::fmt::Debug for KeccakState {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // State may hold secret-derived material.
    f.write_str("KeccakState { .. }")
  }
}
