//! Fuzz target for the streaming tree-hash API.
//!
//! Arbitrary update splits and squeeze splits must match the one-shot digest.

#![no_main]

use arbitrary::Arbitrary;
use hashes::crypto::{Kt128, Kt256};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  data: Vec<u8>,
  customization: Vec<u8>,
  /// Chunk sizes for streaming updates
  chunk_sizes: Vec<u16>,
  /// Sizes of successive squeeze calls
  squeeze_sizes: Vec<u8>,
}

fuzz_target!(|input: Input| {
  let total = input.squeeze_sizes.iter().map(|&n| n as usize).sum::<usize>().max(1);
  check_kt128(&input, total);
  check_kt256(&input, total);
});

macro_rules! check {
  ($name:ident, $hasher:ident) => {
    fn $name(input: &Input, total: usize) {
      let mut expected = vec![0u8; total];
      $hasher::hash(&input.data, &mut expected, &input.customization).unwrap();

      let mut h = $hasher::new(0);
      let mut offset = 0;
      let mut idx = 0;
      while offset < input.data.len() {
        let step = if input.chunk_sizes.is_empty() {
          input.data.len()
        } else {
          (input.chunk_sizes[idx % input.chunk_sizes.len()] as usize).max(1)
        };
        let end = (offset + step).min(input.data.len());
        h.update(&input.data[offset..end]).unwrap();
        offset = end;
        idx += 1;
      }
      h.finalize(&input.customization, None).unwrap();

      let mut actual = vec![0u8; total];
      let mut rest = &mut actual[..];
      for &n in &input.squeeze_sizes {
        let n = (n as usize).min(rest.len());
        let (now, tail) = core::mem::take(&mut rest).split_at_mut(n);
        h.squeeze(now).unwrap();
        rest = tail;
      }
      h.squeeze(rest).unwrap();

      assert_eq!(
        actual,
        expected,
        "{} streaming mismatch (len={}, custom={})",
        stringify!($hasher),
        input.data.len(),
        input.customization.len()
      );
    }
  };
}

check!(check_kt128, Kt128);
check!(check_kt256, Kt256);
