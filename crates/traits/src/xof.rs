//! Extendable-output function (XOF) trait.

/// Extendable-output function producing an arbitrary number of bytes.
///
/// Consecutive calls continue the same output stream: squeezing `a` then `b`
/// bytes yields exactly the bytes of a single `a + b` squeeze.
///
/// This trait intentionally has no `std::io::Read` dependency; it is usable in
/// `no_std` environments. See [`crate::io::XofReader`] for the adapter.
pub trait Xof: Clone {
  /// Squeeze output bytes into `out`.
  fn squeeze(&mut self, out: &mut [u8]);

  /// Advance the output stream by `len` bytes without returning them.
  fn skip(&mut self, mut len: usize) {
    let mut scratch = [0u8; 64];
    while len != 0 {
      let take = core::cmp::min(len, scratch.len());
      if let Some(dst) = scratch.get_mut(..take) {
        self.squeeze(dst);
      }
      len -= take;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::Xof;

  #[derive(Clone)]
  struct Counter(u8);

  impl Xof for Counter {
    fn squeeze(&mut self, out: &mut [u8]) {
      for b in out {
        *b = self.0;
        self.0 = self.0.wrapping_add(1);
      }
    }
  }

  #[test]
  fn skip_advances_stream() {
    let mut a = Counter(0);
    a.skip(200);
    let mut out = [0u8; 1];
    a.squeeze(&mut out);
    assert_eq!(out[0], 200);
  }

  #[test]
  fn skip_zero_is_noop() {
    let mut a = Counter(7);
    a.skip(0);
    let mut out = [0u8; 1];
    a.squeeze(&mut out);
    assert_eq!(out[0], 7);
  }
}
