//! `std::io` adapters for XOF readers.

use crate::Xof;

/// Exposes an [`Xof`] as an infinite [`std::io::Read`] source.
///
/// Every `read` fills the whole buffer; the stream never reports end of file.
///
/// # Examples
///
/// ```
/// use std::io::Read;
///
/// use traits::{Xof, io::XofReader};
///
/// #[derive(Clone)]
/// struct Zeros;
///
/// impl Xof for Zeros {
///   fn squeeze(&mut self, out: &mut [u8]) {
///     out.fill(0);
///   }
/// }
///
/// let mut reader = XofReader::new(Zeros);
/// let mut buf = [1u8; 16];
/// reader.read_exact(&mut buf).unwrap();
/// assert_eq!(buf, [0u8; 16]);
/// ```
#[derive(Clone, Debug)]
pub struct XofReader<X> {
  xof: X,
}

impl<X: Xof> XofReader<X> {
  #[inline]
  #[must_use]
  pub const fn new(xof: X) -> Self {
    Self { xof }
  }

  /// Returns the wrapped XOF, positioned after the bytes already read.
  #[inline]
  #[must_use]
  pub fn into_inner(self) -> X {
    self.xof
  }
}

impl<X: Xof> std::io::Read for XofReader<X> {
  fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
    self.xof.squeeze(buf);
    Ok(buf.len())
  }
}
