//! TurboSHAKE128 / TurboSHAKE256 and the sponge node they share with the tree hash.
//!
//! TurboSHAKE is SHAKE with Keccak-p[1600, 12] and a caller-chosen domain
//! separation byte. The same absorb / pad / squeeze protocol drives each leaf
//! and the final node of KangarooTwelve.
//!
//! # Examples
//!
//! ```
//! use hashes::crypto::TurboShake128;
//! use traits::Xof as _;
//!
//! let mut h = TurboShake128::default();
//! h.update(b"abc");
//! let mut out = [0u8; 32];
//! h.finalize_xof().squeeze(&mut out);
//!
//! let mut oneshot = [0u8; 32];
//! TurboShake128::hash_into(b"abc", TurboShake128::DEFAULT_DOMAIN, &mut oneshot).unwrap();
//! assert_eq!(out, oneshot);
//! ```

#![allow(clippy::indexing_slicing)] // byte_io_index <= rate < 200 is maintained by every mutator

use core::fmt;

use traits::Xof;

use super::keccak::{KeccakState, WIDTH};

/// Terminator bit of the pad10*1 rule, placed in the last byte of the rate.
const PAD_LAST: u8 = 0x80;

/// Delimiter used when squeezing starts without explicit domain separation.
const IMPLICIT_DOMAIN: u8 = 0x01;

// ─────────────────────────────────────────────────────────────────────────────
// Security level
// ─────────────────────────────────────────────────────────────────────────────

/// Security strength, which fixes the capacity/rate split of the sponge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Security {
  /// 128-bit security: rate 168 bytes.
  Bits128,
  /// 256-bit security: rate 136 bytes.
  Bits256,
}

impl Security {
  #[inline]
  #[must_use]
  pub const fn bits(self) -> usize {
    match self {
      Self::Bits128 => 128,
      Self::Bits256 => 256,
    }
  }

  /// Bytes absorbed or squeezed per permutation call.
  #[inline]
  #[must_use]
  pub const fn rate(self) -> usize {
    WIDTH - self.capacity()
  }

  /// Capacity in bytes; also the length of a leaf chaining value.
  #[inline]
  #[must_use]
  pub const fn capacity(self) -> usize {
    2 * self.bits() / 8
  }

  #[inline]
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Bits128 => "128",
      Self::Bits256 => "256",
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sponge protocol
// ─────────────────────────────────────────────────────────────────────────────

/// Absorb / domain-separate / squeeze interface shared by every sponge role.
pub(crate) trait Sponge {
  /// XOR `data` into the rate, permuting whenever a block fills.
  fn absorb(&mut self, data: &[u8]);

  /// Apply `delimiter` and the final padding bit, then switch to squeezing.
  ///
  /// Must be called at most once per node.
  fn absorb_domain_separation(&mut self, delimiter: u8);

  /// Produce the next `out.len()` bytes of output.
  fn squeeze(&mut self, out: &mut [u8]);
}

/// One TurboSHAKE absorb/squeeze session over a private permutation state.
#[derive(Clone, Debug)]
pub(crate) struct SpongeNode {
  state: KeccakState,
  rate: usize,
  /// Bytes of the current block already absorbed or emitted; `<= rate`.
  byte_io_index: usize,
  squeezing: bool,
}

impl SpongeNode {
  #[inline]
  pub(crate) const fn new(security: Security) -> Self {
    Self::resume(security, KeccakState::new())
  }

  /// Continue absorbing from a state that has taken whole blocks only.
  #[inline]
  pub(crate) const fn resume(security: Security, state: KeccakState) -> Self {
    Self {
      state,
      rate: security.rate(),
      byte_io_index: 0,
      squeezing: false,
    }
  }

  #[cfg(test)]
  pub(crate) const fn byte_io_index(&self) -> usize {
    self.byte_io_index
  }

  /// Skip forward to the next 8-byte boundary of the rate, leaving the
  /// skipped bytes as zeros.
  #[inline]
  pub(crate) fn pad_to_lane(&mut self) {
    debug_assert!(!self.squeezing);
    self.byte_io_index = (self.byte_io_index + 7) & !7;
  }
}

impl Sponge for SpongeNode {
  fn absorb(&mut self, mut data: &[u8]) {
    debug_assert!(!self.squeezing, "absorb after squeeze");

    while !data.is_empty() {
      if self.byte_io_index == 0 && data.len() >= self.rate {
        let used = self.state.absorb_blocks(self.rate, data);
        data = &data[used..];
        continue;
      }

      let take = core::cmp::min(self.rate - self.byte_io_index, data.len());
      self.state.add_bytes(&data[..take], self.byte_io_index);
      self.byte_io_index += take;
      data = &data[take..];

      if self.byte_io_index == self.rate {
        self.state.permute();
        self.byte_io_index = 0;
      }
    }
  }

  fn absorb_domain_separation(&mut self, delimiter: u8) {
    debug_assert!(!self.squeezing, "domain separation applied twice");
    debug_assert_ne!(delimiter, 0);

    if self.byte_io_index == self.rate {
      // Only reachable after `pad_to_lane` filled the block exactly.
      self.state.permute();
      self.byte_io_index = 0;
    }

    self.state.add_byte(delimiter, self.byte_io_index);
    if delimiter & 0x80 != 0 && self.byte_io_index == self.rate - 1 {
      // The delimiter's top bit and the terminator would share a byte.
      self.state.permute();
    }
    self.state.add_byte(PAD_LAST, self.rate - 1);
    self.state.permute();
    self.byte_io_index = 0;
    self.squeezing = true;
  }

  fn squeeze(&mut self, mut out: &mut [u8]) {
    if !self.squeezing {
      self.absorb_domain_separation(IMPLICIT_DOMAIN);
    }

    while !out.is_empty() {
      if self.byte_io_index == self.rate {
        self.state.permute();
        self.byte_io_index = 0;
      }
      let take = core::cmp::min(self.rate - self.byte_io_index, out.len());
      let (now, rest) = out.split_at_mut(take);
      self.state.extract_bytes(now, self.byte_io_index);
      self.byte_io_index += take;
      out = rest;
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────────────────────────

/// Leaf delimiter: message bytes hashed into a chaining value.
pub(crate) const LEAF_DELIMITER: u8 = 0x0B;

/// First-leaf continuation: the first leaf is complete and chaining values follow.
pub(crate) const FIRST_LEAF_CONTINUATION: u8 = 0x03;

/// Sponge for one leaf after the first; yields its chaining value.
#[derive(Clone, Debug)]
pub(crate) struct LeafNode(SpongeNode);

impl LeafNode {
  #[inline]
  pub(crate) const fn new(security: Security) -> Self {
    Self(SpongeNode::new(security))
  }

  #[inline]
  pub(crate) const fn resume(security: Security, state: KeccakState) -> Self {
    Self(SpongeNode::resume(security, state))
  }

  /// Close the leaf and write its chaining value (`security.capacity()` bytes).
  pub(crate) fn chaining_value(mut self, cv: &mut [u8]) {
    self.0.absorb_domain_separation(LEAF_DELIMITER);
    self.0.squeeze(cv);
  }
}

impl Sponge for LeafNode {
  #[inline]
  fn absorb(&mut self, data: &[u8]) {
    self.0.absorb(data);
  }

  #[inline]
  fn absorb_domain_separation(&mut self, delimiter: u8) {
    self.0.absorb_domain_separation(delimiter);
  }

  #[inline]
  fn squeeze(&mut self, out: &mut [u8]) {
    self.0.squeeze(out);
  }
}

/// Root sponge: the first leaf's message bytes, then every chaining value.
#[derive(Clone, Debug)]
pub(crate) struct FinalNode(SpongeNode);

impl FinalNode {
  #[inline]
  pub(crate) const fn new(security: Security) -> Self {
    Self(SpongeNode::new(security))
  }

  /// Mark the first leaf as complete and align for the chaining values.
  pub(crate) fn close_first_leaf(&mut self) {
    self.0.absorb(&[FIRST_LEAF_CONTINUATION]);
    self.0.pad_to_lane();
  }

  #[cfg(test)]
  pub(crate) const fn byte_io_index(&self) -> usize {
    self.0.byte_io_index()
  }
}

impl Sponge for FinalNode {
  #[inline]
  fn absorb(&mut self, data: &[u8]) {
    self.0.absorb(data);
  }

  #[inline]
  fn absorb_domain_separation(&mut self, delimiter: u8) {
    self.0.absorb_domain_separation(delimiter);
  }

  #[inline]
  fn squeeze(&mut self, out: &mut [u8]) {
    self.0.squeeze(out);
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public TurboSHAKE
// ─────────────────────────────────────────────────────────────────────────────

/// Domain separation byte outside `0x01..=0x7F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidDomainSeparation(pub u8);

impl fmt::Display for InvalidDomainSeparation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "domain separation byte {:#04x} outside 0x01..=0x7f", self.0)
  }
}

impl core::error::Error for InvalidDomainSeparation {}

#[inline]
const fn check_domain(domain: u8) -> Result<u8, InvalidDomainSeparation> {
  if domain >= 0x01 && domain <= 0x7F {
    Ok(domain)
  } else {
    Err(InvalidDomainSeparation(domain))
  }
}

macro_rules! turboshake {
  ($(#[$meta:meta])* $name:ident, $xof:ident, $security:expr) => {
    $(#[$meta])*
    #[derive(Clone, Debug)]
    pub struct $name {
      node: SpongeNode,
      domain: u8,
    }

    impl $name {
      /// Domain byte used by [`Default`], as in the TurboSHAKE definition.
      pub const DEFAULT_DOMAIN: u8 = 0x1F;

      /// Rate in bytes.
      pub const RATE: usize = $security.rate();

      /// Start a hasher with `domain` in `0x01..=0x7F`.
      pub const fn new(domain: u8) -> Result<Self, InvalidDomainSeparation> {
        match check_domain(domain) {
          Ok(domain) => Ok(Self {
            node: SpongeNode::new($security),
            domain,
          }),
          Err(e) => Err(e),
        }
      }

      #[inline]
      #[must_use]
      pub const fn domain(&self) -> u8 {
        self.domain
      }

      #[inline]
      pub fn update(&mut self, data: &[u8]) {
        self.node.absorb(data);
      }

      #[must_use]
      pub fn finalize_xof(&self) -> $xof {
        let mut node = self.node.clone();
        node.absorb_domain_separation(self.domain);
        $xof { node }
      }

      /// One-shot: hash `data` under `domain` and fill `out`.
      pub fn hash_into(data: &[u8], domain: u8, out: &mut [u8]) -> Result<(), InvalidDomainSeparation> {
        let mut h = Self::new(domain)?;
        h.update(data);
        h.finalize_xof().squeeze(out);
        Ok(())
      }
    }

    impl Default for $name {
      #[inline]
      fn default() -> Self {
        Self {
          node: SpongeNode::new($security),
          domain: Self::DEFAULT_DOMAIN,
        }
      }
    }

    #[derive(Clone, Debug)]
    pub struct $xof {
      node: SpongeNode,
    }

    impl Xof for $xof {
      #[inline]
      fn squeeze(&mut self, out: &mut [u8]) {
        self.node.squeeze(out);
      }
    }
  };
}

turboshake!(
  /// TurboSHAKE128 extendable-output hasher.
  TurboShake128,
  TurboShake128Xof,
  Security::Bits128
);

turboshake!(
  /// TurboSHAKE256 extendable-output hasher.
  TurboShake256,
  TurboShake256Xof,
  Security::Bits256
);
