use hashes::crypto::{TurboShake128, TurboShake256};
use proptest::prelude::*;
use traits::Xof as _;

fn turboshake128_ref(data: &[u8], domain: u8, out: &mut [u8]) {
  use sha3::digest::{ExtendableOutput, Update, XofReader, core_api::CoreWrapper};
  let mut h = CoreWrapper::from_core(sha3::TurboShake128Core::new(domain));
  h.update(data);
  h.finalize_xof().read(out);
}

fn turboshake256_ref(data: &[u8], domain: u8, out: &mut [u8]) {
  use sha3::digest::{ExtendableOutput, Update, XofReader, core_api::CoreWrapper};
  let mut h = CoreWrapper::from_core(sha3::TurboShake256Core::new(domain));
  h.update(data);
  h.finalize_xof().read(out);
}

proptest! {
  #[test]
  fn turboshake128_one_shot_matches_sha3_crate(
    data in proptest::collection::vec(any::<u8>(), 0..4096),
    domain in 0x01u8..=0x7F,
    out_len in 0usize..2048,
  ) {
    let mut expected = vec![0u8; out_len];
    turboshake128_ref(&data, domain, &mut expected);

    let mut actual = vec![0u8; out_len];
    TurboShake128::hash_into(&data, domain, &mut actual).unwrap();

    prop_assert_eq!(actual, expected);
  }

  #[test]
  fn turboshake256_one_shot_matches_sha3_crate(
    data in proptest::collection::vec(any::<u8>(), 0..4096),
    domain in 0x01u8..=0x7F,
    out_len in 0usize..2048,
  ) {
    let mut expected = vec![0u8; out_len];
    turboshake256_ref(&data, domain, &mut expected);

    let mut actual = vec![0u8; out_len];
    TurboShake256::hash_into(&data, domain, &mut actual).unwrap();

    prop_assert_eq!(actual, expected);
  }

  #[test]
  fn turboshake128_streaming_matches_sha3_crate(
    data in proptest::collection::vec(any::<u8>(), 0..4096),
    domain in 0x01u8..=0x7F,
    out_len in 0usize..2048,
    split in any::<usize>(),
  ) {
    let split = split % (out_len + 1);
    let mut expected = vec![0u8; out_len];
    turboshake128_ref(&data, domain, &mut expected);

    let mut h = TurboShake128::new(domain).unwrap();
    let mut i = 0usize;
    while i < data.len() {
      let step = (data[i] as usize % 173) + 1;
      let end = core::cmp::min(data.len(), i + step);
      h.update(&data[i..end]);
      i = end;
    }

    let mut xof = h.finalize_xof();
    let mut actual = vec![0u8; out_len];
    xof.squeeze(&mut actual[..split]);
    xof.squeeze(&mut actual[split..]);

    prop_assert_eq!(actual, expected);
  }

  #[test]
  fn turboshake256_streaming_matches_sha3_crate(
    data in proptest::collection::vec(any::<u8>(), 0..4096),
    domain in 0x01u8..=0x7F,
    out_len in 0usize..2048,
    split in any::<usize>(),
  ) {
    let split = split % (out_len + 1);
    let mut expected = vec![0u8; out_len];
    turboshake256_ref(&data, domain, &mut expected);

    let mut h = TurboShake256::new(domain).unwrap();
    let mut i = 0usize;
    while i < data.len() {
      let step = (data[i] as usize % 131) + 1;
      let end = core::cmp::min(data.len(), i + step);
      h.update(&data[i..end]);
      i = end;
    }

    let mut xof = h.finalize_xof();
    let mut actual = vec![0u8; out_len];
    xof.squeeze(&mut actual[..split]);
    xof.squeeze(&mut actual[split..]);

    prop_assert_eq!(actual, expected);
  }
}

#[test]
fn default_domain_matches_sha3_crate() {
  let mut expected = [0u8; 64];
  turboshake128_ref(b"abc", 0x1F, &mut expected);

  let mut h = TurboShake128::default();
  h.update(b"abc");
  let mut actual = [0u8; 64];
  h.finalize_xof().squeeze(&mut actual);
  assert_eq!(actual, expected);
}
