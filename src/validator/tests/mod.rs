mod fixtures;
mod temporal;

use fixtures::*;
use crate::{error::ErrorKind, key::SecretKey, signer::Algorithm};
use rstest::rstest;

#[test]
fn round_trip() {
    let asserter = Asserter::default();
    let codec = codec(SECRET, expiring_in(10));
    let token = codec.encode().expect("encode failed");

    let claims = asserter.assert_success(&token);
    assert_eq!(&claims, codec.claims());
    assert!(asserter.validator.signature_is_valid(&token).unwrap());
    assert!(!asserter.validator.token_is_expired(&token).unwrap());
}

#[rstest]
#[case::hs256(Algorithm::Hs256)]
#[case::hs384(Algorithm::Hs384)]
#[case::hs512(Algorithm::Hs512)]
fn round_trip_hmac_algorithms(#[case] algorithm: Algorithm) {
    let asserter = Asserter::new(algorithm, SecretKey::from(SECRET));
    let codec = codec(SECRET, expiring_in(10).algorithm(algorithm));
    let token = codec.encode().expect("encode failed");
    assert_eq!(asserter.validator.algorithm(), algorithm.identifier());
    assert_eq!(&asserter.assert_success(&token), codec.claims());
}

#[test]
fn algorithm_mismatch() {
    // Same secret, different HMAC algorithm: the signature can't match.
    let asserter = Asserter::new(Algorithm::Hs512, SecretKey::from(SECRET));
    let token = asserter.token(expiring_in(10));
    asserter.assert_failure(&token, ErrorKind::InvalidSignature);
}

#[test]
fn header_algorithm_mismatch() {
    // A token signed with the right key but claiming a different algorithm in its header.
    use crate::envelope::{to_base64, to_base64_json, JwtHeader};

    let asserter = Asserter::default();
    let token = asserter.token(expiring_in(10));
    let payload = token.split('.').nth(1).unwrap();
    let header = to_base64_json(&JwtHeader::new("HS512")).unwrap();
    let signing_input = format!("{header}.{payload}");
    let signer = SecretKey::from(SECRET).signer(Algorithm::Hs256).unwrap();
    let signature = to_base64(signer.sign(signing_input.as_bytes()).unwrap());

    asserter.assert_failure(&format!("{signing_input}.{signature}"), ErrorKind::UnsupportedAlgorithm);
}

#[test]
fn wrong_secret() {
    let asserter = Asserter::default();
    let token = codec("another secret", expiring_in(10)).encode().expect("encode failed");
    asserter.assert_failure(&token, ErrorKind::InvalidSignature);
    assert!(!asserter.validator.signature_is_valid(&token).unwrap());
}

#[test]
fn es256k_round_trip() {
    let key = SecretKey::generate(Algorithm::Es256k);
    let asserter = Asserter::new(Algorithm::Es256k, key.clone());
    let options = expiring_in(10).algorithm(Algorithm::Es256k);
    let codec = crate::codec::TokenCodec::build_with_clock(key, options, asserter.clock.clone()).unwrap();
    let token = codec.encode().expect("encode failed");
    assert_eq!(&asserter.assert_success(&token), codec.claims());

    let other = Asserter::new(Algorithm::Es256k, SecretKey::generate(Algorithm::Es256k));
    other.assert_failure(&token, ErrorKind::InvalidSignature);
}

#[test]
fn es256k_public_key_validation() {
    use crate::{signer::Es256kSigner, validator::TokenValidator};
    use std::sync::Arc;

    let key = SecretKey::generate(Algorithm::Es256k);
    let asserter = Asserter::default();
    let options = expiring_in(10).algorithm(Algorithm::Es256k);
    let codec = crate::codec::TokenCodec::build_with_clock(key.clone(), options, asserter.clock.clone()).unwrap();
    let token = codec.encode().expect("encode failed");

    let public_key = Es256kSigner::new(&key).unwrap().public_key();
    let verifier = Es256kSigner::from_public_key(&public_key).unwrap();
    let validator = TokenValidator::new(Arc::new(verifier)).with_clock(asserter.clock.clone());
    assert_eq!(&validator.decode(&token).expect("decode failed"), codec.claims());

    let other = Es256kSigner::new(&SecretKey::generate(Algorithm::Es256k)).unwrap().public_key();
    let validator = TokenValidator::new(Arc::new(Es256kSigner::from_public_key(&other).unwrap()));
    assert_eq!(validator.decode(&token).expect_err("decode succeeded").kind(), ErrorKind::InvalidSignature);
}
