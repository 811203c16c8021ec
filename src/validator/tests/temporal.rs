use super::fixtures::*;
use crate::{claims::ClaimSetOptions, error::ErrorKind};

#[test]
fn token_expired() {
    let asserter = Asserter::default();
    let token = asserter.token(expiring_in(1));

    // Move past the expiration second.
    asserter.clock.advance(2);
    assert!(asserter.validator.token_is_expired(&token).unwrap());
    asserter.assert_failure(&token, ErrorKind::TokenExpired);
}

#[test]
fn token_not_expired() {
    let asserter = Asserter::default();
    let token = asserter.token(expiring_in(10));
    assert!(!asserter.validator.token_is_expired(&token).unwrap());
    asserter.assert_success(&token);
}

#[test]
fn expires_at_current_second() {
    // A token is still valid during the second it expires at.
    let asserter = Asserter::default().with_current_time(NOW + 10);
    let token = asserter.token(expiring_in(10));
    assert!(!asserter.validator.token_is_expired(&token).unwrap());
    asserter.assert_success(&token);

    asserter.clock.advance(1);
    assert!(asserter.validator.token_is_expired(&token).unwrap());
    asserter.assert_failure(&token, ErrorKind::TokenExpired);
}

#[test]
fn explicit_expiration_claim() {
    let asserter = Asserter::default().with_current_time(5);
    let token = asserter.token(with_claims(ClaimSetOptions::default().issued_at(0).expires_at(4)));
    asserter.assert_failure(&token, ErrorKind::TokenExpired);

    asserter.clock.set(4);
    asserter.assert_success(&token);
}

#[test]
fn default_lifetime() {
    let asserter = Asserter::default().with_current_time(NOW + 3600);
    let token = asserter.token(Default::default());
    asserter.assert_success(&token);

    asserter.clock.advance(1);
    asserter.assert_failure(&token, ErrorKind::TokenExpired);
}

#[test]
fn clock_past_representable_range() {
    let asserter = Asserter::default().with_current_time(i64::MAX);
    let token = asserter.token(expiring_in(10));
    assert!(asserter.validator.token_is_expired(&token).unwrap());
    asserter.assert_failure(&token, ErrorKind::TokenExpired);
}
