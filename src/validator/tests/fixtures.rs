use crate::{
    claims::{ClaimSet, ClaimSetOptions},
    clock::{Clock, FixedClock},
    codec::{CodecOptions, TokenCodec},
    envelope::{from_base64, to_base64},
    error::{ErrorKind, TokenError},
    key::SecretKey,
    signer::Algorithm,
    validator::TokenValidator,
};
use std::{env, sync::Arc};

pub(crate) const SECRET: &str = "e469d667b15f48808e7595529cf152a0cfb641bd";
pub(crate) const NOW: i64 = 1_740_494_955;

// Builds tokens and validates them against a clock the test controls.
pub(crate) struct Asserter {
    pub clock: Arc<FixedClock>,
    pub validator: TokenValidator,
    pub log_assertions: bool,
}

impl Asserter {
    pub fn new(algorithm: Algorithm, key: SecretKey) -> Self {
        let clock = Arc::new(FixedClock::at(NOW));
        let signer = key.signer(algorithm).expect("invalid key");
        let validator = TokenValidator::new(signer).with_clock(clock.clone());
        Self { clock, validator, log_assertions: env::var("JWT_VALIDATOR_LOG_ASSERTIONS") == Ok("1".to_string()) }
    }

    pub fn with_current_time(self, timestamp: i64) -> Self {
        self.clock.set(timestamp);
        self
    }

    // Build a token signed with `SECRET`, issued at `NOW`.
    pub fn token(&self, options: CodecOptions) -> String {
        codec(SECRET, options).encode().expect("encode failed")
    }

    pub fn assert_failure(&self, token: &str, kind: ErrorKind) -> TokenError {
        self.log(token);
        let err = self.validator.decode(token).expect_err("decode succeeded");
        assert_eq!(err.kind(), kind, "unexpected type of failure: {err}");
        err
    }

    pub fn assert_success(&self, token: &str) -> ClaimSet {
        self.log(token);
        self.validator.decode(token).expect("decode failed")
    }

    fn log(&self, token: &str) {
        if self.log_assertions {
            eprintln!("Token being asserted at {}: {token}", self.clock.now().timestamp());
        }
    }
}

impl Default for Asserter {
    fn default() -> Self {
        Self::new(Algorithm::Hs256, SecretKey::from(SECRET))
    }
}

pub(crate) fn codec(key: &str, options: CodecOptions) -> TokenCodec {
    TokenCodec::build_with_clock(key, options, Arc::new(FixedClock::at(NOW))).expect("build failed")
}

pub(crate) fn expiring_in(seconds: i64) -> CodecOptions {
    CodecOptions::default().expiration(seconds)
}

pub(crate) fn with_claims(claims: ClaimSetOptions) -> CodecOptions {
    CodecOptions::default().claims(claims)
}

// Replace one of the segments in a token.
pub(crate) fn replace_segment(token: &str, index: usize, segment: &[u8]) -> String {
    let mut segments: Vec<String> = token.split('.').map(ToString::to_string).collect();
    segments[index] = to_base64(segment);
    segments.join(".")
}

pub(crate) fn decode_segment(token: &str, index: usize) -> Vec<u8> {
    let segment = token.split('.').nth(index).expect("no segment");
    from_base64(segment).expect("invalid base64")
}
