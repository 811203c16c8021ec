mod temporal;

#[cfg(test)]
mod tests;

use crate::{
    claims::ClaimSet,
    clock::{Clock, SystemClock},
    envelope::TokenDecoder,
    error::TokenError,
    signer::Signer,
};
use std::sync::Arc;
use tracing::debug;

/// A token validator.
///
/// Every check re-derives its verdict from the token string: there is no state kept between
/// calls other than the signer and clock.
#[derive(Clone)]
pub struct TokenValidator {
    signer: Arc<dyn Signer>,
    time_provider: Arc<dyn Clock>,
    decoder: TokenDecoder,
}

impl TokenValidator {
    /// Construct a new validator that checks signatures using the given signer.
    pub fn new(signer: Arc<dyn Signer>) -> Self {
        Self { signer, time_provider: Arc::new(SystemClock), decoder: Default::default() }
    }

    /// Use the given clock for expiration checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.time_provider = clock;
        self
    }

    /// Set the maximum size a raw token can have.
    pub fn with_max_token_size(mut self, size: usize) -> Self {
        self.decoder.max_raw_token_size = size;
        self
    }

    /// The algorithm identifier tokens are expected to be signed with.
    pub fn algorithm(&self) -> &str {
        self.signer.algorithm()
    }

    /// Decode a token, checking its signature and expiration.
    pub fn decode(&self, token: &str) -> Result<ClaimSet, TokenError> {
        let claims = self.verify(token)?;
        let now = self.time_provider.now();
        temporal::validate_expiration(&claims, &now).inspect_err(|e| debug!(kind = %e.kind(), "Rejecting token: {e}"))?;
        Ok(claims)
    }

    /// Check whether the signature in a token is valid.
    ///
    /// Neither the header nor the payload are parsed, and expiration isn't checked. A token that
    /// isn't made up of three base64url segments is reported as malformed rather than invalid.
    pub fn signature_is_valid(&self, token: &str) -> Result<bool, TokenError> {
        let raw = self.decoder.decode(token)?;
        Ok(self.signer.verify(raw.signing_input().as_bytes(), raw.signature()))
    }

    /// Check whether a token is expired.
    ///
    /// The signature is validated first so the expiration of a forged token is never disclosed.
    pub fn token_is_expired(&self, token: &str) -> Result<bool, TokenError> {
        let claims = self.verify(token)?;
        Ok(claims.is_expired_at(&self.time_provider.now()))
    }

    // Decodes the token and checks its signature, but not its expiration.
    fn verify(&self, token: &str) -> Result<ClaimSet, TokenError> {
        self.try_verify(token).inspect_err(|e| debug!(kind = %e.kind(), "Rejecting token: {e}"))
    }

    fn try_verify(&self, token: &str) -> Result<ClaimSet, TokenError> {
        let raw = self.decoder.decode(token)?;

        // Nothing in the token is parsed before its signature is known to be good.
        if !self.signer.verify(raw.signing_input().as_bytes(), raw.signature()) {
            return Err(TokenError::InvalidSignature);
        }
        let header = raw.header()?;
        if header.algorithm != self.signer.algorithm() {
            return Err(TokenError::UnsupportedAlgorithm(header.algorithm));
        }
        Ok(raw.claims()?)
    }
}
