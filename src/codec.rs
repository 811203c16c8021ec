use crate::{
    claims::{ClaimSet, ClaimSetOptions, UnknownAttribute, DEFAULT_LIFETIME_SECS},
    clock::{Clock, SystemClock},
    envelope::{to_base64, to_base64_json, JwtHeader},
    error::TokenError,
    identity::IdentityRecord,
    key::SecretKey,
    signer::{Algorithm, Signer},
    validator::TokenValidator,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The options used to build a [`TokenCodec`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CodecOptions {
    /// The signing algorithm.
    #[serde(default)]
    pub algorithm: Algorithm,

    /// The token lifetime in seconds.
    ///
    /// This is only used when no explicit `exp` claim is given.
    pub expiration: Option<i64>,

    /// The options for the claims in the token.
    #[serde(flatten)]
    pub claims: ClaimSetOptions,
}

impl CodecOptions {
    /// Set the signing algorithm.
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the token lifetime in seconds.
    pub fn expiration(mut self, seconds: i64) -> Self {
        self.expiration = Some(seconds);
        self
    }

    /// Set the options for the claims in the token.
    pub fn claims(mut self, claims: ClaimSetOptions) -> Self {
        self.claims = claims;
        self
    }
}

/// Builds tokens out of a claim set and validates tokens.
pub struct TokenCodec {
    claims: ClaimSet,
    expiration: i64,
    signer: Arc<dyn Signer>,
    validator: TokenValidator,
}

impl TokenCodec {
    /// Build a codec that signs using the given key.
    pub fn build<K: Into<SecretKey>>(secret_key: K, options: CodecOptions) -> Result<Self, TokenError> {
        Self::build_with_clock(secret_key, options, Arc::new(SystemClock))
    }

    /// Build a codec that signs using the given key and reads the time from the given clock.
    pub fn build_with_clock<K: Into<SecretKey>>(
        secret_key: K,
        options: CodecOptions,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        let secret_key = secret_key.into();
        if secret_key.is_empty() {
            return Err(TokenError::InvalidKey("secret key is empty".into()));
        }
        let signer = secret_key.signer(options.algorithm)?;
        Ok(Self::with_signer_and_clock(signer, options, clock))
    }

    /// Build a codec around a custom signer.
    ///
    /// The algorithm in `options` is ignored, the one reported by the signer is used instead. A
    /// debug event is emitted when the two differ.
    pub fn with_signer(signer: Arc<dyn Signer>, options: CodecOptions) -> Self {
        Self::with_signer_and_clock(signer, options, Arc::new(SystemClock))
    }

    /// Build a codec around a custom signer that reads the time from the given clock.
    pub fn with_signer_and_clock(signer: Arc<dyn Signer>, options: CodecOptions, clock: Arc<dyn Clock>) -> Self {
        let CodecOptions { algorithm, expiration, claims: mut claim_options } = options;
        if algorithm.identifier() != signer.algorithm() {
            debug!(
                configured = %algorithm,
                signer = signer.algorithm(),
                "ignoring configured algorithm in favor of the signer's"
            );
        }
        if let (None, Some(expiration)) = (claim_options.exp, expiration) {
            let issued_at = *claim_options.iat.get_or_insert_with(|| clock.now().timestamp());
            claim_options.exp = Some(issued_at.saturating_add(expiration));
        }
        let claims = ClaimSet::build_with_clock(claim_options, clock.as_ref());
        let validator = TokenValidator::new(signer.clone()).with_clock(clock);
        Self { claims, expiration: expiration.unwrap_or(DEFAULT_LIFETIME_SECS), signer, validator }
    }

    /// Use the given record as the subject of the token.
    ///
    /// The subject is set to the record's primary key and every attribute in `attributes` is
    /// copied into the extra claims. If the record is missing any of them, nothing is modified.
    pub fn with_external_subject<R, I, S>(&mut self, record: &R, attributes: I) -> Result<&mut Self, TokenError>
    where
        R: IdentityRecord + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = Vec::new();
        for name in attributes {
            let name = name.as_ref();
            if !record.has_attribute(name) {
                return Err(UnknownAttribute(name.to_string()).into());
            }
            let value = record.attribute(name).ok_or_else(|| UnknownAttribute(name.to_string()))?;
            values.push((name.to_string(), value));
        }
        self.claims.set_subject(record.primary_key()).extend_extra(values);
        Ok(self)
    }

    /// Add every entry in `data` as an extra claim.
    pub fn with_extra_data<I>(&mut self, data: I) -> &mut Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.claims.extend_extra(data);
        self
    }

    /// Encode and sign the claims into a token.
    pub fn encode(&self) -> Result<String, TokenError> {
        if self.claims.expires_at() < self.claims.issued_at() {
            return Err(TokenError::EncodingFailure("expiration precedes issue time".into()));
        }
        let header = JwtHeader::new(self.signer.algorithm());
        let header_b64 = to_base64_json(&header).map_err(|e| TokenError::EncodingFailure(format!("header: {e}")))?;
        let payload_b64 =
            to_base64_json(&self.claims).map_err(|e| TokenError::EncodingFailure(format!("claims: {e}")))?;

        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature = self.signer.sign(signing_input.as_bytes())?;
        let signature_b64 = to_base64(signature);
        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Decode a token, checking its signature and expiration.
    pub fn decode(&self, token: &str) -> Result<ClaimSet, TokenError> {
        self.validator.decode(token)
    }

    /// Check whether the signature in a token is valid.
    pub fn signature_is_valid(&self, token: &str) -> Result<bool, TokenError> {
        self.validator.signature_is_valid(token)
    }

    /// Check whether a validly signed token is expired.
    pub fn token_is_expired(&self, token: &str) -> Result<bool, TokenError> {
        self.validator.token_is_expired(token)
    }

    /// The signing algorithm identifier.
    pub fn algorithm(&self) -> &str {
        self.signer.algorithm()
    }

    /// The configured token lifetime in seconds.
    pub fn expiration(&self) -> i64 {
        self.expiration
    }

    /// The claims that will be encoded.
    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// A mutable reference to the claims that will be encoded.
    pub fn claims_mut(&mut self) -> &mut ClaimSet {
        &mut self.claims
    }

    /// The validator used to decode tokens.
    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }
}
