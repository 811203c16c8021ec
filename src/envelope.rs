use crate::claims::ClaimSet;
use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_RAW_TOKEN_SIZE: usize = 1024 * 10;
const TOKEN_TYPE: &str = "JWT";

/// A raw token in compact serialization.
///
/// This keeps the decoded bytes of every segment along with the original signing input, so the
/// signature can be checked against exactly what was received.
#[derive(Clone, Debug)]
pub struct RawToken<'a> {
    pub(crate) signing_input: &'a str,
    pub(crate) header: Vec<u8>,
    pub(crate) payload: Vec<u8>,
    pub(crate) signature: Vec<u8>,
}

impl<'a> RawToken<'a> {
    fn from_compact(s: &'a str) -> Result<Self, MalformedTokenError> {
        let mut segments = s.split('.');
        let (header_b64, header) = Self::parse_base64_next(&mut segments, "header")?;
        let (payload_b64, payload) = Self::parse_base64_next(&mut segments, "payload")?;
        let (_, signature) = Self::parse_base64_next(&mut segments, "signature")?;
        if segments.next().is_some() {
            return Err(MalformedTokenError::TooManySegments);
        }
        let signing_input = &s[..header_b64.len() + 1 + payload_b64.len()];
        Ok(Self { signing_input, header, payload, signature })
    }

    fn parse_base64_next<I>(iter: &mut I, segment: &'static str) -> Result<(&'a str, Vec<u8>), MalformedTokenError>
    where
        I: Iterator<Item = &'a str>,
    {
        let next = iter.next().ok_or(MalformedTokenError::MissingSegment(segment))?;
        if next.is_empty() {
            return Err(MalformedTokenError::EmptySegment(segment));
        }
        let decoded = from_base64(next).map_err(|e| MalformedTokenError::Base64(segment, e))?;
        Ok((next, decoded))
    }

    /// The `header.payload` part of the token, which is what gets signed.
    pub fn signing_input(&self) -> &str {
        self.signing_input
    }

    /// The raw signature bytes.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Parse the header.
    pub fn header(&self) -> Result<JwtHeader, MalformedTokenError> {
        serde_json::from_slice(&self.header).map_err(|e| MalformedTokenError::Json("header", e))
    }

    /// Parse the claims in the payload.
    pub fn claims(&self) -> Result<ClaimSet, MalformedTokenError> {
        serde_json::from_slice(&self.payload).map_err(|e| MalformedTokenError::Json("payload", e))
    }
}

/// A compact token decoder.
#[derive(Clone, Debug)]
pub struct TokenDecoder {
    /// The maximum raw token size, in bytes.
    pub max_raw_token_size: usize,
}

impl Default for TokenDecoder {
    fn default() -> Self {
        Self { max_raw_token_size: DEFAULT_MAX_RAW_TOKEN_SIZE }
    }
}

impl TokenDecoder {
    /// Split a token into its segments and decode them.
    ///
    /// This performs no integrity checks, it only ensures the token is well formed.
    pub fn decode<'a>(&self, s: &'a str) -> Result<RawToken<'a>, MalformedTokenError> {
        if s.len() > self.max_raw_token_size {
            return Err(MalformedTokenError::TooLarge(self.max_raw_token_size));
        }
        RawToken::from_compact(s)
    }
}

/// An error when a token isn't properly structured.
#[derive(Debug, thiserror::Error)]
pub enum MalformedTokenError {
    #[error("token is larger than max allowed: {0} bytes")]
    TooLarge(usize),

    #[error("no {0} segment in token")]
    MissingSegment(&'static str),

    #[error("empty {0} segment in token")]
    EmptySegment(&'static str),

    #[error("token has more than three segments")]
    TooManySegments,

    #[error("invalid base64 found on {0}: {1}")]
    Base64(&'static str, base64::DecodeError),

    #[error("invalid JSON on {0}: {1}")]
    Json(&'static str, serde_json::Error),
}

/// A token header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// The signing algorithm identifier.
    #[serde(rename = "alg")]
    pub algorithm: String,

    /// The token type.
    #[serde(rename = "typ", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl JwtHeader {
    /// Construct the header for a token signed with the given algorithm.
    pub fn new<S: Into<String>>(algorithm: S) -> Self {
        Self { algorithm: algorithm.into(), token_type: Some(TOKEN_TYPE.to_string()) }
    }
}

pub(crate) fn to_base64<T: AsRef<[u8]>>(input: T) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(input)
}

pub(crate) fn to_base64_json<T: Serialize>(input: &T) -> Result<String, serde_json::Error> {
    let input = serde_json::to_vec(input)?;
    Ok(to_base64(input))
}

pub(crate) fn from_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64_URL_SAFE_NO_PAD.decode(input)
}
