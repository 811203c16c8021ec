use crate::{
    claims::UnknownAttribute,
    envelope::MalformedTokenError,
    signer::{SigningError, UnsupportedAlgorithm},
};
use std::fmt;

/// An error when building, encoding or validating a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    UnknownAttribute(#[from] UnknownAttribute),

    #[error("malformed token: {0}")]
    MalformedToken(#[from] MalformedTokenError),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token is expired")]
    TokenExpired,

    #[error("encoding token: {0}")]
    EncodingFailure(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl TokenError {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAttribute(_) => ErrorKind::UnknownAttribute,
            Self::MalformedToken(_) => ErrorKind::MalformedToken,
            Self::InvalidSignature => ErrorKind::InvalidSignature,
            Self::TokenExpired => ErrorKind::TokenExpired,
            Self::EncodingFailure(_) => ErrorKind::EncodingFailure,
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::InvalidKey(_) => ErrorKind::InvalidKey,
        }
    }
}

impl From<UnsupportedAlgorithm> for TokenError {
    fn from(error: UnsupportedAlgorithm) -> Self {
        Self::UnsupportedAlgorithm(error.0)
    }
}

impl From<SigningError> for TokenError {
    fn from(error: SigningError) -> Self {
        match error {
            SigningError::InvalidKey(reason) => Self::InvalidKey(reason.to_string()),
            SigningError::UnsupportedAlgorithm(algorithm) => algorithm.into(),
            SigningError::SigningFailed(reason) => Self::EncodingFailure(reason),
        }
    }
}

/// The kind of a [`TokenError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownAttribute,
    MalformedToken,
    InvalidSignature,
    TokenExpired,
    EncodingFailure,
    UnsupportedAlgorithm,
    InvalidKey,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnknownAttribute => "unknown attribute",
            Self::MalformedToken => "malformed token",
            Self::InvalidSignature => "invalid signature",
            Self::TokenExpired => "token expired",
            Self::EncodingFailure => "encoding failure",
            Self::UnsupportedAlgorithm => "unsupported algorithm",
            Self::InvalidKey => "invalid key",
        };
        write!(f, "{text}")
    }
}
