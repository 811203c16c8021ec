use crate::{
    claims::ClaimSet,
    error::{ErrorKind, TokenError},
    validator::TokenValidator,
};
use std::{collections::HashMap, hash::BuildHasher};

/// The header bearer tokens are read from by default.
pub const DEFAULT_HEADER_NAME: &str = "Authorization";

const BEARER_SCHEME: &str = "Bearer";

/// A source of request headers.
pub trait HeaderSource {
    /// Get the value of a header, matching its name case insensitively.
    fn header(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> HeaderSource for HashMap<String, String, S> {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }
}

/// Authorizes requests carrying a bearer token.
///
/// This is the piece a request filter hooks into: it pulls the token out of a header and maps
/// every reason to reject it into an [`Unauthorized`] error.
#[derive(Clone)]
pub struct BearerGuard {
    validator: TokenValidator,
    header_name: String,
}

impl BearerGuard {
    /// Construct a guard that reads tokens from the `Authorization` header.
    pub fn new(validator: TokenValidator) -> Self {
        Self { validator, header_name: DEFAULT_HEADER_NAME.to_string() }
    }

    /// Read tokens from the given header instead.
    pub fn with_header_name<S: Into<String>>(mut self, header_name: S) -> Self {
        self.header_name = header_name.into();
        self
    }

    /// The header tokens are read from.
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Authorize a request given its headers, returning the claims in its token.
    pub fn authorize<H>(&self, headers: &H) -> Result<ClaimSet, Unauthorized>
    where
        H: HeaderSource + ?Sized,
    {
        let value = headers.header(&self.header_name).ok_or(Unauthorized::MissingToken)?;
        let token = bearer_token(value).ok_or(Unauthorized::MalformedHeader)?;
        Ok(self.validator.decode(token)?)
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case(BEARER_SCHEME) && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// A request could not be authorized.
#[derive(Debug, thiserror::Error)]
pub enum Unauthorized {
    #[error("your request was made without an authorization token")]
    MissingToken,

    #[error("the authorization header is not a bearer token")]
    MalformedHeader,

    #[error("authentication token is expired")]
    Expired,

    #[error("the token signature is invalid")]
    InvalidSignature,

    #[error("invalid token: {0}")]
    InvalidToken(TokenError),
}

impl From<TokenError> for Unauthorized {
    fn from(error: TokenError) -> Self {
        match error.kind() {
            ErrorKind::TokenExpired => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::InvalidToken(error),
        }
    }
}
