use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};
use tracing::warn;

/// A JSON object.
pub type JsonObject = serde_json::Map<String, Value>;

/// The lifetime of a token when no explicit expiration is provided, in seconds.
pub const DEFAULT_LIFETIME_SECS: i64 = 3600;

/// The set of claims carried by a token.
///
/// The registered claims are always present. Extra claims are kept in insertion order and are
/// serialized after the registered ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// The principal this token refers to.
    #[serde(rename = "sub")]
    subject: Subject,

    /// The token issuer.
    #[serde(rename = "iss", default)]
    issuer: String,

    /// The intended audience.
    #[serde(rename = "aud", default)]
    audience: String,

    /// The Unix timestamp at which this token was issued.
    #[serde(rename = "iat")]
    issued_at: i64,

    /// The Unix timestamp at which this token becomes invalid.
    #[serde(rename = "exp")]
    expires_at: i64,

    /// The token identifier.
    #[serde(rename = "jti")]
    token_id: String,

    /// Any claims that aren't registered ones.
    #[serde(flatten)]
    extra: JsonObject,
}

impl ClaimSet {
    /// Build a claim set, using the system clock for any timestamp that isn't provided.
    pub fn build(options: ClaimSetOptions) -> Self {
        Self::build_with_clock(options, &SystemClock)
    }

    /// Build a claim set, using the given clock for any timestamp that isn't provided.
    pub fn build_with_clock(options: ClaimSetOptions, clock: &dyn Clock) -> Self {
        let ClaimSetOptions { iat, exp, iss, aud, sub, jti, extra_params } = options;
        let issued_at = iat.unwrap_or_else(|| clock.now().timestamp());
        let expires_at = exp.unwrap_or_else(|| issued_at.saturating_add(DEFAULT_LIFETIME_SECS));
        let mut claims = Self {
            subject: sub.unwrap_or_else(|| Subject::Name(generate_id())),
            issuer: iss.unwrap_or_default(),
            audience: aud.unwrap_or_default(),
            issued_at,
            expires_at,
            token_id: jti.unwrap_or_else(generate_id),
            extra: JsonObject::new(),
        };
        claims.extend_extra(extra_params);
        claims
    }

    /// Get the value of a registered claim by name.
    ///
    /// Extra claims are not looked up here, use [`ClaimSet::extra`] for those.
    pub fn get(&self, name: &str) -> Result<Value, UnknownAttribute> {
        let claim: RegisteredClaim = name.parse()?;
        Ok(self.registered(claim))
    }

    /// Get the value of a registered claim.
    pub fn registered(&self, claim: RegisteredClaim) -> Value {
        match claim {
            RegisteredClaim::Subject => self.subject.to_json(),
            RegisteredClaim::Issuer => Value::from(self.issuer.as_str()),
            RegisteredClaim::Audience => Value::from(self.audience.as_str()),
            RegisteredClaim::IssuedAt => Value::from(self.issued_at),
            RegisteredClaim::ExpiresAt => Value::from(self.expires_at),
            RegisteredClaim::TokenId => Value::from(self.token_id.as_str()),
        }
    }

    /// Get an extra claim by name.
    pub fn extra(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Add an extra claim, replacing any existing one with the same name.
    ///
    /// Names that collide with a registered claim are ignored: the registered claim always wins.
    pub fn add_extra_attribute<N, V>(&mut self, name: N, value: V) -> &mut Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        let name = name.into();
        if RegisteredClaim::from_str(&name).is_ok() {
            warn!(claim = %name, "Ignoring extra claim that collides with a registered claim");
            return self;
        }
        self.extra.insert(name, value.into());
        self
    }

    /// Add every entry in the given object as an extra claim.
    pub fn extend_extra<I>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (name, value) in entries {
            self.add_extra_attribute(name, value);
        }
        self
    }

    /// Set the subject.
    pub fn set_subject<S: Into<Subject>>(&mut self, subject: S) -> &mut Self {
        self.subject = subject.into();
        self
    }

    /// Get all claims as a JSON object.
    ///
    /// Registered claims come first in the order `sub, iss, aud, iat, exp, jti`, followed by the
    /// extra claims in the order they were added.
    pub fn data(&self) -> JsonObject {
        let mut data = JsonObject::new();
        for claim in RegisteredClaim::ALL {
            data.insert(claim.to_string(), self.registered(claim));
        }
        data.extend(self.extra.iter().map(|(name, value)| (name.clone(), value.clone())));
        data
    }

    /// The subject.
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// The issuer.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// The audience.
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// The issued at Unix timestamp.
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// The expiration Unix timestamp.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// The expiration time, if it's representable.
    pub fn expires_at_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }

    /// The token identifier.
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// The extra claims.
    pub fn extra_claims(&self) -> &JsonObject {
        &self.extra
    }

    /// Whether these claims are expired at the given time.
    pub fn is_expired_at(&self, now: &DateTime<Utc>) -> bool {
        now.timestamp() > self.expires_at
    }
}

/// The options used to build a [`ClaimSet`].
///
/// Every registered claim left unset gets its default value. The field names match the claim
/// names so these options can be deserialized straight out of a configuration map.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClaimSetOptions {
    /// The issued at timestamp.
    pub iat: Option<i64>,

    /// The expiration timestamp.
    pub exp: Option<i64>,

    /// The issuer.
    pub iss: Option<String>,

    /// The audience.
    pub aud: Option<String>,

    /// The subject.
    pub sub: Option<Subject>,

    /// The token identifier.
    pub jti: Option<String>,

    /// Extra claims to be added on construction.
    #[serde(default, rename = "extraParams")]
    pub extra_params: JsonObject,
}

impl ClaimSetOptions {
    /// Set the issued at timestamp.
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = Some(timestamp);
        self
    }

    /// Set the expiration timestamp.
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = Some(timestamp);
        self
    }

    /// Set the issuer.
    pub fn issuer<S: Into<String>>(mut self, issuer: S) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Set the audience.
    pub fn audience<S: Into<String>>(mut self, audience: S) -> Self {
        self.aud = Some(audience.into());
        self
    }

    /// Set the subject.
    pub fn subject<S: Into<Subject>>(mut self, subject: S) -> Self {
        self.sub = Some(subject.into());
        self
    }

    /// Set the token identifier.
    pub fn token_id<S: Into<String>>(mut self, token_id: S) -> Self {
        self.jti = Some(token_id.into());
        self
    }

    /// Add an extra claim.
    pub fn extra_param<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        self.extra_params.insert(name.into(), value.into());
        self
    }
}

/// The subject of a token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    /// A numeric identifier.
    Id(i64),

    /// A textual identifier.
    Name(String),
}

impl Subject {
    fn to_json(&self) -> Value {
        match self {
            Self::Id(id) => Value::from(*id),
            Self::Name(name) => Value::from(name.as_str()),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for Subject {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<i32> for Subject {
    fn from(id: i32) -> Self {
        Self::Id(id.into())
    }
}

impl From<u32> for Subject {
    fn from(id: u32) -> Self {
        Self::Id(id.into())
    }
}

impl From<String> for Subject {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&str> for Subject {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// A registered claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegisteredClaim {
    Subject,
    Issuer,
    Audience,
    IssuedAt,
    ExpiresAt,
    TokenId,
}

impl RegisteredClaim {
    /// All registered claims, in the order they're serialized.
    pub const ALL: [RegisteredClaim; 6] =
        [Self::Subject, Self::Issuer, Self::Audience, Self::IssuedAt, Self::ExpiresAt, Self::TokenId];

    /// The claim name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Subject => "sub",
            Self::Issuer => "iss",
            Self::Audience => "aud",
            Self::IssuedAt => "iat",
            Self::ExpiresAt => "exp",
            Self::TokenId => "jti",
        }
    }
}

impl fmt::Display for RegisteredClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RegisteredClaim {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|claim| claim.name() == s).ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}

/// An attribute that doesn't exist was requested.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("attribute '{0}' doesn't exist")]
pub struct UnknownAttribute(pub String);

// 16 random bytes, hex encoded.
pub(crate) fn generate_id() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}
