use crate::key::SecretKey;
use hmac::{digest::KeyInit, Hmac, Mac};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use sha2::{Sha256, Sha384, Sha512};
use signature::{Signer as _, Verifier as _};
use std::{fmt, str::FromStr};
use subtle::ConstantTimeEq;

/// A signing algorithm supported out of the box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Algorithm {
    /// HMAC using SHA-256.
    #[default]
    Hs256,

    /// HMAC using SHA-384.
    Hs384,

    /// HMAC using SHA-512.
    Hs512,

    /// ECDSA over secp256k1 using SHA-256.
    Es256k,
}

impl Algorithm {
    /// The identifier for this algorithm, as used in the `alg` header.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
            Self::Es256k => "ES256K",
        }
    }

    /// Whether this is an HMAC based algorithm.
    pub fn is_hmac(&self) -> bool {
        matches!(self, Self::Hs256 | Self::Hs384 | Self::Hs512)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for Algorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            "ES256K" => Ok(Self::Es256k),
            _ => Err(UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// An algorithm identifier that isn't supported.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("unsupported algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub String);

/// A token signer.
///
/// Implementations provide both sides of an algorithm: producing a signature over the signing
/// input of a token and checking one.
pub trait Signer: Send + Sync {
    /// The algorithm identifier placed in the token header.
    fn algorithm(&self) -> &str;

    /// Sign the given message.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError>;

    /// Check that `signature` is a valid signature for `message`.
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool;
}

/// An error that can occur when signing a token.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("invalid key: {0}")]
    InvalidKey(&'static str),

    #[error(transparent)]
    UnsupportedAlgorithm(#[from] UnsupportedAlgorithm),

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// A signer for the HMAC family of algorithms.
pub struct HmacSigner {
    algorithm: Algorithm,
    key: SecretKey,
}

impl HmacSigner {
    /// Create a new HMAC signer.
    pub fn new(algorithm: Algorithm, key: SecretKey) -> Result<Self, SigningError> {
        if !algorithm.is_hmac() {
            return Err(UnsupportedAlgorithm(algorithm.to_string()).into());
        }
        if key.is_empty() {
            return Err(SigningError::InvalidKey("HMAC secret is empty"));
        }
        Ok(Self { algorithm, key })
    }

    fn mac(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        let key = self.key.as_bytes();
        match self.algorithm {
            Algorithm::Hs256 => compute_mac::<Hmac<Sha256>>(key, message),
            Algorithm::Hs384 => compute_mac::<Hmac<Sha384>>(key, message),
            Algorithm::Hs512 => compute_mac::<Hmac<Sha512>>(key, message),
            Algorithm::Es256k => Err(UnsupportedAlgorithm(self.algorithm.to_string()).into()),
        }
    }
}

impl Signer for HmacSigner {
    fn algorithm(&self) -> &str {
        self.algorithm.identifier()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        self.mac(message)
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self.mac(message) {
            Ok(expected) => expected.as_slice().ct_eq(signature).into(),
            Err(_) => false,
        }
    }
}

fn compute_mac<M>(key: &[u8], message: &[u8]) -> Result<Vec<u8>, SigningError>
where
    M: Mac + KeyInit,
{
    let mut mac = <M as Mac>::new_from_slice(key).map_err(|_| SigningError::InvalidKey("invalid HMAC key length"))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// A signer that uses a local secp256k1 key.
///
/// A signer built out of a public key alone can only verify signatures, which lets a party
/// that doesn't hold the secret key check tokens.
pub struct Es256kSigner {
    signing_key: Option<SigningKey>,
    verifying_key: VerifyingKey,
}

impl Es256kSigner {
    /// Create a new ES256K signer out of a 32 byte secret scalar.
    pub fn new(key: &SecretKey) -> Result<Self, SigningError> {
        let signing_key =
            SigningKey::from_slice(key.as_bytes()).map_err(|_| SigningError::InvalidKey("invalid secp256k1 key"))?;
        let verifying_key = *signing_key.verifying_key();
        Ok(Self { signing_key: Some(signing_key), verifying_key })
    }

    /// Create a verification only signer out of a SEC1 encoded public key.
    pub fn from_public_key(public_key: &[u8]) -> Result<Self, SigningError> {
        let verifying_key = VerifyingKey::from_sec1_bytes(public_key)
            .map_err(|_| SigningError::InvalidKey("invalid secp256k1 public key"))?;
        Ok(Self { signing_key: None, verifying_key })
    }

    /// The SEC1 encoded compressed public key for this signer.
    pub fn public_key(&self) -> Vec<u8> {
        self.verifying_key.to_sec1_bytes().to_vec()
    }

    /// Whether this signer holds a secret key and can therefore sign.
    pub fn can_sign(&self) -> bool {
        self.signing_key.is_some()
    }
}

impl Signer for Es256kSigner {
    fn algorithm(&self) -> &str {
        Algorithm::Es256k.identifier()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        let key = self.signing_key.as_ref().ok_or(SigningError::InvalidKey("no secp256k1 secret key"))?;
        let signature: Signature = key.try_sign(message).map_err(|e| SigningError::SigningFailed(e.to_string()))?;
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::try_from(signature) else {
            return false;
        };
        self.verifying_key.verify(message, &signature).is_ok()
    }
}
