use crate::signer::{Algorithm, Es256kSigner, HmacSigner, Signer, SigningError};
use rand::RngCore;
use std::{fmt, sync::Arc};
use zeroize::Zeroizing;

/// Opaque key material used to sign and verify tokens.
///
/// For HMAC algorithms this is the shared secret, for `ES256K` it is the 32 byte secret scalar.
/// The bytes are wiped from memory when the key is dropped.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<Vec<u8>>);

impl SecretKey {
    /// Generates a new, random key suitable for the given algorithm.
    pub fn generate(algorithm: Algorithm) -> Self {
        let mut rng = rand::thread_rng();
        let length = match algorithm {
            Algorithm::Es256k => {
                let bytes = k256::SecretKey::random(&mut rng).to_bytes().to_vec();
                return Self(Zeroizing::new(bytes));
            }
            Algorithm::Hs256 => 32,
            Algorithm::Hs384 => 48,
            Algorithm::Hs512 => 64,
        };
        let mut bytes = Zeroizing::new(vec![0; length]);
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this key has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Creates a signer for the given algorithm using this key.
    pub fn signer(&self, algorithm: Algorithm) -> Result<Arc<dyn Signer>, SigningError> {
        let signer: Arc<dyn Signer> = match algorithm {
            Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512 => {
                Arc::new(HmacSigner::new(algorithm, self.clone())?)
            }
            Algorithm::Es256k => Arc::new(Es256kSigner::new(self)?),
        };
        Ok(signer)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes redacted>)", self.len())
    }
}

impl From<Vec<u8>> for SecretKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }
}

impl From<&[u8]> for SecretKey {
    fn from(bytes: &[u8]) -> Self {
        Self::from(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for SecretKey {
    fn from(bytes: [u8; N]) -> Self {
        Self::from(bytes.to_vec())
    }
}

impl From<&str> for SecretKey {
    fn from(secret: &str) -> Self {
        Self::from(secret.as_bytes())
    }
}

impl From<String> for SecretKey {
    fn from(secret: String) -> Self {
        Self::from(secret.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::hs256(Algorithm::Hs256, 32)]
    #[case::hs384(Algorithm::Hs384, 48)]
    #[case::hs512(Algorithm::Hs512, 64)]
    #[case::es256k(Algorithm::Es256k, 32)]
    fn generated_keys_are_usable(#[case] algorithm: Algorithm, #[case] length: usize) {
        let key = SecretKey::generate(algorithm);
        assert_eq!(key.len(), length);

        let signer = key.signer(algorithm).expect("creating signer failed");
        assert_eq!(signer.algorithm(), algorithm.identifier());
        let signature = signer.sign(b"hello").expect("signing failed");
        assert!(signer.verify(b"hello", &signature));
    }

    #[test]
    fn generated_keys_differ() {
        for algorithm in [Algorithm::Hs384, Algorithm::Hs512] {
            let first = SecretKey::generate(algorithm);
            let second = SecretKey::generate(algorithm);
            assert_ne!(first.as_bytes(), second.as_bytes());
            assert!(first.as_bytes().iter().any(|byte| *byte != 0));
        }
    }

    #[test]
    fn debug_is_redacted() {
        let key = SecretKey::from("e469d667b15f48808e7595529cf152a0cfb641bd");
        let output = format!("{key:?}");
        assert!(!output.contains("e469d667"));
        assert_eq!(output, "SecretKey(<40 bytes redacted>)");
    }

    #[test]
    fn empty_key_has_no_signer() {
        let key = SecretKey::from(Vec::new());
        assert!(key.is_empty());
        assert!(key.signer(Algorithm::Hs256).is_err());
        assert!(key.signer(Algorithm::Es256k).is_err());
    }
}
