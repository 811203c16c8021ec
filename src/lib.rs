pub mod claims;
pub mod clock;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod identity;
pub mod key;
pub mod signer;
pub mod validator;

pub use claims::{ClaimSet, ClaimSetOptions, JsonObject, RegisteredClaim, Subject, UnknownAttribute};
pub use codec::{CodecOptions, TokenCodec};
pub use error::{ErrorKind, TokenError};
pub use signer::Algorithm;
pub use validator::TokenValidator;
