use crate::{claims::ClaimSet, error::TokenError};
use chrono::{DateTime, Utc};

pub(super) fn validate_expiration(claims: &ClaimSet, now: &DateTime<Utc>) -> Result<(), TokenError> {
    if claims.is_expired_at(now) {
        Err(TokenError::TokenExpired)
    } else {
        Ok(())
    }
}
