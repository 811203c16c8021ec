use crate::claims::Subject;
use serde_json::Value;

/// A record describing an external identity, such as a row loaded from a data store.
///
/// Tokens can be issued on behalf of a record: its primary key becomes the token subject and any
/// of its attributes can be copied into the extra claims.
pub trait IdentityRecord {
    /// The primary key of this record.
    fn primary_key(&self) -> Subject;

    /// Whether this record exposes an attribute with the given name.
    fn has_attribute(&self, name: &str) -> bool;

    /// Get the value of an attribute.
    fn attribute(&self, name: &str) -> Option<Value>;
}
