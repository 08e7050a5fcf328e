//! Record policies.
//!
//! A [`Policy`] is the static configuration of a record kind: which fields it
//! may hold and in what order, which must be non-null, whether every declared
//! field must be supplied, and which fields feed its hash-index key.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Field-set policy shared by every record of one kind.
///
/// Built once (typically inside a `LazyLock`) and never changed afterwards.
///
/// ```
/// use tabula::Policy;
///
/// let policy = Policy::new()
///     .with_fields(["author", "title", "type"])
///     .with_non_null_fields(["title"])
///     .with_hash_index_fields(["title", "author"]);
///
/// assert_eq!(policy.key_fields(), ["title", "author"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Allowed field names in canonical order.
    ///
    /// When unset, any key is accepted and insertion order is kept.
    fields: Option<Vec<String>>,

    /// Fields that must be present and non-null, whether or not `fields` is set.
    #[serde(default)]
    non_null_fields: BTreeSet<String>,

    /// Every declared field must be supplied explicitly.
    ///
    /// Only meaningful when `fields` is set.
    #[serde(default)]
    require_all_fields: bool,

    /// Fields (or side attributes) used to derive hash-index keys.
    ///
    /// Falls back to `fields` when unset.
    hash_index_fields: Option<Vec<String>>,
}

impl Policy {
    /// Creates a permissive policy: any fields, none required.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the allowed fields and their canonical order.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Declares fields that must be present and non-null.
    pub fn with_non_null_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_null_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Requires every declared field to be supplied on construction.
    pub fn require_all_fields(mut self) -> Self {
        self.require_all_fields = true;
        self
    }

    /// Declares the fields used for hash-index keys.
    pub fn with_hash_index_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hash_index_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the declared fields. An empty list counts as undeclared.
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref().filter(|fields| !fields.is_empty())
    }

    pub fn non_null_fields(&self) -> &BTreeSet<String> {
        &self.non_null_fields
    }

    pub fn requires_all_fields(&self) -> bool {
        self.require_all_fields
    }

    pub fn hash_index_fields(&self) -> Option<&[String]> {
        self.hash_index_fields.as_deref().filter(|fields| !fields.is_empty())
    }

    /// Returns the fields used for key derivation.
    ///
    /// Hash-index fields when declared, else the declared fields, else none.
    pub fn key_fields(&self) -> &[String] {
        self.hash_index_fields()
            .or(self.fields())
            .unwrap_or(&[])
    }

    /// Returns whether `name` may appear in a record of this policy.
    pub fn allows_field(&self, name: &str) -> bool {
        self.fields()
            .is_none_or(|fields| fields.iter().any(|f| f == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_fields_fall_back_to_fields() {
        let policy = Policy::new().with_fields(["a", "b", "c"]);
        assert_eq!(policy.key_fields(), ["a", "b", "c"]);

        let policy = policy.with_hash_index_fields(["b"]);
        assert_eq!(policy.key_fields(), ["b"]);

        assert!(Policy::new().key_fields().is_empty());
    }

    #[test]
    fn empty_lists_count_as_undeclared() {
        let policy = Policy::new()
            .with_fields(["a", "b"])
            .with_hash_index_fields(Vec::<String>::new());
        assert_eq!(policy.hash_index_fields(), None);
        assert_eq!(policy.key_fields(), ["a", "b"]);

        let open = Policy::new().with_fields(Vec::<String>::new());
        assert_eq!(open.fields(), None);
        assert!(open.allows_field("anything"));
        assert!(open.key_fields().is_empty());
    }

    #[test]
    fn allows_any_field_without_whitelist() {
        let open = Policy::new().with_non_null_fields(["a"]);
        assert!(open.allows_field("anything"));

        let closed = Policy::new().with_fields(["a"]);
        assert!(closed.allows_field("a"));
        assert!(!closed.allows_field("b"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let policy: Policy = serde_json::from_str(r#"{"fields": ["a", "b"]}"#).unwrap();
        assert_eq!(policy, Policy::new().with_fields(["a", "b"]));
        assert!(!policy.requires_all_fields());
        assert!(policy.non_null_fields().is_empty());
    }
}
