//! Immutable records.
//!
//! A [`Record`] pairs sealed, validated field data with a fixed set of side
//! attributes. Side attributes describe context (who supplied a value, what
//! it cost) and never take part in equality, hashing or serialization.
//!
//! # Defining a record kind
//!
//! ```
//! use tabula::{fields, record_kind, Policy, Record, SideAttributes, Value};
//!
//! #[derive(Debug, Clone)]
//! struct Stock {
//!     supplier: String,
//! }
//!
//! impl SideAttributes for Stock {
//!     const NAMES: &'static [&'static str] = &["supplier"];
//!
//!     fn attribute(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "supplier" => Some(Value::from(self.supplier.as_str())),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! record_kind!(Book, Stock, Policy::new()
//!     .with_fields(["author", "title", "type"])
//!     .with_non_null_fields(["title"]));
//!
//! let acme = Record::<Book>::create(
//!     Stock { supplier: "Acme Inc".into() },
//!     fields! { "author" => "Banana Yoshimoto", "title" => "Moshi Moshi", "type" => "hardback" },
//! )?;
//! let bobs = Record::<Book>::create(
//!     Stock { supplier: "Bob's Books".into() },
//!     fields! { "title" => "Moshi Moshi", "type" => "hardback", "author" => "Banana Yoshimoto" },
//! )?;
//!
//! // Same book, different suppliers.
//! assert_eq!(acme, bobs);
//! assert_eq!(acme.attributes().supplier, "Acme Inc");
//! # Ok::<(), tabula::RecordError>(())
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::ops::Index;

use tracing::{debug, trace};

use crate::error::{AccessPath, Mutation, RecordError, Result};
use crate::fields::{FieldMap, Iter, Keys, Values};
use crate::hash_key::generate_hash_index_key;
use crate::policy::Policy;
use crate::validate::validate;
use crate::value::{Value, write_entries};

// ============================================================================
// Record Data
// ============================================================================

/// Validated, read-only field data.
///
/// Only the validator builds one, so every `RecordData` satisfies the policy
/// it was checked against. There is no way to change it afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordData {
    fields: FieldMap,
    /// Order comes from declared fields rather than from input.
    ordered: bool,
}

impl RecordData {
    pub(crate) fn sealed(fields: FieldMap, ordered: bool) -> Self {
        Self { fields, ordered }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the value for `key`, or `default` when the key is absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.fields.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> Keys<'_> {
        self.fields.keys()
    }

    pub fn values(&self) -> Values<'_> {
        self.fields.values()
    }

    pub fn iter(&self) -> Iter<'_> {
        self.fields.iter()
    }

    /// Whether iteration order is the declared field order.
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Borrows the data as a plain field map.
    pub fn as_field_map(&self) -> &FieldMap {
        &self.fields
    }

    /// Returns an unsealed copy of the data.
    pub fn to_field_map(&self) -> FieldMap {
        self.fields.clone()
    }
}

impl PartialEq for RecordData {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for RecordData {}

/// Hashes exactly like the equivalent [`FieldMap`].
impl Hash for RecordData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fields.hash(state);
    }
}

impl PartialEq<FieldMap> for RecordData {
    fn eq(&self, other: &FieldMap) -> bool {
        &self.fields == other
    }
}

impl PartialEq<RecordData> for FieldMap {
    fn eq(&self, other: &RecordData) -> bool {
        self == &other.fields
    }
}

impl PartialEq<BTreeMap<String, Value>> for RecordData {
    fn eq(&self, other: &BTreeMap<String, Value>) -> bool {
        self.fields == *other
    }
}

impl<S: std::hash::BuildHasher> PartialEq<HashMap<String, Value, S>> for RecordData {
    fn eq(&self, other: &HashMap<String, Value, S>) -> bool {
        self.fields == *other
    }
}

impl Index<&str> for RecordData {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self.fields.get(key) {
            Some(value) => value,
            None => panic!("no field named '{key}'"),
        }
    }
}

impl<'a> IntoIterator for &'a RecordData {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_entries(f, self.iter())
    }
}

// ============================================================================
// Kinds and Side Attributes
// ============================================================================

/// Contextual attributes carried next to record data.
///
/// Implementors are plain structs with typed fields. `attribute` exposes them
/// by name so hash-index keys can include them.
pub trait SideAttributes {
    /// Names of every attribute this type carries.
    const NAMES: &'static [&'static str];

    /// Returns the attribute called `name`.
    ///
    /// `None` means the attribute does not exist or does not apply to this
    /// instance.
    fn attribute(&self, name: &str) -> Option<Value>;
}

/// No side attributes.
impl SideAttributes for () {
    const NAMES: &'static [&'static str] = &[];

    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// A concrete record type: a name, a policy and a side-attribute type.
///
/// Static kinds are usually zero-sized and declared with
/// [`record_kind!`](crate::record_kind); kinds defined at runtime use
/// [`Schema`](crate::Schema).
pub trait RecordKind {
    type Attributes: SideAttributes;

    /// The type name used in hash-index keys and error messages.
    fn name(&self) -> &str;

    /// The policy every record of this kind is validated against.
    fn policy(&self) -> &Policy;
}

/// Declares a zero-sized [`RecordKind`] with a lazily built static policy.
///
/// ```
/// use tabula::{fields, record_kind, Policy, Record};
///
/// record_kind!(
///     /// A point on a plane.
///     pub Point, (), Policy::new().with_fields(["x", "y"]).require_all_fields()
/// );
///
/// let point = Record::<Point>::create((), fields! { "y" => 2, "x" => 1 })?;
/// assert_eq!(point.keys().collect::<Vec<_>>(), ["x", "y"]);
/// # Ok::<(), tabula::RecordError>(())
/// ```
#[macro_export]
macro_rules! record_kind {
    ($(#[$meta:meta])* $vis:vis $kind:ident, $attributes:ty, $policy:expr $(,)?) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis struct $kind;

        impl $crate::RecordKind for $kind {
            type Attributes = $attributes;

            fn name(&self) -> &str {
                stringify!($kind)
            }

            fn policy(&self) -> &$crate::Policy {
                static POLICY: ::std::sync::LazyLock<$crate::Policy> =
                    ::std::sync::LazyLock::new(|| $policy);
                &POLICY
            }
        }
    };
}

// ============================================================================
// Record
// ============================================================================

/// An immutable, validated record of kind `K`.
///
/// Behaves like a read-only ordered map over its data. Equality and hashing
/// consider the data only, so records compare equal to any map (or record of
/// any kind) holding the same entries.
///
/// Records have no `&mut` access to their data or attributes. The explicit
/// mutation methods ([`set_item`](Self::set_item) and friends) exist to report
/// the refusal and always fail.
pub struct Record<K: RecordKind> {
    kind: K,
    attributes: K::Attributes,
    data: RecordData,
}

impl<K: RecordKind> Record<K> {
    /// Validates `raw` against the kind's policy and seals the result.
    pub fn new(kind: K, attributes: K::Attributes, raw: FieldMap) -> Result<Self> {
        let data = validate(raw, kind.policy()).inspect_err(|err| {
            debug!(record = %kind.name(), error = %err, "Record rejected");
        })?;

        trace!(record = %kind.name(), fields = data.len(), "Record sealed");

        Ok(Self {
            kind,
            attributes,
            data,
        })
    }

    /// Constructs a record of a kind that carries no state of its own.
    pub fn create(attributes: K::Attributes, raw: FieldMap) -> Result<Self>
    where
        K: Default,
    {
        Self::new(K::default(), attributes, raw)
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn policy(&self) -> &Policy {
        self.kind.policy()
    }

    pub fn attributes(&self) -> &K::Attributes {
        &self.attributes
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    // ------------------------------------------------------------------------
    // Read-only map operations
    // ------------------------------------------------------------------------

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns the value for `key`, or `default` when the key is absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.data.get_or(key, default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of fields. Side attributes are not counted.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> Keys<'_> {
        self.data.keys()
    }

    pub fn values(&self) -> Values<'_> {
        self.data.values()
    }

    pub fn items(&self) -> Iter<'_> {
        self.data.iter()
    }

    // ------------------------------------------------------------------------
    // Refused mutations
    // ------------------------------------------------------------------------

    /// Always fails: side attributes are fixed at construction.
    pub fn set_attribute(&self, _name: &str, _value: impl Into<Value>) -> Result<()> {
        Err(self.refuse(AccessPath::Attribute, Mutation::Assignment))
    }

    /// Always fails: side attributes are fixed at construction.
    pub fn delete_attribute(&self, _name: &str) -> Result<()> {
        Err(self.refuse(AccessPath::Attribute, Mutation::Deletion))
    }

    /// Always fails: record data is sealed. Use [`copy_with`](Self::copy_with).
    pub fn set_item(&self, _key: &str, _value: impl Into<Value>) -> Result<()> {
        Err(self.refuse(AccessPath::Item, Mutation::Assignment))
    }

    /// Always fails: record data is sealed.
    pub fn delete_item(&self, _key: &str) -> Result<()> {
        Err(self.refuse(AccessPath::Item, Mutation::Deletion))
    }

    fn refuse(&self, path: AccessPath, mutation: Mutation) -> RecordError {
        debug!(record = %self.name(), %path, %mutation, "Mutation refused");
        RecordError::Immutable {
            record: self.name().to_string(),
            path,
            mutation,
        }
    }

    // ------------------------------------------------------------------------
    // Copies
    // ------------------------------------------------------------------------

    /// Returns a re-validated copy of the data alone.
    pub fn copy_record(&self) -> Result<RecordData> {
        validate(self.data.to_field_map(), self.policy())
    }

    /// Returns a new record with `overrides` applied to a copy of the data.
    ///
    /// The merged data goes through full validation, so a copy fails exactly
    /// where constructing the same data from scratch would. `self` is never
    /// touched.
    pub fn copy_with(&self, overrides: FieldMap) -> Result<Self>
    where
        K: Clone,
        K::Attributes: Clone,
    {
        let merged = self.data.as_field_map().merge(&overrides);
        Self::new(self.kind.clone(), self.attributes.clone(), merged)
    }

    // ------------------------------------------------------------------------
    // Derived artifacts
    // ------------------------------------------------------------------------

    /// Derives the hash-index key for this record.
    ///
    /// Uses the policy's key fields (hash-index fields, else declared fields).
    /// Side attributes named among them are looked up alongside the data and
    /// take precedence over data fields of the same name.
    pub fn hash_index_key(&self) -> Result<Option<String>> {
        self.hash_index_key_with_id(None)
    }

    /// Like [`hash_index_key`](Self::hash_index_key), with an object id
    /// placed after the type name.
    pub fn hash_index_key_with_id(&self, object_id: Option<u64>) -> Result<Option<String>> {
        let key_fields = self.policy().key_fields();

        let mut lookup = self.data.to_field_map();
        let attribute_names = <K::Attributes as SideAttributes>::NAMES;
        for name in key_fields {
            if !attribute_names.iter().any(|known| *known == name.as_str()) {
                continue;
            }
            if let Some(value) = self.attributes.attribute(name) {
                lookup.insert(name.as_str(), value);
            }
        }

        let key = generate_hash_index_key(self.name(), key_fields, &lookup, object_id)?;
        trace!(record = %self.name(), key = ?key, "Derived hash-index key");
        Ok(key)
    }

    /// Returns the data as normalized JSON. Side attributes are excluded.
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.data)?)
    }

    /// Returns the data as compact JSON text. Side attributes are excluded.
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.data)?)
    }
}

impl<K: RecordKind + Clone> Clone for Record<K>
where
    K::Attributes: Clone,
{
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            attributes: self.attributes.clone(),
            data: self.data.clone(),
        }
    }
}

impl<K: RecordKind, J: RecordKind> PartialEq<Record<J>> for Record<K> {
    fn eq(&self, other: &Record<J>) -> bool {
        self.data == other.data
    }
}

impl<K: RecordKind> Eq for Record<K> {}

/// Hashes exactly like the equivalent [`FieldMap`].
impl<K: RecordKind> Hash for Record<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

impl<K: RecordKind> PartialEq<RecordData> for Record<K> {
    fn eq(&self, other: &RecordData) -> bool {
        &self.data == other
    }
}

impl<K: RecordKind> PartialEq<FieldMap> for Record<K> {
    fn eq(&self, other: &FieldMap) -> bool {
        self.data == *other
    }
}

impl<K: RecordKind> PartialEq<BTreeMap<String, Value>> for Record<K> {
    fn eq(&self, other: &BTreeMap<String, Value>) -> bool {
        self.data == *other
    }
}

impl<K: RecordKind, S: std::hash::BuildHasher> PartialEq<HashMap<String, Value, S>>
    for Record<K>
{
    fn eq(&self, other: &HashMap<String, Value, S>) -> bool {
        self.data == *other
    }
}

impl<K: RecordKind> Index<&str> for Record<K> {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.data[key]
    }
}

/// Iterating a record yields its field names in canonical order.
impl<'a, K: RecordKind> IntoIterator for &'a Record<K> {
    type Item = &'a str;
    type IntoIter = Keys<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys()
    }
}

impl<K: RecordKind> fmt::Debug for Record<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("kind", &self.name())
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl<K: RecordKind> Display for Record<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.name(), self.data)
    }
}
