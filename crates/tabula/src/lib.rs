//! tabula: Immutable validated records
//!
//! A record is a read-only, ordered mapping of field names to [`Value`]s,
//! validated against its kind's [`Policy`] at construction and sealed from
//! then on. Records carry side attributes next to their data: contextual
//! values that are kept out of equality, hashing and serialization.
//!
//! # Components
//!
//! - [`Policy`]: allowed fields, non-null fields, strictness and key fields
//! - [`validate`]: turns raw input into sealed [`RecordData`]
//! - [`Record`]: the immutable container, generic over its [`RecordKind`]
//! - [`generate_hash_index_key`]: deterministic `Type:field:value` keys
//! - JSON encoding via [`serde::Serialize`], with dates and times normalized
//!
//! # Example
//!
//! ```
//! use tabula::{fields, record_kind, Policy, Record, RecordError};
//!
//! record_kind!(Book, (), Policy::new()
//!     .with_fields(["author", "title", "type"])
//!     .with_non_null_fields(["title"])
//!     .with_hash_index_fields(["title", "author"]));
//!
//! let book = Record::<Book>::create((), fields! {
//!     "title" => "Moshi Moshi",
//!     "author" => "Banana Yoshimoto",
//! })?;
//!
//! assert_eq!(book.keys().collect::<Vec<_>>(), ["author", "title", "type"]);
//! assert_eq!(
//!     book.hash_index_key()?.as_deref(),
//!     Some("Book:title:Moshi Moshi:author:Banana Yoshimoto"),
//! );
//! assert_eq!(
//!     book.serialize()?,
//!     r#"{"author":"Banana Yoshimoto","title":"Moshi Moshi","type":null}"#,
//! );
//!
//! // Sealed.
//! assert!(matches!(book.set_item("type", "paperback"), Err(RecordError::Immutable { .. })));
//! # Ok::<(), RecordError>(())
//! ```

mod error;
mod fields;
mod hash_key;
mod json;
mod policy;
mod record;
mod schema;
mod validate;
mod value;

pub use error::{AccessPath, Mutation, RecordError, Result};
pub use fields::{FieldMap, Iter, Keys, Values};
pub use hash_key::generate_hash_index_key;
pub use policy::Policy;
pub use record::{Record, RecordData, RecordKind, SideAttributes};
pub use schema::Schema;
pub use validate::validate;
pub use value::{Value, ValueShape};
