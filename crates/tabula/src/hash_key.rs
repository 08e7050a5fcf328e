//! Hash-index key derivation.
//!
//! A key identifies a record by the values of a small set of fields:
//!
//! ```text
//! Book:title:Moshi Moshi:author:Banana Yoshimoto
//! Book:7:title:Moshi Moshi
//! ```
//!
//! Vacant values (see [`Value::is_vacant`]) are skipped. When every field is
//! skipped there is no key.

use tracing::trace;

use crate::error::{RecordError, Result};
use crate::fields::FieldMap;
use crate::value::Value;

/// Separator between key segments.
const SEPARATOR: char = ':';

/// Derives a hash-index key from `values`.
///
/// Fields are visited in the given order. A field whose value is missing or
/// vacant is left out; any other field must hold an orderable value (see
/// [`ValueShape::is_orderable`](crate::ValueShape::is_orderable)) or the whole
/// derivation fails.
///
/// Returns `Ok(None)` when `fields` or `values` is empty, or when no field
/// contributed a segment.
///
/// # Errors
///
/// Returns [`RecordError::UnorderedValueType`] naming the first field whose
/// value is a real, temporal, mapping or record.
///
/// ```
/// use tabula::{fields, generate_hash_index_key};
///
/// let fields = ["title".to_string(), "author".to_string()];
/// let values = fields! { "title" => "Moshi Moshi", "author" => "" };
///
/// let key = generate_hash_index_key("Book", &fields, &values, Some(7))?;
/// assert_eq!(key.as_deref(), Some("Book:7:title:Moshi Moshi"));
/// # Ok::<(), tabula::RecordError>(())
/// ```
pub fn generate_hash_index_key(
    object_type: &str,
    fields: &[String],
    values: &FieldMap,
    object_id: Option<u64>,
) -> Result<Option<String>> {
    if fields.is_empty() || values.is_empty() {
        return Ok(None);
    }

    let mut segments = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(value) = values.get(field).filter(|value| !value.is_vacant()) else {
            trace!(field = %field, "Skipping vacant key field");
            continue;
        };

        if !value.shape().is_orderable() {
            return Err(RecordError::UnorderedValueType {
                field: field.clone(),
            });
        }

        segments.push(segment(field, value));
    }

    if segments.is_empty() {
        return Ok(None);
    }

    let mut key = String::from(object_type);
    if let Some(id) = object_id {
        key.push(SEPARATOR);
        key.push_str(&id.to_string());
    }
    for segment in segments {
        key.push(SEPARATOR);
        key.push_str(&segment);
    }

    Ok(Some(key))
}

fn segment(field: &str, value: &Value) -> String {
    format!("{field}{SEPARATOR}{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use test_case::test_case;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn fields_appear_in_given_order() {
        let values = fields! { "a" => "x", "b" => 2, "c" => vec!["p", "q"] };
        let key = generate_hash_index_key("T", &names(&["c", "a", "b"]), &values, None).unwrap();
        assert_eq!(key.as_deref(), Some("T:c:[p, q]:a:x:b:2"));
    }

    #[test]
    fn object_id_follows_type_name() {
        let values = fields! { "a" => "x" };
        let key = generate_hash_index_key("T", &names(&["a"]), &values, Some(42)).unwrap();
        assert_eq!(key.as_deref(), Some("T:42:a:x"));
    }

    #[test_case(&[], fields! { "a" => "x" }; "no fields")]
    #[test_case(&["a"], FieldMap::new(); "no values")]
    #[test_case(&["a", "b"], fields! { "a" => "", "b" => Value::Null }; "all vacant")]
    #[test_case(&["z"], fields! { "a" => "x" }; "absent field")]
    fn no_key(fields: &[&str], values: FieldMap) {
        assert_eq!(generate_hash_index_key("T", &names(fields), &values, Some(1)).unwrap(), None);
    }

    #[test_case(Value::from(1.5); "real")]
    #[test_case(Value::Map(fields! { "k" => "v" }); "map")]
    #[test_case(Value::from(chrono::NaiveDate::from_ymd_opt(2001, 1, 1).unwrap()); "date")]
    fn unordered_values_fail(value: Value) {
        let values = fields! { "a" => "x", "b" => value };
        let err = generate_hash_index_key("T", &names(&["a", "b"]), &values, None).unwrap_err();
        assert!(matches!(err, RecordError::UnorderedValueType { ref field } if field == "b"));
    }

    #[test]
    fn vacant_unordered_values_are_skipped() {
        let values = fields! { "a" => "x", "b" => 0.0, "c" => FieldMap::new() };
        let key = generate_hash_index_key("T", &names(&["a", "b", "c"]), &values, None).unwrap();
        assert_eq!(key.as_deref(), Some("T:a:x"));
    }
}
