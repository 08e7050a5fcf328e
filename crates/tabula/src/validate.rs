//! Record validation.
//!
//! Turns raw field input into sealed [`RecordData`] under a [`Policy`].
//!
//! Checks run in a fixed order and the first failing check wins:
//! 1. non-null fields missing from the input
//! 2. non-null fields supplied as null
//! 3. keys outside the declared fields
//! 4. declared fields omitted when all fields are required
//!
//! Within a check, every offending name is collected before failing, and the
//! names are reported in lexicographic order.

use crate::error::{RecordError, Result};
use crate::fields::FieldMap;
use crate::policy::Policy;
use crate::record::RecordData;
use crate::value::Value;

/// Validates `raw` against `policy`.
///
/// With declared fields the result follows their order and absent fields
/// are filled with [`Value::Null`]. Without them the input is sealed as is,
/// in insertion order.
pub fn validate(raw: FieldMap, policy: &Policy) -> Result<RecordData> {
    check_non_null(&raw, policy)?;

    let Some(fields) = policy.fields() else {
        return Ok(RecordData::sealed(raw, false));
    };

    let extra = sorted(raw.keys().filter(|key| !fields.iter().any(|f| f.as_str() == *key)));
    if !extra.is_empty() {
        return Err(RecordError::UnexpectedFields {
            extra,
            allowed: sorted(fields.iter().map(String::as_str)),
        });
    }

    if policy.requires_all_fields() {
        let missing = sorted(
            fields
                .iter()
                .map(String::as_str)
                .filter(|field| !raw.contains_key(field)),
        );
        if !missing.is_empty() {
            return Err(RecordError::MissingFields {
                missing,
                required: sorted(fields.iter().map(String::as_str)),
            });
        }
    }

    let mut data = FieldMap::with_capacity(fields.len());
    for field in fields {
        let value = raw.get(field).cloned().unwrap_or(Value::Null);
        data.insert(field.as_str(), value);
    }

    Ok(RecordData::sealed(data, true))
}

fn check_non_null(raw: &FieldMap, policy: &Policy) -> Result<()> {
    let required = policy.non_null_fields();
    if required.is_empty() {
        return Ok(());
    }

    // BTreeSet iteration is already sorted.
    let missing: Vec<String> = required
        .iter()
        .filter(|field| !raw.contains_key(field))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(RecordError::MissingRequiredFields { fields: missing });
    }

    let null: Vec<String> = required
        .iter()
        .filter(|field| raw.get(field).is_some_and(Value::is_null))
        .cloned()
        .collect();
    if !null.is_empty() {
        return Err(RecordError::NullRequiredFields { fields: null });
    }

    Ok(())
}

fn sorted<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = names.map(ToString::to_string).collect();
    names.sort_unstable();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    fn abc() -> Policy {
        Policy::new()
            .with_fields(["a", "b", "c"])
            .with_non_null_fields(["a", "b"])
    }

    #[test]
    fn absent_optional_fields_default_to_null() {
        let data = validate(fields! { "b" => 3, "a" => 2 }, &abc()).unwrap();
        assert_eq!(data.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(data.get("c"), Some(&Value::Null));
        assert!(data.is_ordered());
    }

    #[test]
    fn missing_beats_null_reporting() {
        let err = validate(fields! { "a" => Value::Null }, &abc()).unwrap_err();
        assert!(matches!(err, RecordError::MissingRequiredFields { ref fields } if fields == &["b"]));
    }

    #[test]
    fn extra_keys_beat_missing_keys() {
        let policy = abc().require_all_fields();
        let err = validate(fields! { "a" => 1, "b" => 2, "z" => 3 }, &policy).unwrap_err();
        assert!(matches!(err, RecordError::UnexpectedFields { .. }));
    }

    #[test]
    fn unordered_policy_keeps_input() {
        let policy = Policy::new().with_non_null_fields(["a"]);
        let data = validate(fields! { "z" => 1, "a" => 2 }, &policy).unwrap();
        assert_eq!(data.keys().collect::<Vec<_>>(), ["z", "a"]);
        assert!(!data.is_ordered());
    }

    #[test]
    fn empty_field_list_accepts_any_key() {
        let policy = Policy::new().with_fields(Vec::<String>::new());
        let data = validate(fields! { "a" => 1 }, &policy).unwrap();
        assert_eq!(data.get("a"), Some(&Value::from(1)));
        assert!(!data.is_ordered());
    }
}
