//! JSON encoding with temporal normalization.
//!
//! Records serialize their data only. On the way out:
//! - dates become `YYYY-MM-DD`
//! - naive datetimes become `YYYY-MM-DDTHH:MM:SS` (sub-second part dropped)
//! - offset datetimes become `YYYY-MM-DDTHH:MM:SS+HH:MM` (sub-second part dropped)
//! - non-finite reals become `null`
//! - nested records and maps become objects, lists become arrays
//!
//! Normalization applies at every depth. Map and record key order is kept.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::fields::FieldMap;
use crate::record::RecordData;
use crate::value::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

fn date_text(date: &NaiveDate) -> impl fmt::Display {
    date.format(DATE_FORMAT)
}

fn datetime_text(datetime: &NaiveDateTime) -> impl fmt::Display {
    datetime.format(DATETIME_FORMAT)
}

fn timestamp_text(timestamp: &DateTime<FixedOffset>) -> impl fmt::Display {
    timestamp.format(TIMESTAMP_FORMAT)
}

impl Value {
    /// Converts to a normalized JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(v) => serde_json::Value::Number((*v).into()),
            Value::Real(v) => {
                serde_json::Number::from_f64(*v)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number) // NaN/Inf become null
            }
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(date_text(d).to_string()),
            Value::DateTime(dt) => serde_json::Value::String(datetime_text(dt).to_string()),
            Value::Timestamp(ts) => serde_json::Value::String(timestamp_text(ts).to_string()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => map.to_json(),
            Value::Record(data) => data.as_field_map().to_json(),
        }
    }
}

impl FieldMap {
    /// Converts to a normalized JSON object, keeping key order.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(key, value)| (key.to_string(), value.to_json()))
                .collect(),
        )
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(v) => serializer.serialize_i64(*v),
            Value::Real(v) if v.is_finite() => serializer.serialize_f64(*v),
            Value::Real(_) => serializer.serialize_unit(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.collect_str(&date_text(d)),
            Value::DateTime(dt) => serializer.collect_str(&datetime_text(dt)),
            Value::Timestamp(ts) => serializer.collect_str(&timestamp_text(ts)),
            Value::List(items) => serializer.collect_seq(items),
            Value::Map(map) => map.serialize(serializer),
            Value::Record(data) => data.serialize(serializer),
        }
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for RecordData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_field_map().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use chrono::{NaiveTime, TimeZone};
    use test_case::test_case;

    fn moment() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2001, 1, 1)
            .unwrap()
            .and_time(NaiveTime::from_hms_micro_opt(1, 1, 1, 100).unwrap())
    }

    #[test_case(Value::from(moment()) => "\"2001-01-01T01:01:01\""; "datetime drops micros")]
    #[test_case(Value::from(moment().date()) => "\"2001-01-01\""; "date")]
    #[test_case(
        Value::from(FixedOffset::east_opt(0).unwrap().from_utc_datetime(&moment()))
            => "\"2001-01-01T01:01:01+00:00\"";
        "utc timestamp"
    )]
    #[test_case(
        Value::from(FixedOffset::east_opt(5 * 3600 + 1800).unwrap().from_utc_datetime(&moment()))
            => "\"2001-01-01T06:31:01+05:30\"";
        "offset timestamp"
    )]
    #[test_case(Value::from(f64::NAN) => "null"; "nan")]
    #[test_case(Value::from(f64::INFINITY) => "null"; "infinity")]
    #[test_case(Value::from(2.5) => "2.5"; "real")]
    fn scalar_encoding(value: Value) -> String {
        serde_json::to_string(&value).unwrap()
    }

    #[test]
    fn normalizes_at_every_depth() {
        let day = moment().date();
        let value = Value::Map(fields! {
            "when" => moment(),
            "days" => vec![Value::from(day), Value::from(vec![day])],
            "inner" => Value::Map(fields! { "at" => moment() }),
        });

        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(
            text,
            r#"{"when":"2001-01-01T01:01:01","days":["2001-01-01",["2001-01-01"]],"inner":{"at":"2001-01-01T01:01:01"}}"#
        );
    }

    #[test]
    fn to_json_matches_serializer() {
        let value = Value::Map(fields! {
            "z" => 1,
            "a" => moment(),
            "d" => moment().date(),
            "t" => FixedOffset::west_opt(5 * 3600).unwrap().from_utc_datetime(&moment()),
            "r" => f64::NAN,
            "l" => vec![Value::Null, Value::from(true)],
        });
        assert_eq!(value.to_json(), serde_json::to_value(&value).unwrap());
        assert_eq!(
            value.to_json().as_object().unwrap().keys().collect::<Vec<_>>(),
            ["z", "a", "d", "t", "r", "l"]
        );
    }
}
