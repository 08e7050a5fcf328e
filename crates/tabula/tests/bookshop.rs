//! Bookshop scenario: typed side attributes, nested records and JSON output.

use std::collections::HashSet;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use tabula::{Policy, Record, RecordError, SideAttributes, Value, fields, record_kind};

/// Who sells a copy and for how much. Not part of the book itself.
#[derive(Debug, Clone)]
struct Listing {
    supplier: String,
    price: Option<i64>,
}

impl Listing {
    fn new(supplier: &str, price: i64) -> Self {
        Self {
            supplier: supplier.to_string(),
            price: Some(price),
        }
    }
}

impl SideAttributes for Listing {
    const NAMES: &'static [&'static str] = &["supplier", "price"];

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "supplier" => Some(Value::from(self.supplier.as_str())),
            "price" => self.price.map(Value::from),
            _ => None,
        }
    }
}

record_kind!(
    /// A book as described by its publisher.
    Book,
    Listing,
    Policy::new()
        .with_fields(["author", "title", "isbn", "type", "published"])
        .with_non_null_fields(["title"])
        .with_hash_index_fields(["isbn", "title"])
);

record_kind!(
    /// A book on a supplier's shelf.
    Offer,
    Listing,
    Policy::new()
        .with_fields(["book", "received", "formats"])
        .with_non_null_fields(["book"])
        .with_hash_index_fields(["supplier", "book"])
);

record_kind!(Sale, (), Policy::new().with_non_null_fields(["offer", "at"]));

fn moshi_moshi(supplier: &str, price: i64) -> Record<Book> {
    Record::create(
        Listing::new(supplier, price),
        fields! {
            "title" => "Moshi Moshi",
            "author" => "Banana Yoshimoto",
            "isbn" => "978-1-61902-786-2",
            "type" => "hardback",
            "published" => NaiveDate::from_ymd_opt(2016, 7, 12).unwrap(),
        },
    )
    .unwrap()
}

fn received() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2001, 1, 1)
        .unwrap()
        .and_time(NaiveTime::from_hms_micro_opt(1, 1, 1, 100).unwrap())
}

// ============================================================================
// Side Attributes
// ============================================================================

#[test]
fn same_book_from_two_suppliers_is_one_book() {
    let acme = moshi_moshi("Acme Inc", 25);
    let bobs = moshi_moshi("Bob's Books", 23);

    assert_eq!(acme, bobs);

    let shelf: HashSet<_> = [acme.clone(), bobs.clone()].into_iter().collect();
    assert_eq!(shelf.len(), 1);

    assert_eq!(acme.attributes().supplier, "Acme Inc");
    assert_eq!(bobs.attributes().price, Some(23));
}

#[test]
fn side_attributes_never_serialize() {
    let book = moshi_moshi("Acme Inc", 25);
    let json = book.to_json_value().unwrap();
    let object = json.as_object().unwrap();

    for name in Listing::NAMES {
        assert!(!object.contains_key(*name), "{name} leaked into JSON");
    }
    assert_eq!(
        object.keys().collect::<Vec<_>>(),
        ["author", "title", "isbn", "type", "published"]
    );
}

#[test]
fn repricing_is_refused() {
    let book = moshi_moshi("Acme Inc", 25);

    let err = book.set_attribute("price", 20).unwrap_err();
    assert_eq!(err.to_string(), "'Book' object does not support attribute assignment");
    assert_eq!(book.attributes().price, Some(25));

    let err = book.delete_item("isbn").unwrap_err();
    assert_eq!(err.to_string(), "'Book' object does not support item deletion");
    assert!(book.contains_key("isbn"));
}

// ============================================================================
// Keys
// ============================================================================

#[test]
fn book_key_uses_isbn_then_title() {
    let book = moshi_moshi("Acme Inc", 25);

    assert_eq!(
        book.hash_index_key().unwrap().as_deref(),
        Some("Book:isbn:978-1-61902-786-2:title:Moshi Moshi")
    );
    assert_eq!(
        book.hash_index_key_with_id(Some(1)).unwrap().as_deref(),
        Some("Book:1:isbn:978-1-61902-786-2:title:Moshi Moshi")
    );
}

#[test]
fn book_without_isbn_keys_on_title() {
    let book = moshi_moshi("Acme Inc", 25);
    let reissue = book.copy_with(fields! { "isbn" => Value::Null }).unwrap();

    assert_eq!(reissue.hash_index_key().unwrap().as_deref(), Some("Book:title:Moshi Moshi"));
}

#[test]
fn offer_key_cannot_use_a_nested_record() {
    let offer = Record::<Offer>::create(
        Listing::new("Acme Inc", 25),
        fields! { "book" => moshi_moshi("Acme Inc", 25).data().clone() },
    )
    .unwrap();

    let err = offer.hash_index_key().unwrap_err();
    assert!(matches!(err, RecordError::UnorderedValueType { ref field } if field == "book"));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn offer_serializes_nested_book_and_drops_micros() {
    let book = moshi_moshi("Acme Inc", 25);
    let offer = Record::<Offer>::create(
        Listing::new("Acme Inc", 25),
        fields! {
            "received" => received(),
            "book" => book.data().clone(),
            "formats" => vec![Value::from("hardback"), Value::from(received().date())],
        },
    )
    .unwrap();

    let text = offer.serialize().unwrap();
    assert_eq!(
        text,
        concat!(
            r#"{"book":{"author":"Banana Yoshimoto","title":"Moshi Moshi","#,
            r#""isbn":"978-1-61902-786-2","type":"hardback","published":"2016-07-12"},"#,
            r#""received":"2001-01-01T01:01:01","formats":["hardback","2001-01-01"]}"#
        )
    );
}

#[test]
fn sale_keeps_offset_and_drops_micros() {
    let offset = FixedOffset::west_opt(5 * 3600).unwrap();
    let at = offset.from_local_datetime(&received()).unwrap();

    let sale = Record::<Sale>::create((), fields! { "at" => at, "offer" => "Book:1" }).unwrap();

    assert_eq!(
        sale.serialize().unwrap(),
        r#"{"at":"2001-01-01T01:01:01-05:00","offer":"Book:1"}"#
    );
}

#[test]
fn sale_requires_both_fields() {
    let err = Record::<Sale>::create((), fields! {}).unwrap_err();
    assert_eq!(err.to_string(), "The following fields are required: at, offer");
}
