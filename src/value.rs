//! Conversions from rendered pages into template [`Value`]s.

use std::collections::HashMap;

use chrono::NaiveDate;
use gtmpl::Value;

use crate::document::ReadingTime;
use crate::render::{ListingPage, Page, Summary};

fn option_to_value(opt: Option<&str>) -> Value {
    match opt {
        Some(s) => Value::String(s.to_owned()),
        None => Value::Nil,
    }
}

/// Dates are exposed both as `YYYY-MM-DD` (`date`, for `datetime`
/// attributes) and in a human-readable form (`date_display`, e.g.
/// `Mon Jan 01 2024`).
fn insert_date(m: &mut HashMap<String, Value>, date: Option<NaiveDate>) {
    let (iso, display) = match date {
        Some(date) => (
            Value::String(date.format("%Y-%m-%d").to_string()),
            Value::String(date.format("%a %b %d %Y").to_string()),
        ),
        None => (Value::Nil, Value::Nil),
    };
    m.insert("date".to_owned(), iso);
    m.insert("date_display".to_owned(), display);
}

impl From<ReadingTime> for Value {
    fn from(rt: ReadingTime) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("words".to_owned(), Value::from(rt.words as u64));
        m.insert("minutes".to_owned(), Value::from(rt.minutes as u64));
        m.insert("text".to_owned(), Value::String(rt.to_string()));
        Value::Object(m)
    }
}

impl From<&Summary> for Value {
    fn from(s: &Summary) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("id".to_owned(), Value::String(s.id.clone()));
        m.insert(
            "type".to_owned(),
            Value::String(s.collection.name().to_owned()),
        );
        m.insert("title".to_owned(), Value::String(s.title.clone()));
        m.insert(
            "description".to_owned(),
            option_to_value(s.description.as_deref()),
        );
        m.insert("url".to_owned(), Value::String(s.slug.clone()));
        insert_date(&mut m, s.date);
        m.insert("reading_time".to_owned(), s.reading_time.into());
        Value::Object(m)
    }
}

impl From<&Page> for Value {
    fn from(p: &Page) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(p.title.clone()));
        m.insert(
            "description".to_owned(),
            option_to_value(p.description.as_deref()),
        );
        m.insert("body".to_owned(), Value::String(p.body.clone()));
        m.insert("url".to_owned(), Value::String(p.slug.clone()));
        insert_date(&mut m, p.date);
        m.insert("reading_time".to_owned(), p.reading_time.into());
        m.insert(
            "children".to_owned(),
            Value::Array(p.children.iter().map(Value::from).collect()),
        );
        Value::Object(m)
    }
}

impl From<&ListingPage> for Value {
    fn from(l: &ListingPage) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(l.title.clone()));
        m.insert(
            "description".to_owned(),
            option_to_value(l.description.as_deref()),
        );
        m.insert("url".to_owned(), Value::String(l.listing.path().to_owned()));
        m.insert(
            "entries".to_owned(),
            Value::Array(l.entries.iter().map(Value::from).collect()),
        );
        Value::Object(m)
    }
}
