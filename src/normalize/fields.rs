// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field lookup and coercion over untyped JSON payloads.

use serde_json::{Map, Value};

use crate::time_utils;

/// Outcome of reading one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    Present(T),
    /// Not there, `null`, or an empty string.
    Absent,
    /// There, but not of the expected semantic type.
    Malformed,
}

impl<T> Extracted<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Extracted::Present(v) => Some(v),
            Extracted::Absent | Extracted::Malformed => None,
        }
    }
}

/// Where a payload's fields are read from once its shape is known.
///
/// `primary` is the details wrapper (or the top level for summary-shaped
/// payloads). `envelope` is the top level of a details-shaped payload, which
/// still carries identity fields such as `activityId`.
#[derive(Debug, Clone, Copy)]
pub struct FieldSource<'a> {
    primary: Option<&'a Map<String, Value>>,
    envelope: Option<&'a Map<String, Value>>,
}

impl<'a> FieldSource<'a> {
    pub fn summary(top: Option<&'a Map<String, Value>>) -> Self {
        Self {
            primary: top,
            envelope: None,
        }
    }

    pub fn details(wrapper: &'a Map<String, Value>, envelope: &'a Map<String, Value>) -> Self {
        Self {
            primary: Some(wrapper),
            envelope: Some(envelope),
        }
    }

    /// First non-null value among `names`, wrapper before envelope.
    pub fn lookup(&self, names: &[&str]) -> Option<&'a Value> {
        [self.primary, self.envelope]
            .into_iter()
            .flatten()
            .flat_map(|map| names.iter().filter_map(move |name| map.get(*name)))
            .find(|v| !is_blank(v))
    }

    /// True when none of `names` carries a value.
    pub fn is_blank(&self, names: &[&str]) -> bool {
        self.lookup(names).is_none()
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// A number, or a string holding one. `"1234.5"` and `1234.5` read the same.
pub fn number(value: Option<&Value>) -> Extracted<f64> {
    match value {
        None | Some(Value::Null) => Extracted::Absent,
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map_or(Extracted::Malformed, Extracted::Present),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Extracted::Absent;
            }
            s.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map_or(Extracted::Malformed, Extracted::Present)
        }
        Some(_) => Extracted::Malformed,
    }
}

/// An integral number (`52`, `52.0`, `"52"`). Fractions are malformed.
pub fn integer(value: Option<&Value>) -> Extracted<i64> {
    if let Some(Value::Number(n)) = value {
        if let Some(i) = n.as_i64() {
            return Extracted::Present(i);
        }
    }
    if let Some(Value::String(s)) = value {
        if let Ok(i) = s.trim().parse::<i64>() {
            return Extracted::Present(i);
        }
    }

    match number(value) {
        Extracted::Present(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Extracted::Present(f as i64)
        }
        Extracted::Present(_) | Extracted::Malformed => Extracted::Malformed,
        Extracted::Absent => Extracted::Absent,
    }
}

/// A non-empty string.
pub fn text(value: Option<&Value>) -> Extracted<String> {
    match value {
        None | Some(Value::Null) => Extracted::Absent,
        Some(Value::String(s)) if s.trim().is_empty() => Extracted::Absent,
        Some(Value::String(s)) => Extracted::Present(s.clone()),
        Some(_) => Extracted::Malformed,
    }
}

/// `true`/`false`, or a string holding one.
pub fn boolean(value: Option<&Value>) -> Extracted<bool> {
    match value {
        None | Some(Value::Null) => Extracted::Absent,
        Some(Value::Bool(b)) => Extracted::Present(*b),
        Some(Value::String(s)) => match s.trim() {
            "" => Extracted::Absent,
            "true" => Extracted::Present(true),
            "false" => Extracted::Present(false),
            _ => Extracted::Malformed,
        },
        Some(_) => Extracted::Malformed,
    }
}

/// A key string, or an object carrying it under `key_field` (Garmin's
/// `{"typeKey": "running", "typeId": 1}` style).
pub fn keyed_text(value: Option<&Value>, key_field: &str) -> Extracted<String> {
    match value {
        Some(Value::Object(obj)) => text(obj.get(key_field)),
        other => text(other),
    }
}

/// A calendar date, returned as zero-padded `YYYY-MM-DD`.
pub fn date(value: Option<&Value>) -> Extracted<String> {
    match text(value) {
        Extracted::Present(s) => time_utils::canonical_calendar_date(&s)
            .map_or(Extracted::Malformed, Extracted::Present),
        Extracted::Malformed => Extracted::Malformed,
        Extracted::Absent => Extracted::Absent,
    }
}

/// A parseable date/time string, kept verbatim apart from surrounding
/// whitespace.
pub fn datetime(value: Option<&Value>) -> Extracted<String> {
    match text(value) {
        Extracted::Present(s) if time_utils::is_datetime(&s) => {
            Extracted::Present(s.trim().to_string())
        }
        Extracted::Present(_) | Extracted::Malformed => Extracted::Malformed,
        Extracted::Absent => Extracted::Absent,
    }
}

/// Collects required fields and remembers which ones were missing.
///
/// Values returned for missing fields are placeholders; callers must check
/// [`Extractor::missing`] before using them.
pub struct Extractor<'a> {
    source: FieldSource<'a>,
    missing: Vec<&'static str>,
}

impl<'a> Extractor<'a> {
    pub fn new(source: FieldSource<'a>) -> Self {
        Self {
            source,
            missing: Vec::new(),
        }
    }

    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }

    pub fn into_missing(self) -> Vec<&'static str> {
        self.missing
    }

    /// Record a field resolved by the caller.
    pub fn require<T: Default>(&mut self, field: &'static str, value: Extracted<T>) -> T {
        match value {
            Extracted::Present(v) => v,
            Extracted::Absent | Extracted::Malformed => {
                self.missing.push(field);
                T::default()
            }
        }
    }

    pub fn number(&mut self, field: &'static str, aliases: &[&str]) -> f64 {
        let value = number(self.source.lookup(aliases));
        self.require(field, value)
    }

    pub fn integer(&mut self, field: &'static str, aliases: &[&str]) -> i64 {
        let value = integer(self.source.lookup(aliases));
        self.require(field, value)
    }

    pub fn text(&mut self, field: &'static str, aliases: &[&str]) -> String {
        let value = text(self.source.lookup(aliases));
        self.require(field, value)
    }

    pub fn datetime(&mut self, field: &'static str, aliases: &[&str]) -> String {
        let value = datetime(self.source.lookup(aliases));
        self.require(field, value)
    }

    pub fn opt_number(&self, aliases: &[&str]) -> Option<f64> {
        number(self.source.lookup(aliases)).ok()
    }

    pub fn opt_integer(&self, aliases: &[&str]) -> Option<i64> {
        integer(self.source.lookup(aliases)).ok()
    }

    pub fn opt_text(&self, aliases: &[&str]) -> Option<String> {
        text(self.source.lookup(aliases)).ok()
    }

    pub fn opt_datetime(&self, aliases: &[&str]) -> Option<String> {
        datetime(self.source.lookup(aliases)).ok()
    }

    pub fn opt_boolean(&self, aliases: &[&str]) -> Option<bool> {
        boolean(self.source.lookup(aliases)).ok()
    }

    pub fn opt_keyed_text(&self, aliases: &[&str], key_field: &str) -> Option<String> {
        keyed_text(self.source.lookup(aliases), key_field).ok()
    }
}
