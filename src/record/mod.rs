use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use serde::de::{self, Deserializer, Visitor};
use serde::ser;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};

pub mod normalize;

pub use normalize::normalize;

/// A JSON number as it takes part in a sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    pub const ZERO: Numeric = Numeric::Int(0);

    // u64 values above i64::MAX have no integer slot and become floats
    pub fn from_number(n: &Number) -> Option<Self> {
        if let Some(i) = n.as_i64() { return Some(Numeric::Int(i)); }
        n.as_f64().map(Numeric::Float)
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }
}

impl Default for Numeric {
    fn default() -> Self { Numeric::ZERO }
}

impl Add for Numeric {
    type Output = Numeric;

    fn add(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Int(a), Numeric::Int(b)) => a
                .checked_add(b)
                .map(Numeric::Int)
                .unwrap_or(Numeric::Float(a as f64 + b as f64)),
            (a, b) => Numeric::Float(a.as_f64() + b.as_f64()),
        }
    }
}

// JSON has no infinity or NaN; refusing them keeps every written sum readable.
impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match *self {
            Numeric::Int(i) => s.serialize_i64(i),
            Numeric::Float(f) if f.is_finite() => s.serialize_f64(f),
            Numeric::Float(f) => Err(ser::Error::custom(format!("sum {} is not finite", f))),
        }
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct NumericVisitor;

        impl<'de> Visitor<'de> for NumericVisitor {
            type Value = Numeric;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON number")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Numeric, E> { Ok(Numeric::Int(v)) }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Numeric, E> {
                Ok(i64::try_from(v).map(Numeric::Int).unwrap_or(Numeric::Float(v as f64)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Numeric, E> { Ok(Numeric::Float(v)) }
        }

        d.deserialize_any(NumericVisitor)
    }
}

/// Field value as seen by aggregation: a number, or anything else.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(Numeric),
    Other,
}

impl From<&Value> for FieldValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Number(n) => Numeric::from_number(n).map_or(FieldValue::Other, FieldValue::Number),
            // booleans are not numbers here
            _ => FieldValue::Other,
        }
    }
}

/// One input record: a mapping of fields, or an element of any other shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Fields(BTreeMap<String, FieldValue>),
    Other,
}

impl Record {
    pub fn has_field(&self, name: &str) -> bool {
        match self {
            Record::Fields(fields) => fields.contains_key(name),
            Record::Other => false,
        }
    }

    /// Numeric (key, value) pairs of a mapping record; empty for anything else.
    pub fn numeric_fields(&self) -> impl Iterator<Item = (&str, Numeric)> {
        let fields = match self {
            Record::Fields(fields) => Some(fields),
            Record::Other => None,
        };
        fields.into_iter().flatten().filter_map(|(k, v)| match v {
            FieldValue::Number(n) => Some((k.as_str(), *n)),
            FieldValue::Other => None,
        })
    }
}

impl From<&Value> for Record {
    fn from(v: &Value) -> Self {
        match v {
            Value::Object(map) => Record::Fields(map.iter().map(|(k, v)| (k.clone(), FieldValue::from(v))).collect()),
            _ => Record::Other,
        }
    }
}

/// Ordered records decoded from one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch(Vec<Record>);

impl RecordBatch {
    /// Normalize a decoded payload and classify each element.
    pub fn from_json(payload: Value) -> Self {
        normalize(payload).iter().map(Record::from).collect()
    }

    pub fn first(&self) -> Option<&Record> { self.0.first() }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> { self.0.iter() }
}

impl FromIterator<Record> for RecordBatch {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self { RecordBatch(iter.into_iter().collect()) }
}

impl<'a> IntoIterator for &'a RecordBatch {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}
