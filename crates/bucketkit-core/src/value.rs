//! In-memory values accepted by save operations and returned by loads.

use bytes::Bytes;
use serde::{Serialize, Serializer};
use strum::IntoStaticStr;

use crate::{Error, Result};

/// A single row of tabular data.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Anything that can be persisted as an object.
///
/// The variant decides the encoding rule: bytes are stored verbatim, text as
/// UTF-8, structured values and record lists as JSON. Record lists are the
/// only values accepted by the tabular (parquet) encoder, together with a
/// single JSON object which is promoted to a one-element list.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Value {
    /// Raw bytes.
    Bytes(Bytes),
    /// UTF-8 text.
    Text(String),
    /// Any JSON-representable value.
    Structured(serde_json::Value),
    /// A list of records.
    Records(Vec<Record>),
}

impl Value {
    /// Returns the variant name, used in error messages and logs.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Returns the text when this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the bytes when this is a [`Value::Bytes`].
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the JSON value when this is a [`Value::Structured`].
    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Structured(json) => Some(json),
            _ => None,
        }
    }

    /// Converts the value into JSON.
    ///
    /// Bytes become a lossy UTF-8 string.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned().into(),
            Self::Text(text) => text.clone().into(),
            Self::Structured(json) => json.clone(),
            Self::Records(records) => records
                .iter()
                .cloned()
                .map(serde_json::Value::Object)
                .collect(),
        }
    }

    /// Builds a value from decoded JSON, mapping JSON strings back to text.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }

    /// Returns the value as a list of records.
    ///
    /// A single JSON object is wrapped into a one-element list. Any other
    /// shape fails with [`Error::NotTabular`].
    pub fn to_records(&self) -> Result<Vec<Record>> {
        match self {
            Self::Records(records) => Ok(records.clone()),
            Self::Structured(serde_json::Value::Object(record)) => Ok(vec![record.clone()]),
            Self::Structured(serde_json::Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::Object(record) => Ok(record.clone()),
                    _ => Err(Error::NotTabular("list with non-record items")),
                })
                .collect(),
            other => Err(Error::NotTabular(other.kind())),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bytes(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Structured(json) => json.serialize(serializer),
            Self::Records(records) => records.serialize(serializer),
        }
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes.into())
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::Structured(json)
    }
}

impl From<Vec<Record>> for Value {
    fn from(records: Vec<Record>) -> Self {
        Self::Records(records)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Structured(serde_json::Value::Object(record))
    }
}
