//! Payload encoding and decoding.
//!
//! The encoding of a stored object is never recorded in object metadata.
//! Gzip and parquet payloads are recognized purely by the key extension,
//! so callers writing compressed data are responsible for choosing a key
//! ending in [`GZIP_EXTENSION`].

mod tabular;

use std::io::{Read, Write};

use bytes::Bytes;
use flate2::Compression as GzipLevel;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub use self::tabular::{decode_tabular, encode_tabular};
use crate::path::StorageKey;
use crate::{Result, TRACING_TARGET_CODEC, Value};

/// Extension marking gzip-compressed objects.
pub const GZIP_EXTENSION: &str = ".gz";

/// Extension marking parquet objects.
pub const TABULAR_EXTENSION: &str = ".parquet";

/// Content type used when none can be guessed from the key.
pub const DEFAULT_CONTENT_TYPE: &str = "binary/octet-stream";

/// Length of generated file names.
pub const RANDOM_SUFFIX_LENGTH: usize = 10;

const RANDOM_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// Compression applied after encoding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Compression {
    /// Store the encoded bytes as-is.
    #[default]
    None,
    /// Gzip the encoded bytes.
    Gzip,
}

impl Compression {
    /// Returns the key extension readers use to detect this compression.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Gzip => Some(GZIP_EXTENSION),
        }
    }
}

/// Encodes a value into a payload.
///
/// Bytes are used as-is, text is UTF-8 encoded, and everything else is
/// serialized to JSON with non-ASCII characters kept verbatim. The result
/// is gzipped when `compression` asks for it.
pub fn encode(value: &Value, compression: Compression) -> Result<Bytes> {
    let encoded = match value {
        Value::Bytes(bytes) => bytes.clone(),
        Value::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
        Value::Structured(_) | Value::Records(_) => Bytes::from(serde_json::to_vec(value)?),
    };

    let payload = match compression {
        Compression::None => encoded,
        Compression::Gzip => Bytes::from(gzip(&encoded)?),
    };

    tracing::debug!(
        target: TRACING_TARGET_CODEC,
        kind = value.kind(),
        compression = %compression,
        size = payload.len(),
        "Encoded payload"
    );

    Ok(payload)
}

/// Encodes a value for `key`, dispatching on the key extension.
///
/// Keys ending in [`TABULAR_EXTENSION`] are written as parquet and ignore
/// `compression`, since parquet columns are already compressed.
pub fn encode_for_key(value: &Value, key: &StorageKey, compression: Compression) -> Result<Bytes> {
    if key.has_extension(TABULAR_EXTENSION) {
        if compression != Compression::None {
            tracing::debug!(
                target: TRACING_TARGET_CODEC,
                key = %key,
                "Ignoring compression for tabular key"
            );
        }
        return encode_tabular(value);
    }

    encode(value, compression)
}

/// Decodes a payload read from `key`.
///
/// Payloads under a [`GZIP_EXTENSION`] key are decompressed first. The
/// bytes then fall through three tiers: valid UTF-8 that parses as JSON
/// becomes [`Value::Structured`], other valid UTF-8 becomes
/// [`Value::Text`], and anything else is returned as [`Value::Bytes`].
pub fn decode(payload: Bytes, key: &StorageKey) -> Result<Value> {
    let payload = if key.has_extension(GZIP_EXTENSION) {
        Bytes::from(gunzip(&payload)?)
    } else {
        payload
    };

    let value = match std::str::from_utf8(&payload) {
        Ok(text) => match serde_json::from_str::<serde_json::Value>(text) {
            Ok(json) => Value::Structured(json),
            Err(_) => Value::Text(text.to_owned()),
        },
        Err(_) => Value::Bytes(payload),
    };

    tracing::debug!(
        target: TRACING_TARGET_CODEC,
        key = %key,
        kind = value.kind(),
        "Decoded payload"
    );

    Ok(value)
}

/// Guesses a MIME type from the key extension.
pub fn content_type_for(key: &StorageKey) -> String {
    mime_guess::from_path(key.as_str())
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_owned()
}

/// Returns `length` characters drawn uniformly from `[a-zA-Z0-9]`.
///
/// Not suitable for anything security related.
pub fn random_suffix(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| RANDOM_ALPHABET[rng.random_range(0..RANDOM_ALPHABET.len())] as char)
        .collect()
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), GzipLevel::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();
    GzDecoder::new(data).read_to_end(&mut decoded)?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn key(key: &str) -> StorageKey {
        StorageKey::from_normalized(key)
    }

    #[test]
    fn test_mapping_survives_plain_round_trip() {
        let value = Value::from(json!({"name": "café", "n": [1, 2, 3]}));
        let payload = encode(&value, Compression::None).unwrap();
        assert_eq!(decode(payload, &key("default/svc/a")).unwrap(), value);
    }

    #[test]
    fn test_non_ascii_is_not_escaped() {
        let payload = encode(&Value::from(json!({"k": "日本"})), Compression::None).unwrap();
        assert!(std::str::from_utf8(&payload).unwrap().contains("日本"));
    }

    #[test]
    fn test_text_survives_plain_round_trip() {
        let value = Value::from("hello world");
        let payload = encode(&value, Compression::None).unwrap();
        assert_eq!(payload.as_ref(), b"hello world");
        assert_eq!(decode(payload, &key("default/svc/a.txt")).unwrap(), value);
    }

    #[test]
    fn test_non_utf8_bytes_survive_plain_round_trip() {
        let value = Value::from(vec![0xff, 0xfe, 0x00, 0x01]);
        let payload = encode(&value, Compression::None).unwrap();
        assert_eq!(decode(payload, &key("default/svc/a.bin")).unwrap(), value);
    }

    #[test]
    fn test_json_looking_text_decodes_as_structured() {
        let payload = encode(&Value::from("42"), Compression::None).unwrap();
        assert_eq!(
            decode(payload, &key("default/svc/n")).unwrap(),
            Value::Structured(json!(42))
        );
    }

    #[test]
    fn test_gzip_round_trip() {
        let value = Value::from(json!({"rows": ["a", "b"]}));
        let payload = encode(&value, Compression::Gzip).unwrap();
        assert_eq!(&payload[..2], &[0x1f, 0x8b]);
        assert_eq!(decode(payload, &key("default/svc/data.json.gz")).unwrap(), value);
    }

    #[test]
    fn test_gzip_without_extension_is_not_decompressed() {
        let payload = encode(&Value::from("zip me"), Compression::Gzip).unwrap();
        let decoded = decode(payload.clone(), &key("default/svc/data.txt")).unwrap();
        assert_eq!(decoded, Value::Bytes(payload));
    }

    #[test]
    fn test_corrupt_gzip_is_an_error() {
        let result = decode(Bytes::from_static(b"not gzip"), &key("default/svc/a.gz"));
        assert!(matches!(result, Err(crate::Error::Compression(_))));
    }

    #[test]
    fn test_records_encode_as_json_array_for_plain_keys() {
        let value = Value::from(json!([{"a": 1}]));
        let records = Value::Records(value.to_records().unwrap());
        let payload = encode_for_key(&records, &key("default/svc/r.json"), Compression::None).unwrap();
        assert_eq!(payload.as_ref(), br#"[{"a":1}]"#);
    }

    #[test]
    fn test_encode_for_key_dispatches_on_tabular_extension() {
        let value = Value::from(json!({"a": 1}));
        let payload =
            encode_for_key(&value, &key("default/svc/r.parquet"), Compression::Gzip).unwrap();
        assert_eq!(&payload[..4], b"PAR1");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(&key("default/svc/a.json")), "application/json");
        assert_eq!(content_type_for(&key("default/svc/a.txt")), "text/plain");
        assert_eq!(content_type_for(&key("default/svc/noext")), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_random_suffix() {
        let suffix = random_suffix(RANDOM_SUFFIX_LENGTH);
        assert_eq!(suffix.len(), RANDOM_SUFFIX_LENGTH);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(random_suffix(32), random_suffix(32));
    }

    #[test]
    fn test_compression_strings() {
        assert_eq!(Compression::Gzip.to_string(), "gzip");
        assert_eq!("none".parse::<Compression>().unwrap(), Compression::None);
        assert_eq!(Compression::Gzip.extension(), Some(".gz"));
    }
}
