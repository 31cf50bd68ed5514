//! Time-to-live envelopes for cached values.
//!
//! A cache entry is stored as a JSON object:
//!
//! ```json
//! {"value": ..., "cache_time": 60.0, "put_time": 1700000000.25}
//! ```
//!
//! `cache_time` is the TTL in seconds (`-1` never expires) and `put_time` the
//! write time in seconds since the Unix epoch. Expiry is evaluated on read
//! only; expired entries are left in place and reported as absent.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{TRACING_TARGET_CACHE, Value};

/// TTL marking an entry that never expires.
pub const NEVER_EXPIRES: f64 = -1.0;

/// A value wrapped with its write time and TTL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEnvelope {
    /// The cached value.
    pub value: serde_json::Value,
    /// Time-to-live in seconds.
    #[serde(rename = "cache_time")]
    pub ttl_seconds: f64,
    /// Write time in seconds since the Unix epoch.
    #[serde(rename = "put_time")]
    pub written_at: f64,
}

impl CacheEnvelope {
    /// Wraps `value`, stamping it with the current time.
    pub fn wrap(value: &Value, ttl_seconds: f64) -> Self {
        Self::wrap_at(value, ttl_seconds, Timestamp::now())
    }

    /// Wraps `value` as if written at `written_at`.
    pub fn wrap_at(value: &Value, ttl_seconds: f64, written_at: Timestamp) -> Self {
        Self {
            value: value.to_json(),
            ttl_seconds,
            written_at: epoch_seconds(written_at),
        }
    }

    /// Recognizes an envelope in a decoded object.
    ///
    /// Returns `None` for anything that is not an object carrying `value`,
    /// `cache_time` and `put_time`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Structured(json) => serde_json::from_value(json).ok(),
            _ => None,
        }
    }

    /// Returns the envelope as a structured value ready for encoding.
    pub fn to_value(&self) -> Value {
        Value::Structured(serde_json::json!({
            "value": self.value,
            "cache_time": self.ttl_seconds,
            "put_time": self.written_at,
        }))
    }

    /// Returns the write time, or `None` when it is outside the supported
    /// timestamp range.
    pub fn written_at(&self) -> Option<Timestamp> {
        SignedDuration::try_from_secs_f64(self.written_at)
            .ok()
            .and_then(|duration| Timestamp::from_duration(duration).ok())
    }

    /// Returns `true` when the entry never expires.
    pub fn is_permanent(&self) -> bool {
        self.ttl_seconds == NEVER_EXPIRES
    }

    /// Returns `true` when more than `ttl_seconds` have elapsed between the
    /// write and `now`. An entry read exactly at its TTL is still fresh.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        if self.is_permanent() {
            return false;
        }

        epoch_seconds(now) - self.written_at > self.ttl_seconds
    }

    /// Returns the inner value unless the envelope has expired.
    pub fn unwrap_if_fresh(self, now: Timestamp) -> Option<Value> {
        if self.is_expired(now) {
            tracing::debug!(
                target: TRACING_TARGET_CACHE,
                ttl_seconds = self.ttl_seconds,
                written_at = self.written_at,
                "Cache entry expired"
            );
            return None;
        }

        Some(Value::from_json(self.value))
    }
}

fn epoch_seconds(timestamp: Timestamp) -> f64 {
    timestamp.as_duration().as_secs_f64()
}
