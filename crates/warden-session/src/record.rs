//! Session records and their attribute values.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application attributes attached to a session.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A value stored in a session's attribute map.
///
/// Serializes untagged, so an attribute map round-trips through plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Map(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Borrow the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a bool, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Number(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Number(v as f64)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

impl From<BTreeMap<String, AttributeValue>> for AttributeValue {
    fn from(v: BTreeMap<String, AttributeValue>) -> Self {
        AttributeValue::Map(v)
    }
}

/// Data held for one session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Identity the session belongs to.
    pub user_id: String,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session was last created, updated or touched.
    pub last_activity: DateTime<Utc>,

    /// Address the session was opened from.
    pub source_ip: String,

    /// Application attributes.
    #[serde(default)]
    pub attributes: Attributes,
}

impl SessionRecord {
    /// Create a record with both timestamps set to now and no attributes.
    pub fn new(user_id: impl Into<String>, source_ip: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            created_at: now,
            last_activity: now,
            source_ip: source_ip.into(),
            attributes: Attributes::new(),
        }
    }

    /// Set the last activity timestamp.
    pub fn with_last_activity(mut self, ts: DateTime<Utc>) -> Self {
        self.last_activity = ts;
        self
    }

    /// Bump `last_activity` to the current time.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// How long the session has been idle as of `now`.
    ///
    /// Negative when `last_activity` lies in the future.
    pub fn idle_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.last_activity)
    }

    /// Whether the session has been idle for strictly longer than `ttl`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        // A ttl too large for chrono never expires anything.
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => self.idle_for(now) > ttl,
            Err(_) => false,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Set an attribute, returning the previous value if any.
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.attributes.insert(key.into(), value.into())
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<AttributeValue> {
        self.attributes.remove(key)
    }
}
