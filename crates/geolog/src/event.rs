//! Analytics event types.
//!
//! An [`Event`] is a named occurrence with an optional payload and an
//! optional [`LocationRecord`] describing where the device was at the time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::location::LocationRecord;

/// Data attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    /// The event name alone.
    #[default]
    None,
    /// A single string value.
    Value(String),
    /// Ordered key/value pairs. Keys may repeat.
    Pairs(Vec<(String, String)>),
    /// Keyed values.
    Dictionary(BTreeMap<String, String>),
}

impl EventPayload {
    /// Build pairs from a flat `[key, value, key, value, ...]` array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEvent`] if the array has an odd length.
    pub fn from_key_value_array<S: AsRef<str>>(items: &[S]) -> Result<Self> {
        if items.len() % 2 != 0 {
            return Err(Error::invalid_event(format!(
                "key/value array has odd length {}",
                items.len()
            )));
        }
        let pairs = items
            .chunks_exact(2)
            .map(|kv| (kv[0].as_ref().to_string(), kv[1].as_ref().to_string()))
            .collect();
        Ok(Self::Pairs(pairs))
    }

    /// Short name of the payload variant, as stored.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Value(_) => "value",
            Self::Pairs(_) => "pairs",
            Self::Dictionary(_) => "dictionary",
        }
    }
}

/// A logged analytics event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Identifier assigned by the journal.
    pub id: Option<i64>,

    /// When the event was logged.
    pub timestamp: DateTime<Utc>,

    /// Event name.
    pub name: String,

    /// Attached data.
    pub payload: EventPayload,

    /// Where the device was, if known.
    pub location: Option<LocationRecord>,
}

impl Event {
    /// Create an event with the given name, timestamped now.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            timestamp: Utc::now(),
            name: name.into(),
            payload: EventPayload::None,
            location: None,
        }
    }

    /// Attach a single value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.payload = EventPayload::Value(value.into());
        self
    }

    /// Attach ordered key/value pairs.
    #[must_use]
    pub fn with_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.payload =
            EventPayload::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Attach a dictionary.
    #[must_use]
    pub fn with_dictionary(mut self, dictionary: BTreeMap<String, String>) -> Self {
        self.payload = EventPayload::Dictionary(dictionary);
        self
    }

    /// Attach a location. Empty records are dropped.
    #[must_use]
    pub fn at_location(mut self, location: LocationRecord) -> Self {
        self.location = (!location.is_empty()).then_some(location);
        self
    }

    /// Override the timestamp.
    #[must_use]
    pub fn at_time(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Check that the event can be recorded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEvent`] if the name is empty or blank.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_event("event name must not be empty"));
        }
        Ok(())
    }

    /// Whether a location is attached.
    #[must_use]
    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Source;

    #[test]
    fn test_event_new() {
        let event = Event::new("app_launched");
        assert!(event.id.is_none());
        assert_eq!(event.name, "app_launched");
        assert_eq!(event.payload, EventPayload::None);
        assert!(!event.has_location());
    }

    #[test]
    fn test_event_with_value() {
        let event = Event::new("search").with_value("coffee");
        assert_eq!(event.payload, EventPayload::Value("coffee".to_string()));
        assert_eq!(event.payload.kind(), "value");
    }

    #[test]
    fn test_event_with_pairs_keeps_order() {
        let event = Event::new("purchase").with_pairs([("sku", "b-2"), ("sku", "a-1")]);
        assert_eq!(
            event.payload,
            EventPayload::Pairs(vec![
                ("sku".to_string(), "b-2".to_string()),
                ("sku".to_string(), "a-1".to_string()),
            ])
        );
    }

    #[test]
    fn test_event_with_dictionary() {
        let mut dict = BTreeMap::new();
        dict.insert("screen".to_string(), "map".to_string());
        let event = Event::new("view").with_dictionary(dict.clone());
        assert_eq!(event.payload, EventPayload::Dictionary(dict));
    }

    #[test]
    fn test_from_key_value_array() {
        let payload = EventPayload::from_key_value_array(&["a", "1", "b", "2"]).unwrap();
        assert_eq!(
            payload,
            EventPayload::Pairs(vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ])
        );
    }

    #[test]
    fn test_from_key_value_array_odd_length() {
        let err = EventPayload::from_key_value_array(&["a", "1", "b"]).unwrap_err();
        assert!(err.to_string().contains("odd length 3"));
    }

    #[test]
    fn test_from_key_value_array_empty() {
        let payload = EventPayload::from_key_value_array::<&str>(&[]).unwrap();
        assert_eq!(payload, EventPayload::Pairs(Vec::new()));
    }

    #[test]
    fn test_at_location() {
        let mut record = LocationRecord::new();
        record.set_lat_lon(1, 1.0, 2.0, 3.0).set_source(Source::Network);
        let event = Event::new("checkin").at_location(record);
        assert_eq!(event.location, Some(record));
    }

    #[test]
    fn test_at_location_drops_empty_record() {
        let event = Event::new("checkin").at_location(LocationRecord::new());
        assert!(!event.has_location());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        assert!(Event::new("ok").validate().is_ok());
        assert!(Event::new("").validate().is_err());
        assert!(Event::new("   ").validate().is_err());
    }

    #[test]
    fn test_payload_serialization() {
        let payload = EventPayload::Value("x".to_string());
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"kind":"value","data":"x"}"#);

        let none = serde_json::to_string(&EventPayload::None).unwrap();
        assert_eq!(none, r#"{"kind":"none"}"#);

        let back: EventPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_payload_kind() {
        assert_eq!(EventPayload::None.kind(), "none");
        assert_eq!(EventPayload::Pairs(Vec::new()).kind(), "pairs");
        assert_eq!(EventPayload::Dictionary(BTreeMap::new()).kind(), "dictionary");
    }
}
