//! Dispatch packet
//!
//! One decoded inbound dispatch: the type tag plus its JSON data. Handlers
//! read fields through the typed accessors, which turn missing or malformed
//! fields into a [`DecodeError`].

use chat_core::{Emoji, Snowflake};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Packet decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A required field is absent or null
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong type
    #[error("invalid field `{field}`: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// The packet data is not a JSON object
    #[error("packet data is not an object")]
    NotAnObject,

    /// The payload did not match the expected shape
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A decoded dispatch packet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Packet type tag (`t`)
    #[serde(rename = "t")]
    pub event_type: String,

    /// Packet data (`d`)
    #[serde(rename = "d", default)]
    pub data: Value,

    /// Sequence number (`s`)
    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}

impl Packet {
    /// Create a new packet
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            sequence: None,
        }
    }

    /// Parse a packet from a JSON gateway frame
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get a required field
    pub fn field(&self, name: &'static str) -> Result<&Value, DecodeError> {
        let object = self.data.as_object().ok_or(DecodeError::NotAnObject)?;
        match object.get(name) {
            None | Some(Value::Null) => Err(DecodeError::MissingField(name)),
            Some(value) => Ok(value),
        }
    }

    /// Get an optional field (absent and null are both `None`)
    pub fn optional_field(&self, name: &'static str) -> Result<Option<&Value>, DecodeError> {
        match self.field(name) {
            Ok(value) => Ok(Some(value)),
            Err(DecodeError::MissingField(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get a required snowflake field (string or integer)
    pub fn snowflake(&self, name: &'static str) -> Result<Snowflake, DecodeError> {
        as_snowflake(name, self.field(name)?)
    }

    /// Get an optional snowflake field
    pub fn optional_snowflake(&self, name: &'static str) -> Result<Option<Snowflake>, DecodeError> {
        self.optional_field(name)?
            .map(|value| as_snowflake(name, value))
            .transpose()
    }

    /// Get a required string field
    pub fn str(&self, name: &'static str) -> Result<&str, DecodeError> {
        self.field(name)?.as_str().ok_or(DecodeError::InvalidField {
            field: name,
            expected: "string",
        })
    }

    /// Get a required emoji object field
    pub fn emoji(&self, name: &'static str) -> Result<Emoji, DecodeError> {
        Emoji::deserialize(self.field(name)?).map_err(|_| DecodeError::InvalidField {
            field: name,
            expected: "emoji object",
        })
    }

    /// Decode the whole packet data into a payload type
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        if !self.data.is_object() {
            return Err(DecodeError::NotAnObject);
        }
        Ok(T::deserialize(&self.data)?)
    }
}

fn as_snowflake(name: &'static str, value: &Value) -> Result<Snowflake, DecodeError> {
    let invalid = DecodeError::InvalidField {
        field: name,
        expected: "snowflake",
    };
    match value {
        Value::String(s) => Snowflake::parse(s).map_err(|_| invalid),
        Value::Number(n) => n.as_u64().map(Snowflake::new).ok_or(invalid),
        _ => Err(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reaction_packet() -> Packet {
        Packet::new(
            "MESSAGE_REACTION_ADD",
            json!({
                "channel_id": "100",
                "message_id": 200,
                "user_id": "300",
                "guild_id": null,
                "emoji": { "id": null, "name": "👍" }
            }),
        )
    }

    #[test]
    fn test_from_json_envelope() {
        let packet = Packet::from_json(
            r#"{"op":0,"t":"MESSAGE_REACTION_REMOVE_ALL","s":42,"d":{"channel_id":"100","message_id":"200"}}"#,
        )
        .unwrap();

        assert_eq!(packet.event_type, "MESSAGE_REACTION_REMOVE_ALL");
        assert_eq!(packet.sequence, Some(42));
        assert_eq!(packet.snowflake("channel_id").unwrap(), Snowflake::new(100));
    }

    #[test]
    fn test_snowflake_accessors() {
        let packet = reaction_packet();
        assert_eq!(packet.snowflake("message_id").unwrap(), Snowflake::new(200));
        assert_eq!(packet.optional_snowflake("guild_id").unwrap(), None);
        assert_eq!(packet.optional_snowflake("missing").unwrap(), None);
        assert_eq!(
            packet.optional_snowflake("user_id").unwrap(),
            Some(Snowflake::new(300))
        );
    }

    #[test]
    fn test_missing_field() {
        let packet = reaction_packet();
        assert!(matches!(
            packet.snowflake("guild_id"),
            Err(DecodeError::MissingField("guild_id"))
        ));
    }

    #[test]
    fn test_invalid_field() {
        let packet = Packet::new("X", json!({ "channel_id": true, "name": 5 }));
        assert!(matches!(
            packet.snowflake("channel_id"),
            Err(DecodeError::InvalidField { field: "channel_id", .. })
        ));
        assert!(matches!(
            packet.str("name"),
            Err(DecodeError::InvalidField { field: "name", .. })
        ));
        assert!(matches!(
            packet.optional_snowflake("channel_id"),
            Err(DecodeError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_emoji_accessor() {
        let packet = reaction_packet();
        assert_eq!(packet.emoji("emoji").unwrap(), Emoji::unicode("👍"));

        let bad = Packet::new("X", json!({ "emoji": { "id": null, "name": null } }));
        assert!(matches!(
            bad.emoji("emoji"),
            Err(DecodeError::InvalidField { field: "emoji", .. })
        ));
    }

    #[test]
    fn test_non_object_data() {
        let packet = Packet::new("X", json!([1, 2, 3]));
        assert!(matches!(packet.field("a"), Err(DecodeError::NotAnObject)));
        assert!(matches!(
            packet.decode::<serde_json::Map<String, Value>>(),
            Err(DecodeError::NotAnObject)
        ));
    }
}
