//! Decoding of inbound PubSub frames
//!
//! The wire format is two layers of JSON: an outer envelope with a `type`
//! discriminator, and, when the discriminator is `MESSAGE`, an inner payload
//! that is itself JSON-encoded text. The payload stays opaque to the envelope
//! decode and may carry message kinds other than `viewcount`, which are
//! ignored. The two decode stages are deliberately kept separate.

use serde::Deserialize;

use crate::types::{MonitorError, Result};

/// Outer wire message from the PubSub connection
#[derive(Debug, Deserialize)]
pub struct PubSubEnvelope {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub data: Option<EnvelopeData>,
}

/// Payload of a `MESSAGE` envelope
#[derive(Debug, Deserialize)]
pub struct EnvelopeData {
    pub topic: String,
    /// Inner payload, still JSON-encoded text at this stage
    pub message: String,
}

/// Decoded inner payload of a data message
#[derive(Debug, Deserialize)]
pub struct ViewCountEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Absent on non-viewcount kinds sharing the topic (stream-up, stream-down)
    #[serde(default)]
    pub viewers: u64,
}

/// Parser for inbound PubSub frames
pub struct MessageParser;

impl MessageParser {
    /// Parse one raw text frame, returning the viewer count it carries.
    ///
    /// Returns `Ok(None)` for frames that are valid but carry no count:
    /// control frames (`PONG`, `RESPONSE`, `RECONNECT`) and data messages of
    /// kinds other than `viewcount`. Returns an error for malformed frames;
    /// the caller drops those and keeps reading.
    pub fn parse_frame(raw: &str) -> Result<Option<u64>> {
        let envelope: PubSubEnvelope = serde_json::from_str(raw)?;

        if envelope.message_type != "MESSAGE" {
            return Ok(None);
        }

        let data = envelope
            .data
            .ok_or_else(|| MonitorError::InvalidFrame("MESSAGE frame without data".to_string()))?;

        let event: ViewCountEvent = serde_json::from_str(&data.message)?;

        if event.event_type == "viewcount" {
            Ok(Some(event.viewers))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewcount_message_yields_count() {
        let raw = r#"{"type":"MESSAGE","data":{"topic":"video-playback-by-id.42","message":"{\"type\":\"viewcount\",\"viewers\":1337}"}}"#;
        assert_eq!(MessageParser::parse_frame(raw).unwrap(), Some(1337));
    }

    #[test]
    fn other_event_kinds_are_ignored() {
        let raw = r#"{"type":"MESSAGE","data":{"topic":"video-playback-by-id.42","message":"{\"type\":\"other\",\"viewers\":5}"}}"#;
        assert_eq!(MessageParser::parse_frame(raw).unwrap(), None);
    }

    #[test]
    fn control_frames_are_ignored() {
        assert_eq!(MessageParser::parse_frame(r#"{"type":"PONG"}"#).unwrap(), None);
        assert_eq!(
            MessageParser::parse_frame(r#"{"type":"RESPONSE","error":"","nonce":"n"}"#).unwrap(),
            None
        );
        assert_eq!(
            MessageParser::parse_frame(r#"{"type":"RECONNECT"}"#).unwrap(),
            None
        );
    }

    #[test]
    fn malformed_outer_json_is_an_error() {
        assert!(MessageParser::parse_frame("not json").is_err());
        assert!(MessageParser::parse_frame("").is_err());
    }

    #[test]
    fn message_without_data_is_an_error() {
        let err = MessageParser::parse_frame(r#"{"type":"MESSAGE"}"#).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidFrame(_)));
    }

    #[test]
    fn malformed_inner_payload_is_an_error() {
        let raw = r#"{"type":"MESSAGE","data":{"topic":"t","message":"{broken"}}"#;
        assert!(matches!(
            MessageParser::parse_frame(raw).unwrap_err(),
            MonitorError::Decode(_)
        ));
    }

    #[test]
    fn stream_up_payload_without_viewers_is_ignored() {
        // stream-up/stream-down events on the same topic lack a viewers field
        let raw = r#"{"type":"MESSAGE","data":{"topic":"t","message":"{\"type\":\"stream-up\",\"play_delay\":0}"}}"#;
        assert_eq!(MessageParser::parse_frame(raw).unwrap(), None);
    }
}
