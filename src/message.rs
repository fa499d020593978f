//! Chat message types
//!
//! Messages are immutable once written. The log is ordered by creation
//! timestamp, oldest first.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a message carries besides its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Audio,
}

impl MessageKind {
    /// Get the string representation of the message kind
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Audio => "audio",
        }
    }
}

impl FromStr for MessageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(MessageKind::Text),
            "image" | "img" | "photo" => Ok(MessageKind::Image),
            "audio" | "voice" => Ok(MessageKind::Audio),
            _ => Err(Error::InvalidValue(format!("Unknown message kind: {}", s))),
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry in the chat log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// UUID v4
    pub id: String,
    pub content: String,
    /// Unix epoch milliseconds
    pub timestamp: i64,
    /// `true` when sent by the local user, `false` when received
    pub from_user: bool,
    pub kind: MessageKind,
    pub image_uri: Option<String>,
    pub audio_uri: Option<String>,
}

impl ChatMessage {
    /// A message sent by the local user, stamped now
    pub fn sent(content: impl Into<String>, kind: MessageKind) -> Self {
        Self::stamped(content.into(), kind, true)
    }

    /// A message from the simulated peer, stamped now
    pub fn received(content: impl Into<String>, kind: MessageKind) -> Self {
        Self::stamped(content.into(), kind, false)
    }

    fn stamped(content: String, kind: MessageKind, from_user: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content,
            timestamp: chrono::Utc::now().timestamp_millis(),
            from_user,
            kind,
            image_uri: None,
            audio_uri: None,
        }
    }

    /// Attach an image reference
    pub fn with_image(mut self, uri: impl Into<String>) -> Self {
        self.image_uri = Some(uri.into());
        self
    }

    /// Attach an audio reference
    pub fn with_audio(mut self, uri: impl Into<String>) -> Self {
        self.audio_uri = Some(uri.into());
        self
    }

    /// Override the creation time
    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether the message has a media reference attached
    pub fn has_media(&self) -> bool {
        self.image_uri.is_some() || self.audio_uri.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_kind_roundtrip() {
        for kind in [MessageKind::Text, MessageKind::Image, MessageKind::Audio] {
            let parsed: MessageKind = kind.as_str().parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_message_kind_aliases() {
        assert_eq!(MessageKind::from_str("photo").unwrap(), MessageKind::Image);
        assert_eq!(MessageKind::from_str("VOICE").unwrap(), MessageKind::Audio);
        assert!(MessageKind::from_str("video").is_err());
    }

    #[test]
    fn test_sent_and_received_direction() {
        let sent = ChatMessage::sent("hi", MessageKind::Text);
        let received = ChatMessage::received("hello", MessageKind::Text);

        assert!(sent.from_user);
        assert!(!received.from_user);
        assert_ne!(sent.id, received.id);
        assert!(!sent.has_media());
        assert!(sent.clone().with_image("content://img/1").has_media());
    }
}
