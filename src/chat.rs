//! Chat simulator
//!
//! Sent messages come from the local user; "received" ones are produced on
//! demand from a fixed set of canned replies.

use rand::seq::IndexedRandom;
use crate::Result;
use crate::message::{ChatMessage, MessageKind};
use crate::storage::SharedStore;

/// Replies the simulated peer picks from
pub const CANNED_REPLIES: &[&str] = &[
    "Hello! How are you?",
    "That's interesting!",
    "I see what you mean.",
    "Thanks for sharing!",
    "Great to hear from you!",
    "What do you think about this?",
    "I agree with you.",
    "Let me know what you think.",
];

#[derive(Clone)]
pub struct ChatService {
    store: SharedStore,
}

impl ChatService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Send a message as the local user
    ///
    /// Blank text without any media is ignored and yields `None`.
    pub async fn send(
        &self,
        content: &str,
        kind: MessageKind,
        image_uri: Option<&str>,
        audio_uri: Option<&str>,
    ) -> Result<Option<ChatMessage>> {
        let mut message = ChatMessage::sent(content, kind);
        if let Some(uri) = image_uri {
            message = message.with_image(uri);
        }
        if let Some(uri) = audio_uri {
            message = message.with_audio(uri);
        }
        if content.trim().is_empty() && !message.has_media() {
            return Ok(None);
        }

        self.store.lock().await.insert_message(&message)?;
        tracing::debug!(id = %message.id, kind = %message.kind, "message sent");
        Ok(Some(message))
    }

    /// Record a text message from the simulated peer
    pub async fn simulate_received(&self, content: &str) -> Result<ChatMessage> {
        let message = ChatMessage::received(content, MessageKind::Text);
        self.store.lock().await.insert_message(&message)?;
        tracing::debug!(id = %message.id, "message received");
        Ok(message)
    }

    /// Record a random canned reply from the simulated peer
    pub async fn simulate_reply(&self) -> Result<ChatMessage> {
        let reply = CANNED_REPLIES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(CANNED_REPLIES[0]);
        self.simulate_received(reply).await
    }

    /// The full log, oldest first
    pub async fn messages(&self) -> Result<Vec<ChatMessage>> {
        self.store.lock().await.all_messages()
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.lock().await.clear_messages()?;
        tracing::info!("Chat history cleared");
        Ok(())
    }

    pub async fn count(&self) -> Result<usize> {
        self.store.lock().await.count_messages()
    }
}
