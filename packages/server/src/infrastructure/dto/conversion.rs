//! Conversion logic between DTOs and domain entities.

use crate::domain::{ChatMessage, InboundMessage, MessageId, Tag, Timestamp, ValidationError};
use crate::infrastructure::dto::{document::MessageDocument, websocket::MessageFrame};

// ========================================
// DTO → Domain Entity
// ========================================

/// Inbound frames drop `id` and `ts`; the server assigns both.
impl From<MessageFrame> for InboundMessage {
    fn from(frame: MessageFrame) -> Self {
        Self {
            tag: Tag::new(frame.tag),
            content: frame.content,
        }
    }
}

impl MessageDocument {
    /// Rebuild a domain message from a stored document and its storage key.
    pub fn into_message(self, id: String) -> Result<ChatMessage, ValidationError> {
        Ok(ChatMessage::new(
            MessageId::new(id)?,
            Tag::new(self.tag),
            self.content,
            Timestamp::new(self.ts),
        ))
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&ChatMessage> for MessageFrame {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            tag: message.tag.as_str().to_string(),
            content: message.content.clone(),
            ts: message.timestamp.value(),
        }
    }
}

impl From<&ChatMessage> for MessageDocument {
    fn from(message: &ChatMessage) -> Self {
        Self {
            tag: message.tag.as_str().to_string(),
            content: message.content.clone(),
            ts: message.timestamp.value(),
        }
    }
}
