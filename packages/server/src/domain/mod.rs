//! Domain layer: entities, value objects, pure watermark logic and the
//! interfaces the relay needs from its collaborators.
//!
//! Concrete implementations of `ChatStore` and `MessagePusher` live in the
//! infrastructure layer (dependency inversion).

pub mod entity;
pub mod error;
pub mod pusher;
pub mod store;
pub mod value_object;
pub mod watermark;

pub use entity::{ChatMessage, InboundMessage};
pub use error::{PushError, StoreError, ValidationError};
pub use pusher::{MessagePusher, PusherChannel};
pub use store::ChatStore;
#[cfg(test)]
pub use store::MockChatStore;
pub use value_object::{ConnectionId, MessageId, Tag, Timestamp};
pub use watermark::{ConnectionRecord, messages_in_window};
