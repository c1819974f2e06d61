//! UseCase layer: orchestrates the registry, the pusher channels and the
//! storage collaborator for each relay operation.

pub mod broadcast_message;
pub mod connect_session;
pub mod disconnect_session;
pub mod error;
pub mod manage_tags;
pub mod receive_message;
pub mod search_messages;
pub mod sync_tags;

#[cfg(test)]
pub(crate) mod test_support;

pub use broadcast_message::{BroadcastReport, Broadcaster};
pub use connect_session::{ConnectSessionUseCase, ConnectedSession};
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{StartupError, TagError};
pub use manage_tags::{DEFAULT_TAGS, TagAdded, TagCatalog};
pub use receive_message::{ReceiveMessageUseCase, ReceivedMessage};
pub use search_messages::SearchMessagesUseCase;
pub use sync_tags::{CycleReport, TagSyncScheduler};
