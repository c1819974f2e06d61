//! Infrastructure layer: concrete collaborators for the domain traits and
//! the in-memory connection registry.

pub mod dto;
pub mod message_pusher;
pub mod registry;
pub mod store;
