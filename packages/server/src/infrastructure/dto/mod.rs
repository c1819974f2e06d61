//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by boundary:
//! - `websocket`: frames exchanged with clients
//! - `document`: documents persisted in the chat store

pub mod conversion;
pub mod document;
pub mod websocket;
