//! Request handlers.

mod http;
mod websocket;

pub use http::{add_tag, delete_tag, health_check, index, list_tags, search};
pub use websocket::websocket_handler;
