//! HTTP / WebSocket surface of the relay.

mod handler;
mod html;
mod server;
mod signal;
pub mod state;

pub use server::{Server, router};
pub use signal::shutdown_signal;
