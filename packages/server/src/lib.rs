//! Tagged chat relay library.
//!
//! Clients connect over WebSocket, receive every message broadcast to all
//! connected clients, and are periodically caught up on tagged messages by a
//! background scheduler.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
pub mod startup;
