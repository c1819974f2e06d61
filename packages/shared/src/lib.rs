//! Shared utilities for the tag relay workspace.

pub mod logger;
pub mod time;
