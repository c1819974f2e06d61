//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};

/// One chat frame on the wire, in both directions.
///
/// Inbound frames only need `content` (and optionally `tag`); `id` and `ts`
/// are accepted but always overwritten by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFrame {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tag: String,
    pub content: String,
    #[serde(default)]
    pub ts: i64,
}
