//! Per-connection update watermarks.
//!
//! Pure functions over `ConnectionRecord`, kept free of I/O so the
//! catch-up window rules are easy to test in isolation.

use super::{ChatMessage, Timestamp};

/// Two-dimensional watermark of one live connection.
///
/// A connection is *behind* exactly when `last_message > last_tag`: the
/// tag-sync scheduler still owes it the window `(last_tag, last_message]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRecord {
    /// Timestamp of the newest message delivered by broadcast.
    pub last_message: Timestamp,
    /// Timestamp up to which the tag-sync scheduler has caught this connection up.
    pub last_tag: Timestamp,
}

impl ConnectionRecord {
    /// Both watermarks start at the connection-accept time.
    pub fn new(connected_at: Timestamp) -> Self {
        Self {
            last_message: connected_at,
            last_tag: connected_at,
        }
    }

    pub fn is_behind(&self) -> bool {
        self.last_message > self.last_tag
    }

    /// `(last_tag, last_message]`
    pub fn in_update_window(&self, ts: Timestamp) -> bool {
        self.last_tag < ts && ts <= self.last_message
    }

    /// Record a successful broadcast delivery. Never moves the message watermark backwards.
    pub fn with_message_delivered(self, ts: Timestamp) -> Self {
        Self {
            last_message: self.last_message.max(ts),
            ..self
        }
    }

    /// Record a completed tag-sync pass.
    pub fn with_tag_synced(self, cycle_watermark: Timestamp) -> Self {
        Self {
            last_tag: cycle_watermark,
            ..self
        }
    }
}

/// Select the fetched messages that fall into the connection's catch-up window.
///
/// Returns an empty list when the connection is not behind. The relative
/// order of `messages` is preserved.
pub fn messages_in_window<'a>(
    record: &ConnectionRecord,
    messages: &'a [ChatMessage],
) -> Vec<&'a ChatMessage> {
    if !record.is_behind() {
        return Vec::new();
    }
    messages
        .iter()
        .filter(|message| record.in_update_window(message.timestamp))
        .collect()
}
