//! Entities

use serde::Serialize;

use super::value_object::{MessageId, Tag, Timestamp};

/// チャットメッセージ
///
/// Session Handler が受信時に ID と時刻を付与して作成する。作成後は不変。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub tag: Tag,
    pub content: String,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(id: MessageId, tag: Tag, content: String, timestamp: Timestamp) -> Self {
        Self {
            id,
            tag,
            content,
            timestamp,
        }
    }

    /// Tag-sync 用のアナウンス（本文を空にしたコピー）を作成
    ///
    /// タグ同期で送るのは「このタグのメッセージが存在する」という通知のみ。
    pub fn as_tag_announcement(&self) -> Self {
        Self {
            id: self.id.clone(),
            tag: self.tag.clone(),
            content: String::new(),
            timestamp: self.timestamp,
        }
    }
}

/// クライアントから受信したメッセージ（ID・時刻はまだ付与されていない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub tag: Tag,
    pub content: String,
}

impl InboundMessage {
    /// サーバー側で ID と時刻を付与して ChatMessage にする
    pub fn accept(self, id: MessageId, timestamp: Timestamp) -> ChatMessage {
        ChatMessage::new(id, self.tag, self.content, timestamp)
    }
}
