//! Value objects
//!
//! 不変で、値によって同一性が決まるオブジェクト群。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValidationError;

/// メッセージ ID
///
/// サーバーが受信時に採番する。クライアントから渡された値は使わない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// 既存の ID（ストレージのキーなど）から MessageId を作成
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyMessageId);
        }
        Ok(Self(value))
    }

    /// 新しい一意な MessageId を採番
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 接続ハンドル
///
/// Connection Registry のキー。WebSocket セッションごとに 1 つ採番される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix timestamp (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// タグ（ラベル）
///
/// 空文字列は「タグなし」を表す。比較は大文字小文字を区別する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag(String);

impl Tag {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn untagged() -> Self {
        Self(String::new())
    }

    pub fn is_untagged(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_rejects_blank_value() {
        // テスト項目: 空白のみの MessageId は作成できない
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = MessageId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValidationError::EmptyMessageId));
    }

    #[test]
    fn test_message_id_generate_is_unique() {
        // テスト項目: 採番された MessageId は毎回異なる
        // given (前提条件):

        // when (操作):
        let id1 = MessageId::generate();
        let id2 = MessageId::generate();

        // then (期待する結果):
        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_empty_tag_means_untagged() {
        // テスト項目: 空文字列のタグは「タグなし」として扱われる
        // given (前提条件):
        let empty = Tag::new(String::new());
        let nature = Tag::new("Природа".to_string());

        // when (操作):

        // then (期待する結果):
        assert!(empty.is_untagged());
        assert_eq!(empty, Tag::untagged());
        assert!(!nature.is_untagged());
    }

    #[test]
    fn test_timestamp_ordering() {
        // テスト項目: Timestamp は値の大小で比較できる
        // given (前提条件):
        let earlier = Timestamp::new(100);
        let later = Timestamp::new(105);

        // when (操作):

        // then (期待する結果):
        assert!(earlier < later);
        assert_eq!(earlier.max(later), later);
    }
}
