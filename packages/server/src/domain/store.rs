//! ChatStore trait 定義
//!
//! 永続化と全文検索を担う外部コラボレータ（ドキュメントストア）の境界。
//! メッセージは `chat` コレクション、タグ一覧は `tags` コレクションに保存される。

use async_trait::async_trait;

use super::{ChatMessage, StoreError, Timestamp};

/// チャットメッセージとタグ一覧のストア
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// 必要なコレクション（インデックス）を作成する。既に存在する場合は成功扱い。
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// メッセージを保存する（ID がキー、本文・タグ・時刻がドキュメント）
    async fn insert_message(&self, message: &ChatMessage) -> Result<(), StoreError>;

    /// 最新のメッセージを時刻の降順で最大 `limit` 件取得する
    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError>;

    /// `until` 以前のタグ付きメッセージを時刻の降順で最大 `limit` 件取得する
    async fn tagged_messages_until(
        &self,
        until: Timestamp,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError>;

    /// タグ（重み 2）と本文を対象に全文検索する。関連度順。
    async fn search_messages(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError>;

    /// 保存済みのタグ一覧を取得する。未作成の場合は `None`。
    async fn load_tags(&self) -> Result<Option<Vec<String>>, StoreError>;

    /// タグ一覧を丸ごと保存する
    async fn save_tags(&self, tags: &[String]) -> Result<(), StoreError>;
}
