//! InMemory ChatStore 実装
//!
//! ドメイン層が定義する ChatStore trait の具体的な実装。
//! Vec をインメモリ DB として使用します。プロセス終了でデータは失われます。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, ChatStore, StoreError, Timestamp};

/// インメモリ ChatStore 実装
#[derive(Default)]
pub struct InMemoryChatStore {
    /// 挿入順のメッセージ
    messages: Mutex<Vec<ChatMessage>>,
    /// タグ一覧ドキュメント（未作成なら None）
    tags: Mutex<Option<Vec<String>>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first by timestamp; among equal timestamps the later insert comes first.
    async fn newest_first<P>(&self, predicate: P, limit: usize) -> Vec<ChatMessage>
    where
        P: Fn(&ChatMessage) -> bool,
    {
        let messages = self.messages.lock().await;
        let mut selected: Vec<ChatMessage> = messages
            .iter()
            .rev()
            .filter(|message| predicate(message))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        selected.truncate(limit);
        selected
    }
}

/// Relevance of `message` for the lowercased query terms: tag hits weigh double.
fn score(message: &ChatMessage, terms: &[String]) -> usize {
    let tag = message.tag.as_str().to_lowercase();
    let content = message.content.to_lowercase();
    terms
        .iter()
        .map(|term| {
            let tag_hit = if tag.contains(term.as_str()) { 2 } else { 0 };
            let content_hit = usize::from(content.contains(term.as_str()));
            tag_hit + content_hit
        })
        .sum()
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_message(&self, message: &ChatMessage) -> Result<(), StoreError> {
        let mut messages = self.messages.lock().await;
        match messages.iter_mut().find(|stored| stored.id == message.id) {
            Some(stored) => *stored = message.clone(),
            None => messages.push(message.clone()),
        }
        Ok(())
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self.newest_first(|_| true, limit).await)
    }

    async fn tagged_messages_until(
        &self,
        until: Timestamp,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self
            .newest_first(
                |message| message.timestamp <= until && !message.tag.is_untagged(),
                limit,
            )
            .await)
    }

    async fn search_messages(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let messages = self.messages.lock().await;
        let mut hits: Vec<(usize, &ChatMessage)> = messages
            .iter()
            .rev()
            .map(|message| (score(message, &terms), message))
            .filter(|(score, _)| *score > 0)
            .collect();
        hits.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .cmp(score_a)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        Ok(hits
            .into_iter()
            .take(limit)
            .map(|(_, message)| message.clone())
            .collect())
    }

    async fn load_tags(&self) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.tags.lock().await.clone())
    }

    async fn save_tags(&self, tags: &[String]) -> Result<(), StoreError> {
        *self.tags.lock().await = Some(tags.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageId, Tag};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 最新 N 件（時刻の降順）の取得
    // - 「時刻 <= X かつタグあり」の取得
    // - タグを重み付けした全文検索
    // - タグ一覧ドキュメントの保存と読み込み
    // ========================================

    fn message(id: &str, tag: &str, content: &str, ts: i64) -> ChatMessage {
        ChatMessage::new(
            MessageId::new(id.to_string()).unwrap(),
            Tag::new(tag.to_string()),
            content.to_string(),
            Timestamp::new(ts),
        )
    }

    async fn seeded_store() -> InMemoryChatStore {
        let store = InMemoryChatStore::new();
        for msg in [
            message("a", "", "first", 100),
            message("b", "Космос", "rocket launch", 110),
            message("c", "", "rocket science", 120),
            message("d", "Природа", "forest walk", 130),
            message("e", "", "latest", 140),
        ] {
            store.insert_message(&msg).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_recent_messages_newest_first_with_limit() {
        // テスト項目: 最新のメッセージが時刻の降順で limit 件まで返される
        // given (前提条件):
        let store = seeded_store().await;

        // when (操作):
        let recent = store.recent_messages(3).await.unwrap();

        // then (期待する結果):
        let ids: Vec<&str> = recent.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["e", "d", "c"]);
    }

    #[tokio::test]
    async fn test_tagged_messages_until_filters_untagged_and_future() {
        // テスト項目: タグなしと指定時刻より新しいメッセージは除外される
        // given (前提条件):
        let store = seeded_store().await;

        // when (操作):
        let tagged = store
            .tagged_messages_until(Timestamp::new(125), 10)
            .await
            .unwrap();

        // then (期待する結果):
        let ids: Vec<&str> = tagged.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn test_insert_same_id_replaces_document() {
        // テスト項目: 同じ ID での保存はドキュメントを置き換える
        // given (前提条件):
        let store = seeded_store().await;

        // when (操作):
        store
            .insert_message(&message("a", "Интернет", "first", 100))
            .await
            .unwrap();

        // then (期待する結果):
        let recent = store.recent_messages(10).await.unwrap();
        assert_eq!(recent.len(), 5);
        let a = recent.iter().find(|m| m.id.as_str() == "a").unwrap();
        assert_eq!(a.tag.as_str(), "Интернет");
    }

    #[tokio::test]
    async fn test_search_ranks_tag_matches_above_content_matches() {
        // テスト項目: タグに一致したメッセージが本文のみの一致より上位になる
        // given (前提条件):
        let store = seeded_store().await;
        store
            .insert_message(&message("f", "rocket", "unrelated", 90))
            .await
            .unwrap();

        // when (操作):
        let hits = store.search_messages("Rocket", 10).await.unwrap();

        // then (期待する結果):
        let ids: Vec<&str> = hits.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["f", "c", "b"]);
    }

    #[tokio::test]
    async fn test_search_with_blank_query_returns_nothing() {
        // テスト項目: 空のクエリでは何も返されない
        // given (前提条件):
        let store = seeded_store().await;

        // when (操作):
        let hits = store.search_messages("   ", 10).await.unwrap();

        // then (期待する結果):
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_tag_list_document_round_trip() {
        // テスト項目: タグ一覧は未作成なら None、保存後は保存した内容が返される
        // given (前提条件):
        let store = InMemoryChatStore::new();
        assert_eq!(store.load_tags().await.unwrap(), None);

        // when (操作):
        let tags = vec!["Космос".to_string(), "Природа".to_string()];
        store.save_tags(&tags).await.unwrap();

        // then (期待する結果):
        assert_eq!(store.load_tags().await.unwrap(), Some(tags));
    }
}
