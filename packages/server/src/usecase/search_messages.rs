//! UseCase: メッセージ全文検索

use std::sync::Arc;

use crate::domain::{ChatMessage, ChatStore, StoreError};

/// メッセージ検索のユースケース
pub struct SearchMessagesUseCase {
    store: Arc<dyn ChatStore>,
    limit: usize,
}

impl SearchMessagesUseCase {
    pub fn new(store: Arc<dyn ChatStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    /// タグと本文を対象に検索し、関連度順で最大 `limit` 件を返す。空のクエリは空の結果。
    pub async fn execute(&self, query: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let hits = self.store.search_messages(query, self.limit).await?;
        tracing::debug!("Search '{}' returned {} hits", query, hits.len());
        Ok(hits)
    }
}
