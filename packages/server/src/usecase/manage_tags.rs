//! UseCase: タグカタログ管理
//!
//! プロセス全体で 1 つのタグ一覧を保持します。
//!
//! - 変更（add / remove）は必ず「ストア → メモリ」の順で反映する。
//!   ストアが拒否したタグがメモリ上に見えることはない。
//! - 変更操作どうしは `write_gate` で直列化し、同時追加による更新の消失を防ぐ。
//! - 読み取り（list / contains）はストア呼び出し中でもブロックされない。

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::ChatStore;

use super::error::TagError;

/// ストアにタグ一覧が無いときに使う初期タグ
pub const DEFAULT_TAGS: [&str; 5] = ["Природа", "Космос", "Животные", "Технологии", "Интернет"];

/// add の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAdded {
    Added,
    /// 大文字小文字を無視して同じタグが既に存在した
    AlreadyPresent,
}

pub struct TagCatalog {
    store: Arc<dyn ChatStore>,
    tags: Mutex<Vec<String>>,
    write_gate: Mutex<()>,
}

impl TagCatalog {
    /// Load the tag list from the store, seeding the defaults when none is stored.
    pub async fn load(store: Arc<dyn ChatStore>) -> Result<Self, TagError> {
        let tags = match store.load_tags().await? {
            Some(tags) => {
                tracing::info!("Loaded {} tags from storage", tags.len());
                tags
            }
            None => {
                let seed: Vec<String> = DEFAULT_TAGS.iter().map(|t| t.to_string()).collect();
                store.save_tags(&seed).await?;
                tracing::info!("Seeded default tag list ({} tags)", seed.len());
                seed
            }
        };

        Ok(Self {
            store,
            tags: Mutex::new(tags),
            write_gate: Mutex::new(()),
        })
    }

    /// 現在のタグ一覧（登録順）
    pub async fn list(&self) -> Vec<String> {
        self.tags.lock().await.clone()
    }

    pub async fn add(&self, name: &str) -> Result<TagAdded, TagError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TagError::EmptyName);
        }

        let _writer = self.write_gate.lock().await;
        let mut pending = self.list().await;
        if contains_ignore_case(&pending, name) {
            return Ok(TagAdded::AlreadyPresent);
        }
        pending.push(name.to_string());

        self.store.save_tags(&pending).await?;
        *self.tags.lock().await = pending;
        tracing::info!("Tag '{}' added", name);
        Ok(TagAdded::Added)
    }

    /// 完全一致するタグを削除する。存在しなかった場合は `false`。
    pub async fn remove(&self, name: &str) -> Result<bool, TagError> {
        let _writer = self.write_gate.lock().await;
        let mut pending = self.list().await;
        let Some(position) = pending.iter().position(|tag| tag == name) else {
            return Ok(false);
        };
        pending.remove(position);

        self.store.save_tags(&pending).await?;
        *self.tags.lock().await = pending;
        tracing::info!("Tag '{}' removed", name);
        Ok(true)
    }
}

fn contains_ignore_case(tags: &[String], name: &str) -> bool {
    let needle = name.to_lowercase();
    tags.iter().any(|tag| tag.to_lowercase() == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockChatStore, StoreError},
        infrastructure::store::InMemoryChatStore,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 起動時の読み込みと初期タグの投入
    // - 追加（空白除去・空文字拒否・大文字小文字を無視した重複）
    // - 削除（完全一致）
    // - ストアが拒否した変更がメモリに反映されないこと
    // ========================================

    async fn catalog_with(tags: &[&str]) -> (Arc<InMemoryChatStore>, TagCatalog) {
        let store = Arc::new(InMemoryChatStore::new());
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        store.save_tags(&tags).await.unwrap();
        let catalog = TagCatalog::load(store.clone()).await.unwrap();
        (store, catalog)
    }

    #[tokio::test]
    async fn test_load_seeds_defaults_when_store_is_empty() {
        // テスト項目: ストアにタグ一覧が無ければ初期タグが保存され、使われる
        // given (前提条件):
        let store = Arc::new(InMemoryChatStore::new());

        // when (操作):
        let catalog = TagCatalog::load(store.clone()).await.unwrap();

        // then (期待する結果):
        let expected: Vec<String> = DEFAULT_TAGS.iter().map(|t| t.to_string()).collect();
        assert_eq!(catalog.list().await, expected);
        assert_eq!(store.load_tags().await.unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn test_load_uses_stored_list() {
        // テスト項目: ストアにタグ一覧があればそれを使う
        // given (前提条件):
        let (_, catalog) = catalog_with(&["Rust", "Go"]).await;

        // when (操作):
        let tags = catalog.list().await;

        // then (期待する結果):
        assert_eq!(tags, vec!["Rust", "Go"]);
    }

    #[tokio::test]
    async fn test_load_fails_when_store_is_unreachable() {
        // テスト項目: ストアに到達できない場合は起動エラーになる
        // given (前提条件):
        let mut store = MockChatStore::new();
        store
            .expect_load_tags()
            .returning(|| Err(StoreError::Unavailable("down".to_string())));

        // when (操作):
        let result = TagCatalog::load(Arc::new(store)).await;

        // then (期待する結果):
        assert!(matches!(result, Err(TagError::Store(StoreError::Unavailable(_)))));
    }

    #[tokio::test]
    async fn test_add_trims_and_persists_before_memory() {
        // テスト項目: 追加したタグは空白が除去され、ストアとメモリの両方に反映される
        // given (前提条件):
        let (store, catalog) = catalog_with(&["Космос"]).await;

        // when (操作):
        let added = catalog.add("  Rust  ").await.unwrap();

        // then (期待する結果):
        assert_eq!(added, TagAdded::Added);
        assert_eq!(catalog.list().await, vec!["Космос", "Rust"]);
        assert_eq!(
            store.load_tags().await.unwrap(),
            Some(vec!["Космос".to_string(), "Rust".to_string()])
        );
    }

    #[tokio::test]
    async fn test_add_case_insensitive_duplicate_is_noop() {
        // テスト項目: 大文字小文字だけが異なるタグの追加は何もしない
        // given (前提条件):
        let (_, catalog) = catalog_with(&["Космос"]).await;

        // when (操作):
        let added = catalog.add("КОСМОС").await.unwrap();

        // then (期待する結果):
        assert_eq!(added, TagAdded::AlreadyPresent);
        assert_eq!(catalog.list().await, vec!["Космос"]);
    }

    #[tokio::test]
    async fn test_add_rejects_blank_name() {
        // テスト項目: 空白だけのタグ名は拒否される
        // given (前提条件):
        let (_, catalog) = catalog_with(&[]).await;

        // when (操作):
        let result = catalog.add("   ").await;

        // then (期待する結果):
        assert_eq!(result, Err(TagError::EmptyName));
        assert!(catalog.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_add_leaves_memory_unchanged() {
        // テスト項目: ストアが保存を拒否した場合、メモリ上のタグ一覧は変わらない
        // given (前提条件):
        let mut store = MockChatStore::new();
        store
            .expect_load_tags()
            .returning(|| Ok(Some(vec!["Космос".to_string()])));
        store
            .expect_save_tags()
            .returning(|_| Err(StoreError::Rejected { status: 409, body: "conflict".to_string() }));
        let catalog = TagCatalog::load(Arc::new(store)).await.unwrap();

        // when (操作):
        let result = catalog.add("Rust").await;

        // then (期待する結果):
        assert!(matches!(result, Err(TagError::Store(_))));
        assert_eq!(catalog.list().await, vec!["Космос"]);
    }

    #[tokio::test]
    async fn test_remove_requires_exact_match() {
        // テスト項目: 削除は完全一致したタグだけが対象
        // given (前提条件):
        let (store, catalog) = catalog_with(&["Космос", "Rust"]).await;

        // when (操作):
        let case_mismatch = catalog.remove("rust").await.unwrap();
        let exact = catalog.remove("Rust").await.unwrap();

        // then (期待する結果):
        assert!(!case_mismatch);
        assert!(exact);
        assert_eq!(catalog.list().await, vec!["Космос"]);
        assert_eq!(
            store.load_tags().await.unwrap(),
            Some(vec!["Космос".to_string()])
        );
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        // テスト項目: 同時に追加しても全てのタグが残る
        // given (前提条件):
        let (_, catalog) = catalog_with(&[]).await;
        let catalog = Arc::new(catalog);

        // when (操作):
        let mut handles = Vec::new();
        for i in 0..8 {
            let catalog = catalog.clone();
            handles.push(tokio::spawn(async move { catalog.add(&format!("tag-{i}")).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // then (期待する結果):
        assert_eq!(catalog.list().await.len(), 8);
    }
}
