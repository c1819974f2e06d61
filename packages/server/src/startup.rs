//! Dependency wiring shared by the binary and the integration tests.

use std::{sync::Arc, time::Duration};

use tagrelay_shared::time::Clock;

use crate::{
    config::{HISTORY_REPLAY_SIZE, SEARCH_PAGE_SIZE, StorageConfig, TAG_SYNC_PAGE_SIZE},
    domain::ChatStore,
    infrastructure::{
        registry::ConnectionRegistry,
        store::{InMemoryChatStore, OpenSearchChatStore},
    },
    ui::state::AppState,
    usecase::{
        Broadcaster, ConnectSessionUseCase, DisconnectSessionUseCase, ReceiveMessageUseCase,
        SearchMessagesUseCase, StartupError, TagCatalog, TagSyncScheduler,
    },
};

/// Everything a running relay needs
pub struct Relay {
    pub state: Arc<AppState>,
    pub scheduler: Arc<TagSyncScheduler>,
}

/// Create the configured storage backend.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn ChatStore>, StartupError> {
    match config {
        StorageConfig::InMemory => {
            tracing::info!("Using in-memory storage (OPENSEARCH_URL not set)");
            Ok(Arc::new(InMemoryChatStore::new()))
        }
        StorageConfig::OpenSearch(opensearch) => {
            tracing::info!("Using OpenSearch storage at {}", opensearch.url);
            let store =
                OpenSearchChatStore::new(opensearch.clone()).map_err(StartupError::StoreClient)?;
            Ok(Arc::new(store))
        }
    }
}

/// Prepare storage and wire the use cases.
///
/// Fails before anything is served if the schema cannot be created or the
/// tag catalog cannot be loaded.
pub async fn build(
    store: Arc<dyn ChatStore>,
    clock: Arc<dyn Clock>,
    sync_interval: Duration,
) -> Result<Relay, StartupError> {
    // 1. Storage
    store.ensure_schema().await.map_err(StartupError::Schema)?;
    let tag_catalog = Arc::new(
        TagCatalog::load(store.clone())
            .await
            .map_err(StartupError::Tags)?,
    );

    // 2. Registry and broadcast engine
    let registry = Arc::new(ConnectionRegistry::new());
    let broadcaster = Arc::new(Broadcaster::new(registry.clone()));

    // 3. UseCases
    let connect_session = Arc::new(ConnectSessionUseCase::new(
        registry.clone(),
        store.clone(),
        clock.clone(),
        HISTORY_REPLAY_SIZE,
    ));
    let receive_message = Arc::new(ReceiveMessageUseCase::new(
        store.clone(),
        broadcaster,
        clock.clone(),
    ));
    let disconnect_session = Arc::new(DisconnectSessionUseCase::new(registry.clone()));
    let search_messages = Arc::new(SearchMessagesUseCase::new(store.clone(), SEARCH_PAGE_SIZE));

    // 4. Scheduler
    let scheduler = Arc::new(TagSyncScheduler::new(
        store,
        registry,
        clock,
        sync_interval,
        TAG_SYNC_PAGE_SIZE,
    ));

    let state = Arc::new(AppState {
        connect_session,
        receive_message,
        disconnect_session,
        tag_catalog,
        search_messages,
    });

    Ok(Relay { state, scheduler })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockChatStore, StoreError};
    use tagrelay_shared::time::FixedClock;

    #[tokio::test]
    async fn test_build_fails_when_schema_cannot_be_created() {
        // テスト項目: スキーマ作成に失敗した場合は起動エラーになる
        // given (前提条件):
        let mut store = MockChatStore::new();
        store
            .expect_ensure_schema()
            .returning(|| Err(StoreError::Unavailable("connection refused".to_string())));
        store.expect_load_tags().never();

        // when (操作):
        let result = build(
            Arc::new(store),
            Arc::new(FixedClock::new(0)),
            Duration::from_secs(30),
        )
        .await;

        // then (期待する結果):
        assert!(matches!(result, Err(StartupError::Schema(_))));
    }

    #[tokio::test]
    async fn test_build_seeds_tags_on_fresh_store() {
        // テスト項目: 空のストアで起動すると初期タグが読み込まれる
        // given (前提条件):
        let store = Arc::new(InMemoryChatStore::new());

        // when (操作):
        let relay = build(store, Arc::new(FixedClock::new(0)), Duration::from_secs(30))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(relay.state.tag_catalog.list().await.len(), 5);
    }

    #[test]
    fn test_open_store_defaults_to_in_memory() {
        // テスト項目: OpenSearch の設定が無ければインメモリストアが使われる
        // given (前提条件):
        let config = StorageConfig::InMemory;

        // when (操作):
        let store = open_store(&config);

        // then (期待する結果):
        assert!(store.is_ok());
    }
}
