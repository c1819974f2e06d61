//! UseCase: セッション接続処理
//!
//! 1. 接続を Registry に登録（両ウォーターマーク = 接続時刻）
//! 2. 最新 N 件の履歴を時系列順（古い順）でこの接続にだけ送信
//!
//! 履歴リプレイはウォーターマークに影響しません。
//! 履歴の取得は `HISTORY_LOAD_TIMEOUT` で打ち切り、空の履歴として扱います。
//! リプレイが終わるまで他の送信者はこの接続への push を待つためです。

use std::sync::Arc;

use tagrelay_shared::time::{Clock, timestamp_to_rfc3339};

use crate::{
    config::HISTORY_LOAD_TIMEOUT,
    domain::{ChatMessage, ChatStore, ConnectionId, PushError, PusherChannel, Timestamp},
    infrastructure::registry::ConnectionRegistry,
};

/// 接続が確立したセッションの情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedSession {
    pub id: ConnectionId,
    pub connected_at: Timestamp,
    /// リプレイした履歴の件数
    pub replayed: usize,
}

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn ChatStore>,
    clock: Arc<dyn Clock>,
    history_size: usize,
}

impl ConnectSessionUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        store: Arc<dyn ChatStore>,
        clock: Arc<dyn Clock>,
        history_size: usize,
    ) -> Self {
        Self {
            registry,
            store,
            clock,
            history_size,
        }
    }

    /// 新しい接続を登録して履歴をリプレイする
    ///
    /// 履歴の送信に失敗した場合、接続は登録解除されエラーを返す。
    /// 履歴の取得に失敗した場合、または時間内に終わらない場合は空の履歴として扱う。
    pub async fn execute(&self, pusher: PusherChannel) -> Result<ConnectedSession, PushError> {
        let id = ConnectionId::generate();
        let connected_at = Timestamp::new(self.clock.now_unix_secs());

        self.registry
            .register(id, Arc::clone(&pusher), connected_at)
            .await;
        tracing::info!(
            "Session '{}' connected at {}",
            id,
            timestamp_to_rfc3339(connected_at.value()).unwrap_or_else(|| connected_at.value().to_string())
        );

        let history = self.load_history(id).await;

        if let Err(e) = pusher.push_history(&history).await {
            tracing::warn!("Failed to replay history to '{}': {}", id, e);
            self.registry.unregister(&id).await;
            return Err(e);
        }

        Ok(ConnectedSession {
            id,
            connected_at,
            replayed: history.len(),
        })
    }

    /// 直近の履歴を時系列順（古い順）で返す
    async fn load_history(&self, id: ConnectionId) -> Vec<ChatMessage> {
        let loaded =
            tokio::time::timeout(HISTORY_LOAD_TIMEOUT, self.store.recent_messages(self.history_size)).await;
        let mut history = match loaded {
            Ok(Ok(history)) => history,
            Ok(Err(e)) => {
                tracing::warn!("Failed to load history for '{}': {}", id, e);
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    "History query for '{}' did not finish within {:?}",
                    id,
                    HISTORY_LOAD_TIMEOUT
                );
                Vec::new()
            }
        };
        // newest first → chronological
        history.reverse();
        history
    }
}
