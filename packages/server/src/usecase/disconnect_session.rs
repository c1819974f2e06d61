//! UseCase: セッション切断処理

use std::sync::Arc;

use crate::{domain::ConnectionId, infrastructure::registry::ConnectionRegistry};

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<ConnectionRegistry>,
}

impl DisconnectSessionUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 接続の登録を解除する
    ///
    /// 送信失敗で既に削除されている場合もあるため冪等。削除した場合は `true`。
    pub async fn execute(&self, id: ConnectionId) -> bool {
        let removed = self.registry.unregister(&id).await;
        tracing::info!("Session '{}' closed (was registered: {})", id, removed);
        removed
    }
}
