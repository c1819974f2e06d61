//! In-memory Connection Registry
//!
//! ## 責務
//!
//! - 接続中の各 WebSocket 接続と、その 2 次元ウォーターマーク（ConnectionRecord）を保持
//! - register / unregister / for_each を 1 つのクリティカルセクション内で実行
//!
//! ## 設計ノート
//!
//! ネットワーク送信やストレージ呼び出しの間はロックを保持しません。
//! Broadcast Engine と Tag-Sync Scheduler は `for_each` で送信対象のスナップショットを取り、
//! ロックを外して送信し、結果を再度 `for_each` で反映します。
//! その間に削除された接続は、結果反映時に存在しないため復活しません。

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConnectionRecord, PusherChannel, Timestamp};

/// `for_each` のコールバックが返す、1 接続に対する処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// レコードを変更しない
    Keep,
    /// レコードを置き換える
    Update(ConnectionRecord),
    /// 接続が死んでいるので登録を削除する
    Remove,
}

/// `for_each` 中に見える 1 接続分のビュー
pub struct ConnectionView<'a> {
    pub id: ConnectionId,
    pub pusher: &'a PusherChannel,
    pub record: ConnectionRecord,
}

struct ConnectionEntry {
    pusher: PusherChannel,
    record: ConnectionRecord,
}

/// 接続レジストリ（プロセス内・インメモリ）
///
/// 再起動で失われる。再接続したクライアントは新しいレコードで登録される。
#[derive(Default)]
pub struct ConnectionRegistry {
    /// Key: ConnectionId
    /// Value: 送信チャンネルとウォーターマーク
    connections: Mutex<HashMap<ConnectionId, ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続を登録する。両ウォーターマークは `connected_at` で初期化される。
    ///
    /// 同じ ID が既に登録されている場合は、新しいウォーターマークで上書きする
    /// （配信が重複することはない）。上書きした場合は `true` を返す。
    pub async fn register(
        &self,
        id: ConnectionId,
        pusher: PusherChannel,
        connected_at: Timestamp,
    ) -> bool {
        let mut connections = self.connections.lock().await;
        let replaced = connections
            .insert(
                id,
                ConnectionEntry {
                    pusher,
                    record: ConnectionRecord::new(connected_at),
                },
            )
            .is_some();
        tracing::debug!(
            "Connection '{}' registered (replaced: {}, total: {})",
            id,
            replaced,
            connections.len()
        );
        replaced
    }

    /// 接続の登録を削除する。既に削除済みでもエラーにはならない（冪等）。
    pub async fn unregister(&self, id: &ConnectionId) -> bool {
        let mut connections = self.connections.lock().await;
        let removed = connections.remove(id).is_some();
        if removed {
            tracing::debug!(
                "Connection '{}' unregistered (remaining: {})",
                id,
                connections.len()
            );
        }
        removed
    }

    /// 全接続に対してコールバックを 1 つのクリティカルセクション内で実行する
    ///
    /// コールバックの戻り値に応じてレコードを維持・置換・削除する。
    /// コールバック内で await はできない（ロック中に送信しないため）。
    pub async fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(ConnectionView<'_>) -> Visit,
    {
        let mut connections = self.connections.lock().await;
        connections.retain(|id, entry| {
            let view = ConnectionView {
                id: *id,
                pusher: &entry.pusher,
                record: entry.record,
            };
            match f(view) {
                Visit::Keep => true,
                Visit::Update(record) => {
                    entry.record = record;
                    true
                }
                Visit::Remove => {
                    tracing::info!("Connection '{}' pruned from registry", id);
                    false
                }
            }
        });
    }

    /// 指定した接続の現在のレコードを取得する
    #[cfg(test)]
    pub async fn record(&self, id: &ConnectionId) -> Option<ConnectionRecord> {
        let connections = self.connections.lock().await;
        connections.get(id).map(|entry| entry.record)
    }

    #[cfg(test)]
    pub async fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.lock().await.contains_key(id)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }
}
