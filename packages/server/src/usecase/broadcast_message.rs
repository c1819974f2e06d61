//! UseCase: Broadcast Engine
//!
//! 1 件のメッセージを登録中の全接続へ並行して送信します。
//!
//! 1. Registry からスナップショット（ID と送信チャンネル）を取得し、ロックを外す
//! 2. 接続ごとにタスクを起動して送信し、全タスクの完了を待つ（バリア）
//! 3. 結果を 1 回の `for_each` で反映する
//!    - 成功: last-message ウォーターマークをメッセージ時刻まで進める
//!    - 失敗: 接続を削除する（リトライ・バッファリングはしない）

use std::{collections::HashMap, sync::Arc};

use tokio::task::JoinSet;

use crate::{
    domain::{ChatMessage, ConnectionId, PushError, PusherChannel},
    infrastructure::registry::{ConnectionRegistry, Visit},
};

/// 1 回のブロードキャストの結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 送信に成功し、ウォーターマークが進んだ接続数
    pub delivered: usize,
    /// 送信に失敗して削除された接続数
    pub pruned: usize,
}

pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Fan `message` out to every registered connection and wait for all sends.
    pub async fn broadcast(&self, message: &ChatMessage) -> BroadcastReport {
        let mut targets: Vec<(ConnectionId, PusherChannel)> = Vec::new();
        self.registry
            .for_each(|view| {
                targets.push((view.id, Arc::clone(view.pusher)));
                Visit::Keep
            })
            .await;

        if targets.is_empty() {
            return BroadcastReport::default();
        }

        let mut sends = JoinSet::new();
        for (id, pusher) in targets {
            let message = message.clone();
            sends.spawn(async move { (id, pusher.push(&message).await) });
        }

        let mut outcomes: HashMap<ConnectionId, Result<(), PushError>> = HashMap::new();
        while let Some(joined) = sends.join_next().await {
            match joined {
                Ok((id, result)) => {
                    outcomes.insert(id, result);
                }
                Err(e) => tracing::error!("Broadcast send task failed: {}", e),
            }
        }

        let mut report = BroadcastReport::default();
        self.registry
            .for_each(|view| match outcomes.remove(&view.id) {
                Some(Ok(())) => {
                    report.delivered += 1;
                    Visit::Update(view.record.with_message_delivered(message.timestamp))
                }
                Some(Err(e)) => {
                    tracing::warn!("Failed to deliver '{}' to '{}': {}", message.id, view.id, e);
                    report.pruned += 1;
                    Visit::Remove
                }
                None => Visit::Keep,
            })
            .await;

        tracing::debug!(
            "Broadcast '{}' (ts={}): delivered={}, pruned={}",
            message.id,
            message.timestamp.value(),
            report.delivered,
            report.pruned
        );
        report
    }
}
