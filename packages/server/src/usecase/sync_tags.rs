//! UseCase: Tag-Sync Scheduler
//!
//! 一定間隔ごとに、タグ付きメッセージを「遅れている」接続へ通知します。
//!
//! ```text
//! IDLE → QUERY → DISPATCH → IDLE（interval だけ sleep）→ ...
//! ```
//!
//! - QUERY: `ts <= now` かつタグありのメッセージを新しい順に最大 page_size 件取得
//! - DISPATCH: 遅れている接続ごとに窓 `(last_tag, last_message]` に入るものを古い順に送信し、
//!   last-tag ウォーターマークを取得ページの最大時刻（cycle watermark）に設定
//!
//! 送信に失敗した接続は Broadcast Engine と同様に削除し、他の接続の処理は続行します。

use std::{collections::HashMap, sync::Arc, time::Duration};

use tagrelay_shared::time::Clock;
use tokio::task::{JoinHandle, JoinSet};

use crate::{
    domain::{
        ChatMessage, ChatStore, ConnectionId, ConnectionRecord, PushError, PusherChannel,
        StoreError, Timestamp, messages_in_window,
    },
    infrastructure::registry::{ConnectionRegistry, Visit},
};

/// 1 サイクルの結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// ストアから取得したタグ付きメッセージ数
    pub fetched: usize,
    /// 取得ページの最大時刻（取得 0 件なら `None`）
    pub cycle_watermark: Option<Timestamp>,
    /// 送信したフレーム数（全接続合計）
    pub dispatched: usize,
    /// last-tag ウォーターマークを進めた接続数
    pub synced: usize,
    /// 送信に失敗して削除された接続数
    pub pruned: usize,
}

pub struct TagSyncScheduler {
    store: Arc<dyn ChatStore>,
    registry: Arc<ConnectionRegistry>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    page_size: usize,
}

impl TagSyncScheduler {
    pub fn new(
        store: Arc<dyn ChatStore>,
        registry: Arc<ConnectionRegistry>,
        clock: Arc<dyn Clock>,
        interval: Duration,
        page_size: usize,
    ) -> Self {
        Self {
            store,
            registry,
            clock,
            interval,
            page_size,
        }
    }

    /// Run one QUERY → DISPATCH pass as of `now`.
    pub async fn run_cycle(&self, now: Timestamp) -> Result<CycleReport, StoreError> {
        let fetched = self
            .store
            .tagged_messages_until(now, self.page_size)
            .await?;

        let Some(cycle_watermark) = fetched.iter().map(|m| m.timestamp).max() else {
            return Ok(CycleReport::default());
        };

        let mut report = CycleReport {
            fetched: fetched.len(),
            cycle_watermark: Some(cycle_watermark),
            ..CycleReport::default()
        };

        // Behind connections only; the record is snapshotted so the window is
        // computed without holding the registry lock.
        let mut targets: Vec<(ConnectionId, PusherChannel, ConnectionRecord)> = Vec::new();
        self.registry
            .for_each(|view| {
                if view.record.is_behind() {
                    targets.push((view.id, Arc::clone(view.pusher), view.record));
                }
                Visit::Keep
            })
            .await;

        if targets.is_empty() {
            return Ok(report);
        }

        let mut sends = JoinSet::new();
        for (id, pusher, record) in targets {
            // fetched is newest first; announce oldest first
            let announcements: Vec<ChatMessage> = messages_in_window(&record, &fetched)
                .into_iter()
                .rev()
                .map(ChatMessage::as_tag_announcement)
                .collect();
            sends.spawn(async move {
                let result = dispatch(&pusher, &announcements).await;
                (id, result)
            });
        }

        let mut outcomes: HashMap<ConnectionId, Result<usize, PushError>> = HashMap::new();
        while let Some(joined) = sends.join_next().await {
            match joined {
                Ok((id, result)) => {
                    outcomes.insert(id, result);
                }
                Err(e) => tracing::error!("Tag-sync dispatch task failed: {}", e),
            }
        }

        self.registry
            .for_each(|view| match outcomes.remove(&view.id) {
                Some(Ok(sent)) => {
                    report.dispatched += sent;
                    report.synced += 1;
                    Visit::Update(view.record.with_tag_synced(cycle_watermark))
                }
                Some(Err(e)) => {
                    tracing::warn!("Tag-sync dispatch to '{}' failed: {}", view.id, e);
                    report.pruned += 1;
                    Visit::Remove
                }
                None => Visit::Keep,
            })
            .await;

        Ok(report)
    }

    /// Start the background loop. Runs until the process exits.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tracing::info!(
            "Tag-sync scheduler started (interval: {}s, page size: {})",
            self.interval.as_secs(),
            self.page_size
        );
        tokio::spawn(async move {
            loop {
                let now = Timestamp::new(self.clock.now_unix_secs());
                match self.run_cycle(now).await {
                    Ok(report) if report.synced > 0 || report.pruned > 0 => {
                        tracing::info!(
                            "Tag-sync cycle at {}: fetched={}, dispatched={}, synced={}, pruned={}",
                            now.value(),
                            report.fetched,
                            report.dispatched,
                            report.synced,
                            report.pruned
                        );
                    }
                    Ok(_) => tracing::debug!("Tag-sync cycle at {}: nothing to do", now.value()),
                    Err(e) => tracing::warn!("Tag-sync query failed: {}", e),
                }
                tokio::time::sleep(self.interval).await;
            }
        })
    }
}

async fn dispatch(pusher: &PusherChannel, announcements: &[ChatMessage]) -> Result<usize, PushError> {
    for announcement in announcements {
        pusher.push(announcement).await?;
    }
    Ok(announcements.len())
}
