//! UseCase: 受信メッセージ処理
//!
//! 1. サーバー側で ID（UUID）と時刻を付与
//! 2. ストアへの保存とブロードキャストを並行して実行し、両方の完了を待つ
//!
//! 保存の失敗はログに記録するだけで、既に行われたブロードキャストは取り消しません。

use std::sync::Arc;

use tagrelay_shared::time::Clock;

use crate::domain::{ChatMessage, ChatStore, InboundMessage, MessageId, Timestamp};

use super::broadcast_message::{BroadcastReport, Broadcaster};

/// 受信処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub message: ChatMessage,
    pub broadcast: BroadcastReport,
    pub persisted: bool,
}

/// 受信メッセージ処理のユースケース
pub struct ReceiveMessageUseCase {
    store: Arc<dyn ChatStore>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl ReceiveMessageUseCase {
    pub fn new(store: Arc<dyn ChatStore>, broadcaster: Arc<Broadcaster>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            broadcaster,
            clock,
        }
    }

    pub async fn execute(&self, inbound: InboundMessage) -> ReceivedMessage {
        let message = inbound.accept(
            MessageId::generate(),
            Timestamp::new(self.clock.now_unix_secs()),
        );

        let (persist, broadcast) = tokio::join!(
            self.store.insert_message(&message),
            self.broadcaster.broadcast(&message)
        );

        let persisted = match persist {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to persist message '{}': {}", message.id, e);
                false
            }
        };

        ReceivedMessage {
            message,
            broadcast,
            persisted,
        }
    }
}
