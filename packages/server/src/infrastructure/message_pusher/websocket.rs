//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 1 接続分の WebSocket 送信側（Sink）を保持し、フレームを JSON で書き込む
//! - 接続直後の履歴リプレイが書き終わるまで、通常の push を待たせる
//!
//! ## 設計ノート
//!
//! WebSocket の分割（split）は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は送信側だけを受け取り、Registry には `Arc` で共有されます。
//! Sink は Mutex で保護されるため、同一接続への送信が並行して書き込まれることはありません。
//!
//! 接続処理中に到着したメッセージは、履歴リプレイとライブ配信の両方に含まれることがあります。
//! リプレイ済みのメッセージと同一のライブフレームは書き込まずに成功扱いにします。
//! リプレイ待ちは `REPLAY_WAIT_LIMIT` で打ち切り、他の送信者を止め続けないようにします。

use std::{fmt::Display, time::Duration};

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, stream::SplitSink};
use tokio::sync::{Mutex, watch};

use crate::{
    domain::{ChatMessage, MessagePusher, PushError},
    infrastructure::dto::websocket::MessageFrame,
};

/// 履歴リプレイの完了を待つ上限
pub const REPLAY_WAIT_LIMIT: Duration = Duration::from_secs(15);

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let (sink, stream) = socket.split();
/// let pusher: PusherChannel = Arc::new(WebSocketMessagePusher::new(sink));
///
/// pusher.push_history(&history).await?;
/// pusher.push(&message).await?;
/// ```
pub struct WebSocketMessagePusher<S = SplitSink<WebSocket, Message>> {
    sink: Mutex<S>,
    /// 履歴リプレイの送信が終わったら `true`
    replayed: watch::Sender<bool>,
    /// リプレイで書き込んだメッセージ
    history: Mutex<Vec<ChatMessage>>,
}

impl<S> WebSocketMessagePusher<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: Display + Send,
{
    pub fn new(sink: S) -> Self {
        let (replayed, _) = watch::channel(false);
        Self {
            sink: Mutex::new(sink),
            replayed,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Close frame を送ってから Sink を閉じる
    pub async fn close(&self) {
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.close().await {
            tracing::debug!("Failed to close WebSocket sink: {}", e);
        }
    }

    async fn wait_for_replay(&self) -> Result<(), PushError> {
        let mut replayed = self.replayed.subscribe();
        // The sender is owned by `self`, so this can only resolve through `push_history`.
        match tokio::time::timeout(REPLAY_WAIT_LIMIT, replayed.wait_for(|done| *done)).await {
            Ok(_) => Ok(()),
            Err(_) => Err(PushError::ReplayTimeout),
        }
    }

    async fn was_replayed(&self, message: &ChatMessage) -> bool {
        self.history.lock().await.contains(message)
    }
}

fn encode(message: &ChatMessage) -> Result<String, PushError> {
    serde_json::to_string(&MessageFrame::from(message)).map_err(|e| PushError::Encode(e.to_string()))
}

async fn write<S>(sink: &mut S, json: String) -> Result<(), PushError>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| PushError::Write(e.to_string()))
}

#[async_trait]
impl<S> MessagePusher for WebSocketMessagePusher<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: Display + Send,
{
    async fn push(&self, message: &ChatMessage) -> Result<(), PushError> {
        self.wait_for_replay().await?;
        if self.was_replayed(message).await {
            tracing::debug!("Skipping '{}', already sent in history replay", message.id);
            return Ok(());
        }
        let json = encode(message)?;
        let mut sink = self.sink.lock().await;
        write(&mut *sink, json).await?;
        tracing::debug!("Pushed message '{}'", message.id);
        Ok(())
    }

    async fn push_history(&self, messages: &[ChatMessage]) -> Result<(), PushError> {
        let mut sink = self.sink.lock().await;
        let mut result = Ok(());
        for message in messages {
            result = match encode(message) {
                Ok(json) => write(&mut *sink, json).await,
                Err(e) => Err(e),
            };
            if result.is_err() {
                break;
            }
        }
        self.history.lock().await.extend_from_slice(messages);
        // Live pushes are released even if the replay failed; they will fail on the dead sink.
        self.replayed.send_replace(true);
        result
    }
}
