//! WebSocket session handler.
//!
//! CONNECTING → ACTIVE → CLOSED
//!
//! - CONNECTING: 登録して履歴をリプレイ（このフレームはライブ配信より必ず先に届く）
//! - ACTIVE: 受信フレームごとに保存とブロードキャストを行い、完了してから次を読む
//! - CLOSED: 登録を解除して送信側を閉じる

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::stream::StreamExt;

use crate::{
    domain::PusherChannel,
    infrastructure::{dto::websocket::MessageFrame, message_pusher::WebSocketMessagePusher},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let pusher = Arc::new(WebSocketMessagePusher::new(sender));
    let channel: PusherChannel = pusher.clone();

    let session = match state.connect_session.execute(channel).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Closing session before it became active: {}", e);
            pusher.close().await;
            return;
        }
    };
    let id = session.id;
    tracing::info!("Session '{}' active ({} messages replayed)", id, session.replayed);

    while let Some(frame) = receiver.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                // a single bad read does not end the session; the stream
                // itself reports the end once the socket is gone
                tracing::warn!("Read error on '{}': {}", id, e);
                continue;
            }
        };

        match msg {
            Message::Text(text) => match serde_json::from_str::<MessageFrame>(text.as_str()) {
                Ok(frame) => {
                    let received = state.receive_message.execute(frame.into()).await;
                    tracing::debug!(
                        "'{}' accepted message '{}' (delivered: {}, pruned: {})",
                        id,
                        received.message.id,
                        received.broadcast.delivered,
                        received.broadcast.pruned
                    );
                }
                Err(e) => tracing::warn!("Undecodable frame from '{}': {}", id, e),
            },
            Message::Close(_) => {
                tracing::info!("Session '{}' sent close frame", id);
                break;
            }
            Message::Binary(_) => tracing::debug!("Ignoring binary frame from '{}'", id),
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    state.disconnect_session.execute(id).await;
    pusher.close().await;
}
