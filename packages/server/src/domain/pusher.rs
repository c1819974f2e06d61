//! MessagePusher trait 定義
//!
//! 1 本の双方向チャンネル（WebSocket 接続）へのフレーム送信を抽象化します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{ChatMessage, PushError};

/// Connection Registry が保持する送信チャンネル
///
/// 所有者は Session Handler。Registry は Arc の複製を保持するだけ。
pub type PusherChannel = Arc<dyn MessagePusher>;

/// 1 接続分の送信口
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// メッセージを 1 件送信する
    ///
    /// 失敗した場合、その接続は切断されたものとして扱われる。
    async fn push(&self, message: &ChatMessage) -> Result<(), PushError>;

    /// 接続直後の履歴リプレイを送信する
    ///
    /// `messages` は与えられた順に送信され、その間に `push` が割り込むことはない。
    /// 実装は、リプレイが終わるまで通常の `push` を待たせてもよい。
    async fn push_history(&self, messages: &[ChatMessage]) -> Result<(), PushError>;
}
