//! Test doubles shared by the use case tests.

use std::{
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicI64, Ordering},
    },
};

use async_trait::async_trait;
use axum::extract::ws::Message;
use futures_util::Sink;
use tagrelay_shared::time::Clock;
use tokio::sync::{Mutex, Notify, mpsc};

use crate::{
    domain::{ChatMessage, ChatStore, MessagePusher, PushError, PusherChannel, StoreError, Timestamp},
    infrastructure::store::InMemoryChatStore,
};

/// 送信されたフレームを記録する MessagePusher
///
/// `fail_sends()` 以降の `push` は `PushError::Closed` を返す。
#[derive(Default)]
pub struct RecordingPusher {
    live: Mutex<Vec<ChatMessage>>,
    history: Mutex<Vec<ChatMessage>>,
    failing: AtomicBool,
}

impl RecordingPusher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let pusher = Self::new();
        pusher.fail_sends();
        pusher
    }

    pub fn fail_sends(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub async fn live(&self) -> Vec<ChatMessage> {
        self.live.lock().await.clone()
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }

    pub fn channel(self: &Arc<Self>) -> PusherChannel {
        Arc::clone(self) as PusherChannel
    }
}

#[async_trait]
impl MessagePusher for RecordingPusher {
    async fn push(&self, message: &ChatMessage) -> Result<(), PushError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PushError::Closed);
        }
        self.live.lock().await.push(message.clone());
        Ok(())
    }

    async fn push_history(&self, messages: &[ChatMessage]) -> Result<(), PushError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PushError::Closed);
        }
        self.history.lock().await.extend_from_slice(messages);
        Ok(())
    }
}

/// 手動で進める時計
#[derive(Debug)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn at(secs: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(secs)))
    }

    pub fn set(&self, secs: i64) {
        self.0.store(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix_secs(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub type TestSink = Pin<Box<dyn Sink<Message, Error = PushError> + Send>>;

/// 書き込まれたフレームをチャネルに流す Sink
pub fn channel_sink() -> (TestSink, mpsc::UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = futures_util::sink::unfold(
        tx,
        |tx: mpsc::UnboundedSender<Message>, msg: Message| async move {
            tx.send(msg).map_err(|_| PushError::Closed)?;
            Ok::<_, PushError>(tx)
        },
    );
    (Box::pin(sink), rx)
}

/// `recent_messages` を `release()` まで止める ChatStore
///
/// それ以外の操作は内側の InMemoryChatStore にそのまま委譲する。
#[derive(Default)]
pub struct GatedHistoryStore {
    pub inner: InMemoryChatStore,
    entered: Notify,
    release: Notify,
}

impl GatedHistoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 履歴の取得が始まるまで待つ
    pub async fn history_requested(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl ChatStore for GatedHistoryStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.inner.ensure_schema().await
    }

    async fn insert_message(&self, message: &ChatMessage) -> Result<(), StoreError> {
        self.inner.insert_message(message).await
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.recent_messages(limit).await
    }

    async fn tagged_messages_until(
        &self,
        until: Timestamp,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        self.inner.tagged_messages_until(until, limit).await
    }

    async fn search_messages(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        self.inner.search_messages(query, limit).await
    }

    async fn load_tags(&self) -> Result<Option<Vec<String>>, StoreError> {
        self.inner.load_tags().await
    }

    async fn save_tags(&self, tags: &[String]) -> Result<(), StoreError> {
        self.inner.save_tags(tags).await
    }
}
