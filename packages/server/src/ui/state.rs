//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::usecase::{
    ConnectSessionUseCase, DisconnectSessionUseCase, ReceiveMessageUseCase,
    SearchMessagesUseCase, TagCatalog,
};

pub struct AppState {
    /// ConnectSessionUseCase（登録と履歴リプレイ）
    pub connect_session: Arc<ConnectSessionUseCase>,
    /// ReceiveMessageUseCase（ID・時刻付与、保存とブロードキャスト）
    pub receive_message: Arc<ReceiveMessageUseCase>,
    /// DisconnectSessionUseCase（登録解除）
    pub disconnect_session: Arc<DisconnectSessionUseCase>,
    /// TagCatalog（プロセス全体のタグ一覧）
    pub tag_catalog: Arc<TagCatalog>,
    /// SearchMessagesUseCase（全文検索）
    pub search_messages: Arc<SearchMessagesUseCase>,
}
