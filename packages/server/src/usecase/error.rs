//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::StoreError;

/// タグカタログ操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("tag name must not be empty")]
    EmptyName,

    #[error("failed to persist tag list: {0}")]
    Store(#[from] StoreError),
}

/// 起動時の致命的なエラー（接続を受け付ける前にプロセスを終了する）
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to create storage client: {0}")]
    StoreClient(StoreError),

    #[error("failed to prepare storage schema: {0}")]
    Schema(StoreError),

    #[error("failed to load tag catalog: {0}")]
    Tags(TagError),
}
