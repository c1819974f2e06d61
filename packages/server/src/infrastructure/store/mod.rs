//! ChatStore 実装
//!
//! - `inmemory`: プロセス内のストア（デフォルト・テスト用）
//! - `opensearch`: OpenSearch クラスタを使うストア

pub mod inmemory;
pub mod opensearch;

pub use inmemory::InMemoryChatStore;
pub use opensearch::{OpenSearchChatStore, OpenSearchConfig};

/// Collection holding chat messages
pub const CHAT_COLLECTION: &str = "chat";
/// Collection holding the tag list document
pub const TAGS_COLLECTION: &str = "tags";
/// Id of the single tag list document
pub const TAG_LIST_DOCUMENT_ID: &str = "1";
