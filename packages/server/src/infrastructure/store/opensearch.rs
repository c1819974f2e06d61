//! OpenSearch ChatStore 実装
//!
//! OpenSearch の REST API を `reqwest` で直接呼び出します。
//!
//! - `chat` インデックス: `{tag, content, ts}`（ドキュメント ID = メッセージ ID）
//! - `tags` インデックス: ID `1` の単一ドキュメント `{tags: [...]}`
//!
//! 書き込みは `refresh=true` で行い、直後の検索（履歴リプレイ・タグ同期）から見えるようにします。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{CHAT_COLLECTION, TAG_LIST_DOCUMENT_ID, TAGS_COLLECTION};
use crate::{
    domain::{ChatMessage, ChatStore, StoreError, Timestamp},
    infrastructure::dto::document::{MessageDocument, TagListDocument},
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the OpenSearch cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSearchConfig {
    /// Base URL, e.g. `https://localhost:9200`
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Accept self-signed certificates (local clusters)
    pub accept_invalid_certs: bool,
}

/// OpenSearch を使った ChatStore 実装
pub struct OpenSearchChatStore {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Default, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: Value,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<Value>,
}

impl OpenSearchChatStore {
    pub fn new(config: OpenSearchConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username,
            password: config.password,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/{}", self.base_url, path));
        match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_ref()),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn create_index(&self, index: &str, mapping: Value) -> Result<(), StoreError> {
        match Self::send(self.request(Method::PUT, index).json(&mapping)).await {
            Ok(_) => {
                tracing::info!("Created index '{}'", index);
                Ok(())
            }
            Err(StoreError::Rejected { status, body })
                if status == StatusCode::BAD_REQUEST.as_u16()
                    && body.contains("resource_already_exists_exception") =>
            {
                tracing::debug!("Index '{}' already exists", index);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn search(&self, body: Value) -> Result<Vec<ChatMessage>, StoreError> {
        let path = format!("{}/_search", CHAT_COLLECTION);
        let response = Self::send(self.request(Method::POST, &path).json(&body)).await?;
        let response: SearchResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(decode_hits(response.hits.hits))
    }
}

fn chat_mapping() -> Value {
    let text_with_keyword = json!({
        "type": "text",
        "fields": {"keyword": {"type": "keyword", "ignore_above": 256}}
    });
    json!({
        "mappings": {
            "properties": {
                "content": text_with_keyword,
                "tag": text_with_keyword,
                "ts": {"type": "long"}
            }
        }
    })
}

fn tags_mapping() -> Value {
    json!({"mappings": {"properties": {"tags": {"type": "keyword"}}}})
}

fn recent_query(limit: usize) -> Value {
    json!({
        "size": limit,
        "sort": [{"ts": {"order": "desc"}}]
    })
}

fn tagged_until_query(until: Timestamp, limit: usize) -> Value {
    json!({
        "query": {
            "bool": {
                "must": [{"range": {"ts": {"lte": until.value()}}}],
                "must_not": [{"term": {"tag.keyword": ""}}]
            }
        },
        "size": limit,
        "sort": [{"ts": {"order": "desc"}}]
    })
}

fn search_query(query: &str, limit: usize) -> Value {
    json!({
        "query": {"multi_match": {"query": query, "fields": ["tag^2", "content"]}},
        "size": limit
    })
}

/// Decode search hits in order, skipping (and logging) any hit that is malformed.
fn decode_hits(hits: Vec<SearchHit>) -> Vec<ChatMessage> {
    hits.into_iter()
        .filter_map(|hit| {
            let document: MessageDocument = match serde_json::from_value(hit.source) {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("Skipping undecodable document '{}': {}", hit.id, e);
                    return None;
                }
            };
            match document.into_message(hit.id) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!("Skipping invalid document: {}", e);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl ChatStore for OpenSearchChatStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.create_index(CHAT_COLLECTION, chat_mapping()).await?;
        self.create_index(TAGS_COLLECTION, tags_mapping()).await
    }

    async fn insert_message(&self, message: &ChatMessage) -> Result<(), StoreError> {
        let path = format!(
            "{}/_doc/{}?refresh=true",
            CHAT_COLLECTION,
            message.id.as_str()
        );
        Self::send(
            self.request(Method::PUT, &path)
                .json(&MessageDocument::from(message)),
        )
        .await?;
        Ok(())
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        self.search(recent_query(limit)).await
    }

    async fn tagged_messages_until(
        &self,
        until: Timestamp,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        self.search(tagged_until_query(until, limit)).await
    }

    async fn search_messages(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        self.search(search_query(query, limit)).await
    }

    async fn load_tags(&self) -> Result<Option<Vec<String>>, StoreError> {
        let path = format!("{}/_doc/{}", TAGS_COLLECTION, TAG_LIST_DOCUMENT_ID);
        let response = match Self::send(self.request(Method::GET, &path)).await {
            Ok(response) => response,
            Err(StoreError::Rejected { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let response: GetResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let Some(source) = response.source.filter(|_| response.found) else {
            return Ok(None);
        };
        match serde_json::from_value::<TagListDocument>(source) {
            Ok(document) => Ok(Some(document.tags)),
            Err(e) => {
                tracing::warn!("Stored tag list is undecodable, treating as absent: {}", e);
                Ok(None)
            }
        }
    }

    async fn save_tags(&self, tags: &[String]) -> Result<(), StoreError> {
        let path = format!(
            "{}/_doc/{}?refresh=true",
            TAGS_COLLECTION, TAG_LIST_DOCUMENT_ID
        );
        let document = TagListDocument {
            tags: tags.to_vec(),
        };
        Self::send(self.request(Method::PUT, &path).json(&document)).await?;
        Ok(())
    }
}
