//! Runtime configuration read from the environment.
//!
//! CLI flags (host / port) are parsed by the binary with `clap`; everything
//! here comes from environment variables so deployments can tune the relay
//! without rebuilding.

use std::time::Duration;

use crate::infrastructure::store::OpenSearchConfig;

/// 接続時に再生する履歴の件数
pub const HISTORY_REPLAY_SIZE: usize = 10;
/// タグ同期 1 サイクルで取得するタグ付きメッセージの最大件数
pub const TAG_SYNC_PAGE_SIZE: usize = 10;
/// 検索結果の最大件数
pub const SEARCH_PAGE_SIZE: usize = 10;
/// `THROTTLE` 未設定・不正時のタグ同期間隔（秒）
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;
/// 接続時の履歴取得を待つ上限
pub const HISTORY_LOAD_TIMEOUT: Duration = Duration::from_millis(1500);

const THROTTLE_VAR: &str = "THROTTLE";
const OPENSEARCH_URL_VAR: &str = "OPENSEARCH_URL";
const OPENSEARCH_USERNAME_VAR: &str = "OPENSEARCH_USERNAME";
const OPENSEARCH_PASSWORD_VAR: &str = "OPENSEARCH_PASSWORD";
const OPENSEARCH_INSECURE_VAR: &str = "OPENSEARCH_INSECURE";

/// Which storage backend the relay talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    OpenSearch(OpenSearchConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub sync_interval: Duration,
    pub storage: StorageConfig,
}

impl RelayConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let sync_interval = Duration::from_secs(parse_interval(lookup(THROTTLE_VAR).as_deref()));

        let storage = match lookup(OPENSEARCH_URL_VAR).filter(|url| !url.trim().is_empty()) {
            Some(url) => StorageConfig::OpenSearch(OpenSearchConfig {
                url: url.trim().to_string(),
                username: lookup(OPENSEARCH_USERNAME_VAR),
                password: lookup(OPENSEARCH_PASSWORD_VAR),
                accept_invalid_certs: lookup(OPENSEARCH_INSECURE_VAR)
                    .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
                    .unwrap_or(false),
            }),
            None => StorageConfig::InMemory,
        };

        Self {
            sync_interval,
            storage,
        }
    }
}

fn parse_interval(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return DEFAULT_SYNC_INTERVAL_SECS;
    };
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs > 0 => secs as u64,
        _ => {
            tracing::warn!(
                "Invalid {} value '{}', falling back to {}s",
                THROTTLE_VAR,
                raw,
                DEFAULT_SYNC_INTERVAL_SECS
            );
            DEFAULT_SYNC_INTERVAL_SECS
        }
    }
}
