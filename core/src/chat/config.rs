//! Chat service configuration

use std::time::Duration;

/// Default REST base of the chat service
pub const DEFAULT_URL: &str = "https://qfamiwiqxhrdtcipmeju.supabase.co";

/// Publishable (anonymous) key; access is enforced server-side by row policies.
pub const DEFAULT_KEY: &str = "sb_publishable_jS1bqdOlGVqxu2feYxGXJA_ZZeZnfPD";

/// Table holding the messages
pub const DEFAULT_TABLE: &str = "messages";

/// Chat client configuration
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// REST base URL
    pub url: String,
    /// API key sent with every request
    pub key: String,
    /// Realtime websocket endpoint
    pub realtime_url: String,
    pub table: String,
    /// Heartbeat interval on the realtime socket
    pub heartbeat_interval: Duration,
    /// Wait between realtime reconnect attempts
    pub reconnect_backoff: Duration,
    /// Messages fetched at startup
    pub history_limit: usize,
    /// Timeout for REST calls
    pub request_timeout: Duration,
    /// Messages kept in memory
    pub buffer_size: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            key: DEFAULT_KEY.to_string(),
            realtime_url: realtime_url_for(DEFAULT_URL, DEFAULT_KEY),
            table: DEFAULT_TABLE.to_string(),
            heartbeat_interval: Duration::from_secs(30),
            reconnect_backoff: Duration::from_secs(3),
            history_limit: 100,
            request_timeout: Duration::from_secs(10),
            buffer_size: 200,
        }
    }
}

impl ChatConfig {
    /// Create from environment variables
    ///
    /// - `DOPOGOTO_CHAT_URL`: REST base
    /// - `DOPOGOTO_CHAT_KEY`: API key
    /// - `DOPOGOTO_CHAT_REALTIME_URL`: websocket endpoint (derived from the
    ///   other two when unset)
    pub fn from_env() -> Self {
        let url = std::env::var("DOPOGOTO_CHAT_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let key = std::env::var("DOPOGOTO_CHAT_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_KEY.to_string());
        let realtime_url = std::env::var("DOPOGOTO_CHAT_REALTIME_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| realtime_url_for(&url, &key));

        Self {
            url,
            key,
            realtime_url,
            ..Self::default()
        }
    }

    /// Point REST and realtime at explicit endpoints.
    #[must_use]
    pub fn with_endpoints(mut self, url: impl Into<String>, realtime_url: impl Into<String>) -> Self {
        self.url = url.into();
        self.realtime_url = realtime_url.into();
        self
    }

    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    #[must_use]
    pub fn with_reconnect_backoff(mut self, backoff: Duration) -> Self {
        self.reconnect_backoff = backoff;
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// `topic` of the realtime channel for the message table
    pub fn topic(&self) -> String {
        format!("realtime:public:{}", self.table)
    }

    /// REST endpoint of the message table
    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), self.table)
    }
}

/// Websocket endpoint for a REST base: same host, `wss`/`ws` scheme.
pub fn realtime_url_for(url: &str, key: &str) -> String {
    let base = url.trim_end_matches('/');
    let base = match base.split_once("://") {
        Some(("https", rest)) => format!("wss://{rest}"),
        Some(("http", rest)) => format!("ws://{rest}"),
        _ => base.to_string(),
    };
    format!("{base}/realtime/v1/websocket?apikey={key}&vsn=1.0.0")
}
