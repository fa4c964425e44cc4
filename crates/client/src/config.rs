pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Sent as `x-operator-key` on operator-only calls
    pub operator_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: 30,
            operator_key: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_operator_key(mut self, key: &str) -> Self {
        self.operator_key = Some(key.to_string());
        self
    }
}
