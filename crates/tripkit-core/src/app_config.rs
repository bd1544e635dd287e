#[derive(Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub maps_api_base: String,
    pub maps_api_key: String,
    pub request_timeout_secs: u64,
    pub debounce_ms: u64,
    pub log_level: String,
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base_url", &self.api_base_url)
            .field("maps_api_base", &self.maps_api_base)
            .field("maps_api_key", &"[redacted]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("debounce_ms", &self.debounce_ms)
            .field("log_level", &self.log_level)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
