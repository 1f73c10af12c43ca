use std::borrow::Cow;
use std::time::Duration;
use url::Url;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: Url,
    pub auth_token: String,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Config {
    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn auth_token(&self) -> Cow<str> {
        Cow::Borrowed(&self.auth_token)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}
