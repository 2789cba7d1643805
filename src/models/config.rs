//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;

use crate::listing::query::DEFAULT_PAGE_SIZE;
use crate::messaging::StompOptions;

fn default_api_timeout_secs() -> u64 {
    30
}

fn default_chat_destination() -> String {
    "/app/chat".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_login_url() -> String {
    "/login".to_string()
}

#[derive(Clone, Debug, Deserialize)]
/// Settings shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    /// Signs session cookies and verifies JWTs. At least 64 bytes.
    pub secret: String,
    pub api_base_url: String,
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,
    pub stomp_url: String,
    #[serde(default = "default_chat_destination")]
    pub chat_destination: String,
    /// Ask the broker for a RECEIPT per message and resend unacknowledged
    /// ones after a reconnect.
    #[serde(default)]
    pub stomp_receipt_timeout_secs: Option<u64>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Where signed-out visitors are sent to authenticate.
    #[serde(default = "default_login_url")]
    pub login_url: String,
}

impl ServerConfig {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn stomp_options(&self) -> StompOptions {
        let options = StompOptions::new(&self.stomp_url, &self.chat_destination);
        match self.stomp_receipt_timeout_secs {
            Some(secs) => options.with_receipts(Duration::from_secs(secs)),
            None => options,
        }
    }

    /// Configured page size, never zero.
    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }
}
