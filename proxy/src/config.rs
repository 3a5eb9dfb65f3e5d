// Proxy settings from the environment
use std::net::SocketAddr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use shared::utils::history_floor;

#[derive(Debug, Clone, PartialEq)]
pub struct ProxySettings {
    pub port: u16,
    pub chart_base_url: String,
    pub search_base_url: String,
    /// Oldest date ever requested upstream.
    pub history_floor: DateTime<Utc>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        ProxySettings {
            port: 3000,
            chart_base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            search_base_url: "https://query2.finance.yahoo.com/v1/finance/search".to_string(),
            history_floor: history_floor(),
        }
    }
}

impl ProxySettings {
    pub fn load() -> Result<Self> {
        Self::from_env(|key| std::env::var(key).ok())
    }

    pub fn from_env(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = ProxySettings::default();
        if let Some(port) = env("PORT") {
            settings.port = port
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
        }
        if let Some(url) = env("PROXY_CHART_URL") {
            settings.chart_base_url = url;
        }
        if let Some(url) = env("PROXY_SEARCH_URL") {
            settings.search_base_url = url;
        }
        Ok(settings)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], self.port))
    }
}
