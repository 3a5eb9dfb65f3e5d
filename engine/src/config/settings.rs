// Engine settings: defaults, then an optional JSON file, then environment overrides
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub host: String,
    pub port: u16,
    /// Base URL of the HTTP quote proxy.
    pub proxy_url: String,
    pub watchlist_path: PathBuf,
    /// Written to the watchlist file the first time it is created.
    pub default_labels: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            host: "127.0.0.1".to_string(),
            port: 50051,
            proxy_url: "http://localhost:3000".to_string(),
            watchlist_path: PathBuf::from("watchlist.json"),
            default_labels: ["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl EngineSettings {
    /// Reads `ENGINE_CONFIG` and the `ENGINE_*` overrides from the process environment.
    pub fn load() -> Result<Self> {
        let file = std::env::var_os("ENGINE_CONFIG").map(PathBuf::from);
        Self::load_from(file.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn load_from(file: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = match file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading engine config {}", path.display()))?;
                serde_json::from_str(&raw).with_context(|| format!("parsing engine config {}", path.display()))?
            }
            None => EngineSettings::default(),
        };

        if let Some(host) = env("ENGINE_HOST") {
            settings.host = host;
        }
        if let Some(port) = env("ENGINE_PORT") {
            settings.port = port
                .parse()
                .with_context(|| format!("ENGINE_PORT must be a port number, got '{}'", port))?;
        }
        if let Some(url) = env("ENGINE_PROXY_URL") {
            settings.proxy_url = url;
        }
        if let Some(path) = env("ENGINE_WATCHLIST") {
            settings.watchlist_path = PathBuf::from(path);
        }
        Ok(settings)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_file_or_env() {
        let settings = EngineSettings::load_from(None, no_env).unwrap();
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.listen_addr(), "127.0.0.1:50051");
        assert_eq!(settings.default_labels.len(), 5);
    }

    #[test]
    fn file_values_fill_in_over_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "port": 6000, "proxy_url": "http://quotes:3000" }}"#).unwrap();
        let settings = EngineSettings::load_from(Some(file.path()), no_env).unwrap();
        assert_eq!(settings.port, 6000);
        assert_eq!(settings.proxy_url, "http://quotes:3000");
        assert_eq!(settings.host, "127.0.0.1");
    }

    #[test]
    fn environment_overrides_file() {
        let env = |key: &str| match key {
            "ENGINE_PORT" => Some("7000".to_string()),
            "ENGINE_WATCHLIST" => Some("/tmp/labels.json".to_string()),
            _ => None,
        };
        let settings = EngineSettings::load_from(None, env).unwrap();
        assert_eq!(settings.port, 7000);
        assert_eq!(settings.watchlist_path, PathBuf::from("/tmp/labels.json"));
    }

    #[test]
    fn bad_port_is_an_error() {
        let env = |key: &str| (key == "ENGINE_PORT").then(|| "http".to_string());
        assert!(EngineSettings::load_from(None, env).is_err());
    }
}
