// Watchlist persisted as a JSON array of symbols
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::EngineError;

pub struct WatchlistFile {
    path: PathBuf,
    defaults: Vec<String>,
}

impl WatchlistFile {
    pub fn new(path: impl Into<PathBuf>, defaults: Vec<String>) -> Self {
        Self {
            path: path.into(),
            defaults,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the labels, creating the file with the defaults when missing.
    pub async fn load(&self) -> Result<Vec<String>, EngineError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Creating watchlist with default labels");
                self.save(&self.defaults).await?;
                Ok(self.defaults.clone())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, labels: &[String]) -> Result<(), EngineError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(labels)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    pub async fn add(&self, item: &str) -> Result<Vec<String>, EngineError> {
        let item = item.trim();
        if item.is_empty() {
            return Err(EngineError::InvalidArgument("Watchlist label must not be empty".to_string()));
        }
        let mut labels = self.load().await?;
        if !labels.iter().any(|l| l == item) {
            labels.push(item.to_string());
            self.save(&labels).await?;
            debug!(label = %item, "Watchlist label added");
        }
        Ok(labels)
    }

    pub async fn delete(&self, label: &str) -> Result<Vec<String>, EngineError> {
        let mut labels = self.load().await?;
        let before = labels.len();
        labels.retain(|l| l != label);
        if labels.len() != before {
            self.save(&labels).await?;
            debug!(%label, "Watchlist label deleted");
        }
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn defaults() -> Vec<String> {
        vec!["AAPL".to_string(), "MSFT".to_string()]
    }

    #[tokio::test]
    async fn missing_file_is_seeded_with_defaults() {
        let dir = tempdir().unwrap();
        let file = WatchlistFile::new(dir.path().join("nested/watchlist.json"), defaults());
        assert_eq!(file.load().await.unwrap(), defaults());
        assert!(file.path().exists());
    }

    #[tokio::test]
    async fn add_and_delete_persist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watchlist.json");
        let file = WatchlistFile::new(&path, defaults());

        file.add("TSLA").await.unwrap();
        file.add("TSLA").await.unwrap();
        file.delete("AAPL").await.unwrap();

        let reopened = WatchlistFile::new(&path, Vec::new());
        assert_eq!(reopened.load().await.unwrap(), vec!["MSFT".to_string(), "TSLA".to_string()]);
    }

    #[tokio::test]
    async fn empty_labels_are_rejected() {
        let dir = tempdir().unwrap();
        let file = WatchlistFile::new(dir.path().join("w.json"), defaults());
        assert!(matches!(file.add("  ").await, Err(EngineError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("w.json");
        std::fs::write(&path, "not json").unwrap();
        let file = WatchlistFile::new(&path, defaults());
        assert!(matches!(file.load().await, Err(EngineError::JsonError { .. })));
    }
}
