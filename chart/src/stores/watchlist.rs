use serde::{Deserialize, Serialize};

/// Tracked symbols and the one currently charted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistStore {
    labels: Vec<String>,
    selected: Option<String>,
}

impl WatchlistStore {
    pub fn new(labels: Vec<String>) -> Self {
        let selected = labels.first().cloned();
        Self { labels, selected }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Appends `label` if it is new, without selecting it.
    pub fn add_label(&mut self, label: &str) {
        if !self.contains(label) {
            self.labels.push(label.to_string());
        }
    }

    /// Appends `label` if it is new, and selects it either way.
    pub fn set_label(&mut self, label: &str) {
        self.add_label(label);
        self.selected = Some(label.to_string());
    }

    /// Drops `label`; selection falls back to the first remaining symbol.
    pub fn remove_label(&mut self, label: &str) {
        self.labels.retain(|l| l != label);
        self.selected = self.labels.first().cloned();
    }

    /// Replaces the list with the backend's copy, keeping the selection
    /// when it is still present.
    pub fn replace_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
        let keep = matches!(&self.selected, Some(s) if self.contains(s));
        if !keep {
            self.selected = self.labels.first().cloned();
        }
    }
}
