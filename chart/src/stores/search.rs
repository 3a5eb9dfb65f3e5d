use tracing::warn;

/// Minimum query length before the backend is asked.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStore {
    query: String,
    results: Vec<String>,
    open: bool,
}

impl SearchStore {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Records the query and returns it when it is long enough to search.
    pub fn set_query(&mut self, query: &str) -> Option<String> {
        self.query = query.trim().to_string();
        if self.query.chars().count() < MIN_QUERY_LEN {
            self.results.clear();
            self.open = false;
            return None;
        }
        Some(self.query.clone())
    }

    /// Results for `query`; ignored if the user has typed something else since.
    pub fn set_results(&mut self, query: &str, results: Vec<String>) {
        if query != self.query {
            return;
        }
        self.open = !results.is_empty();
        self.results = results;
    }

    pub fn fail(&mut self, query: &str, error: &dyn std::fmt::Display) {
        warn!(query = %query, error = %error, "Symbol search failed");
        if query == self.query {
            self.results.clear();
            self.open = false;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_queries_do_not_search() {
        let mut search = SearchStore::default();
        assert_eq!(search.set_query("A"), None);
        assert_eq!(search.set_query("AA"), Some("AA".to_string()));
    }

    #[test]
    fn results_open_the_dropdown() {
        let mut search = SearchStore::default();
        let query = search.set_query("goo").unwrap();
        search.set_results(&query, vec!["GOOG".into(), "GOOGL".into()]);
        assert!(search.is_open());
        assert_eq!(search.results().len(), 2);
    }

    #[test]
    fn failure_clears_and_closes() {
        let mut search = SearchStore::default();
        let query = search.set_query("msf").unwrap();
        search.set_results(&query, vec!["MSFT".into()]);
        search.fail(&query, &"connection refused");
        assert!(!search.is_open());
        assert!(search.results().is_empty());
    }

    #[test]
    fn late_results_for_an_old_query_are_ignored() {
        let mut search = SearchStore::default();
        let old = search.set_query("ap").unwrap();
        search.set_query("tsl");
        search.set_results(&old, vec!["AAPL".into()]);
        assert!(search.results().is_empty());
    }
}
