use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 9;
pub const MAX_LIMIT: u32 = 50;

/// Key under which the page size is persisted.
pub const STORE_KEY: &str = "post-store";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryState {
    pub current_page: u32,
    pub search_query: String,
    pub limit: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            current_page: DEFAULT_PAGE,
            search_query: String::new(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// The persisted slice of the query state, in the `{"state":{..},"version":0}` envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedQuery {
    pub state: PersistedLimit,
    #[serde(default)]
    pub version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedLimit {
    pub limit: u32,
}

impl PersistedQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            state: PersistedLimit { limit },
            version: 0,
        }
    }

    /// Decodes a stored record, ignoring anything outside `1..=MAX_LIMIT`.
    pub fn decode(raw: &str) -> Option<u32> {
        let record: PersistedQuery = serde_json::from_str(raw).ok()?;
        let limit = record.state.limit;
        (1..=MAX_LIMIT).contains(&limit).then_some(limit)
    }

    pub fn encode(limit: u32) -> String {
        serde_json::to_string(&Self::new(limit)).unwrap_or_default()
    }
}

/// Where the page size survives between sessions.
pub trait PageSizeStore {
    fn load(&self) -> Option<u32>;
    fn save(&mut self, limit: u32);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPageSize {
    raw: Option<String>,
}

impl MemoryPageSize {
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl PageSizeStore for MemoryPageSize {
    fn load(&self) -> Option<u32> {
        self.raw.as_deref().and_then(PersistedQuery::decode)
    }

    fn save(&mut self, limit: u32) {
        self.raw = Some(PersistedQuery::encode(limit));
    }
}

/// File-backed store used by the command line client.
#[derive(Debug, Clone)]
pub struct FilePageSize {
    path: PathBuf,
}

impl FilePageSize {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PageSizeStore for FilePageSize {
    fn load(&self) -> Option<u32> {
        let raw = fs::read_to_string(&self.path).ok()?;
        PersistedQuery::decode(raw.trim())
    }

    fn save(&mut self, limit: u32) {
        if let Err(e) = fs::write(&self.path, PersistedQuery::encode(limit)) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not persist page size");
        }
    }
}

/// Page, search text and page size for the post list.
///
/// Changing the search text or the page size always sends the user back to page one,
/// since a page number only means something relative to the filter that produced it.
pub struct QueryStore {
    state: QueryState,
    persistence: Box<dyn PageSizeStore>,
}

impl fmt::Debug for QueryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryStore").field("state", &self.state).finish()
    }
}

impl QueryStore {
    pub fn new(persistence: impl PageSizeStore + 'static) -> Self {
        let mut state = QueryState::default();
        if let Some(limit) = persistence.load() {
            state.limit = limit;
        }
        Self {
            state,
            persistence: Box::new(persistence),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryPageSize::default())
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    pub fn search_query(&self) -> &str {
        &self.state.search_query
    }

    pub fn limit(&self) -> u32 {
        self.state.limit
    }

    pub fn set_current_page(&mut self, page: u32) {
        self.state.current_page = page;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.state.search_query = query.into();
        self.state.current_page = DEFAULT_PAGE;
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.state.limit = limit;
        self.state.current_page = DEFAULT_PAGE;
        self.persistence.save(limit);
    }

    pub fn reset_filters(&mut self) {
        self.state = QueryState::default();
        self.persistence.save(self.state.limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_and_limit_always_return_to_first_page() {
        let mut store = QueryStore::in_memory();
        for (search, limit) in [("rust", 12), ("", 9), ("async", 50), ("async", 6)] {
            store.set_current_page(7);
            store.set_search_query(search);
            assert_eq!(store.current_page(), 1);

            store.set_current_page(4);
            store.set_limit(limit);
            assert_eq!(store.current_page(), 1);
        }
    }

    #[test]
    fn reset_restores_initial_tuple() {
        let mut store = QueryStore::in_memory();
        store.set_search_query("tokio");
        store.set_limit(24);
        store.set_current_page(3);

        store.reset_filters();
        assert_eq!(
            store.state(),
            &QueryState {
                current_page: 1,
                search_query: String::new(),
                limit: 9,
            }
        );
    }

    #[test]
    fn set_current_page_does_not_validate() {
        let mut store = QueryStore::in_memory();
        store.set_current_page(999);
        assert_eq!(store.current_page(), 999);
    }

    #[test]
    fn only_page_size_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".post_store");

        let mut store = QueryStore::new(FilePageSize::new(&path));
        store.set_limit(18);
        store.set_search_query("serde");
        store.set_current_page(2);

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"state":{"limit":18},"version":0}"#);

        let restored = QueryStore::new(FilePageSize::new(&path));
        assert_eq!(restored.limit(), 18);
        assert_eq!(restored.current_page(), 1);
        assert_eq!(restored.search_query(), "");
    }

    #[test]
    fn out_of_range_persisted_limit_is_ignored() {
        assert_eq!(PersistedQuery::decode(r#"{"state":{"limit":0},"version":0}"#), None);
        assert_eq!(PersistedQuery::decode(r#"{"state":{"limit":51}}"#), None);
        assert_eq!(PersistedQuery::decode("not json"), None);
        assert_eq!(PersistedQuery::decode(r#"{"state":{"limit":50}}"#), Some(50));
    }
}
