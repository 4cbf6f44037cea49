use gloo_storage::{LocalStorage, Storage};
use post_client::query::{PersistedQuery, STORE_KEY};
use post_client::PageSizeStore;

/// Page size kept in `localStorage` under the same record the CLI writes to disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPageSize;

impl PageSizeStore for LocalPageSize {
    fn load(&self) -> Option<u32> {
        let raw = LocalStorage::raw().get_item(STORE_KEY).ok().flatten()?;
        PersistedQuery::decode(&raw)
    }

    fn save(&mut self, limit: u32) {
        if let Err(e) = LocalStorage::set(STORE_KEY, PersistedQuery::new(limit)) {
            tracing::warn!(error = %e, "could not persist page size");
        }
    }
}
