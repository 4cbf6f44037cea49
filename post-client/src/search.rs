use std::time::Duration;

use crate::query::QueryStore;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// One scheduled commit of the search box. Stale once a newer keystroke arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

/// The text in the search box, which lags behind the committed query by one debounce
/// interval.
///
/// Every keystroke bumps the generation, cancelling whatever timer was running. The host
/// sleeps for [`SEARCH_DEBOUNCE`] and then calls [`SearchInput::fire`]; only the newest
/// ticket commits.
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
    text: String,
    generation: u64,
}

impl SearchInput {
    pub fn new(committed: &str) -> Self {
        Self {
            text: committed.to_string(),
            generation: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Records a keystroke. Returns a ticket to fire later, or `None` when the text is
    /// already what the query holds.
    pub fn input(&mut self, text: impl Into<String>, committed: &str) -> Option<DebounceTicket> {
        self.text = text.into();
        self.generation += 1;
        (self.text != committed).then_some(DebounceTicket(self.generation))
    }

    /// Commits the text if `ticket` is still the newest one. Returns whether it did.
    pub fn fire(&self, ticket: DebounceTicket, store: &mut QueryStore) -> bool {
        if ticket.0 != self.generation || self.text == store.search_query() {
            return false;
        }
        tracing::debug!(search = %self.text, "search committed");
        store.set_search_query(self.text.clone());
        true
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
    }

    /// Empties the box and the query at once, without waiting for the timer.
    pub fn clear(&mut self, store: &mut QueryStore) {
        self.text.clear();
        self.generation += 1;
        store.set_search_query("");
    }

    /// True while typed text is waiting to be committed.
    pub fn is_searching(&self, committed: &str) -> bool {
        !self.text.is_empty() && self.text != committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_last_keystroke_commits() {
        let mut store = QueryStore::in_memory();
        let mut input = SearchInput::new(store.search_query());

        let t1 = input.input("r", store.search_query()).unwrap();
        let t2 = input.input("ru", store.search_query()).unwrap();
        let t3 = input.input("rust", store.search_query()).unwrap();
        assert!(input.is_searching(store.search_query()));

        assert!(!input.fire(t1, &mut store));
        assert!(!input.fire(t2, &mut store));
        assert_eq!(store.search_query(), "");

        store.set_current_page(3);
        assert!(input.fire(t3, &mut store));
        assert_eq!(store.search_query(), "rust");
        assert_eq!(store.current_page(), 1);
        assert!(!input.is_searching(store.search_query()));
    }

    #[test]
    fn typing_back_to_committed_text_schedules_nothing() {
        let mut store = QueryStore::in_memory();
        store.set_search_query("serde");
        let mut input = SearchInput::new(store.search_query());

        let pending = input.input("serd", store.search_query()).unwrap();
        assert_eq!(input.input("serde", store.search_query()), None);
        assert!(!input.fire(pending, &mut store));
        assert_eq!(store.search_query(), "serde");
    }

    #[test]
    fn clear_commits_immediately_and_cancels_timer() {
        let mut store = QueryStore::in_memory();
        let mut input = SearchInput::new("");
        let pending = input.input("axum", "").unwrap();

        input.clear(&mut store);
        assert_eq!(input.text(), "");
        assert!(!input.fire(pending, &mut store));
        assert_eq!(store.search_query(), "");
    }

    #[test]
    fn cancel_discards_pending_commit() {
        let mut store = QueryStore::in_memory();
        let mut input = SearchInput::new("");
        let pending = input.input("hyper", "").unwrap();
        input.cancel();
        assert!(!input.fire(pending, &mut store));
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_with_real_timer() {
        let mut store = QueryStore::in_memory();
        let mut input = SearchInput::new("");

        let early = input.input("tok", "").unwrap();
        tokio::time::sleep(SEARCH_DEBOUNCE / 2).await;
        let late = input.input("tokio", "").unwrap();
        tokio::time::sleep(SEARCH_DEBOUNCE / 2).await;
        assert!(!input.fire(early, &mut store));

        tokio::time::sleep(SEARCH_DEBOUNCE / 2).await;
        assert!(input.fire(late, &mut store));
        assert_eq!(store.search_query(), "tokio");
    }
}
