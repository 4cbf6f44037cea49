use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::error::PostClientError;
use crate::gateway::{ListQuery, PostsGateway};
use crate::model::{CreatePostPayload, PaginatedPosts, Post};
use crate::query::QueryState;

impl From<&QueryState> for ListQuery {
    fn from(state: &QueryState) -> Self {
        Self {
            page: state.current_page,
            limit: state.limit,
            search: state.search_query.clone(),
        }
    }
}

/// Result of a fetch that made it back from the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// The result is now what the view for this key shows.
    Applied(T),
    /// A newer request for the key, or a different key, took over while this one was in
    /// flight. Nothing visible changed.
    Superseded,
}

impl<T> Fetched<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Fetched::Applied(v) => Some(v),
            Fetched::Superseded => None,
        }
    }
}

/// Handle for one in-flight request. Only the newest ticket for a key may write it.
#[derive(Debug)]
#[must_use]
pub struct Ticket<K> {
    key: K,
    id: u64,
}

impl<K> Ticket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

pub type ListTicket = Ticket<ListQuery>;
pub type PostTicket = Ticket<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    data: Option<T>,
    error: Option<PostClientError>,
    stale: bool,
    pending: Option<u64>,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            stale: false,
            pending: None,
        }
    }
}

impl<T: Clone> Entry<T> {
    fn fresh(&self) -> Option<T> {
        match (&self.data, &self.error, self.stale) {
            (Some(data), None, false) => Some(data.clone()),
            _ => None,
        }
    }

    // Returns whether the result was written.
    fn settle(&mut self, id: u64, result: &Result<T, PostClientError>) -> bool {
        if self.pending != Some(id) {
            return false;
        }
        self.pending = None;
        match result {
            Ok(data) => {
                self.data = Some(data.clone());
                self.error = None;
                self.stale = false;
            }
            Err(e) => self.error = Some(e.clone()),
        }
        true
    }
}

/// What the list view should render for a query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListSnapshot {
    pub data: Option<PaginatedPosts>,
    /// `data` belongs to a previous query and is shown until this one lands.
    pub is_placeholder: bool,
    pub is_fetching: bool,
    pub is_stale: bool,
    pub error: Option<PostClientError>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PostSnapshot {
    pub data: Option<Post>,
    pub is_fetching: bool,
    pub error: Option<PostClientError>,
}

#[derive(Debug, Default)]
struct SyncState {
    next_ticket: u64,
    lists: HashMap<ListQuery, Entry<PaginatedPosts>>,
    posts: HashMap<String, Entry<Post>>,
    active_list: Option<ListQuery>,
    displayed: Option<PaginatedPosts>,
    notifications: Vec<Notification>,
}

impl SyncState {
    fn issue<K, T>(next: &mut u64, entries: &mut HashMap<K, Entry<T>>, key: K) -> Ticket<K>
    where
        K: Eq + Hash + Clone,
    {
        *next += 1;
        let id = *next;
        entries.entry(key.clone()).or_default().pending = Some(id);
        Ticket { key, id }
    }
}

/// Keeps list and detail results cached per query and decides which response gets shown.
///
/// The lock is only taken for bookkeeping, never across a gateway call.
pub struct PostsSync<G> {
    gateway: Arc<G>,
    state: Arc<Mutex<SyncState>>,
}

impl<G> Clone for PostsSync<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            state: Arc::clone(&self.state),
        }
    }
}

impl<G: PostsGateway> PostsSync<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway: Arc::new(gateway),
            state: Arc::new(Mutex::new(SyncState::default())),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks `query` as the list being viewed and registers a new request for it.
    pub fn begin_list(&self, query: &ListQuery) -> ListTicket {
        let mut state = self.state();
        let state = &mut *state;
        state.active_list = Some(query.clone());
        SyncState::issue(&mut state.next_ticket, &mut state.lists, query.clone())
    }

    pub fn complete_list(
        &self,
        ticket: ListTicket,
        result: Result<PaginatedPosts, PostClientError>,
    ) -> Result<Fetched<PaginatedPosts>, PostClientError> {
        let mut state = self.state();
        let written = state
            .lists
            .get_mut(&ticket.key)
            .is_some_and(|entry| entry.settle(ticket.id, &result));
        let active = state.active_list.as_ref() == Some(&ticket.key);

        if !(written && active) {
            debug!(query = ?ticket.key, written, "list response superseded");
            return Ok(Fetched::Superseded);
        }
        match result {
            Ok(page) => {
                state.displayed = Some(page.clone());
                Ok(Fetched::Applied(page))
            }
            Err(e) => Err(e),
        }
    }

    /// Loads a list page, serving it from cache when a fresh copy exists.
    pub async fn fetch_list(
        &self,
        query: &ListQuery,
    ) -> Result<Fetched<PaginatedPosts>, PostClientError> {
        {
            let mut state = self.state();
            if let Some(page) = state.lists.get(query).and_then(Entry::fresh) {
                state.active_list = Some(query.clone());
                state.displayed = Some(page.clone());
                return Ok(Fetched::Applied(page));
            }
        }
        self.refetch_list(query).await
    }

    /// Always goes to the gateway. Backs the retry action.
    pub async fn refetch_list(
        &self,
        query: &ListQuery,
    ) -> Result<Fetched<PaginatedPosts>, PostClientError> {
        let ticket = self.begin_list(query);
        debug!(?query, "fetching posts");
        let result = self.gateway.list_posts(query).await;
        self.complete_list(ticket, result)
    }

    pub fn list_snapshot(&self, query: &ListQuery) -> ListSnapshot {
        let state = self.state();
        let entry = state.lists.get(query);
        let mut snapshot = ListSnapshot {
            data: entry.and_then(|e| e.data.clone()),
            is_placeholder: false,
            is_fetching: entry.is_some_and(|e| e.pending.is_some()),
            is_stale: entry.is_some_and(|e| e.stale),
            error: entry.and_then(|e| e.error.clone()),
        };
        if snapshot.data.is_none() && snapshot.error.is_none() {
            snapshot.data = state.displayed.clone();
            snapshot.is_placeholder = snapshot.data.is_some();
        }
        snapshot
    }

    /// Snapshot of whichever list was requested last.
    pub fn active_list(&self) -> Option<ListSnapshot> {
        let query = self.state().active_list.clone()?;
        Some(self.list_snapshot(&query))
    }

    pub fn begin_post(&self, id: &str) -> PostTicket {
        let mut state = self.state();
        let state = &mut *state;
        SyncState::issue(&mut state.next_ticket, &mut state.posts, id.to_string())
    }

    pub fn complete_post(
        &self,
        ticket: PostTicket,
        result: Result<Post, PostClientError>,
    ) -> Result<Fetched<Post>, PostClientError> {
        let written = self
            .state()
            .posts
            .get_mut(&ticket.key)
            .is_some_and(|entry| entry.settle(ticket.id, &result));
        if !written {
            debug!(id = %ticket.key, "post response superseded");
            return Ok(Fetched::Superseded);
        }
        result.map(Fetched::Applied)
    }

    pub async fn fetch_post(&self, id: &str) -> Result<Fetched<Post>, PostClientError> {
        if let Some(post) = self.state().posts.get(id).and_then(Entry::fresh) {
            return Ok(Fetched::Applied(post));
        }
        self.refetch_post(id).await
    }

    pub async fn refetch_post(&self, id: &str) -> Result<Fetched<Post>, PostClientError> {
        let ticket = self.begin_post(id);
        debug!(%id, "fetching post");
        let result = self.gateway.get_post(id).await;
        self.complete_post(ticket, result)
    }

    pub fn post_snapshot(&self, id: &str) -> PostSnapshot {
        let state = self.state();
        match state.posts.get(id) {
            Some(entry) => PostSnapshot {
                data: entry.data.clone(),
                is_fetching: entry.pending.is_some(),
                error: entry.error.clone(),
            },
            None => PostSnapshot::default(),
        }
    }

    /// Marks every cached list page stale so the next fetch of any of them hits the server.
    pub fn invalidate_lists(&self) {
        let mut state = self.state();
        for entry in state.lists.values_mut() {
            entry.stale = true;
            // responses already in flight predate the change and must not refresh the entry
            entry.pending = None;
        }
        debug!(entries = state.lists.len(), "list cache invalidated");
    }

    /// Submits a new post. Success invalidates every cached list rather than splicing
    /// the post in, since only the server knows where it lands.
    pub async fn create_post(&self, payload: CreatePostPayload) -> Result<Post, PostClientError> {
        let images = payload.images.len();
        match self.gateway.create_post(payload).await {
            Ok(post) => {
                info!(id = %post.id, images, "post created");
                self.invalidate_lists();
                let mut state = self.state();
                state.posts.insert(
                    post.id.clone(),
                    Entry {
                        data: Some(post.clone()),
                        ..Entry::default()
                    },
                );
                state.notifications.push(Notification {
                    kind: NotificationKind::Success,
                    title: "Post created successfully!".into(),
                    description: "Your post has been published to the community.".into(),
                });
                Ok(post)
            }
            Err(e) => {
                warn!(error = %e, "post creation failed");
                self.state().notifications.push(Notification {
                    kind: NotificationKind::Error,
                    title: "Failed to create post".into(),
                    description: e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut self.state().notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use crate::model::PaginationInfo;
    use async_trait::async_trait;
    use futures_util::poll;
    use std::pin::pin;
    use tokio::sync::oneshot;

    fn post(id: &str, title: &str) -> Post {
        Post {
            id: id.into(),
            title: title.into(),
            content: "body".into(),
            author: "Ferris".into(),
            excerpt: "excerpt".into(),
            cover_image: None,
            images: None,
            tags: vec![],
            created_at: "2026-05-01T00:00:00Z".into(),
            updated_at: "2026-05-01T00:00:00Z".into(),
        }
    }

    fn page_for(query: &ListQuery) -> PaginatedPosts {
        let title = if query.search.is_empty() {
            format!("page {}", query.page)
        } else {
            query.search.clone()
        };
        PaginatedPosts {
            data: vec![post(&format!("{}-{}", title, query.page), &title)],
            pagination: PaginationInfo {
                current_page: query.page as i64,
                total_pages: 3,
                total_items: 25,
                items_per_page: query.limit as i64,
                has_next_page: query.page < 3,
                has_prev_page: query.page > 1,
            },
        }
    }

    fn query(page: u32, search: &str) -> ListQuery {
        ListQuery {
            page,
            limit: 9,
            search: search.into(),
        }
    }

    #[derive(Default)]
    struct FakeGateway {
        list_calls: Mutex<Vec<ListQuery>>,
        held: Mutex<HashMap<String, oneshot::Receiver<()>>>,
        posts: Mutex<HashMap<String, Post>>,
        reject_create: bool,
    }

    impl FakeGateway {
        /// Holds responses for `search` until the returned sender fires.
        fn hold(&self, search: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.held.lock().unwrap().insert(search.into(), rx);
            tx
        }

        fn list_calls(&self) -> usize {
            self.list_calls.lock().unwrap().len()
        }
    }

    #[async_trait(?Send)]
    impl PostsGateway for FakeGateway {
        async fn list_posts(&self, query: &ListQuery) -> Result<PaginatedPosts, PostClientError> {
            self.list_calls.lock().unwrap().push(query.clone());
            let gate = self.held.lock().unwrap().remove(&query.search);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(page_for(query))
        }

        async fn get_post(&self, id: &str) -> Result<Post, PostClientError> {
            self.posts.lock().unwrap().get(id).cloned().ok_or_else(|| {
                PostClientError::from_status(
                    Operation::GetPost,
                    404,
                    r#"{"message":"Post not found"}"#,
                )
            })
        }

        async fn create_post(&self, payload: CreatePostPayload) -> Result<Post, PostClientError> {
            if self.reject_create {
                return Err(PostClientError::from_status(Operation::CreatePost, 500, ""));
            }
            Ok(post("fresh", &payload.title))
        }
    }

    fn payload() -> CreatePostPayload {
        CreatePostPayload {
            title: "New".into(),
            author: "Ferris".into(),
            excerpt: "e".into(),
            content: "c".into(),
            tags: "a,b".into(),
            images: vec![],
        }
    }

    fn shown_title(sync: &PostsSync<FakeGateway>) -> String {
        let snapshot = sync.active_list().unwrap();
        snapshot.data.unwrap().data[0].title.clone()
    }

    #[tokio::test]
    async fn slow_old_search_never_overwrites_newer_one() {
        let sync = PostsSync::new(FakeGateway::default());
        let release_foo = sync.gateway().hold("foo");

        let foo_query = query(1, "foo");
        let mut foo = pin!(sync.fetch_list(&foo_query));
        assert!(poll!(foo.as_mut()).is_pending());

        let bar = sync.fetch_list(&query(1, "bar")).await.unwrap();
        assert!(matches!(bar, Fetched::Applied(_)));

        release_foo.send(()).unwrap();
        assert_eq!(foo.await.unwrap(), Fetched::Superseded);
        assert_eq!(shown_title(&sync), "bar");
    }

    #[tokio::test]
    async fn older_ticket_for_same_key_is_discarded() {
        let sync = PostsSync::new(FakeGateway::default());
        let q = query(2, "");
        let first = sync.begin_list(&q);
        let second = sync.begin_list(&q);

        let mut newer = page_for(&q);
        newer.data[0].title = "newer".into();
        let mut older = page_for(&q);
        older.data[0].title = "older".into();

        assert!(matches!(sync.complete_list(second, Ok(newer)), Ok(Fetched::Applied(_))));
        assert_eq!(sync.complete_list(first, Ok(older)), Ok(Fetched::Superseded));
        assert_eq!(shown_title(&sync), "newer");
    }

    #[tokio::test]
    async fn previous_page_stays_visible_while_next_loads() {
        let sync = PostsSync::new(FakeGateway::default());
        sync.fetch_list(&query(1, "")).await.unwrap();

        let next = query(2, "");
        let ticket = sync.begin_list(&next);
        let snapshot = sync.list_snapshot(&next);
        assert!(snapshot.is_placeholder);
        assert!(snapshot.is_fetching);
        assert_eq!(snapshot.data.unwrap().pagination.current_page, 1);

        sync.complete_list(ticket, Ok(page_for(&next))).unwrap();
        let snapshot = sync.list_snapshot(&next);
        assert!(!snapshot.is_placeholder);
        assert_eq!(snapshot.data.unwrap().pagination.current_page, 2);
    }

    #[tokio::test]
    async fn fresh_pages_come_from_cache() {
        let sync = PostsSync::new(FakeGateway::default());
        sync.fetch_list(&query(1, "")).await.unwrap();
        sync.fetch_list(&query(2, "")).await.unwrap();
        sync.fetch_list(&query(1, "")).await.unwrap();
        assert_eq!(sync.gateway().list_calls(), 2);

        sync.refetch_list(&query(1, "")).await.unwrap();
        assert_eq!(sync.gateway().list_calls(), 3);
    }

    #[tokio::test]
    async fn create_invalidates_every_cached_list() {
        let sync = PostsSync::new(FakeGateway::default());
        sync.fetch_list(&query(1, "")).await.unwrap();
        sync.fetch_list(&query(1, "rust")).await.unwrap();
        assert_eq!(sync.gateway().list_calls(), 2);

        let created = sync.create_post(payload()).await.unwrap();
        assert_eq!(created.title, "New");
        assert!(sync.list_snapshot(&query(1, "rust")).is_stale);

        sync.fetch_list(&query(1, "rust")).await.unwrap();
        sync.fetch_list(&query(1, "")).await.unwrap();
        assert_eq!(sync.gateway().list_calls(), 4);
        assert!(!sync.list_snapshot(&query(1, "")).is_stale);

        let notes = sync.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Success);
        assert_eq!(notes[0].title, "Post created successfully!");
        assert!(sync.take_notifications().is_empty());

        assert_eq!(sync.post_snapshot("fresh").data.unwrap().title, "New");
    }

    #[tokio::test]
    async fn response_in_flight_during_create_stays_stale() {
        let sync = PostsSync::new(FakeGateway::default());
        let home = query(1, "");
        sync.fetch_list(&home).await.unwrap();

        let ticket = sync.begin_list(&home);
        sync.create_post(payload()).await.unwrap();
        let mut before = page_for(&home);
        before.data[0].title = "before create".into();
        assert_eq!(
            sync.complete_list(ticket, Ok(before)).unwrap(),
            Fetched::Superseded
        );
        assert!(sync.list_snapshot(&home).is_stale);

        let calls = sync.gateway().list_calls();
        let page = sync.fetch_list(&home).await.unwrap().applied().unwrap();
        assert_eq!(sync.gateway().list_calls(), calls + 1);
        assert_eq!(page.data[0].title, "page 1");
    }

    #[tokio::test]
    async fn failed_create_notifies_and_keeps_cache() {
        let sync = PostsSync::new(FakeGateway {
            reject_create: true,
            ..FakeGateway::default()
        });
        sync.fetch_list(&query(1, "")).await.unwrap();

        let err = sync.create_post(payload()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to create post");
        assert!(!sync.list_snapshot(&query(1, "")).is_stale);

        let notes = sync.take_notifications();
        assert_eq!(
            notes,
            vec![Notification {
                kind: NotificationKind::Error,
                title: "Failed to create post".into(),
                description: "Failed to create post".into(),
            }]
        );
    }

    #[tokio::test]
    async fn unknown_post_is_retryable() {
        let sync = PostsSync::new(FakeGateway::default());
        let err = sync.fetch_post("ghost").await.unwrap_err();
        assert!(err.is_not_found());

        let snapshot = sync.post_snapshot("ghost");
        assert_eq!(snapshot.error.unwrap().to_string(), "Post not found");
        assert!(snapshot.data.is_none());
        assert!(!snapshot.is_fetching);

        sync.gateway()
            .posts
            .lock()
            .unwrap()
            .insert("ghost".into(), post("ghost", "Found it"));
        let fetched = sync.fetch_post("ghost").await.unwrap();
        assert_eq!(fetched.applied().unwrap().title, "Found it");
        assert!(sync.post_snapshot("ghost").error.is_none());
    }

    #[test]
    fn query_state_maps_to_list_key() {
        let state = QueryState {
            current_page: 4,
            search_query: "tokio".into(),
            limit: 12,
        };
        assert_eq!(
            ListQuery::from(&state),
            ListQuery {
                page: 4,
                limit: 12,
                search: "tokio".into(),
            }
        );
    }
}
