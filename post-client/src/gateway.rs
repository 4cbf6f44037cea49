use async_trait::async_trait;

use crate::error::PostClientError;
use crate::model::{CreatePostPayload, PaginatedPosts, Post};

/// Parameters of one list request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
}

impl ListQuery {
    /// Query string pairs. `search` is left out entirely when empty so the server can
    /// tell "no filter" apart from a filter on the empty string.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        params
    }
}

/// The remote posts API. Each call fails independently and never retries.
#[async_trait(?Send)]
pub trait PostsGateway {
    async fn list_posts(&self, query: &ListQuery) -> Result<PaginatedPosts, PostClientError>;
    async fn get_post(&self, id: &str) -> Result<Post, PostClientError>;
    async fn create_post(&self, payload: CreatePostPayload) -> Result<Post, PostClientError>;
}
