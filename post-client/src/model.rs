use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::{Operation, PostClientError};
use crate::upload::UploadFile;

pub const TITLE_MAX_CHARS: usize = 200;
pub const EXCERPT_MAX_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
#[display("Post {{ id: {}, title: {}, author: {} }}", id, title, author)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Server-computed paging metadata. Signed so that malformed bodies still parse and
/// can be rejected by [`PaginatedPosts::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedPosts {
    pub data: Vec<Post>,
    pub pagination: PaginationInfo,
}

impl PaginationInfo {
    pub fn validate(&self) -> Result<(), String> {
        if self.current_page < 1 {
            return Err(format!("currentPage must be positive, got {}", self.current_page));
        }
        if self.total_pages < 0 {
            return Err(format!("totalPages must not be negative, got {}", self.total_pages));
        }
        if self.total_items < 0 {
            return Err(format!("totalItems must not be negative, got {}", self.total_items));
        }
        if self.items_per_page < 1 {
            return Err(format!(
                "itemsPerPage must be positive, got {}",
                self.items_per_page
            ));
        }
        Ok(())
    }
}

impl PaginatedPosts {
    pub fn validate(self) -> Result<Self, PostClientError> {
        if let Err(reason) = self.pagination.validate() {
            tracing::warn!(%reason, "rejecting malformed posts page");
            return Err(PostClientError::schema(Operation::ListPosts));
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Parses a list body, treating any shape mismatch as a failed fetch.
pub fn parse_posts_page(body: &str) -> Result<PaginatedPosts, PostClientError> {
    let page: PaginatedPosts = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "posts page does not match the expected shape");
        PostClientError::schema(Operation::ListPosts)
    })?;
    page.validate()
}

pub fn parse_post(op: Operation, body: &str) -> Result<Post, PostClientError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "post does not match the expected shape");
        PostClientError::schema(op)
    })
}

/// A validated create request: text fields plus images in cover-first order.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePostPayload {
    pub title: String,
    pub author: String,
    pub excerpt: String,
    pub content: String,
    pub tags: String,
    pub images: Vec<UploadFile>,
}

impl CreatePostPayload {
    /// Text parts in the order they go on the wire.
    pub fn text_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("title", self.title.as_str()),
            ("author", self.author.as_str()),
            ("excerpt", self.excerpt.as_str()),
            ("content", self.content.as_str()),
            ("tags", self.tags.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_json(total_items: i64) -> String {
        json!({
            "data": [{
                "_id": "65f0c1",
                "title": "Borrow checker field notes",
                "content": "Lifetimes, again.",
                "author": "Ada Byron",
                "excerpt": "What the compiler taught me",
                "tags": ["rust", "compilers", "notes"],
                "createdAt": "2026-03-01T10:00:00.000Z",
                "updatedAt": "2026-03-01T10:00:00.000Z"
            }],
            "pagination": {
                "currentPage": 1,
                "totalPages": 1,
                "totalItems": total_items,
                "itemsPerPage": 9,
                "hasNextPage": false,
                "hasPrevPage": false
            }
        })
        .to_string()
    }

    #[test]
    fn parses_well_formed_page() {
        let page = parse_posts_page(&page_json(1)).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, "65f0c1");
        assert_eq!(page.data[0].images, None);
        assert_eq!(page.pagination.items_per_page, 9);
    }

    #[test]
    fn negative_total_items_is_rejected() {
        let err = parse_posts_page(&page_json(-3)).unwrap_err();
        assert_eq!(err, PostClientError::Schema("Failed to fetch posts".into()));
    }

    #[test]
    fn missing_pagination_is_rejected() {
        let err = parse_posts_page(r#"{"data": []}"#).unwrap_err();
        assert!(matches!(err, PostClientError::Schema(_)));
    }

    #[test]
    fn post_display_is_compact() {
        let page = parse_posts_page(&page_json(1)).unwrap();
        assert_eq!(
            page.data[0].to_string(),
            "Post { id: 65f0c1, title: Borrow checker field notes, author: Ada Byron }"
        );
    }
}
