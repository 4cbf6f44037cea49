use chrono::DateTime;

use crate::model::{PaginatedPosts, Post};
use crate::sync::{ListSnapshot, PostSnapshot};

pub const DEFAULT_COVER: &str =
    "https://images.unsplash.com/photo-1499750310107-5fef28a66643?w=800";

/// Tags shown on a card before collapsing the rest into `+N`.
pub const CARD_TAGS: usize = 2;

impl Post {
    /// The first uploaded image, else the legacy cover, else the stock picture.
    pub fn cover_url(&self) -> &str {
        self.images
            .as_deref()
            .and_then(|images| images.first())
            .or(self.cover_image.as_ref())
            .map(String::as_str)
            .unwrap_or(DEFAULT_COVER)
    }

    /// Images for the detail gallery. Empty when the post has no pictures at all.
    pub fn gallery(&self) -> Vec<&str> {
        match self.images.as_deref() {
            Some(images) if !images.is_empty() => images.iter().map(String::as_str).collect(),
            _ => self.cover_image.iter().map(String::as_str).collect(),
        }
    }

    pub fn image_count(&self) -> usize {
        self.images.as_ref().map_or(0, Vec::len)
    }

    /// First two tags and how many were left out.
    pub fn card_tags(&self) -> (&[String], usize) {
        let shown = self.tags.len().min(CARD_TAGS);
        (&self.tags[..shown], self.tags.len() - shown)
    }

    pub fn author_initials(&self) -> String {
        initials(&self.author)
    }

    pub fn published_on(&self) -> String {
        format_date(&self.created_at)
    }
}

pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// `Mar 7, 2026`. Unparseable input is shown as is.
pub fn format_date(iso: &str) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => iso.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Loading,
    Failed { message: String },
    Empty { search: String },
    Page { posts: PaginatedPosts, is_placeholder: bool },
}

impl ListView {
    pub fn derive(snapshot: &ListSnapshot, search: &str) -> Self {
        if let Some(err) = &snapshot.error {
            return ListView::Failed {
                message: err.to_string(),
            };
        }
        match &snapshot.data {
            None => ListView::Loading,
            Some(page) if page.is_empty() => ListView::Empty {
                search: search.to_string(),
            },
            Some(page) => ListView::Page {
                posts: page.clone(),
                is_placeholder: snapshot.is_placeholder,
            },
        }
    }
}

/// Heading and body for the empty list.
pub fn empty_message(search: &str) -> (&'static str, String) {
    if search.is_empty() {
        (
            "No posts yet",
            "There are no blog posts available at the moment.".to_string(),
        )
    } else {
        (
            "No posts found",
            format!(
                "We couldn't find any posts matching \"{}\". Try adjusting your search terms.",
                search
            ),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Loading,
    Failed { message: String },
    Loaded(Post),
}

impl DetailView {
    pub fn derive(snapshot: &PostSnapshot) -> Self {
        if let Some(err) = &snapshot.error {
            return DetailView::Failed {
                message: err.to_string(),
            };
        }
        match &snapshot.data {
            Some(post) => DetailView::Loaded(post.clone()),
            None => DetailView::Loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PostClientError;
    use crate::model::PaginationInfo;

    fn post() -> Post {
        Post {
            id: "1".into(),
            title: "t".into(),
            content: "c".into(),
            author: "ada lovelace byron".into(),
            excerpt: "e".into(),
            cover_image: Some("https://img/legacy.png".into()),
            images: None,
            tags: vec!["rust".into(), "wasm".into(), "dioxus".into(), "web".into()],
            created_at: "2026-03-07T18:30:00.000Z".into(),
            updated_at: "2026-03-07T18:30:00.000Z".into(),
        }
    }

    #[test]
    fn cover_prefers_first_uploaded_image() {
        let mut post = post();
        assert_eq!(post.cover_url(), "https://img/legacy.png");
        assert_eq!(post.gallery(), ["https://img/legacy.png"]);

        post.images = Some(vec!["https://img/a.png".into(), "https://img/b.png".into()]);
        assert_eq!(post.cover_url(), "https://img/a.png");
        assert_eq!(post.gallery(), ["https://img/a.png", "https://img/b.png"]);

        post.images = Some(vec![]);
        post.cover_image = None;
        assert_eq!(post.cover_url(), DEFAULT_COVER);
        assert!(post.gallery().is_empty());
    }

    #[test]
    fn card_shows_two_tags_and_a_counter() {
        let post = post();
        let (shown, hidden) = post.card_tags();
        assert_eq!(shown, ["rust", "wasm"]);
        assert_eq!(hidden, 2);
    }

    #[test]
    fn initials_and_dates() {
        assert_eq!(post().author_initials(), "AL");
        assert_eq!(initials("ferris"), "F");
        assert_eq!(post().published_on(), "Mar 7, 2026");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn list_view_prefers_error_then_data() {
        let empty_page = PaginatedPosts {
            data: vec![],
            pagination: PaginationInfo {
                current_page: 999,
                total_pages: 3,
                total_items: 25,
                items_per_page: 9,
                has_next_page: false,
                has_prev_page: true,
            },
        };

        let snapshot = ListSnapshot::default();
        assert_eq!(ListView::derive(&snapshot, ""), ListView::Loading);

        let snapshot = ListSnapshot {
            data: Some(empty_page.clone()),
            ..ListSnapshot::default()
        };
        assert_eq!(
            ListView::derive(&snapshot, "zig"),
            ListView::Empty {
                search: "zig".into()
            }
        );

        let snapshot = ListSnapshot {
            data: Some(empty_page),
            error: Some(PostClientError::Transport("Failed to fetch posts".into())),
            ..ListSnapshot::default()
        };
        assert_eq!(
            ListView::derive(&snapshot, ""),
            ListView::Failed {
                message: "Failed to fetch posts".into()
            }
        );
    }

    #[test]
    fn empty_message_mentions_search() {
        assert_eq!(empty_message("").0, "No posts yet");
        let (title, body) = empty_message("zig");
        assert_eq!(title, "No posts found");
        assert!(body.contains("\"zig\""));
    }
}
