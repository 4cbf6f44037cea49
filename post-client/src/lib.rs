//! Client side of the posts board: query state, the remote gateway, the response cache
//! and the image intake used when composing a post.

pub mod draft;
pub mod error;
pub mod gateway;
pub mod model;
pub mod pagination;
pub mod query;
pub mod search;
pub mod sync;
pub mod upload;
pub mod view;

#[cfg(feature = "http")]
pub mod config;
#[cfg(feature = "http")]
mod http_client;

#[cfg(feature = "http")]
pub use config::ClientConfig;
pub use draft::{CreatePostDraft, DraftErrors, DraftField};
pub use error::{Operation, PostClientError};
pub use gateway::{ListQuery, PostsGateway};
#[cfg(feature = "http")]
pub use http_client::PostsHttp;
pub use model::{CreatePostPayload, PaginatedPosts, PaginationInfo, Post};
pub use query::{FilePageSize, MemoryPageSize, PageSizeStore, QueryState, QueryStore};
pub use search::{SEARCH_DEBOUNCE, SearchInput};
pub use sync::{Fetched, ListSnapshot, Notification, NotificationKind, PostSnapshot, PostsSync};
pub use upload::{
    DataUriPreview, FileMeta, FileSource, ImageIntake, IntakeError, PreviewRenderer, UploadFile,
    read_batch,
};
pub use view::{DetailView, ListView};
