use crate::config::ClientConfig;
use crate::error::{Operation, PostClientError};
use crate::gateway::{ListQuery, PostsGateway};
use crate::model::{CreatePostPayload, PaginatedPosts, Post, parse_post, parse_posts_page};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct PostsHttp {
    client: Arc<Client>,
    base_url: String,
}

impl PostsHttp {
    pub fn connect(config: &ClientConfig) -> Result<Self, PostClientError> {
        let base_url = config.api_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PostClientError::InvalidRequest(e.to_string()))?;
        Ok(Self {
            client: Arc::new(client),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/posts/{id}` with `id` encoded as a single path segment.
    fn post_url(&self, id: &str) -> Result<Url, PostClientError> {
        let invalid =
            || PostClientError::InvalidRequest(format!("invalid API URL: {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["posts", id]);
        Ok(url)
    }

    // Shared send path: log, send, normalize failures, hand back the body text.
    async fn send(&self, op: Operation, request: RequestBuilder) -> Result<String, PostClientError> {
        let request = request.build().map_err(|e| {
            warn!(error = %e, "could not build request");
            PostClientError::transport(op)
        })?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "api request");

        let resp = self.client.execute(request).await.map_err(|e| {
            warn!(%method, %url, error = %e, "api request failed");
            PostClientError::transport(op)
        })?;

        let status = resp.status();
        debug!(%url, status = status.as_u16(), "api response");
        if !status.is_success() {
            let err = PostClientError::from_http_response(op, resp).await;
            warn!(%url, status = status.as_u16(), error = %err, "api error response");
            return Err(err);
        }

        resp.text().await.map_err(|e| {
            warn!(%url, error = %e, "could not read response body");
            PostClientError::transport(op)
        })
    }

    fn multipart(payload: CreatePostPayload) -> Result<Form, PostClientError> {
        let mut form = Form::new();
        for (name, value) in payload.text_fields() {
            form = form.text(name, value.to_string());
        }
        for image in payload.images {
            let part = Part::bytes(image.bytes)
                .file_name(image.name)
                .mime_str(&image.content_type)
                .map_err(|_| {
                    PostClientError::InvalidRequest(format!(
                        "unsupported content type {}",
                        image.content_type
                    ))
                })?;
            form = form.part("images", part);
        }
        Ok(form)
    }
}

#[async_trait(?Send)]
impl PostsGateway for PostsHttp {
    async fn list_posts(&self, query: &ListQuery) -> Result<PaginatedPosts, PostClientError> {
        let request = self
            .client
            .get(format!("{}/posts", self.base_url))
            .query(&query.params());
        let body = self.send(Operation::ListPosts, request).await?;
        parse_posts_page(&body)
    }

    async fn get_post(&self, id: &str) -> Result<Post, PostClientError> {
        let request = self.client.get(self.post_url(id)?);
        let body = self.send(Operation::GetPost, request).await?;
        parse_post(Operation::GetPost, &body)
    }

    async fn create_post(&self, payload: CreatePostPayload) -> Result<Post, PostClientError> {
        let form = Self::multipart(payload)?;
        let request = self
            .client
            .post(format!("{}/posts", self.base_url))
            .multipart(form);
        let body = self.send(Operation::CreatePost, request).await?;
        parse_post(Operation::CreatePost, &body)
    }
}
