use async_trait::async_trait;
use gloo_net::http::Request;
use js_sys::{encode_uri_component, Array, Uint8Array};
use post_client::model::{parse_post, parse_posts_page};
use post_client::{
    CreatePostPayload, ListQuery, Operation, PaginatedPosts, Post, PostClientError, PostsGateway,
};
use tracing::{debug, warn};
use web_sys::{Blob, BlobPropertyBag, FormData};

/// Browser gateway over `fetch`.
#[derive(Clone)]
pub struct PostsWeb {
    pub base_url: String,
}

impl PostsWeb {
    pub fn new(endpoint: &str) -> Self {
        Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
        }
    }

    // Универсальная отправка запроса
    async fn send(op: Operation, request: Request) -> Result<String, PostClientError> {
        let url = request.url();
        debug!(method = %request.method(), %url, "api request");

        let response = request.send().await.map_err(|e| {
            warn!(%url, error = %e, "api request failed");
            PostClientError::transport(op)
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        debug!(%url, status, "api response");

        if response.ok() {
            Ok(text)
        } else {
            Err(PostClientError::from_status(op, status, &text))
        }
    }

    fn form_data(payload: &CreatePostPayload) -> Result<FormData, PostClientError> {
        let invalid = |_| PostClientError::InvalidRequest("could not encode post".into());

        let form = FormData::new().map_err(invalid)?;
        for (name, value) in payload.text_fields() {
            form.append_with_str(name, value).map_err(invalid)?;
        }
        for image in &payload.images {
            let parts = Array::new();
            parts.push(&Uint8Array::from(image.bytes.as_slice()));
            let options = BlobPropertyBag::new();
            options.set_type(&image.content_type);
            let blob =
                Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(invalid)?;
            form.append_with_blob_and_filename("images", &blob, &image.name)
                .map_err(invalid)?;
        }
        Ok(form)
    }
}

#[async_trait(?Send)]
impl PostsGateway for PostsWeb {
    async fn list_posts(&self, query: &ListQuery) -> Result<PaginatedPosts, PostClientError> {
        let url = format!("{}/posts", self.base_url);
        let request = Request::get(&url)
            .query(query.params())
            .header("Accept", "application/json")
            .build()
            .map_err(|_| PostClientError::transport(Operation::ListPosts))?;

        let body = Self::send(Operation::ListPosts, request).await?;
        parse_posts_page(&body)
    }

    async fn get_post(&self, id: &str) -> Result<Post, PostClientError> {
        let id = String::from(encode_uri_component(id));
        let url = format!("{}/posts/{}", self.base_url, id);
        let request = Request::get(&url)
            .header("Accept", "application/json")
            .build()
            .map_err(|_| PostClientError::transport(Operation::GetPost))?;

        let body = Self::send(Operation::GetPost, request).await?;
        parse_post(Operation::GetPost, &body)
    }

    async fn create_post(&self, payload: CreatePostPayload) -> Result<Post, PostClientError> {
        let url = format!("{}/posts", self.base_url);
        let form = Self::form_data(&payload)?;
        // no Content-Type header: the browser adds the multipart boundary itself
        let request = Request::post(&url)
            .body(form)
            .map_err(|_| PostClientError::transport(Operation::CreatePost))?;

        let body = Self::send(Operation::CreatePost, request).await?;
        parse_post(Operation::CreatePost, &body)
    }
}
