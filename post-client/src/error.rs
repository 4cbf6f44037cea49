use serde::Deserialize;
use thiserror::Error;

/// Failure of a gateway call, already normalized to the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostClientError {
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Schema(String),
    #[error("{0}")]
    InvalidRequest(String),
}

/// The three remote operations, each with its own fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListPosts,
    GetPost,
    CreatePost,
}

impl Operation {
    pub fn default_message(self) -> &'static str {
        match self {
            Operation::ListPosts => "Failed to fetch posts",
            Operation::GetPost => "Failed to fetch post",
            Operation::CreatePost => "Failed to create post",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServerMessage {
    message: Option<String>,
}

impl PostClientError {
    /// Builds the error for a non-2xx response, preferring the server's `message` field.
    pub fn from_status(op: Operation, status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ServerMessage>(body)
            .ok()
            .and_then(|m| m.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| op.default_message().to_string());
        PostClientError::Http { status, message }
    }

    pub fn transport(op: Operation) -> Self {
        PostClientError::Transport(op.default_message().to_string())
    }

    pub fn schema(op: Operation) -> Self {
        PostClientError::Schema(op.default_message().to_string())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PostClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(feature = "http")]
impl PostClientError {
    pub async fn from_http_response(op: Operation, resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Self::from_status(op, status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_wins_over_default() {
        let err = PostClientError::from_status(
            Operation::GetPost,
            404,
            r#"{"message":"Post not found"}"#,
        );
        assert_eq!(err.to_string(), "Post not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn falls_back_to_operation_default() {
        let err = PostClientError::from_status(Operation::ListPosts, 500, "<html>oops</html>");
        assert_eq!(err.to_string(), "Failed to fetch posts");

        let err = PostClientError::from_status(Operation::CreatePost, 400, r#"{"message":"  "}"#);
        assert_eq!(err.to_string(), "Failed to create post");
    }
}
