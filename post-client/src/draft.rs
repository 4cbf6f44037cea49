use std::fmt;

use crate::model::{CreatePostPayload, EXCERPT_MAX_CHARS, TITLE_MAX_CHARS};
use crate::upload::{ImageIntake, MAX_IMAGES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DraftField {
    Title,
    Author,
    Excerpt,
    Content,
    Images,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: DraftField,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftErrors(Vec<FieldError>);

impl DraftErrors {
    pub fn get(&self, field: DraftField) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for DraftErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for DraftErrors {}

/// The compose form. Lives as long as the compose dialog is open and is never persisted.
#[derive(Debug, Default, Clone)]
pub struct CreatePostDraft {
    pub title: String,
    pub author: String,
    pub excerpt: String,
    pub content: String,
    /// Comma separated; split into tags by the server.
    pub tags: String,
    pub images: ImageIntake,
}

impl CreatePostDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_len(&self) -> usize {
        self.title.chars().count()
    }

    pub fn excerpt_len(&self) -> usize {
        self.excerpt.chars().count()
    }

    pub fn validate(&self) -> Result<(), DraftErrors> {
        let mut errors = Vec::new();
        let mut push = |field, message| errors.push(FieldError { field, message });

        if self.title.is_empty() {
            push(DraftField::Title, "Title is required");
        } else if self.title_len() > TITLE_MAX_CHARS {
            push(DraftField::Title, "Title cannot exceed 200 characters");
        }
        if self.author.is_empty() {
            push(DraftField::Author, "Author is required");
        }
        if self.excerpt.is_empty() {
            push(DraftField::Excerpt, "Excerpt is required");
        } else if self.excerpt_len() > EXCERPT_MAX_CHARS {
            push(DraftField::Excerpt, "Excerpt cannot exceed 300 characters");
        }
        if self.content.is_empty() {
            push(DraftField::Content, "Content is required");
        }
        if self.images.len() > MAX_IMAGES {
            push(DraftField::Images, "Maximum 5 images allowed");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DraftErrors(errors))
        }
    }

    /// Builds the request body, leaving the draft intact so a failed submit can be retried.
    pub fn to_payload(&self) -> Result<CreatePostPayload, DraftErrors> {
        self.validate()?;
        Ok(CreatePostPayload {
            title: self.title.clone(),
            author: self.author.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
            images: self.images.files().to_vec(),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{DataUriPreview, UploadFile};

    fn filled() -> CreatePostDraft {
        CreatePostDraft {
            title: "Zero-copy parsing".into(),
            author: "Grace".into(),
            excerpt: "Borrowing from the input buffer".into(),
            content: "nom, winnow and friends".into(),
            tags: "rust, parsing".into(),
            ..CreatePostDraft::default()
        }
    }

    #[test]
    fn empty_draft_reports_every_required_field() {
        let errors = CreatePostDraft::new().validate().unwrap_err();
        assert_eq!(errors.get(DraftField::Title), Some("Title is required"));
        assert_eq!(errors.get(DraftField::Author), Some("Author is required"));
        assert_eq!(errors.get(DraftField::Excerpt), Some("Excerpt is required"));
        assert_eq!(errors.get(DraftField::Content), Some("Content is required"));
        assert_eq!(errors.get(DraftField::Images), None);
    }

    #[test]
    fn length_limits_count_characters() {
        let mut draft = filled();
        draft.title = "é".repeat(200);
        draft.excerpt = "x".repeat(300);
        assert!(draft.validate().is_ok());

        draft.title.push('!');
        draft.excerpt.push('!');
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get(DraftField::Title), Some("Title cannot exceed 200 characters"));
        assert_eq!(
            errors.get(DraftField::Excerpt),
            Some("Excerpt cannot exceed 300 characters")
        );
    }

    #[tokio::test]
    async fn payload_keeps_tags_raw_and_images_ordered() {
        let mut draft = filled();
        draft
            .images
            .add_batch(
                vec![
                    UploadFile::new("cover.jpg", "image/jpeg", vec![1, 2]),
                    UploadFile::new("inline.png", "image/png", vec![3]),
                ],
                &DataUriPreview,
            )
            .await
            .unwrap();

        let payload = draft.to_payload().unwrap();
        assert_eq!(payload.tags, "rust, parsing");
        let names: Vec<_> = payload.images.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["cover.jpg", "inline.png"]);
        assert_eq!(draft.images.len(), 2);
    }
}
