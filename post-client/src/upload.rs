use async_trait::async_trait;
use base64::prelude::*;
use futures_util::future::join_all;
use thiserror::Error;

pub const MAX_IMAGES: usize = 5;
pub const MAX_IMAGE_MB: u64 = 5;
pub const MAX_IMAGE_BYTES: u64 = MAX_IMAGE_MB * 1024 * 1024;

/// An image picked or dropped by the user, held in memory until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn meta(&self) -> FileMeta {
        FileMeta {
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            size: self.size(),
        }
    }

    pub fn validate(&self) -> Option<String> {
        self.meta().validate()
    }
}

/// What the picker reports about a file before its bytes are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

impl FileMeta {
    /// Per-file check; `None` when the file is acceptable.
    pub fn validate(&self) -> Option<String> {
        if !self.content_type.starts_with("image/") {
            return Some(format!("{} is not an image file", self.name));
        }
        if self.size > MAX_IMAGE_BYTES {
            return Some(format!("{} exceeds {}MB", self.name, MAX_IMAGE_MB));
        }
        None
    }
}

/// A picked file whose contents are loaded on demand.
#[async_trait(?Send)]
pub trait FileSource {
    fn meta(&self) -> FileMeta;
    async fn read(&self) -> Result<Vec<u8>, String>;
}

/// Loads every file of a batch that already passed [`ImageIntake::check_batch`].
/// One unreadable file fails the whole batch.
pub async fn read_batch<S: FileSource>(sources: &[S]) -> Result<Vec<UploadFile>, IntakeError> {
    let reads = join_all(sources.iter().map(|s| s.read())).await;
    sources
        .iter()
        .zip(reads)
        .map(|(source, read)| {
            let meta = source.meta();
            match read {
                Ok(bytes) => Ok(UploadFile::new(meta.name, meta.content_type, bytes)),
                Err(e) => {
                    tracing::warn!(file = %meta.name, error = %e, "could not read picked file");
                    Err(IntakeError::Unreadable(meta.name))
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("Maximum {} images allowed", MAX_IMAGES)]
    TooManyFiles,
    #[error("{}", .0.join(", "))]
    InvalidFiles(Vec<String>),
    #[error("Could not read {0}")]
    Unreadable(String),
}

/// Produces the displayable preview of a file.
#[async_trait(?Send)]
pub trait PreviewRenderer {
    async fn render(&self, file: &UploadFile) -> String;
}

/// Inline `data:` URI preview, what a browser `FileReader` would hand back.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataUriPreview;

#[async_trait(?Send)]
impl PreviewRenderer for DataUriPreview {
    async fn render(&self, file: &UploadFile) -> String {
        format!(
            "data:{};base64,{}",
            file.content_type,
            BASE64_STANDARD.encode(&file.bytes)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntakeState {
    #[default]
    Idle,
    Validating,
    PreviewGenerating,
    Committed,
}

/// A batch that passed validation and still needs previews.
#[derive(Debug)]
pub struct ValidatedBatch {
    files: Vec<UploadFile>,
}

/// A batch whose previews all resolved, ready to be appended.
#[derive(Debug)]
pub struct PreviewedBatch {
    files: Vec<UploadFile>,
    previews: Vec<String>,
}

impl ValidatedBatch {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Renders every preview concurrently and waits for all of them.
    pub async fn render_previews(self, renderer: &dyn PreviewRenderer) -> PreviewedBatch {
        let previews = join_all(self.files.iter().map(|f| renderer.render(f))).await;
        PreviewedBatch {
            files: self.files,
            previews,
        }
    }
}

/// The ordered set of images attached to a draft post. Slot 0 is the cover.
///
/// Batches are all-or-nothing: one bad file rejects everything that arrived with it.
#[derive(Debug, Default, Clone)]
pub struct ImageIntake {
    files: Vec<UploadFile>,
    previews: Vec<String>,
    state: IntakeState,
    error: Option<String>,
    picker_epoch: u64,
}

impl ImageIntake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    pub fn previews(&self) -> &[String] {
        &self.previews
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.files.len() >= MAX_IMAGES
    }

    pub fn cover(&self) -> Option<&UploadFile> {
        self.files.first()
    }

    pub fn state(&self) -> IntakeState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Bumped on every commit so the file picker can be re-created and the same file
    /// chosen again.
    pub fn picker_epoch(&self) -> u64 {
        self.picker_epoch
    }

    /// Count and per-file checks on metadata alone. Clears the previous error.
    pub fn check_batch(&mut self, batch: &[FileMeta]) -> Result<(), IntakeError> {
        self.error = None;
        self.state = IntakeState::Validating;

        if self.files.len() + batch.len() > MAX_IMAGES {
            return Err(self.fail(IntakeError::TooManyFiles));
        }

        let errors: Vec<String> = batch.iter().filter_map(FileMeta::validate).collect();
        if !errors.is_empty() {
            return Err(self.fail(IntakeError::InvalidFiles(errors)));
        }
        Ok(())
    }

    /// First half of a batch whose bytes are in hand.
    pub fn validate_batch(
        &mut self,
        batch: Vec<UploadFile>,
    ) -> Result<ValidatedBatch, IntakeError> {
        let metas: Vec<FileMeta> = batch.iter().map(UploadFile::meta).collect();
        self.check_batch(&metas)?;
        self.state = IntakeState::PreviewGenerating;
        Ok(ValidatedBatch { files: batch })
    }

    /// Second half of a batch: append files and previews together.
    pub fn commit(&mut self, batch: PreviewedBatch) -> Result<usize, IntakeError> {
        if self.files.len() + batch.files.len() > MAX_IMAGES {
            return Err(self.fail(IntakeError::TooManyFiles));
        }
        let added = batch.files.len();
        self.files.extend(batch.files);
        self.previews.extend(batch.previews);
        self.state = IntakeState::Committed;
        self.picker_epoch += 1;
        tracing::debug!(added, total = self.files.len(), "image batch committed");
        Ok(added)
    }

    /// Validates, previews and commits a batch in one go.
    pub async fn add_batch(
        &mut self,
        batch: Vec<UploadFile>,
        renderer: &dyn PreviewRenderer,
    ) -> Result<usize, IntakeError> {
        let validated = self.validate_batch(batch)?;
        let previewed = validated.render_previews(renderer).await;
        self.commit(previewed)
    }

    pub fn clear(&mut self) {
        *self = Self {
            picker_epoch: self.picker_epoch + 1,
            ..Self::default()
        };
    }

    pub fn into_files(self) -> Vec<UploadFile> {
        self.files
    }

    /// Records a rejected batch; the files already held stay.
    pub fn fail(&mut self, err: IntakeError) -> IntakeError {
        tracing::debug!(error = %err, "image batch rejected");
        self.error = Some(err.to_string());
        self.state = IntakeState::Idle;
        err
    }
}
