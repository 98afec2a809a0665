//! Upload coordinator: phase one of a media submission
//!
//! A record that references media is only sent after its file has been
//! stored and the server has handed back a path. Local checks (a file was
//! selected, it can be read, it fits the limit) run before any request.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::api::{ResourceApi, StoredFile, UploadRequest};
use crate::error::{SubmitError, ValidationError};
use crate::model::UploadCategory;

/// A local file the user picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    path: PathBuf,
}

impl FileSelection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name sent in the multipart part; the server prefixes it with a timestamp
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string())
    }
}

pub struct UploadCoordinator {
    max_bytes: u64,
}

impl UploadCoordinator {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Read and check the selection. No network activity.
    pub async fn prepare(
        &self,
        selection: Option<&FileSelection>,
        category: UploadCategory,
    ) -> Result<UploadRequest, ValidationError> {
        let selection = selection.ok_or(ValidationError::NoFileSelected)?;
        let display = selection.path().display().to_string();

        let metadata = tokio::fs::metadata(selection.path()).await.map_err(|e| {
            ValidationError::UnreadableFile {
                path: display.clone(),
                reason: e.to_string(),
            }
        })?;
        if !metadata.is_file() {
            return Err(ValidationError::UnreadableFile {
                path: display,
                reason: "not a regular file".to_string(),
            });
        }
        if metadata.len() == 0 {
            return Err(ValidationError::EmptyFile(display));
        }
        if metadata.len() > self.max_bytes {
            return Err(ValidationError::FileTooLarge {
                path: display,
                size: metadata.len(),
                limit: self.max_bytes,
            });
        }

        let bytes = tokio::fs::read(selection.path()).await.map_err(|e| {
            ValidationError::UnreadableFile {
                path: display.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(UploadRequest {
            file_name: selection.file_name(),
            bytes,
            category,
        })
    }

    /// Upload the selection and return where the server stored it
    pub async fn upload<A: ResourceApi + ?Sized>(
        &self,
        api: &A,
        selection: Option<&FileSelection>,
        category: UploadCategory,
    ) -> Result<StoredFile, SubmitError> {
        let request = self.prepare(selection, category).await?;
        let size = request.bytes.len();

        let stored = api.upload(request).await.map_err(SubmitError::Upload)?;
        info!(
            "Uploaded {} bytes to {} as {}",
            size,
            category.as_str(),
            stored.filepath
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockResourceApi;
    use crate::error::ApiError;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_selection_never_reaches_network() {
        let mut api = MockResourceApi::new();
        api.expect_upload().times(0);

        let coordinator = UploadCoordinator::new(1024);
        let err = coordinator
            .upload(&api, None, UploadCategory::Stickers)
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::Validation(ValidationError::NoFileSelected));
    }

    #[tokio::test]
    async fn test_upload_sends_file_with_category() {
        let mut file = tempfile::Builder::new().suffix(".webp").tempfile().unwrap();
        file.write_all(b"RIFF0000WEBP").unwrap();
        let selection = FileSelection::new(file.path());
        let expected_name = selection.file_name();

        let mut api = MockResourceApi::new();
        api.expect_upload()
            .withf(move |req| {
                req.category == UploadCategory::Stickers
                    && req.bytes == b"RIFF0000WEBP"
                    && req.file_name == expected_name
            })
            .times(1)
            .returning(|_| {
                Ok(StoredFile {
                    filename: "20240501_101500_lol.webp".into(),
                    filepath: "media/stickers/20240501_101500_lol.webp".into(),
                })
            });

        let coordinator = UploadCoordinator::new(1024);
        let stored = coordinator
            .upload(&api, Some(&selection), UploadCategory::Stickers)
            .await
            .unwrap();
        assert_eq!(stored.filepath, "media/stickers/20240501_101500_lol.webp");
    }

    #[tokio::test]
    async fn test_server_failure_is_tagged_as_upload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"data").unwrap();
        let selection = FileSelection::new(file.path());

        let mut api = MockResourceApi::new();
        api.expect_upload()
            .returning(|_| Err(ApiError::Transport("connection refused".into())));

        let coordinator = UploadCoordinator::new(1024);
        let err = coordinator
            .upload(&api, Some(&selection), UploadCategory::Files)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Upload(ApiError::Transport(_))));
    }

    #[tokio::test]
    async fn test_local_checks() {
        let coordinator = UploadCoordinator::new(4);

        let empty = tempfile::NamedTempFile::new().unwrap();
        let err = coordinator
            .prepare(Some(&FileSelection::new(empty.path())), UploadCategory::Audios)
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyFile(_)));

        let mut big = tempfile::NamedTempFile::new().unwrap();
        big.write_all(b"too large").unwrap();
        let err = coordinator
            .prepare(Some(&FileSelection::new(big.path())), UploadCategory::Audios)
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { size: 9, limit: 4, .. }));

        let err = coordinator
            .prepare(
                Some(&FileSelection::new("/definitely/not/here.ogg")),
                UploadCategory::Audios,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnreadableFile { .. }));
    }
}
