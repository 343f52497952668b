//! Upload storage on the local filesystem.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::StorageResult;

/// A file written by [`UploadStore::save`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    /// Name under the upload directory, returned to the client
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Writes uploads into one directory under collision-free names.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Store `bytes` as `<uuid>-<sanitized original name>`.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> StorageResult<StoredFile> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = format!(
            "{}-{}",
            Uuid::new_v4().simple(),
            sanitize_file_name(original_name)
        );
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, bytes).await?;

        Ok(StoredFile {
            file_name,
            path,
            size: bytes.len() as u64,
        })
    }
}

/// Keep the last path component and replace anything outside
/// `[A-Za-z0-9._-]` with `_`. Never returns an empty or dot-leading name.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\cv final.pdf"), "cv_final.pdf");
        assert_eq!(sanitize_file_name(".htaccess"), "htaccess");
        assert_eq!(sanitize_file_name("été.png"), "_t_.png");
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("..."), "upload");
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let dir = tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("nested"));

        let stored = store.save("photo.jpg", b"hello").await.unwrap();
        assert!(stored.file_name.ends_with("-photo.jpg"));
        assert_eq!(stored.size, 5);
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_same_name_does_not_collide() {
        let dir = tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let a = store.save("a.png", b"1").await.unwrap();
        let b = store.save("a.png", b"2").await.unwrap();
        assert_ne!(a.file_name, b.file_name);
        assert_eq!(std::fs::read(&a.path).unwrap(), b"1");
        assert_eq!(std::fs::read(&b.path).unwrap(), b"2");
    }
}
