use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
}

/// Stores objects as plain files under a root directory.
#[derive(Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl StorageClient for FsStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.object_path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    /// A key whose file is already gone is not an error: the database row is
    /// the source of truth, the file is replaceable.
    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        let path = self.object_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_delete_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FsStorage::new(dir.path());

        storage
            .put_object("profile_1.jpg", Bytes::from_static(b"jpeg bytes"))
            .await
            .expect("put");
        let on_disk = std::fs::read(dir.path().join("profile_1.jpg")).expect("read back");
        assert_eq!(on_disk, b"jpeg bytes");

        storage.delete_object("profile_1.jpg").await.expect("delete");
        assert!(!dir.path().join("profile_1.jpg").exists());
    }

    #[tokio::test]
    async fn put_creates_nested_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FsStorage::new(dir.path());

        storage
            .put_object("photos/2026/p.png", Bytes::from_static(b"png"))
            .await
            .expect("put nested");
        assert!(dir.path().join("photos/2026/p.png").exists());
    }

    #[tokio::test]
    async fn delete_missing_is_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FsStorage::new(dir.path());

        storage
            .delete_object("never-written.gif")
            .await
            .expect("deleting an absent object should succeed");
    }
}
