//! File system operations
//!
//! `FileStore` is the only component that touches the shared directory. Every
//! name it receives is checked to be a direct child of the root before any
//! filesystem call is made.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use log::{error, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::pin;
use std::time::SystemTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::ShareError;
use crate::storage::validation::is_plain_file_name;

/// Directory below the root holding uploads that are still being written.
/// Listing only returns regular files, so nothing in here is ever visible.
const STAGING_DIR: &str = ".incoming";

/// Accessor for the shared directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ShareError> {
        let store = Self { root: root.into() };
        store.ensure_root().await?;
        info!("Storage root: {}", store.root.display());
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn ensure_root(&self) -> Result<(), ShareError> {
        fs::create_dir_all(self.root.join(STAGING_DIR)).await?;
        Ok(())
    }

    /// Resolve a stored name to its real path below the root
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ShareError> {
        if !is_plain_file_name(name) || name == STAGING_DIR {
            return Err(ShareError::InvalidPath(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// Check whether anything occupies `name`
    pub async fn exists(&self, name: &str) -> Result<bool, ShareError> {
        let path = self.resolve(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn file_metadata(&self, name: &str) -> Result<std::fs::Metadata, ShareError> {
        let path = self.resolve(name)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(meta),
            Ok(_) => Err(ShareError::NotFound(name.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ShareError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Size of a stored file in bytes
    pub async fn size(&self, name: &str) -> Result<u64, ShareError> {
        Ok(self.file_metadata(name).await?.len())
    }

    /// Last modification time of a stored file
    pub async fn modified_at(&self, name: &str) -> Result<SystemTime, ShareError> {
        Ok(self.file_metadata(name).await?.modified()?)
    }

    /// Names of all regular files directly below the root.
    ///
    /// Symlinks are followed, so a link to a file is listed and a link to a
    /// directory is not. Order is unspecified.
    pub async fn list(&self) -> Result<Vec<String>, ShareError> {
        self.ensure_root().await?;

        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            error!("Failed to list {}: {}", self.root.display(), e);
            ShareError::from(e)
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                warn!("Skipping non UTF-8 entry {:?}", entry.file_name());
                continue;
            };

            match fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => names.push(name),
                Ok(_) => {}
                // Dangling symlink or removed since read_dir
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(names)
    }

    /// Open a stored file for reading, returning it with its length
    pub async fn open_read(&self, name: &str) -> Result<(fs::File, u64), ShareError> {
        let len = self.size(name).await?;
        let file = fs::File::open(self.resolve(name)?).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ShareError::NotFound(name.to_string())
            } else {
                e.into()
            }
        })?;
        Ok((file, len))
    }

    /// Stream `body` into the store under `name`.
    ///
    /// Bytes go to a staging file first and are published under the final
    /// name only once the stream has ended cleanly. More than `limit` bytes
    /// aborts with `FileTooLarge`. Publishing never replaces an existing file.
    pub async fn save<S>(&self, name: &str, body: S, limit: u64) -> Result<u64, ShareError>
    where
        S: Stream<Item = Result<Bytes, ShareError>>,
    {
        let target = self.resolve(name)?;
        self.ensure_root().await?;

        let staging = self
            .root
            .join(STAGING_DIR)
            .join(format!("{}.part", Uuid::new_v4()));

        let written = match write_staging(&staging, body, limit).await {
            Ok(written) => written,
            Err(e) => {
                discard(&staging).await;
                return Err(e);
            }
        };

        if let Err(e) = publish(&staging, &target, name).await {
            discard(&staging).await;
            return Err(e);
        }

        info!("Stored {} ({} bytes)", target.display(), written);
        Ok(written)
    }

    /// Delete a stored file
    pub async fn remove(&self, name: &str) -> Result<(), ShareError> {
        // Reject directories and missing names before removing anything
        self.file_metadata(name).await?;
        let path = self.resolve(name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ShareError::NotFound(name.to_string()))
            }
            Err(e) => {
                error!("Failed to delete {}: {}", path.display(), e);
                Err(e.into())
            }
        }
    }
}

async fn write_staging<S>(staging: &Path, body: S, limit: u64) -> Result<u64, ShareError>
where
    S: Stream<Item = Result<Bytes, ShareError>>,
{
    let mut body = pin!(body);
    let mut file = fs::File::create(staging).await?;
    let mut written = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        written += chunk.len() as u64;
        if written > limit {
            return Err(ShareError::FileTooLarge { limit });
        }
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

/// Move a finished staging file to its final name without clobbering.
async fn publish(staging: &Path, target: &Path, name: &str) -> Result<(), ShareError> {
    match fs::hard_link(staging, target).await {
        Ok(()) => {
            if let Err(e) = fs::remove_file(staging).await {
                warn!("Failed to clean staging file {}: {}", staging.display(), e);
            }
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(ShareError::NameTaken(name.to_string()))
        }
        Err(e) => {
            // Filesystems without hard links (FAT, some network mounts)
            warn!(
                "Hard link to {} failed ({}), falling back to rename",
                target.display(),
                e
            );
            if fs::try_exists(target).await? {
                return Err(ShareError::NameTaken(name.to_string()));
            }
            fs::rename(staging, target).await?;
            Ok(())
        }
    }
}

async fn discard(staging: &Path) {
    if let Err(e) = fs::remove_file(staging).await {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove staging file {}: {}", staging.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chunks(parts: Vec<&'static str>) -> impl Stream<Item = Result<Bytes, ShareError>> {
        stream::iter(
            parts
                .into_iter()
                .map(|part| Ok(Bytes::from_static(part.as_bytes()))),
        )
    }

    async fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("shared")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn open_creates_root_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("shared");

        FileStore::open(&root).await.unwrap();
        FileStore::open(&root).await.unwrap();

        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn save_then_read_back() {
        let (_dir, store) = store().await;

        let written = store
            .save("hello.txt", chunks(vec!["hello ", "world"]), 1024)
            .await
            .unwrap();

        assert_eq!(written, 11);
        assert!(store.exists("hello.txt").await.unwrap());
        assert_eq!(store.size("hello.txt").await.unwrap(), 11);
        assert_eq!(
            std::fs::read(store.root().join("hello.txt")).unwrap(),
            b"hello world"
        );
        assert_eq!(store.list().await.unwrap(), vec!["hello.txt".to_string()]);
    }

    #[tokio::test]
    async fn oversize_stream_leaves_nothing_behind() {
        let (_dir, store) = store().await;

        let err = store
            .save("big.bin", chunks(vec!["12345", "67890"]), 8)
            .await
            .unwrap_err();

        assert!(matches!(err, ShareError::FileTooLarge { limit: 8 }));
        assert!(!store.exists("big.bin").await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
        let staged = std::fs::read_dir(store.root().join(STAGING_DIR)).unwrap();
        assert_eq!(staged.count(), 0);
    }

    #[tokio::test]
    async fn failed_stream_is_not_published() {
        let (_dir, store) = store().await;
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(ShareError::Io(std::io::Error::other("connection reset"))),
        ]);

        let err = store.save("cut.txt", body, 1024).await.unwrap_err();

        assert!(matches!(err, ShareError::Io(_)));
        assert!(!store.exists("cut.txt").await.unwrap());
    }

    #[tokio::test]
    async fn save_never_overwrites() {
        let (_dir, store) = store().await;
        store.save("a.txt", chunks(vec!["first"]), 64).await.unwrap();

        let err = store
            .save("a.txt", chunks(vec!["second"]), 64)
            .await
            .unwrap_err();

        assert!(matches!(err, ShareError::NameTaken(_)));
        assert_eq!(std::fs::read(store.root().join("a.txt")).unwrap(), b"first");
    }

    #[tokio::test]
    async fn traversal_names_never_reach_the_filesystem() {
        let (dir, store) = store().await;
        std::fs::write(dir.path().join("outside.txt"), b"secret").unwrap();

        for name in ["../outside.txt", "..", "/etc/passwd", "sub/x.txt", STAGING_DIR] {
            assert!(matches!(
                store.exists(name).await,
                Err(ShareError::InvalidPath(_))
            ));
            assert!(matches!(
                store.remove(name).await,
                Err(ShareError::InvalidPath(_))
            ));
        }
        assert!(dir.path().join("outside.txt").exists());
    }

    #[tokio::test]
    async fn list_skips_directories() {
        let (_dir, store) = store().await;
        std::fs::create_dir(store.root().join("folder")).unwrap();
        std::fs::write(store.root().join("file.txt"), b"x").unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["file.txt".to_string()]);
        assert!(matches!(
            store.size("folder").await,
            Err(ShareError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn remove_then_remove_again() {
        let (_dir, store) = store().await;
        std::fs::write(store.root().join("gone.txt"), b"x").unwrap();

        store.remove("gone.txt").await.unwrap();
        assert!(!store.exists("gone.txt").await.unwrap());

        assert!(matches!(
            store.remove("gone.txt").await,
            Err(ShareError::NotFound(_))
        ));
        assert!(matches!(
            store.modified_at("gone.txt").await,
            Err(ShareError::NotFound(_))
        ));
    }
}
