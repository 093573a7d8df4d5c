//! Upload policy operations implementation

use log::debug;
use std::collections::HashSet;

use crate::config::ShareConfig;
use crate::error::ShareError;
use crate::storage::FileStore;
use crate::storage::validation::{extension_of, secure_filename, split_extension};

/// Slack allowed on top of the file ceiling for multipart boundaries and
/// part headers when judging a whole request body.
pub const FORM_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Size ceiling and extension allow-list applied to every upload
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed_extensions: HashSet<String>,
    max_bytes: u64,
}

impl UploadPolicy {
    pub fn new(allowed_extensions: HashSet<String>, max_bytes: u64) -> Self {
        Self {
            allowed_extensions,
            max_bytes,
        }
    }

    pub fn from_config(config: &ShareConfig) -> Self {
        Self::new(config.allowed_extension_set(), config.max_upload_bytes())
    }

    /// Largest accepted file, in bytes
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Largest accepted request body, in bytes
    pub fn max_request_bytes(&self) -> u64 {
        self.max_bytes.saturating_add(FORM_OVERHEAD_BYTES)
    }

    pub fn too_large(&self) -> ShareError {
        ShareError::FileTooLarge {
            limit: self.max_bytes,
        }
    }

    /// Reject a declared length above the ceiling.
    ///
    /// `declared` is the length of the whole request body, so it is measured
    /// against the ceiling plus form overhead; the exact ceiling is enforced
    /// again while the bytes are written.
    ///
    /// A disallowed file whose size falls inside that overhead window passes
    /// here and is reported by the extension check as `UnsupportedFileType`.
    pub fn check_declared_size(&self, declared: Option<u64>) -> Result<(), ShareError> {
        match declared {
            Some(len) if len > self.max_request_bytes() => Err(self.too_large()),
            _ => Ok(()),
        }
    }

    /// Require the text after the last dot to be on the allow-list
    pub fn check_extension(&self, filename: &str) -> Result<(), ShareError> {
        match extension_of(filename) {
            Some(ext) if self.allowed_extensions.contains(&ext) => Ok(()),
            _ => Err(ShareError::UnsupportedFileType(filename.to_string())),
        }
    }

    /// Sanitize `filename` and pick the first free name in the store.
    ///
    /// Probes `name.ext`, `name_1.ext`, `name_2.ext`, ... in order. The name
    /// is free at decision time only; `FileStore::save` refuses to overwrite
    /// if another upload takes it first.
    pub async fn resolve_target(
        &self,
        store: &FileStore,
        filename: &str,
    ) -> Result<String, ShareError> {
        let sanitized = secure_filename(filename);
        if sanitized.is_empty() {
            return Err(ShareError::InvalidPath(filename.to_string()));
        }
        self.check_extension(&sanitized)?;

        if !store.exists(&sanitized).await? {
            return Ok(sanitized);
        }

        let (base, ext) = split_extension(&sanitized);
        let mut counter = 1u64;
        loop {
            let candidate = format!("{base}_{counter}{ext}");
            if !store.exists(&candidate).await? {
                debug!("Renamed upload {filename} to {candidate}");
                return Ok(candidate);
            }
            counter += 1;
        }
    }

    /// Run every check in order and return the name to store under:
    /// declared size, extension, then sanitize and resolve collisions.
    pub async fn plan(
        &self,
        store: &FileStore,
        filename: &str,
        declared: Option<u64>,
    ) -> Result<String, ShareError> {
        if filename.is_empty() {
            return Err(ShareError::NoFileSelected);
        }
        self.check_declared_size(declared)?;
        self.check_extension(filename)?;
        self.resolve_target(store, filename).await
    }
}
