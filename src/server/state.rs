//! Shared handler state
//!
//! Built once at startup and only ever read afterwards.

use std::sync::Arc;

use crate::config::ShareConfig;
use crate::error::ShareError;
use crate::policy::UploadPolicy;
use crate::storage::FileStore;
use crate::utils::network::get_local_ip;

#[derive(Debug)]
pub struct AppState {
    pub config: Arc<ShareConfig>,
    pub policy: UploadPolicy,
    pub store: FileStore,
    /// LAN address shown on the index page, looked up at startup
    pub local_ip: String,
}

impl AppState {
    /// Open the storage root named by `config` and derive the upload policy
    pub async fn new(config: Arc<ShareConfig>) -> Result<Self, ShareError> {
        let store = FileStore::open(config.storage_root()).await?;
        let policy = UploadPolicy::from_config(&config);
        let local_ip = get_local_ip().await;

        Ok(Self {
            config,
            policy,
            store,
            local_ip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn state_resolves_local_ip_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShareConfig {
            upload_folder: dir.path().join("shared").to_string_lossy().into_owned(),
            ..ShareConfig::default()
        };

        let state = AppState::new(Arc::new(config)).await.unwrap();
        let ip: Ipv4Addr = state.local_ip.parse().unwrap();
        assert!(!ip.is_unspecified());
        assert!(state.store.root().is_dir());
    }
}
