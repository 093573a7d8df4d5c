//! Configuration management for the LAN share server
//!
//! All settings are read once at startup and never change afterwards. The
//! resulting value is shared by reference with every component.

use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

pub const DEFAULT_ALLOWED_EXTENSIONS: &str =
    "txt,pdf,png,jpg,jpeg,gif,mp4,mp3,zip,rar,doc,docx,xls,xlsx,pptx,csv,exe,apk";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ShareConfig {
    /// Session secret of the web layer; carried but not used by request handling.
    /// Environment: SECRET_KEY
    pub secret_key: String,

    /// Environment: SERVER_HOST
    pub server_host: String,

    /// Environment: SERVER_PORT
    pub server_port: u16,

    /// Directory holding the shared files
    /// Environment: UPLOAD_FOLDER
    pub upload_folder: String,

    /// Upload ceiling in MB
    /// Environment: MAX_FILE_SIZE_MB
    pub max_file_size_mb: u64,

    /// Comma-separated extension allow-list
    /// Environment: ALLOWED_EXTENSIONS
    pub allowed_extensions: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            secret_key: "dev-secret-key-change-in-production".to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            upload_folder: "shared_files".to_string(),
            max_file_size_mb: 500,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.to_string(),
        }
    }
}

impl ShareConfig {
    /// Load configuration: defaults, then `lanshare.toml` if present, then the environment.
    ///
    /// A `.env` file in the working directory is merged into the environment first.
    pub fn load() -> Result<Self, config::ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment overrides from {}", path.display());
        }

        let builder = Config::builder()
            .add_source(File::with_name("lanshare").required(false))
            .add_source(Environment::default());

        Self::from_builder(builder)
    }

    /// Apply defaults underneath the given sources, deserialize and validate.
    pub fn from_builder(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        let settings = builder
            .set_default("secret_key", defaults.secret_key)?
            .set_default("server_host", defaults.server_host)?
            .set_default("server_port", i64::from(defaults.server_port))?
            .set_default("upload_folder", defaults.upload_folder)?
            .set_default("max_file_size_mb", defaults.max_file_size_mb as i64)?
            .set_default("allowed_extensions", defaults.allowed_extensions)?
            .build()?;

        let config: ShareConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server_port == 0 {
            return Err(config::ConfigError::Message(
                "server_port cannot be 0".into(),
            ));
        }

        if self.upload_folder.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "upload_folder cannot be empty".into(),
            ));
        }

        if self.max_file_size_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_file_size_mb must be greater than 0".into(),
            ));
        }

        if self.allowed_extension_set().is_empty() {
            return Err(config::ConfigError::Message(
                "allowed_extensions must name at least one extension".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn bind_socket(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Get storage root as PathBuf
    pub fn storage_root(&self) -> PathBuf {
        PathBuf::from(&self.upload_folder)
    }

    /// Get maximum upload size in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Allowed extensions, lowercased, without dots or blanks
    pub fn allowed_extension_set(&self) -> HashSet<String> {
        self.allowed_extensions
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_setting() {
        let config = ShareConfig::from_builder(Config::builder()).unwrap();

        assert_eq!(config.server_port, 5000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.upload_folder, "shared_files");
        assert_eq!(config.max_upload_bytes(), 500 * 1024 * 1024);

        let allowed = config.allowed_extension_set();
        assert_eq!(allowed.len(), 18);
        assert!(allowed.contains("pptx"));
        assert!(!allowed.contains("sh"));
    }

    #[test]
    fn overrides_replace_defaults() {
        let builder = Config::builder()
            .set_override("server_port", "8080")
            .unwrap()
            .set_override("allowed_extensions", " TXT, .md ,,")
            .unwrap();
        let config = ShareConfig::from_builder(builder).unwrap();

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.bind_socket(), "0.0.0.0:8080");
        let allowed = config.allowed_extension_set();
        assert_eq!(allowed.len(), 2);
        assert!(allowed.contains("txt"));
        assert!(allowed.contains("md"));
    }

    #[test]
    fn zero_size_ceiling_is_rejected() {
        let builder = Config::builder()
            .set_override("max_file_size_mb", 0_i64)
            .unwrap();
        assert!(ShareConfig::from_builder(builder).is_err());
    }

    #[test]
    fn empty_allow_list_is_rejected() {
        let builder = Config::builder()
            .set_override("allowed_extensions", " , ")
            .unwrap();
        assert!(ShareConfig::from_builder(builder).is_err());
    }
}
