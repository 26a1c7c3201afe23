//! Storage configuration types.

pub use dealdesk_shared::config::StorageProvider;
use dealdesk_shared::config::StorageSettings;

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Base URL for public links, overriding the provider default.
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            public_base_url: None,
        }
    }

    /// Build from the `storage` section of the application config.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            max_file_size: settings.max_file_size,
            public_base_url: settings.public_base_url.clone(),
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set the public base URL.
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    /// Base URL public links are built from, without a trailing slash.
    #[must_use]
    pub fn public_url_base(&self) -> String {
        let base = match (&self.public_base_url, &self.provider) {
            (Some(url), _) => url.clone(),
            (None, StorageProvider::S3 {
                endpoint, bucket, ..
            }) => format!("{}/{bucket}", endpoint.trim_end_matches('/')),
            (None, StorageProvider::AzureBlob {
                account, container, ..
            }) => format!("https://{account}.blob.core.windows.net/{container}"),
            (None, StorageProvider::LocalFs { .. }) => "/files".to_string(),
            (None, StorageProvider::Memory) => "memory://documents".to_string(),
        };
        base.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::new(StorageProvider::local_fs("./storage"));
        assert_eq!(config.max_file_size, StorageConfig::DEFAULT_MAX_FILE_SIZE);
        assert!(config.public_base_url.is_none());
    }

    #[test]
    fn test_public_url_base_s3() {
        let config = StorageConfig::new(StorageProvider::s3(
            "https://account.r2.cloudflarestorage.com/",
            "documents",
            "key",
            "secret",
            "auto",
        ));
        assert_eq!(
            config.public_url_base(),
            "https://account.r2.cloudflarestorage.com/documents"
        );
    }

    #[test]
    fn test_public_url_base_azure() {
        let config =
            StorageConfig::new(StorageProvider::azure_blob("dealdesk", "key", "documents"));
        assert_eq!(
            config.public_url_base(),
            "https://dealdesk.blob.core.windows.net/documents"
        );
    }

    #[test]
    fn test_public_url_base_override_wins() {
        let config = StorageConfig::new(StorageProvider::Memory)
            .with_public_base_url("https://project.supabase.co/storage/v1/object/public/documents/");
        assert_eq!(
            config.public_url_base(),
            "https://project.supabase.co/storage/v1/object/public/documents"
        );
    }

    #[test]
    fn test_from_settings() {
        let settings = StorageSettings {
            provider: StorageProvider::Memory,
            public_base_url: Some("https://cdn.example.com".to_string()),
            max_file_size: 2048,
        };
        let config = StorageConfig::from_settings(&settings);
        assert_eq!(config.max_file_size, 2048);
        assert_eq!(config.public_url_base(), "https://cdn.example.com");
    }
}
