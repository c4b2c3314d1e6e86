use core_config::{env_flag, env_or_default, env_parse, ConfigError, FromEnv};
use std::path::PathBuf;

/// Catalog settings injected at startup
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Directory receiving uploaded images
    pub uploads_dir: PathBuf,
    /// Run the validator on multipart product creation
    pub validate_image_uploads: bool,
    /// Seed demo categories and products into an empty catalog
    pub seed_demo_data: bool,
    /// Body limit for multipart routes
    pub max_upload_bytes: usize,
}

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl CatalogConfig {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            ..Self::default()
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("./uploads"),
            validate_image_uploads: true,
            seed_demo_data: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl FromEnv for CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            uploads_dir: PathBuf::from(env_or_default("UPLOADS_PATH", "./uploads")),
            validate_image_uploads: env_flag("CATALOG_VALIDATE_IMAGE_UPLOADS", true)?,
            seed_demo_data: env_flag("CATALOG_SEED_DATA", false)?,
            max_upload_bytes: env_parse("UPLOAD_MAX_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars_unset(
            [
                "UPLOADS_PATH",
                "CATALOG_VALIDATE_IMAGE_UPLOADS",
                "CATALOG_SEED_DATA",
                "UPLOAD_MAX_BYTES",
            ],
            || {
                let config = CatalogConfig::from_env().unwrap();
                assert_eq!(config.uploads_dir, PathBuf::from("./uploads"));
                assert!(config.validate_image_uploads);
                assert!(!config.seed_demo_data);
                assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
            },
        );
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("UPLOADS_PATH", Some("/var/catalog/images")),
                ("CATALOG_VALIDATE_IMAGE_UPLOADS", Some("false")),
                ("CATALOG_SEED_DATA", Some("yes")),
                ("UPLOAD_MAX_BYTES", Some("1024")),
            ],
            || {
                let config = CatalogConfig::from_env().unwrap();
                assert_eq!(config.uploads_dir, PathBuf::from("/var/catalog/images"));
                assert!(!config.validate_image_uploads);
                assert!(config.seed_demo_data);
                assert_eq!(config.max_upload_bytes, 1024);
            },
        );
    }

    #[test]
    fn test_from_env_rejects_bad_limit() {
        temp_env::with_var("UPLOAD_MAX_BYTES", Some("lots"), || {
            assert!(matches!(
                CatalogConfig::from_env(),
                Err(ConfigError::ParseError { .. })
            ));
        });
    }
}
