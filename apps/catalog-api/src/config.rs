//! Configuration for Catalog API

use core_config::{app_info, server::ServerConfig, AppInfo, FromEnv};
use database::mongodb::MongoConfig;
use domain_products::CatalogConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let catalog = CatalogConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            catalog,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_composes_sections() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_DATABASE", Some("catalog")),
                ("APP_ENV", Some("production")),
                ("PORT", Some("9090")),
                ("UPLOADS_PATH", Some("/srv/catalog/uploads")),
                ("CATALOG_SEED_DATA", Some("true")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.environment.is_production());
                assert_eq!(config.server.port, 9090);
                assert_eq!(
                    config.catalog.uploads_dir,
                    std::path::PathBuf::from("/srv/catalog/uploads")
                );
                assert!(config.catalog.seed_demo_data);
                assert_eq!(config.app.name, "catalog_api");
            },
        );
    }

    #[test]
    fn test_config_rejects_invalid_flag() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_DATABASE", Some("catalog")),
                ("CATALOG_VALIDATE_IMAGE_UPLOADS", Some("maybe")),
            ],
            || assert!(Config::from_env().is_err()),
        );
    }

    #[test]
    fn test_config_requires_mongodb_url() {
        temp_env::with_vars_unset(["MONGODB_URL", "MONGO_URL"], || {
            assert!(Config::from_env().is_err());
        });
    }
}
