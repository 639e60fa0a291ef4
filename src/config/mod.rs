//! Configuration loading and schema

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, BuyerPolicy, CatalogPolicy, ExportSettings, ImportMode, LineQuantityPolicy,
    LoggingConfig, OcExportConfig, OrderCloudConfig, ProductPolicy, SourceConfig, UserPolicy,
};
pub use secret::{secret_string, SecretString, SecretValue};
