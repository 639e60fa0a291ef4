//! Configuration schema types
//!
//! This module defines the configuration structure for ocexport. The TOML
//! file maps one section per struct; validation runs before any remote call
//! so a misconfigured run fails fast instead of half-migrating.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Import conflict behavior for resources that already exist remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Create missing resources; leave existing ones untouched
    #[default]
    Create,
    /// Create missing resources and update existing ones
    Update,
    /// Recreate resources from scratch
    Replace,
}

/// Main ocexport configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcExportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// OrderCloud API credentials and endpoints
    pub ordercloud: OrderCloudConfig,

    /// Source snapshot location
    pub source: SourceConfig,

    /// Export settings (mode + per-stage gating)
    #[serde(default)]
    pub export: ExportSettings,

    /// One policy per storefront/buyer to migrate
    #[serde(default)]
    pub buyers: Vec<BuyerPolicy>,

    /// Catalog export policy
    #[serde(default)]
    pub catalog: CatalogPolicy,

    /// Sellable item export policy
    #[serde(default)]
    pub products: ProductPolicy,

    /// Buyer user defaults
    #[serde(default)]
    pub users: UserPolicy,

    /// Order line quantity policy, feeds price schedule limits
    #[serde(default)]
    pub order: LineQuantityPolicy,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OcExportConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.ordercloud.validate()?;
        self.source.validate()?;
        for buyer in &self.buyers {
            buyer.validate()?;
        }
        self.catalog.validate(&self.buyers)?;
        self.products.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// The buyer policy declaring the given customer domain, if any.
    pub fn buyer_for_domain(&self, domain: &str) -> Option<&BuyerPolicy> {
        self.buyers.iter().find(|b| b.domain == domain)
    }

    /// The buyer policy for the given storefront name, if any.
    pub fn buyer_for_storefront(&self, storefront: &str) -> Option<&BuyerPolicy> {
        self.buyers.iter().find(|b| b.storefront == storefront)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// OrderCloud API configuration
///
/// All four credential fields are required; the run refuses to start
/// without a complete, usable client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCloudConfig {
    /// Base URL of the OrderCloud API (e.g. "https://sandboxapi.ordercloud.io")
    pub api_url: String,

    /// OAuth2 token endpoint base URL
    pub auth_url: String,

    /// API client ID
    pub client_id: String,

    /// API client secret
    /// Stored securely in memory and automatically zeroized on drop
    pub client_secret: SecretString,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Page size for list calls
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl OrderCloudConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.api_url.is_empty() {
            return Err("ordercloud.api_url is required".to_string());
        }
        if self.auth_url.is_empty() {
            return Err("ordercloud.auth_url is required".to_string());
        }
        if self.client_id.is_empty() {
            return Err("ordercloud.client_id is required".to_string());
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err("ordercloud.client_secret is required".to_string());
        }
        url::Url::parse(&self.api_url)
            .map_err(|e| format!("ordercloud.api_url is not a valid URL: {e}"))?;
        url::Url::parse(&self.auth_url)
            .map_err(|e| format!("ordercloud.auth_url is not a valid URL: {e}"))?;
        if self.page_size == 0 || self.page_size > 100 {
            return Err("ordercloud.page_size must be between 1 and 100".to_string());
        }
        Ok(())
    }
}

/// Source snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the snapshot JSON file
    pub snapshot_path: String,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.snapshot_path.is_empty() {
            return Err("source.snapshot_path is required".to_string());
        }
        Ok(())
    }
}

/// Export settings: import mode plus per-stage gating flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Conflict behavior for already-existing remote resources
    #[serde(default)]
    pub import_mode: ImportMode,

    #[serde(default = "default_true")]
    pub process_buyers: bool,

    #[serde(default = "default_true")]
    pub process_customers: bool,

    #[serde(default = "default_true")]
    pub process_catalogs: bool,

    #[serde(default = "default_true")]
    pub process_categories: bool,

    #[serde(default = "default_true")]
    pub process_products: bool,

    #[serde(default = "default_true")]
    pub process_category_assignments: bool,

    #[serde(default = "default_true")]
    pub process_catalog_assignments: bool,

    /// Accepted but not consumed; no relationship stage exists
    #[serde(default)]
    pub process_product_relationships: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            import_mode: ImportMode::Create,
            process_buyers: true,
            process_customers: true,
            process_catalogs: true,
            process_categories: true,
            process_products: true,
            process_category_assignments: true,
            process_catalog_assignments: true,
            process_product_relationships: false,
        }
    }
}

/// Policy for one storefront/buyer to migrate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerPolicy {
    /// Source shop identifier; becomes the destination buyer ID
    pub storefront: String,

    /// Customer domain whose customers belong to this buyer
    pub domain: String,

    /// Currencies this buyer trades in
    pub currencies: Vec<String>,

    /// The currency of the buyer's default user group and price schedule
    pub default_currency: String,
}

impl BuyerPolicy {
    fn validate(&self) -> Result<(), String> {
        if self.storefront.is_empty() {
            return Err("buyers.storefront is required".to_string());
        }
        if self.currencies.is_empty() {
            return Err(format!(
                "buyers policy '{}' must declare at least one currency",
                self.storefront
            ));
        }
        if !self.currencies.contains(&self.default_currency) {
            return Err(format!(
                "buyers policy '{}': default_currency '{}' is not in currencies",
                self.storefront, self.default_currency
            ));
        }
        Ok(())
    }

    /// Whether this buyer trades in more than one currency.
    pub fn multi_currency(&self) -> bool {
        self.currencies.len() > 1
    }
}

/// Catalog export policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogPolicy {
    /// Buyer that receives the catalog assignment for each migrated catalog
    #[serde(default)]
    pub default_buyer: String,
}

impl CatalogPolicy {
    fn validate(&self, buyers: &[BuyerPolicy]) -> Result<(), String> {
        if !self.default_buyer.is_empty()
            && !buyers.iter().any(|b| b.storefront == self.default_buyer)
        {
            return Err(format!(
                "catalog.default_buyer '{}' has no matching buyers policy",
                self.default_buyer
            ));
        }
        Ok(())
    }
}

/// Sellable item export policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPolicy {
    /// Track inventory per stock location (admin addresses + inventory
    /// records) instead of a single product-level quantity
    #[serde(default)]
    pub multi_inventory: bool,

    /// The inventory set to read quantities from in single-inventory mode
    #[serde(default)]
    pub inventory_set: String,

    /// Currency of the default price schedule
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl Default for ProductPolicy {
    fn default() -> Self {
        Self {
            multi_inventory: false,
            inventory_set: String::new(),
            default_currency: default_currency(),
        }
    }
}

impl ProductPolicy {
    fn validate(&self) -> Result<(), String> {
        if self.default_currency.is_empty() {
            return Err("products.default_currency is required".to_string());
        }
        if !self.multi_inventory && self.inventory_set.is_empty() {
            return Err(
                "products.inventory_set is required when multi_inventory is false".to_string(),
            );
        }
        Ok(())
    }
}

/// Defaults for migrated buyer users missing name components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPolicy {
    #[serde(default = "default_first_name")]
    pub default_first_name: String,

    #[serde(default = "default_last_name")]
    pub default_last_name: String,
}

impl Default for UserPolicy {
    fn default() -> Self {
        Self {
            default_first_name: default_first_name(),
            default_last_name: default_last_name(),
        }
    }
}

/// Order line quantity policy; feeds price schedule limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineQuantityPolicy {
    /// Maximum quantity per order line
    #[serde(default = "default_maximum_quantity")]
    pub maximum_quantity: i32,

    /// Whether identical lines roll up into one cumulative quantity
    #[serde(default)]
    pub rollup_cart_lines: bool,
}

impl Default for LineQuantityPolicy {
    fn default() -> Self {
        Self {
            maximum_quantity: default_maximum_quantity(),
            rollup_cart_lines: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format: "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.format != "text" && self.format != "json" {
            return Err(format!(
                "Invalid logging.format '{}'. Must be 'text' or 'json'",
                self.format
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_page_size() -> u32 {
    20
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_first_name() -> String {
    "FirstName".to_string()
}

fn default_last_name() -> String {
    "LastName".to_string()
}

fn default_maximum_quantity() -> i32 {
    100
}

fn default_true() -> bool {
    true
}
