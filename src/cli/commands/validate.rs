//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("Configuration is invalid");
                println!("  Error: {e}");
                return Ok(2);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration summary:");
        println!("  OrderCloud API: {}", config.ordercloud.api_url);
        println!("  Snapshot: {}", config.source.snapshot_path);
        println!("  Import Mode: {:?}", config.export.import_mode);
        println!("  Buyers: {}", config.buyers.len());
        for buyer in &config.buyers {
            println!(
                "    {} (domain {}, currencies {:?}, default {})",
                buyer.storefront, buyer.domain, buyer.currencies, buyer.default_currency
            );
        }
        println!("  Default Catalog Buyer: {}", config.catalog.default_buyer);
        println!(
            "  Inventory: {}",
            if config.products.multi_inventory {
                "multi-location".to_string()
            } else {
                format!("single set '{}'", config.products.inventory_set)
            }
        );

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_missing_file_reports_config_error() {
        let args = ValidateArgs {};
        let code = args.execute("does-not-exist.toml").await.unwrap();
        assert_eq!(code, 2);
    }
}
