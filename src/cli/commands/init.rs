//! Init command implementation
//!
//! Writes a scaffold configuration file with commented defaults to get a
//! new migration started.

use clap::Args;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to write the configuration file to
    #[arg(short, long, default_value = "ocexport.toml")]
    pub output: String,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TEMPLATE: &str = r#"# ocexport configuration

[application]
log_level = "info"

[ordercloud]
api_url = "https://sandboxapi.ordercloud.io"
auth_url = "https://sandboxauth.ordercloud.io"
client_id = "your-client-id"
# Prefer keeping the secret out of this file:
client_secret = "${OCEXPORT_CLIENT_SECRET}"

[source]
snapshot_path = "snapshot.json"

[export]
# create | update | replace
import_mode = "create"
process_buyers = true
process_customers = true
process_catalogs = true
process_categories = true
process_products = true
process_category_assignments = true
process_catalog_assignments = true
process_product_relationships = false

# One [[buyers]] block per storefront to migrate.
[[buyers]]
storefront = "Storefront"
domain = "Storefront.Com"
currencies = ["USD"]
default_currency = "USD"

[catalog]
default_buyer = "Storefront"

[products]
multi_inventory = false
inventory_set = "Default"
default_currency = "USD"

[users]
default_first_name = "FirstName"
default_last_name = "LastName"

[order]
maximum_quantity = 100
rollup_cart_lines = false

[logging]
# text | json
format = "text"
"#;

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let path = Path::new(&self.output);

        if path.exists() && !self.force {
            eprintln!(
                "Refusing to overwrite existing file {} (use --force)",
                path.display()
            );
            return Ok(2);
        }

        std::fs::write(path, CONFIG_TEMPLATE)?;

        println!("Wrote configuration scaffold to {}", path.display());
        println!("Set OCEXPORT_CLIENT_SECRET (or edit the file) before running an export.");
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_parseable_scaffold() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("ocexport.toml");
        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: false,
        };

        let code = args.execute().await.unwrap();
        assert_eq!(code, 0);

        let contents = std::fs::read_to_string(&output).unwrap();
        let parsed: toml::Value = toml::from_str(&contents).unwrap();
        assert!(parsed.get("ordercloud").is_some());
        assert!(parsed.get("buyers").is_some());
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("ocexport.toml");
        std::fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: false,
        };
        let code = args.execute().await.unwrap();
        assert_eq!(code, 2);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_init_overwrites_with_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("ocexport.toml");
        std::fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: true,
        };
        let code = args.execute().await.unwrap();
        assert_eq!(code, 0);
        assert!(std::fs::read_to_string(&output).unwrap().contains("[ordercloud]"));
    }
}
