//! Catalog export stage
//!
//! Get-or-create for each source catalog, then a catalog assignment giving
//! the configured default buyer visibility over it.

use crate::adapters::ordercloud::models::{Catalog, CatalogAssignment};
use crate::core::context::RunContext;
use crate::domain::entities;
use crate::domain::ids::sanitize;

use super::{absorb_info, Abort, StepResult};

/// Runs the catalogs stage over every catalog in the snapshot.
pub async fn run(ctx: &mut RunContext) -> StepResult<()> {
    let catalogs = ctx
        .source
        .catalogs()
        .await
        .map_err(|e| Abort::error(format!("Failed to list catalogs: {e}")))?;

    tracing::info!(count = catalogs.len(), "Exporting catalogs");

    for catalog in &catalogs {
        absorb_info(export_catalog(ctx, catalog).await)?;
    }

    Ok(())
}

async fn export_catalog(ctx: &mut RunContext, source: &entities::Catalog) -> StepResult<()> {
    let catalog_id = sanitize(&source.name);

    match ctx.client.get_catalog(&catalog_id).await {
        Ok(_) => {
            tracing::debug!(catalog_id = %catalog_id, "Catalog already exists");
            ctx.result.catalogs.not_changed();
        }
        Err(e) if e.is_not_found() => {
            let catalog = Catalog {
                id: catalog_id.clone(),
                name: if source.display_name.is_empty() {
                    source.name.clone()
                } else {
                    source.display_name.clone()
                },
                active: true,
            };
            match ctx.client.save_catalog(&catalog).await {
                Ok(_) => {
                    tracing::info!(catalog_id = %catalog_id, "Created catalog");
                    ctx.result.catalogs.created();
                }
                Err(e) => {
                    tracing::error!(catalog_id = %catalog_id, error = %e, "Failed to create catalog");
                    ctx.result.catalogs.errored();
                    return Err(Abort::info(format!("Catalog '{catalog_id}' failed: {e}")));
                }
            }
        }
        Err(e) => {
            tracing::error!(catalog_id = %catalog_id, error = %e, "Failed to get catalog");
            ctx.result.catalogs.errored();
            return Err(Abort::info(format!("Catalog '{catalog_id}' failed: {e}")));
        }
    }

    let default_buyer = ctx
        .config
        .buyer_for_storefront(&ctx.config.catalog.default_buyer)
        .map(|policy| sanitize(&policy.storefront));
    if let Some(buyer_id) = default_buyer {
        let assignment = CatalogAssignment {
            catalog_id: catalog_id.clone(),
            buyer_id,
            view_all_categories: true,
            view_all_products: true,
        };
        match ctx.client.save_catalog_assignment(&assignment).await {
            Ok(()) => ctx.result.catalog_assignments.created(),
            Err(e) => {
                tracing::error!(catalog_id = %catalog_id, error = %e, "Failed to assign catalog");
                ctx.result.catalog_assignments.errored();
                return Err(Abort::info(format!(
                    "CatalogAssignment '{catalog_id}' failed: {e}"
                )));
            }
        }
    }

    Ok(())
}
