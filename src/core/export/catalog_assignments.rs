//! Catalog assignments stage
//!
//! Final stage: assigns every exported product to its catalog, skipping
//! problem products without a remote call.

use crate::adapters::ordercloud::models::ProductCatalogAssignment;
use crate::core::context::RunContext;
use crate::domain::entities;
use crate::domain::ids::sanitize;

use super::{absorb_info, Abort, StepResult};

/// Runs the catalog assignments stage over every catalog in the snapshot.
pub async fn run(ctx: &mut RunContext) -> StepResult<()> {
    let catalogs = ctx
        .source
        .catalogs()
        .await
        .map_err(|e| Abort::error(format!("Failed to list catalogs: {e}")))?;

    tracing::info!(count = catalogs.len(), "Exporting catalog assignments");

    for catalog in &catalogs {
        absorb_info(export_assignments(ctx, catalog).await)?;
    }

    Ok(())
}

async fn export_assignments(ctx: &mut RunContext, source: &entities::Catalog) -> StepResult<()> {
    let catalog_id = sanitize(&source.name);

    let item_ids = ctx
        .source
        .catalog_products(&source.name)
        .await
        .map_err(|e| Abort::error(format!("Failed to list catalog products: {e}")))?;

    for item_id in &item_ids {
        let item = match ctx.source.sellable_item(item_id).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                tracing::error!(item_id = %item_id, catalog_id = %catalog_id, "Referenced sellable item not in snapshot");
                ctx.result.catalog_assignments.errored();
                continue;
            }
            Err(e) => {
                return Err(Abort::error(format!(
                    "Failed to resolve sellable item '{item_id}': {e}"
                )))
            }
        };

        let product_id = sanitize(&item.friendly_id);

        if ctx.problem_objects.contains_product(&product_id) {
            tracing::warn!(product_id = %product_id, catalog_id = %catalog_id, "Skipping assignment to problem product");
            ctx.result.catalog_assignments.skipped();
            continue;
        }

        let assignment = ProductCatalogAssignment {
            catalog_id: catalog_id.clone(),
            product_id: product_id.clone(),
        };
        match ctx.client.save_product_catalog_assignment(&assignment).await {
            Ok(()) => ctx.result.catalog_assignments.created(),
            Err(e) => {
                tracing::error!(product_id = %product_id, catalog_id = %catalog_id, error = %e, "Failed to assign product to catalog");
                ctx.result.catalog_assignments.errored();
            }
        }
    }

    Ok(())
}
