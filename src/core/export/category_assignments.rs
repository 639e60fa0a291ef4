//! Category assignments stage
//!
//! Second pass over the category tree: patches child categories' parent
//! references (safe now that every category exists) and creates the
//! category-to-product assignments. Products that earlier failed
//! irrecoverably are skipped without a remote call.

use crate::adapters::ordercloud::models::{CategoryProductAssignment, PartialCategory};
use crate::core::context::RunContext;
use crate::domain::entities;
use crate::domain::ids::sanitize;
use std::collections::HashMap;

use super::categories::destination_ids;
use super::{absorb_info, Abort, StepResult};

/// Runs the category assignments stage over every published category.
pub async fn run(ctx: &mut RunContext) -> StepResult<()> {
    let categories = ctx
        .source
        .categories()
        .await
        .map_err(|e| Abort::error(format!("Failed to list categories: {e}")))?;

    tracing::info!(count = categories.len(), "Exporting category assignments");

    // Unpublished categories were never created, so their parent patches
    // must not be attempted.
    let published: HashMap<&str, bool> = categories
        .iter()
        .map(|c| (c.friendly_id.as_str(), c.published))
        .collect();

    for category in &categories {
        absorb_info(export_assignments(ctx, category, &published).await)?;
    }

    Ok(())
}

async fn export_assignments(
    ctx: &mut RunContext,
    source: &entities::Category,
    published: &HashMap<&str, bool>,
) -> StepResult<()> {
    if !source.published {
        return Err(Abort::info(format!(
            "Category '{}' not published",
            source.friendly_id
        )));
    }

    let Some((catalog_id, category_id)) = destination_ids(source) else {
        return Err(Abort::info(format!(
            "Category '{}' has a malformed key",
            source.friendly_id
        )));
    };

    assign_children(ctx, source, &catalog_id, &category_id, published).await?;
    assign_products(ctx, source, &catalog_id, &category_id).await?;

    Ok(())
}

/// Patches each published child category's ParentID to this category.
async fn assign_children(
    ctx: &mut RunContext,
    source: &entities::Category,
    catalog_id: &str,
    category_id: &str,
    published: &HashMap<&str, bool>,
) -> StepResult<()> {
    let children = ctx
        .source
        .category_children(&source.friendly_id)
        .await
        .map_err(|e| Abort::error(format!("Failed to list category children: {e}")))?;

    for child_key in &children {
        if !published.get(child_key.as_str()).copied().unwrap_or(false) {
            tracing::debug!(child = %child_key, "Child category not published; skipping parent patch");
            ctx.result.category_assignments.skipped();
            continue;
        }

        // Children live in the parent's catalog; only the category half of
        // the key addresses them.
        let Some((_, child_id)) = child_key.split_once('-').map(|(c, n)| (c, sanitize(n)))
        else {
            tracing::error!(child = %child_key, "Malformed child category key");
            ctx.result.category_assignments.errored();
            continue;
        };

        let partial = PartialCategory {
            id: None,
            parent_id: Some(category_id.to_string()),
        };
        match ctx.client.patch_category(catalog_id, &child_id, &partial).await {
            Ok(_) => {
                tracing::debug!(catalog_id, child_id = %child_id, parent_id = category_id, "Patched category parent");
                ctx.result.category_assignments.patched();
            }
            Err(e) => {
                tracing::error!(catalog_id, child_id = %child_id, error = %e, "Failed to patch category parent");
                ctx.result.category_assignments.errored();
            }
        }
    }

    Ok(())
}

/// Creates category-to-product assignments, skipping problem products.
async fn assign_products(
    ctx: &mut RunContext,
    source: &entities::Category,
    catalog_id: &str,
    category_id: &str,
) -> StepResult<()> {
    let item_ids = ctx
        .source
        .category_products(&source.friendly_id)
        .await
        .map_err(|e| Abort::error(format!("Failed to list category products: {e}")))?;

    for item_id in &item_ids {
        let item = match ctx.source.sellable_item(item_id).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                tracing::error!(item_id = %item_id, category = %source.friendly_id, "Referenced sellable item not in snapshot");
                ctx.result.category_product_assignments.errored();
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
            tracing::warn!(product_id = %product_id, category_id, "Skipping assignment to problem product");
            ctx.result.category_product_assignments.skipped();
            continue;
        }

        let assignment = CategoryProductAssignment {
            category_id: category_id.to_string(),
            product_id: product_id.clone(),
        };
        match ctx
            .client
            .save_category_product_assignment(catalog_id, &assignment)
            .await
        {
            Ok(()) => ctx.result.category_product_assignments.created(),
            Err(e) => {
                tracing::error!(product_id = %product_id, category_id, error = %e, "Failed to assign product to category");
                ctx.result.category_product_assignments.errored();
            }
        }
    }

    Ok(())
}
