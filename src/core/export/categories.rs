//! Category export stage
//!
//! Get-or-create for each published source category. The composite
//! `{catalog}-{category}` source key addresses the destination; the parent
//! reference is deliberately left unset here and patched in by the
//! category assignments stage once every category exists.

use crate::adapters::ordercloud::models::Category;
use crate::core::context::RunContext;
use crate::domain::entities;
use crate::domain::ids::sanitize;

use super::{absorb_info, Abort, StepResult};

/// Runs the categories stage over every category in the snapshot.
pub async fn run(ctx: &mut RunContext) -> StepResult<()> {
    let categories = ctx
        .source
        .categories()
        .await
        .map_err(|e| Abort::error(format!("Failed to list categories: {e}")))?;

    tracing::info!(count = categories.len(), "Exporting categories");

    for category in &categories {
        absorb_info(export_category(ctx, category).await)?;
    }

    Ok(())
}

/// Splits and sanitizes a composite `{catalog}-{category}` source key into
/// destination (catalog id, category id).
pub(crate) fn destination_ids(category: &entities::Category) -> Option<(String, String)> {
    category
        .friendly_id_parts()
        .map(|(catalog, name)| (sanitize(catalog), sanitize(name)))
}

async fn export_category(ctx: &mut RunContext, source: &entities::Category) -> StepResult<()> {
    if !source.published {
        tracing::debug!(category = %source.friendly_id, "Category not published; skipping");
        ctx.result.categories.skipped();
        return Err(Abort::info(format!(
            "Category '{}' not published",
            source.friendly_id
        )));
    }

    let Some((catalog_id, category_id)) = destination_ids(source) else {
        tracing::error!(category = %source.friendly_id, "Malformed composite category key");
        ctx.result.categories.errored();
        return Err(Abort::info(format!(
            "Category '{}' has a malformed key",
            source.friendly_id
        )));
    };

    match ctx.client.get_category(&catalog_id, &category_id).await {
        Ok(_) => {
            tracing::debug!(catalog_id = %catalog_id, category_id = %category_id, "Category already exists");
            ctx.result.categories.not_changed();
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            let category = Category {
                id: category_id.clone(),
                name: if source.display_name.is_empty() {
                    category_id.clone()
                } else {
                    source.display_name.clone()
                },
                description: if source.description.is_empty() {
                    None
                } else {
                    Some(source.description.clone())
                },
                active: source.published,
                parent_id: None,
            };
            match ctx.client.save_category(&catalog_id, &category).await {
                Ok(_) => {
                    tracing::info!(catalog_id = %catalog_id, category_id = %category_id, "Created category");
                    ctx.result.categories.created();
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(catalog_id = %catalog_id, category_id = %category_id, error = %e, "Failed to create category");
                    ctx.result.categories.errored();
                    Err(Abort::info(format!(
                        "Category '{catalog_id}/{category_id}' failed: {e}"
                    )))
                }
            }
        }
        Err(e) => {
            tracing::error!(catalog_id = %catalog_id, category_id = %category_id, error = %e, "Failed to get category");
            ctx.result.categories.errored();
            Err(Abort::info(format!(
                "Category '{catalog_id}/{category_id}' failed: {e}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_ids() {
        let category = entities::Category {
            id: "entity-Category-Awesome Catalog-Kids' Shoes".to_string(),
            friendly_id: "Awesome Catalog-Kids' Shoes".to_string(),
            display_name: "Kids' Shoes".to_string(),
            description: String::new(),
            published: true,
        };
        let (catalog_id, category_id) = destination_ids(&category).unwrap();
        assert_eq!(catalog_id, "Awesome_Catalog");
        assert_eq!(category_id, "Kids__Shoes");
    }

    #[test]
    fn test_destination_ids_malformed() {
        let category = entities::Category {
            id: "entity".to_string(),
            friendly_id: "NoSeparator".to_string(),
            display_name: String::new(),
            description: String::new(),
            published: true,
        };
        assert!(destination_ids(&category).is_none());
    }
}
