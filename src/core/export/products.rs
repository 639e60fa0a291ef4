//! Sellable item export stage
//!
//! The deepest mapper: each published sellable item becomes a product with
//! price schedules, policy-driven product assignments, and either a folded
//! standalone form or the full variant apparatus (specs, spec options,
//! remote variant generation, list-back, and per-variant patching).
//!
//! An item that fails irrecoverably lands in the problem-object set so the
//! assignment stages skip it instead of emitting dangling references.

use crate::adapters::ordercloud::models::{
    Address, AddressXp, Inventory, InventoryRecord, PartialVariant, PriceBreak, PriceSchedule,
    Product, ProductAssignment, ProductXp, Spec, SpecOption, SpecProductAssignment, Variant,
    VariantInventory, VariantXp,
};
use crate::config::ImportMode;
use crate::core::context::RunContext;
use crate::domain::entities::{InventoryAssociation, SellableItem, Variation};
use crate::domain::ids::sanitize;
use crate::domain::variations::{
    requires_variants, VariationPropertyKind, VariationSummary, VariationsSummary,
};
use std::collections::HashMap;

use super::buyers_extended::currency_group_id;
use super::{absorb_info, Abort, StepResult};

/// Runs the sellable items stage over every item in the snapshot.
pub async fn run(ctx: &mut RunContext) -> StepResult<()> {
    let items = ctx
        .source
        .sellable_items()
        .await
        .map_err(|e| Abort::error(format!("Failed to list sellable items: {e}")))?;

    tracing::info!(count = items.len(), "Exporting sellable items");

    for item in &items {
        absorb_info(export_sellable_item(ctx, item).await)?;
    }

    Ok(())
}

async fn export_sellable_item(ctx: &mut RunContext, item: &SellableItem) -> StepResult<()> {
    if !item.published {
        tracing::debug!(item = %item.friendly_id, "Item not published; skipping");
        ctx.result.products.skipped();
        return Err(Abort::info(format!(
            "Item '{}' not published",
            item.friendly_id
        )));
    }

    let product_id = sanitize(&item.friendly_id);

    let existing = match ctx.client.get_product(&product_id).await {
        Ok(product) => Some(product),
        Err(e) if e.is_not_found() => None,
        Err(e) => {
            tracing::error!(product_id = %product_id, error = %e, "Failed to get product");
            ctx.result.products.errored();
            ctx.problem_objects.add_product(&product_id);
            return Err(Abort::info(format!("Product '{product_id}' failed: {e}")));
        }
    };

    if existing.is_some() && ctx.config.export.import_mode == ImportMode::Create {
        tracing::debug!(product_id = %product_id, "Product already exists");
        ctx.result.products.not_changed();
        return Ok(());
    }

    match export_product_tree(ctx, item, &product_id, existing.is_some()).await {
        Ok(()) => Ok(()),
        Err(abort) => {
            if !abort.is_error() {
                ctx.problem_objects.add_product(&product_id);
            }
            Err(abort)
        }
    }
}

async fn export_product_tree(
    ctx: &mut RunContext,
    item: &SellableItem,
    product_id: &str,
    existed: bool,
) -> StepResult<()> {
    let with_variants = requires_variants(item);
    let multi_inventory = ctx.config.products.multi_inventory;

    // Price schedules go first so the default schedule ID can land on the
    // product itself.
    let schedules = match export_price_schedules(ctx, product_id, &item.pricing).await {
        Ok(schedules) => schedules,
        Err(abort) => {
            ctx.result.products.errored();
            return Err(abort);
        }
    };
    let default_schedule = schedules.get(&ctx.config.products.default_currency).cloned();

    let mut product = match build_product(ctx, item, product_id, with_variants, multi_inventory)
        .await
    {
        Ok(product) => product,
        Err(abort) => {
            ctx.result.products.errored();
            return Err(abort);
        }
    };
    product.default_price_schedule_id = default_schedule;

    match ctx.client.save_product(&product).await {
        Ok(_) => {
            if existed {
                tracing::info!(product_id = %product_id, "Updated product");
                ctx.result.products.updated();
            } else {
                tracing::info!(product_id = %product_id, with_variants, "Created product");
                ctx.result.products.created();
            }
        }
        Err(e) => {
            tracing::error!(product_id = %product_id, error = %e, "Failed to save product");
            ctx.result.products.errored();
            return Err(Abort::info(format!("Product '{product_id}' failed: {e}")));
        }
    }

    export_product_assignments(ctx, product_id, &schedules).await;

    if multi_inventory && !with_variants {
        export_inventory_records(ctx, product_id, None, &item.inventory).await?;
    }

    if with_variants {
        let summary = VariationsSummary::of(item);
        export_specs(ctx, product_id, &summary).await?;
        export_variants(ctx, item, product_id, &summary).await?;
    }

    Ok(())
}

async fn build_product(
    ctx: &mut RunContext,
    item: &SellableItem,
    product_id: &str,
    with_variants: bool,
    multi_inventory: bool,
) -> StepResult<Product> {
    let inventory = if with_variants {
        Some(Inventory {
            enabled: true,
            variant_level_tracking: true,
            quantity_available: None,
        })
    } else if multi_inventory {
        Some(Inventory {
            enabled: true,
            variant_level_tracking: false,
            quantity_available: None,
        })
    } else {
        resolve_quantity(ctx, &item.inventory).await?.map(|quantity| Inventory {
            enabled: true,
            variant_level_tracking: false,
            quantity_available: Some(quantity),
        })
    };

    let specs = item.specifications.as_ref().filter(|_| item.physical);

    Ok(Product {
        id: product_id.to_string(),
        name: if item.display_name.is_empty() {
            item.friendly_id.clone()
        } else {
            item.display_name.clone()
        },
        description: if item.description.is_empty() {
            None
        } else {
            Some(item.description.clone())
        },
        active: item.published,
        ship_weight: specs.map(|s| s.weight),
        ship_height: specs.map(|s| s.height),
        ship_width: specs.map(|s| s.width),
        ship_length: specs.map(|s| s.length),
        default_price_schedule_id: None,
        inventory,
        xp: ProductXp {
            brand: non_empty(&item.brand),
            manufacturer: non_empty(&item.manufacturer),
            type_of_good: non_empty(&item.type_of_good),
            tags: item.tags.clone(),
        },
    })
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Saves one price schedule per source currency. Returns currency →
/// schedule ID for the assignment pass.
async fn export_price_schedules(
    ctx: &mut RunContext,
    owner_id: &str,
    pricing: &[crate::domain::entities::Price],
) -> StepResult<HashMap<String, String>> {
    let mut schedules = HashMap::new();

    for price in pricing {
        let schedule_id = sanitize(&format!("{owner_id}_{}", price.currency_code));
        let schedule = PriceSchedule {
            id: schedule_id.clone(),
            name: schedule_id.clone(),
            currency: price.currency_code.clone(),
            max_quantity: Some(ctx.config.order.maximum_quantity),
            use_cumulative_quantity: ctx.config.order.rollup_cart_lines,
            price_breaks: vec![PriceBreak {
                quantity: 1,
                price: price.amount,
            }],
        };
        match ctx.client.save_price_schedule(&schedule).await {
            Ok(_) => {
                ctx.result.price_schedules.created();
                schedules.insert(price.currency_code.clone(), schedule_id);
            }
            Err(e) => {
                tracing::error!(schedule_id = %schedule.id, error = %e, "Failed to save price schedule");
                ctx.result.price_schedules.errored();
                return Err(Abort::info(format!(
                    "PriceSchedule '{}' failed: {e}",
                    schedule.id
                )));
            }
        }
    }

    Ok(schedules)
}

/// Assigns the product to every (buyer, currency group) pair whose currency
/// has a price schedule. Assignment failures don't fail the product.
async fn export_product_assignments(
    ctx: &mut RunContext,
    product_id: &str,
    schedules: &HashMap<String, String>,
) {
    let policies = ctx.config.buyers.clone();

    for policy in &policies {
        let buyer_id = sanitize(&policy.storefront);
        for currency in &policy.currencies {
            let Some(schedule_id) = schedules.get(currency) else {
                continue;
            };
            let assignment = ProductAssignment {
                product_id: product_id.to_string(),
                buyer_id: buyer_id.clone(),
                user_group_id: Some(currency_group_id(&buyer_id, currency)),
                price_schedule_id: Some(schedule_id.clone()),
            };
            match ctx.client.save_product_assignment(&assignment).await {
                Ok(()) => ctx.result.product_assignments.created(),
                Err(e) => {
                    tracing::error!(
                        product_id = %product_id,
                        buyer_id = %buyer_id,
                        currency = %currency,
                        error = %e,
                        "Failed to save product assignment"
                    );
                    ctx.result.product_assignments.errored();
                }
            }
        }
    }
}

/// Resolves the single-location quantity for an item or variation from the
/// configured inventory set.
async fn resolve_quantity(
    ctx: &mut RunContext,
    associations: &[InventoryAssociation],
) -> StepResult<Option<i32>> {
    let set_id = &ctx.config.products.inventory_set;

    for association in associations {
        if &association.inventory_set_id != set_id {
            continue;
        }
        let info = ctx
            .source
            .inventory_information(&association.inventory_information_id)
            .await
            .map_err(|e| Abort::error(format!("Failed to resolve inventory: {e}")))?;
        if let Some(info) = info {
            return Ok(Some(info.quantity));
        }
    }

    Ok(None)
}

/// Creates one spec per variation-defining property with its distinct
/// values as options, and assigns each spec to the product.
async fn export_specs(
    ctx: &mut RunContext,
    product_id: &str,
    summary: &VariationsSummary,
) -> StepResult<()> {
    for kind in &summary.unique_properties {
        let spec_id = spec_id(product_id, *kind);

        let spec = Spec {
            id: spec_id.clone(),
            name: kind.as_str().to_string(),
            required: true,
            defines_variant: true,
        };
        match ctx.client.save_spec(&spec).await {
            Ok(_) => ctx.result.specs.created(),
            Err(e) => {
                tracing::error!(spec_id = %spec_id, error = %e, "Failed to save spec");
                ctx.result.specs.errored();
                return Err(Abort::info(format!("Spec '{spec_id}' failed: {e}")));
            }
        }

        for value in summary.distinct_values(*kind) {
            let option = SpecOption {
                id: sanitize(value),
                value: value.to_string(),
            };
            match ctx.client.save_spec_option(&spec_id, &option).await {
                Ok(_) => ctx.result.spec_options.created(),
                Err(e) => {
                    tracing::error!(spec_id = %spec_id, value, error = %e, "Failed to save spec option");
                    ctx.result.spec_options.errored();
                    return Err(Abort::info(format!(
                        "SpecOption '{spec_id}/{value}' failed: {e}"
                    )));
                }
            }
        }

        let assignment = SpecProductAssignment {
            spec_id: spec_id.clone(),
            product_id: product_id.to_string(),
        };
        match ctx.client.save_spec_product_assignment(&assignment).await {
            Ok(()) => ctx.result.spec_product_assignments.created(),
            Err(e) => {
                tracing::error!(spec_id = %spec_id, error = %e, "Failed to assign spec");
                ctx.result.spec_product_assignments.errored();
                return Err(Abort::info(format!(
                    "SpecProductAssignment '{spec_id}' failed: {e}"
                )));
            }
        }
    }

    Ok(())
}

fn spec_id(product_id: &str, kind: VariationPropertyKind) -> String {
    sanitize(&format!("{product_id}_{kind}"))
}

/// Generates variants remotely, lists them back page by page, and patches
/// each one from its matching source variation. Remote variants with no
/// matching variation are disabled: an unrecognized variant must never be
/// purchasable.
async fn export_variants(
    ctx: &mut RunContext,
    item: &SellableItem,
    product_id: &str,
    summary: &VariationsSummary,
) -> StepResult<()> {
    if let Err(e) = ctx.client.generate_variants(product_id).await {
        tracing::error!(product_id = %product_id, error = %e, "Failed to generate variants");
        ctx.result.variants.errored();
        return Err(Abort::info(format!(
            "Variant generation for '{product_id}' failed: {e}"
        )));
    }

    let mut page = 1;
    loop {
        let listed = match ctx.client.list_variants(product_id, page).await {
            Ok(listed) => listed,
            Err(e) => {
                tracing::error!(product_id = %product_id, page, error = %e, "Failed to list variants");
                ctx.result.variants.errored();
                return Err(Abort::info(format!(
                    "Variant listing for '{product_id}' failed: {e}"
                )));
            }
        };

        let has_next = listed.has_next_page();
        for variant in &listed.items {
            export_variant(ctx, item, product_id, summary, variant).await?;
        }

        if !has_next {
            break;
        }
        page += 1;
    }

    Ok(())
}

async fn export_variant(
    ctx: &mut RunContext,
    item: &SellableItem,
    product_id: &str,
    summary: &VariationsSummary,
    variant: &Variant,
) -> StepResult<()> {
    let matched = summary
        .variations
        .iter()
        .find(|vs| property_sets_match(vs, variant))
        .and_then(|vs| item.variation(&vs.id));

    let Some(variation) = matched else {
        tracing::warn!(
            product_id = %product_id,
            variant_id = %variant.id,
            "No source variation matches this variant; disabling"
        );
        let partial = PartialVariant {
            active: Some(false),
            ..Default::default()
        };
        match ctx.client.patch_variant(product_id, &variant.id, &partial).await {
            Ok(_) => ctx.result.variants.updated(),
            Err(e) => {
                tracing::error!(product_id = %product_id, variant_id = %variant.id, error = %e, "Failed to disable variant");
                ctx.result.variants.errored();
            }
        }
        return Ok(());
    };

    let partial = match build_variant_patch(ctx, product_id, variation).await {
        Ok(partial) => partial,
        Err(abort) => {
            ctx.result.variants.errored();
            if abort.is_error() {
                return Err(abort);
            }
            return Ok(());
        }
    };

    match ctx.client.patch_variant(product_id, &variant.id, &partial).await {
        Ok(_) => {
            tracing::debug!(product_id = %product_id, variant_id = %variant.id, variation = %variation.id, "Patched variant");
            ctx.result.variants.patched();
        }
        Err(e) => {
            tracing::error!(product_id = %product_id, variant_id = %variant.id, error = %e, "Failed to patch variant");
            ctx.result.variants.errored();
            return Ok(());
        }
    }

    if ctx.config.products.multi_inventory {
        let associations = variation.inventory.clone();
        export_inventory_records(ctx, product_id, Some(&variant.id), &associations).await?;
    }

    Ok(())
}

/// Exact property-set equality between a source variation and a remote
/// variant: same number of defining properties, each with the same value.
fn property_sets_match(variation: &VariationSummary, variant: &Variant) -> bool {
    if variation.properties.len() != variant.specs.len() {
        return false;
    }
    variation.properties.iter().all(|property| {
        variant
            .specs
            .iter()
            .any(|spec| spec.name == property.kind.as_str() && spec.value == property.value)
    })
}

async fn build_variant_patch(
    ctx: &mut RunContext,
    product_id: &str,
    variation: &Variation,
) -> StepResult<PartialVariant> {
    let specs = variation.specifications.as_ref();

    let inventory = if ctx.config.products.multi_inventory {
        None
    } else {
        resolve_quantity(ctx, &variation.inventory)
            .await?
            .map(|quantity| VariantInventory {
                quantity_available: Some(quantity),
            })
    };

    // Per-currency variant pricing rides along as dedicated schedules
    // recorded in xp; variants have no first-class schedule linkage.
    let mut schedule_ids = Vec::new();
    if !variation.pricing.is_empty() {
        let owner_id = sanitize(&format!("{product_id}_{}", variation.id));
        let schedules = export_price_schedules(ctx, &owner_id, &variation.pricing).await?;
        let mut ids: Vec<String> = schedules.into_values().collect();
        ids.sort();
        schedule_ids = ids;
    }

    // The variant is re-keyed to the source variation ID, which also owns
    // its price schedules.
    Ok(PartialVariant {
        id: Some(sanitize(&variation.id)),
        active: Some(!variation.disabled),
        description: variation.description.clone(),
        ship_weight: specs.map(|s| s.weight),
        ship_height: specs.map(|s| s.height),
        ship_width: specs.map(|s| s.width),
        ship_length: specs.map(|s| s.length),
        inventory,
        xp: Some(VariantXp {
            tags: variation.tags.clone(),
            price_schedules: schedule_ids,
        }),
    })
}

/// Multi-location inventory: ensures an admin address per inventory set and
/// writes one inventory record per association.
async fn export_inventory_records(
    ctx: &mut RunContext,
    product_id: &str,
    variant_id: Option<&str>,
    associations: &[InventoryAssociation],
) -> StepResult<()> {
    for association in associations {
        let info = match ctx
            .source
            .inventory_information(&association.inventory_information_id)
            .await
        {
            Ok(Some(info)) => info,
            Ok(None) => {
                tracing::error!(
                    info_id = %association.inventory_information_id,
                    "Referenced inventory information not in snapshot"
                );
                ctx.result.inventory_records.errored();
                continue;
            }
            Err(e) => {
                return Err(Abort::error(format!("Failed to resolve inventory: {e}")))
            }
        };

        // The record's friendly ID names the inventory set it lives in.
        let address_id = match ensure_admin_address(ctx, info.inventory_set_id()).await {
            Ok(address_id) => address_id,
            Err(abort) => {
                ctx.result.inventory_records.errored();
                if abort.is_error() {
                    return Err(abort);
                }
                continue;
            }
        };

        let record = InventoryRecord {
            id: sanitize(&info.friendly_id),
            address_id,
            quantity_available: info.quantity,
        };
        let saved = match variant_id {
            Some(variant_id) => {
                ctx.client
                    .save_variant_inventory_record(product_id, variant_id, &record)
                    .await
            }
            None => ctx.client.save_inventory_record(product_id, &record).await,
        };
        match saved {
            Ok(_) => ctx.result.inventory_records.created(),
            Err(e) => {
                tracing::error!(record_id = %record.id, product_id = %product_id, error = %e, "Failed to save inventory record");
                ctx.result.inventory_records.errored();
            }
        }
    }

    Ok(())
}

/// Resolves the admin address (stock location) for an inventory set through
/// the run cache, the remote get, or creation.
async fn ensure_admin_address(ctx: &mut RunContext, set_id: &str) -> StepResult<String> {
    let address_id = sanitize(set_id);

    if ctx.cached_admin_address(&address_id).is_some() {
        return Ok(address_id);
    }

    match ctx.client.get_admin_address(&address_id).await {
        Ok(address) => {
            ctx.result.admin_addresses.not_changed();
            ctx.cache_admin_address(address);
            Ok(address_id)
        }
        Err(e) if e.is_not_found() => {
            let set = ctx
                .source
                .inventory_set(set_id)
                .await
                .map_err(|e| Abort::error(format!("Failed to resolve inventory set: {e}")))?;

            let (name, description) = set
                .map(|s| (s.display_name, non_empty(&s.description)))
                .unwrap_or_default();

            let address = Address {
                id: address_id.clone(),
                address_name: Some(if name.is_empty() {
                    set_id.to_string()
                } else {
                    name
                }),
                xp: AddressXp {
                    is_primary: None,
                    description,
                },
                ..Default::default()
            };
            match ctx.client.save_admin_address(&address).await {
                Ok(saved) => {
                    tracing::info!(address_id = %address_id, "Created admin address");
                    ctx.result.admin_addresses.created();
                    ctx.cache_admin_address(saved);
                    Ok(address_id)
                }
                Err(e) => {
                    tracing::error!(address_id = %address_id, error = %e, "Failed to create admin address");
                    ctx.result.admin_addresses.errored();
                    Err(Abort::info(format!(
                        "AdminAddress '{address_id}' failed: {e}"
                    )))
                }
            }
        }
        Err(e) => {
            tracing::error!(address_id = %address_id, error = %e, "Failed to get admin address");
            ctx.result.admin_addresses.errored();
            Err(Abort::info(format!("AdminAddress '{address_id}' failed: {e}")))
        }
    }
}
