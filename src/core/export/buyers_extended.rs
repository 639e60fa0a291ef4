//! Buyer extended export stage
//!
//! Builds out each buyer's currency structure: one user group and one
//! locale per declared currency, plus the locale-to-group assignments.
//! Runs after the buyers stage so every buyer is already cached.

use crate::adapters::ordercloud::models::{Locale, LocaleAssignment, UserGroup};
use crate::config::BuyerPolicy;
use crate::core::context::RunContext;
use crate::domain::ids::sanitize;

use super::{absorb_info, Abort, StepResult};

/// Runs the buyers-extended stage over every configured buyer policy.
pub async fn run(ctx: &mut RunContext) -> StepResult<()> {
    let policies = ctx.config.buyers.clone();

    tracing::info!(count = policies.len(), "Exporting buyer currency structure");

    for policy in &policies {
        absorb_info(export_buyer_extended(ctx, policy).await)?;
    }

    Ok(())
}

async fn export_buyer_extended(ctx: &mut RunContext, policy: &BuyerPolicy) -> StepResult<()> {
    let buyer_id = sanitize(&policy.storefront);

    if ctx.cached_buyer(&buyer_id).is_none() {
        tracing::warn!(buyer_id, "Buyer was not exported; skipping currency structure");
        ctx.result.buyer_groups.skipped();
        return Err(Abort::info(format!("Buyer '{buyer_id}' not exported")));
    }

    for currency in &policy.currencies {
        ensure_currency_group(ctx, &buyer_id, currency).await?;
    }

    Ok(())
}

/// Creates the `{buyer}_{currency}` user group, the `Locale_{currency}`
/// locale, and the locale assignment binding them.
pub(crate) async fn ensure_currency_group(
    ctx: &mut RunContext,
    buyer_id: &str,
    currency: &str,
) -> StepResult<()> {
    let group_id = currency_group_id(buyer_id, currency);

    let group = UserGroup {
        id: group_id.clone(),
        name: format!("{currency} buyers"),
    };
    match ctx.client.save_user_group(buyer_id, &group).await {
        Ok(_) => ctx.result.buyer_groups.created(),
        Err(e) => {
            tracing::error!(buyer_id, group_id = %group_id, error = %e, "Failed to save user group");
            ctx.result.buyer_groups.errored();
            return Err(Abort::info(format!("UserGroup '{group_id}' failed: {e}")));
        }
    }

    let locale = Locale {
        id: locale_id(currency),
        currency: currency.to_string(),
    };
    match ctx.client.save_locale(&locale).await {
        Ok(_) => ctx.result.locales.created(),
        Err(e) => {
            tracing::error!(locale_id = %locale.id, error = %e, "Failed to save locale");
            ctx.result.locales.errored();
            return Err(Abort::info(format!("Locale '{}' failed: {e}", locale.id)));
        }
    }

    let assignment = LocaleAssignment {
        locale_id: locale.id.clone(),
        buyer_id: buyer_id.to_string(),
        user_group_id: Some(group_id.clone()),
    };
    match ctx.client.save_locale_assignment(&assignment).await {
        Ok(()) => ctx.result.locale_assignments.created(),
        Err(e) => {
            tracing::error!(locale_id = %locale.id, group_id = %group_id, error = %e, "Failed to assign locale");
            ctx.result.locale_assignments.errored();
            return Err(Abort::info(format!(
                "LocaleAssignment '{}' failed: {e}",
                locale.id
            )));
        }
    }

    Ok(())
}

/// The destination user group ID for one buyer currency.
pub(crate) fn currency_group_id(buyer_id: &str, currency: &str) -> String {
    sanitize(&format!("{buyer_id}_{currency}"))
}

fn locale_id(currency: &str) -> String {
    sanitize(&format!("Locale_{currency}"))
}
