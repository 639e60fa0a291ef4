//! Buyer export stage
//!
//! Exports each configured storefront as an OrderCloud buyer with its
//! security profile and profile assignment. Resolved buyers and profiles
//! are cached on the run context so later stages (customers in particular)
//! never re-fetch them.

use crate::adapters::ordercloud::models::{
    Buyer, SecurityProfile, SecurityProfileAssignment, DEFAULT_BUYER_ROLES,
};
use crate::config::BuyerPolicy;
use crate::core::context::RunContext;
use crate::domain::ids::sanitize;

use super::{absorb_info, Abort, StepResult};

/// Runs the buyers stage over every configured buyer policy.
pub async fn run(ctx: &mut RunContext) -> StepResult<()> {
    let policies = ctx.config.buyers.clone();

    tracing::info!(count = policies.len(), "Exporting buyers");

    for policy in &policies {
        absorb_info(export_buyer(ctx, policy).await)?;
    }

    Ok(())
}

async fn export_buyer(ctx: &mut RunContext, policy: &BuyerPolicy) -> StepResult<()> {
    let shops = ctx
        .source
        .shops()
        .await
        .map_err(|e| Abort::error(format!("Failed to list shops: {e}")))?;

    let Some(shop) = shops.into_iter().find(|s| s.id == policy.storefront) else {
        tracing::warn!(storefront = %policy.storefront, "Storefront not present in snapshot");
        ctx.result.buyers.skipped();
        return Err(Abort::info(format!(
            "Storefront '{}' not in snapshot",
            policy.storefront
        )));
    };

    let buyer_id = sanitize(&policy.storefront);
    let buyer_name = if shop.name.is_empty() {
        policy.storefront.clone()
    } else {
        shop.name
    };

    ensure_buyer(ctx, &buyer_id, &buyer_name).await?;
    ensure_security_profile(ctx, &buyer_id).await?;

    Ok(())
}

/// Resolves a buyer through the run cache, the remote get, or creation, in
/// that order. Only a cache miss costs a remote call.
pub(crate) async fn ensure_buyer(
    ctx: &mut RunContext,
    buyer_id: &str,
    name: &str,
) -> StepResult<()> {
    if ctx.cached_buyer(buyer_id).is_some() {
        return Ok(());
    }

    match ctx.client.get_buyer(buyer_id).await {
        Ok(buyer) => {
            tracing::debug!(buyer_id, "Buyer already exists");
            ctx.result.buyers.not_changed();
            ctx.cache_buyer(buyer);
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            let buyer = Buyer {
                id: buyer_id.to_string(),
                name: name.to_string(),
                active: true,
            };
            match ctx.client.save_buyer(&buyer).await {
                Ok(saved) => {
                    tracing::info!(buyer_id, "Created buyer");
                    ctx.result.buyers.created();
                    ctx.cache_buyer(saved);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(buyer_id, error = %e, "Failed to create buyer");
                    ctx.result.buyers.errored();
                    Err(Abort::info(format!("Buyer '{buyer_id}' failed: {e}")))
                }
            }
        }
        Err(e) => {
            tracing::error!(buyer_id, error = %e, "Failed to get buyer");
            ctx.result.buyers.errored();
            Err(Abort::info(format!("Buyer '{buyer_id}' failed: {e}")))
        }
    }
}

/// Resolves the buyer's security profile and its buyer assignment, with the
/// same cache-first discipline as [`ensure_buyer`].
pub(crate) async fn ensure_security_profile(
    ctx: &mut RunContext,
    buyer_id: &str,
) -> StepResult<()> {
    if ctx.cached_security_profile(buyer_id).is_none() {
        match ctx.client.get_security_profile(buyer_id).await {
            Ok(profile) => {
                ctx.result.security_profiles.not_changed();
                ctx.cache_security_profile(profile);
            }
            Err(e) if e.is_not_found() => {
                let profile = SecurityProfile {
                    id: buyer_id.to_string(),
                    name: buyer_id.to_string(),
                    roles: DEFAULT_BUYER_ROLES.to_vec(),
                };
                match ctx.client.save_security_profile(&profile).await {
                    Ok(saved) => {
                        tracing::info!(buyer_id, "Created security profile");
                        ctx.result.security_profiles.created();
                        ctx.cache_security_profile(saved);
                    }
                    Err(e) => {
                        tracing::error!(buyer_id, error = %e, "Failed to create security profile");
                        ctx.result.security_profiles.errored();
                        return Err(Abort::info(format!(
                            "SecurityProfile '{buyer_id}' failed: {e}"
                        )));
                    }
                }
            }
            Err(e) => {
                tracing::error!(buyer_id, error = %e, "Failed to get security profile");
                ctx.result.security_profiles.errored();
                return Err(Abort::info(format!(
                    "SecurityProfile '{buyer_id}' failed: {e}"
                )));
            }
        }

        let assignment = SecurityProfileAssignment {
            security_profile_id: buyer_id.to_string(),
            buyer_id: buyer_id.to_string(),
        };
        match ctx.client.save_security_profile_assignment(&assignment).await {
            Ok(()) => ctx.result.security_profile_assignments.created(),
            Err(e) => {
                tracing::error!(buyer_id, error = %e, "Failed to assign security profile");
                ctx.result.security_profile_assignments.errored();
                return Err(Abort::info(format!(
                    "SecurityProfileAssignment '{buyer_id}' failed: {e}"
                )));
            }
        }
    }

    Ok(())
}
