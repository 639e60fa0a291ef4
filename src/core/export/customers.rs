//! Customer export stage
//!
//! Exports each source customer as a buyer user under the buyer its domain
//! maps to, with the customer's addresses, address assignments, and a user
//! group assignment to the buyer's default-currency group. The buyer and
//! security profile come from the run cache when earlier stages already
//! resolved them.

use crate::adapters::ordercloud::models::{
    Address, AddressAssignment, AddressXp, User, UserGroupAssignment,
};
use crate::config::BuyerPolicy;
use crate::core::context::RunContext;
use crate::domain::entities::{AccountStatus, Customer, CustomerAddress};
use crate::domain::ids::sanitize;
use std::collections::HashSet;

use super::buyers::{ensure_buyer, ensure_security_profile};
use super::buyers_extended::{currency_group_id, ensure_currency_group};
use super::{absorb_info, Abort, StepResult};

/// Runs the customers stage over every customer in the snapshot.
pub async fn run(ctx: &mut RunContext) -> StepResult<()> {
    let customers = ctx
        .source
        .customers()
        .await
        .map_err(|e| Abort::error(format!("Failed to list customers: {e}")))?;

    tracing::info!(count = customers.len(), "Exporting customers");

    // Currency groups are ensured once per buyer, not once per customer.
    let mut groups_ensured: HashSet<String> = HashSet::new();

    for customer in &customers {
        absorb_info(export_customer(ctx, customer, &mut groups_ensured).await)?;
    }

    Ok(())
}

async fn export_customer(
    ctx: &mut RunContext,
    customer: &Customer,
    groups_ensured: &mut HashSet<String>,
) -> StepResult<()> {
    let Some(policy) = ctx.config.buyer_for_domain(&customer.domain).cloned() else {
        tracing::warn!(
            customer_id = %customer.id,
            domain = %customer.domain,
            "No buyer policy declares this customer's domain"
        );
        ctx.result.buyer_users.skipped();
        return Err(Abort::info(format!(
            "Customer '{}' domain '{}' has no buyer policy",
            customer.id, customer.domain
        )));
    };

    let buyer_id = sanitize(&policy.storefront);

    ensure_buyer(ctx, &buyer_id, &policy.storefront).await?;
    ensure_security_profile(ctx, &buyer_id).await?;

    if groups_ensured.insert(buyer_id.clone()) {
        for currency in &policy.currencies {
            ensure_currency_group(ctx, &buyer_id, currency).await?;
        }
    }

    let user_id = export_user(ctx, &buyer_id, customer, &policy).await?;

    for address in &customer.addresses {
        export_address(ctx, &buyer_id, &user_id, address).await?;
    }

    let assignment = UserGroupAssignment {
        user_group_id: currency_group_id(&buyer_id, &policy.default_currency),
        user_id: user_id.clone(),
    };
    match ctx.client.save_user_group_assignment(&buyer_id, &assignment).await {
        Ok(()) => ctx.result.buyer_group_assignments.created(),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Failed to assign user to default group");
            ctx.result.buyer_group_assignments.errored();
            return Err(Abort::info(format!(
                "UserGroupAssignment for '{user_id}' failed: {e}"
            )));
        }
    }

    Ok(())
}

async fn export_user(
    ctx: &mut RunContext,
    buyer_id: &str,
    customer: &Customer,
    policy: &BuyerPolicy,
) -> StepResult<String> {
    let user_id = sanitize(&customer.friendly_id);
    let defaults = &ctx.config.users;

    let user = User {
        id: user_id.clone(),
        username: customer.login_name.clone(),
        first_name: customer
            .first_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| defaults.default_first_name.clone()),
        last_name: customer
            .last_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| defaults.default_last_name.clone()),
        email: customer.email.clone(),
        active: customer.account_status == AccountStatus::ActiveAccount,
        phone: customer.phone.clone(),
    };

    match ctx.client.save_user(buyer_id, &user).await {
        Ok(_) => {
            tracing::debug!(user_id = %user_id, buyer_id, storefront = %policy.storefront, "Saved buyer user");
            ctx.result.buyer_users.created();
            Ok(user_id)
        }
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Failed to save buyer user");
            ctx.result.buyer_users.errored();
            Err(Abort::info(format!("User '{user_id}' failed: {e}")))
        }
    }
}

async fn export_address(
    ctx: &mut RunContext,
    buyer_id: &str,
    user_id: &str,
    address: &CustomerAddress,
) -> StepResult<()> {
    let address_id = sanitize(&format!("{user_id}_{}", address.address_name));

    let destination = Address {
        id: address_id.clone(),
        address_name: Some(address.address_name.clone()),
        first_name: address.first_name.clone(),
        last_name: address.last_name.clone(),
        street1: address.address1.clone(),
        street2: address.address2.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        zip: address.zip_postal_code.clone(),
        country: address.country_code.clone(),
        phone: address.phone_number.clone(),
        xp: AddressXp {
            is_primary: Some(address.is_primary),
            description: None,
        },
    };

    match ctx.client.save_address(buyer_id, &destination).await {
        Ok(_) => ctx.result.buyer_addresses.created(),
        Err(e) => {
            tracing::error!(address_id = %address_id, error = %e, "Failed to save address");
            ctx.result.buyer_addresses.errored();
            return Err(Abort::info(format!("Address '{address_id}' failed: {e}")));
        }
    }

    let assignment = AddressAssignment {
        address_id: address_id.clone(),
        user_id: user_id.to_string(),
        is_shipping: true,
        is_billing: true,
    };
    match ctx.client.save_address_assignment(buyer_id, &assignment).await {
        Ok(()) => ctx.result.buyer_address_assignments.created(),
        Err(e) => {
            tracing::error!(address_id = %address_id, error = %e, "Failed to assign address");
            ctx.result.buyer_address_assignments.errored();
            return Err(Abort::info(format!(
                "AddressAssignment '{address_id}' failed: {e}"
            )));
        }
    }

    Ok(())
}
