//! Export result aggregation
//!
//! This module defines the per-resource-category counters that make up the
//! end-of-run summary, plus the problem-object set used to stop dependent
//! stages from referencing products that failed irrecoverably.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Outcome counters for one resource category.
///
/// Every outcome method also bumps `processed`, so the conservation
/// invariant `processed == not_changed + created + updated + patched +
/// skipped + errored` holds by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportCounters {
    pub processed: u64,
    pub not_changed: u64,
    pub created: u64,
    pub updated: u64,
    pub patched: u64,
    pub skipped: u64,
    pub errored: u64,
}

impl ExportCounters {
    /// Records an entity that already existed and was left untouched.
    pub fn not_changed(&mut self) {
        self.processed += 1;
        self.not_changed += 1;
    }

    /// Records a newly created entity.
    pub fn created(&mut self) {
        self.processed += 1;
        self.created += 1;
    }

    /// Records a full update of an existing entity.
    pub fn updated(&mut self) {
        self.processed += 1;
        self.updated += 1;
    }

    /// Records a partial update of an existing entity.
    pub fn patched(&mut self) {
        self.processed += 1;
        self.patched += 1;
    }

    /// Records an entity deliberately skipped without a remote call.
    pub fn skipped(&mut self) {
        self.processed += 1;
        self.skipped += 1;
    }

    /// Records an entity that failed to export.
    pub fn errored(&mut self) {
        self.processed += 1;
        self.errored += 1;
    }

    /// Sums another bucket into this one, elementwise.
    pub fn merge(&mut self, other: &ExportCounters) {
        self.processed += other.processed;
        self.not_changed += other.not_changed;
        self.created += other.created;
        self.updated += other.updated;
        self.patched += other.patched;
        self.skipped += other.skipped;
        self.errored += other.errored;
    }

    /// Whether the conservation invariant holds.
    pub fn is_conserved(&self) -> bool {
        self.processed
            == self.not_changed
                + self.created
                + self.updated
                + self.patched
                + self.skipped
                + self.errored
    }

    pub fn is_empty(&self) -> bool {
        self.processed == 0
    }
}

/// Sanitized IDs of products that failed irrecoverably during export.
///
/// Dependent stages consult this set before emitting assignments: a
/// reference to a problem product is counted Skipped, with no remote call.
#[derive(Debug, Clone, Default)]
pub struct ProblemObjects {
    products: BTreeSet<String>,
}

impl ProblemObjects {
    /// Marks a product (by sanitized destination ID) as a problem object.
    pub fn add_product(&mut self, product_id: impl Into<String>) {
        self.products.insert(product_id.into());
    }

    pub fn contains_product(&self, product_id: &str) -> bool {
        self.products.contains(product_id)
    }

    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Absorbs another problem set into this one.
    pub fn merge(&mut self, other: &ProblemObjects) {
        self.products.extend(other.products.iter().cloned());
    }
}

/// The complete result of an export run: one counter bucket per resource
/// category, run-level error diagnostics, and elapsed time.
#[derive(Debug, Clone, Default)]
pub struct ExportResult {
    pub admin_addresses: ExportCounters,
    pub buyer_address_assignments: ExportCounters,
    pub buyer_addresses: ExportCounters,
    pub buyers: ExportCounters,
    pub buyer_group_assignments: ExportCounters,
    pub buyer_groups: ExportCounters,
    pub buyer_users: ExportCounters,
    pub catalogs: ExportCounters,
    pub catalog_assignments: ExportCounters,
    pub categories: ExportCounters,
    pub category_assignments: ExportCounters,
    pub category_product_assignments: ExportCounters,
    pub locales: ExportCounters,
    pub locale_assignments: ExportCounters,
    pub product_assignments: ExportCounters,
    pub products: ExportCounters,
    pub security_profile_assignments: ExportCounters,
    pub security_profiles: ExportCounters,
    pub specs: ExportCounters,
    pub spec_options: ExportCounters,
    pub spec_product_assignments: ExportCounters,
    pub variants: ExportCounters,
    pub price_schedules: ExportCounters,
    pub inventory_records: ExportCounters,

    /// Run-level error diagnostics, in occurrence order
    pub run_errors: Vec<String>,

    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// Elapsed wall-clock time of the run
    pub duration: Duration,
}

impl ExportResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a run-level error diagnostic.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.run_errors.push(message.into());
    }

    /// Sums another result into this one, bucket by bucket.
    pub fn merge(&mut self, other: &ExportResult) {
        for (bucket, other_bucket) in self.buckets_mut().into_iter().zip(other.buckets()) {
            bucket.1.merge(other_bucket.1);
        }
        self.run_errors.extend(other.run_errors.iter().cloned());
    }

    /// Named views over every bucket, in summary order.
    pub fn buckets(&self) -> Vec<(&'static str, &ExportCounters)> {
        vec![
            ("AdminAddresses", &self.admin_addresses),
            ("BuyerAddressAssignments", &self.buyer_address_assignments),
            ("BuyerAddresses", &self.buyer_addresses),
            ("Buyers", &self.buyers),
            ("BuyerGroupAssignments", &self.buyer_group_assignments),
            ("BuyerGroups", &self.buyer_groups),
            ("BuyerUsers", &self.buyer_users),
            ("Catalogs", &self.catalogs),
            ("CatalogAssignments", &self.catalog_assignments),
            ("Categories", &self.categories),
            ("CategoryAssignments", &self.category_assignments),
            (
                "CategoryProductAssignments",
                &self.category_product_assignments,
            ),
            ("Locales", &self.locales),
            ("LocaleAssignments", &self.locale_assignments),
            ("ProductAssignments", &self.product_assignments),
            ("Products", &self.products),
            (
                "SecurityProfileAssignments",
                &self.security_profile_assignments,
            ),
            ("SecurityProfiles", &self.security_profiles),
            ("Specs", &self.specs),
            ("SpecOptions", &self.spec_options),
            ("SpecProductAssignments", &self.spec_product_assignments),
            ("Variants", &self.variants),
            ("PriceSchedules", &self.price_schedules),
            ("InventoryRecords", &self.inventory_records),
        ]
    }

    fn buckets_mut(&mut self) -> Vec<(&'static str, &mut ExportCounters)> {
        vec![
            ("AdminAddresses", &mut self.admin_addresses),
            (
                "BuyerAddressAssignments",
                &mut self.buyer_address_assignments,
            ),
            ("BuyerAddresses", &mut self.buyer_addresses),
            ("Buyers", &mut self.buyers),
            ("BuyerGroupAssignments", &mut self.buyer_group_assignments),
            ("BuyerGroups", &mut self.buyer_groups),
            ("BuyerUsers", &mut self.buyer_users),
            ("Catalogs", &mut self.catalogs),
            ("CatalogAssignments", &mut self.catalog_assignments),
            ("Categories", &mut self.categories),
            ("CategoryAssignments", &mut self.category_assignments),
            (
                "CategoryProductAssignments",
                &mut self.category_product_assignments,
            ),
            ("Locales", &mut self.locales),
            ("LocaleAssignments", &mut self.locale_assignments),
            ("ProductAssignments", &mut self.product_assignments),
            ("Products", &mut self.products),
            (
                "SecurityProfileAssignments",
                &mut self.security_profile_assignments,
            ),
            ("SecurityProfiles", &mut self.security_profiles),
            ("Specs", &mut self.specs),
            ("SpecOptions", &mut self.spec_options),
            ("SpecProductAssignments", &mut self.spec_product_assignments),
            ("Variants", &mut self.variants),
            ("PriceSchedules", &mut self.price_schedules),
            ("InventoryRecords", &mut self.inventory_records),
        ]
    }

    /// Total errored count across all buckets.
    pub fn total_errored(&self) -> u64 {
        self.buckets().iter().map(|(_, b)| b.errored).sum()
    }

    /// Whether the run finished without any errored entities or run-level
    /// errors.
    pub fn is_successful(&self) -> bool {
        self.total_errored() == 0 && self.run_errors.is_empty()
    }

    /// Whether every bucket satisfies the conservation invariant.
    pub fn is_conserved(&self) -> bool {
        self.buckets().iter().all(|(_, b)| b.is_conserved())
    }

    /// Log the summary, one line per non-empty bucket.
    pub fn log_summary(&self) {
        for (name, bucket) in self.buckets() {
            if bucket.is_empty() {
                continue;
            }
            tracing::info!(
                category = name,
                processed = bucket.processed,
                not_changed = bucket.not_changed,
                created = bucket.created,
                updated = bucket.updated,
                patched = bucket.patched,
                skipped = bucket.skipped,
                errored = bucket.errored,
                "Export summary"
            );
        }

        tracing::info!(
            duration_secs = self.duration.as_secs(),
            errored = self.total_errored(),
            "Export completed"
        );

        if !self.run_errors.is_empty() {
            tracing::warn!(
                error_count = self.run_errors.len(),
                "Export completed with errors"
            );
            for error in &self.run_errors {
                tracing::warn!(message = %error, "Export error");
            }
        }
    }
}
