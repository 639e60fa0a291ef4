//! OrderCloud API surface
//!
//! The [`OrderCloudApi`] trait is the seam between the export pipeline and
//! the marketplace. The production implementation is the HTTP client in
//! [`super::client`]; tests substitute in-memory fakes.

use crate::domain::result::Result;
use async_trait::async_trait;

use super::models::{
    Address, AddressAssignment, Buyer, Catalog, CatalogAssignment, Category,
    CategoryProductAssignment, InventoryRecord, ListPage, Locale, LocaleAssignment,
    PartialCategory, PartialVariant, PriceSchedule, Product, ProductAssignment,
    ProductCatalogAssignment, SecurityProfile, SecurityProfileAssignment, Spec, SpecOption,
    SpecProductAssignment, User, UserGroup, UserGroupAssignment, Variant,
};

/// Operations the export performs against an OrderCloud marketplace.
///
/// Every `get_*` method returns `OrderCloudError::NotFound` (wrapped in
/// `ExportError::OrderCloud`) when the resource does not exist; callers use
/// that as the signal to create. `save_*` methods are PUT-semantics
/// upserts keyed on the resource ID; `patch_*` methods send partial
/// documents and leave unset fields untouched.
#[async_trait]
pub trait OrderCloudApi: Send + Sync {
    // --- Buyers ---

    async fn get_buyer(&self, buyer_id: &str) -> Result<Buyer>;

    async fn save_buyer(&self, buyer: &Buyer) -> Result<Buyer>;

    // --- Security profiles ---

    async fn get_security_profile(&self, profile_id: &str) -> Result<SecurityProfile>;

    async fn save_security_profile(&self, profile: &SecurityProfile) -> Result<SecurityProfile>;

    async fn save_security_profile_assignment(
        &self,
        assignment: &SecurityProfileAssignment,
    ) -> Result<()>;

    // --- Locales ---

    async fn save_locale(&self, locale: &Locale) -> Result<Locale>;

    async fn save_locale_assignment(&self, assignment: &LocaleAssignment) -> Result<()>;

    // --- Buyer users and user groups ---

    async fn save_user_group(&self, buyer_id: &str, group: &UserGroup) -> Result<UserGroup>;

    async fn save_user_group_assignment(
        &self,
        buyer_id: &str,
        assignment: &UserGroupAssignment,
    ) -> Result<()>;

    async fn save_user(&self, buyer_id: &str, user: &User) -> Result<User>;

    // --- Addresses ---

    async fn save_address(&self, buyer_id: &str, address: &Address) -> Result<Address>;

    async fn save_address_assignment(
        &self,
        buyer_id: &str,
        assignment: &AddressAssignment,
    ) -> Result<()>;

    async fn get_admin_address(&self, address_id: &str) -> Result<Address>;

    async fn save_admin_address(&self, address: &Address) -> Result<Address>;

    // --- Catalogs ---

    async fn get_catalog(&self, catalog_id: &str) -> Result<Catalog>;

    async fn save_catalog(&self, catalog: &Catalog) -> Result<Catalog>;

    async fn save_catalog_assignment(&self, assignment: &CatalogAssignment) -> Result<()>;

    async fn save_product_catalog_assignment(
        &self,
        assignment: &ProductCatalogAssignment,
    ) -> Result<()>;

    // --- Categories ---

    async fn get_category(&self, catalog_id: &str, category_id: &str) -> Result<Category>;

    async fn save_category(&self, catalog_id: &str, category: &Category) -> Result<Category>;

    async fn patch_category(
        &self,
        catalog_id: &str,
        category_id: &str,
        partial: &PartialCategory,
    ) -> Result<Category>;

    async fn save_category_product_assignment(
        &self,
        catalog_id: &str,
        assignment: &CategoryProductAssignment,
    ) -> Result<()>;

    // --- Products ---

    async fn get_product(&self, product_id: &str) -> Result<Product>;

    async fn save_product(&self, product: &Product) -> Result<Product>;

    async fn save_product_assignment(&self, assignment: &ProductAssignment) -> Result<()>;

    // --- Specs ---

    async fn save_spec(&self, spec: &Spec) -> Result<Spec>;

    async fn save_spec_option(&self, spec_id: &str, option: &SpecOption) -> Result<SpecOption>;

    async fn save_spec_product_assignment(&self, assignment: &SpecProductAssignment) -> Result<()>;

    // --- Price schedules ---

    async fn save_price_schedule(&self, schedule: &PriceSchedule) -> Result<PriceSchedule>;

    // --- Variants ---

    /// Asks OrderCloud to (re)generate variants from the product's
    /// variant-defining specs.
    async fn generate_variants(&self, product_id: &str) -> Result<()>;

    async fn list_variants(&self, product_id: &str, page: u32) -> Result<ListPage<Variant>>;

    async fn patch_variant(
        &self,
        product_id: &str,
        variant_id: &str,
        partial: &PartialVariant,
    ) -> Result<Variant>;

    // --- Inventory records ---

    async fn save_inventory_record(
        &self,
        product_id: &str,
        record: &InventoryRecord,
    ) -> Result<InventoryRecord>;

    async fn save_variant_inventory_record(
        &self,
        product_id: &str,
        variant_id: &str,
        record: &InventoryRecord,
    ) -> Result<InventoryRecord>;
}
