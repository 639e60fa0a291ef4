//! OrderCloud wire models
//!
//! Serde representations of the OrderCloud resources this migration writes.
//! Field names follow the OrderCloud API's PascalCase convention; only the
//! fields the migration populates are modeled, plus `xp` extension payloads
//! where the source carries data OrderCloud has no first-class field for.

use serde::{Deserialize, Serialize};

/// Security profile roles granted to migrated buyers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiRole {
    MeAddressAdmin,
    MeAdmin,
    MeCreditCardAdmin,
    MeXpAdmin,
    PasswordReset,
    Shopper,
    FullAccess,
}

/// The fixed role set assigned to every migrated buyer's security profile.
pub const DEFAULT_BUYER_ROLES: [ApiRole; 6] = [
    ApiRole::MeAddressAdmin,
    ApiRole::MeAdmin,
    ApiRole::MeCreditCardAdmin,
    ApiRole::MeXpAdmin,
    ApiRole::PasswordReset,
    ApiRole::Shopper,
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Buyer {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SecurityProfile {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub roles: Vec<ApiRole>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SecurityProfileAssignment {
    #[serde(rename = "SecurityProfileID")]
    pub security_profile_id: String,
    #[serde(rename = "BuyerID")]
    pub buyer_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserGroup {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserGroupAssignment {
    #[serde(rename = "UserGroupID")]
    pub user_group_id: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct User {
    #[serde(rename = "ID")]
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AddressXp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A buyer address or an admin address (stock location).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Address {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub xp: AddressXp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AddressAssignment {
    #[serde(rename = "AddressID")]
    pub address_id: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    pub is_shipping: bool,
    pub is_billing: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Catalog {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CatalogAssignment {
    #[serde(rename = "CatalogID")]
    pub catalog_id: String,
    #[serde(rename = "BuyerID")]
    pub buyer_id: String,
    pub view_all_categories: bool,
    pub view_all_products: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProductCatalogAssignment {
    #[serde(rename = "CatalogID")]
    pub catalog_id: String,
    #[serde(rename = "ProductID")]
    pub product_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Category {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub active: bool,
    #[serde(rename = "ParentID", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Partial category for PATCH calls; only set fields are serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PartialCategory {
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "ParentID", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CategoryProductAssignment {
    #[serde(rename = "CategoryID")]
    pub category_id: String,
    #[serde(rename = "ProductID")]
    pub product_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Inventory {
    pub enabled: bool,
    pub variant_level_tracking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_available: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProductXp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_of_good: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Product {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_length: Option<f64>,
    #[serde(rename = "DefaultPriceScheduleID", skip_serializing_if = "Option::is_none")]
    pub default_price_schedule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Inventory>,
    pub xp: ProductXp,
}

/// A buyer/user-group product visibility assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProductAssignment {
    #[serde(rename = "ProductID")]
    pub product_id: String,
    #[serde(rename = "BuyerID")]
    pub buyer_id: String,
    #[serde(rename = "UserGroupID", skip_serializing_if = "Option::is_none")]
    pub user_group_id: Option<String>,
    /// Price schedule the assigned party buys at
    #[serde(rename = "PriceScheduleID", skip_serializing_if = "Option::is_none")]
    pub price_schedule_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Spec {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub required: bool,
    pub defines_variant: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SpecOption {
    #[serde(rename = "ID")]
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SpecProductAssignment {
    #[serde(rename = "SpecID")]
    pub spec_id: String,
    #[serde(rename = "ProductID")]
    pub product_id: String,
}

/// A spec/value pair carried on a generated variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VariantSpec {
    #[serde(rename = "SpecID")]
    pub spec_id: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Variant {
    #[serde(rename = "ID")]
    pub id: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub specs: Vec<VariantSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VariantInventory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_available: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VariantXp {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Price schedule IDs created for this variant; OrderCloud variants
    /// have no first-class price schedule linkage.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub price_schedules: Vec<String>,
}

/// Partial variant for PATCH calls; only set fields are serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PartialVariant {
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<VariantInventory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<VariantXp>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PriceBreak {
    pub quantity: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PriceSchedule {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_quantity: Option<i32>,
    pub use_cumulative_quantity: bool,
    pub price_breaks: Vec<PriceBreak>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InventoryRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "AddressID")]
    pub address_id: String,
    pub quantity_available: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Locale {
    #[serde(rename = "ID")]
    pub id: String,
    pub currency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LocaleAssignment {
    #[serde(rename = "LocaleID")]
    pub locale_id: String,
    #[serde(rename = "BuyerID")]
    pub buyer_id: String,
    #[serde(rename = "UserGroupID", skip_serializing_if = "Option::is_none")]
    pub user_group_id: Option<String>,
}

/// Paging metadata returned by OrderCloud list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListPageMeta {
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u32,
}

/// One page of a paged OrderCloud list response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListPage<T> {
    pub meta: ListPageMeta,
    pub items: Vec<T>,
}

impl<T> ListPage<T> {
    /// Whether another page follows this one.
    pub fn has_next_page(&self) -> bool {
        self.meta.page < self.meta.total_pages
    }
}
