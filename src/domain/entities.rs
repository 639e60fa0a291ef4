//! Source commerce entity model
//!
//! These types mirror the source platform's domain model as captured in a
//! snapshot file: shops, customers, catalogs, categories, sellable items
//! with their variations, pricing, and inventory associations. They are the
//! *input* side of the migration; the OrderCloud wire models live in
//! `adapters::ordercloud::models`.

use serde::{Deserialize, Serialize};

/// A source shop/storefront. Maps to an OrderCloud buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    /// Source entity identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Currency codes supported by this shop (e.g. "USD", "EUR")
    #[serde(default)]
    pub currencies: Vec<String>,
}

/// A source customer. Maps to an OrderCloud buyer user plus addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Source entity identifier
    pub id: String,

    /// Human-friendly identifier, used as the destination user ID
    pub friendly_id: String,

    /// The shop domain this customer belongs to; resolves the buyer
    pub domain: String,

    pub login_name: String,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    pub email: String,

    /// Source account status; only `ActiveAccount` exports as active
    #[serde(default)]
    pub account_status: AccountStatus,

    #[serde(default)]
    pub phone: Option<String>,

    /// Address components attached to the customer
    #[serde(default)]
    pub addresses: Vec<CustomerAddress>,
}

/// Source customer account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccountStatus {
    #[default]
    ActiveAccount,
    InactiveAccount,
    RequiresApproval,
}

/// An address component on a source customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerAddress {
    pub address_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_postal_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// A source catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub id: String,

    /// Catalog name; sanitized into the destination catalog ID
    pub name: String,

    #[serde(default)]
    pub display_name: String,
}

/// A source category
///
/// The friendly ID is a composite `{catalog}-{category}` key; both halves
/// are sanitized independently to address the destination category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,

    /// Composite `{catalog}-{category}` key
    pub friendly_id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    /// Unpublished categories are skipped, not errored
    #[serde(default = "default_true")]
    pub published: bool,
}

impl Category {
    /// Splits the composite friendly ID into (catalog, category) halves.
    pub fn friendly_id_parts(&self) -> Option<(&str, &str)> {
        self.friendly_id.split_once('-')
    }
}

/// Physical measurements for a sellable item or variation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemSpecifications {
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub length: f64,
}

/// A single list price in one currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub currency_code: String,
    pub amount: f64,
}

/// A reference from an item/variation to inventory information held in a
/// specific inventory set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryAssociation {
    /// The inventory set the record lives in
    pub inventory_set_id: String,

    /// The inventory information entity holding the quantity
    pub inventory_information_id: String,
}

/// A source sellable item. Maps to an OrderCloud product, optionally with
/// variants, specs, price schedules, and inventory records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellableItem {
    pub id: String,

    /// Human-friendly identifier, used as the destination product ID
    pub friendly_id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub brand: String,

    #[serde(default)]
    pub manufacturer: String,

    #[serde(default)]
    pub type_of_good: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Unpublished items are skipped, not errored
    #[serde(default = "default_true")]
    pub published: bool,

    /// Whether the item ships as a physical good
    #[serde(default = "default_true")]
    pub physical: bool,

    #[serde(default)]
    pub specifications: Option<ItemSpecifications>,

    /// List pricing; absent items get no price schedules
    #[serde(default)]
    pub pricing: Vec<Price>,

    /// Inventory held directly against the item (standalone products)
    #[serde(default)]
    pub inventory: Vec<InventoryAssociation>,

    /// Source variations of this item
    #[serde(default)]
    pub variations: Vec<Variation>,
}

impl SellableItem {
    /// Finds a variation by its source identifier.
    pub fn variation(&self, variation_id: &str) -> Option<&Variation> {
        self.variations.iter().find(|v| v.id == variation_id)
    }
}

/// A source item variation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variation {
    pub id: String,

    #[serde(default)]
    pub disabled: bool,

    /// Variation-defining display properties
    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub size: Option<String>,

    /// Disambiguating description shown on the variant
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub specifications: Option<ItemSpecifications>,

    #[serde(default)]
    pub pricing: Vec<Price>,

    #[serde(default)]
    pub inventory: Vec<InventoryAssociation>,
}

/// A source inventory set (a stock location). Maps to an OrderCloud admin
/// address in multi-inventory mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySet {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

/// A source inventory information record: the quantity of one item or
/// variation in one inventory set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryInformation {
    pub id: String,

    /// Composite `{inventory_set}-{sku}` key
    pub friendly_id: String,

    pub quantity: i32,
}

impl InventoryInformation {
    /// The inventory set half of the composite friendly ID.
    pub fn inventory_set_id(&self) -> &str {
        self.friendly_id
            .split_once('-')
            .map_or(self.friendly_id.as_str(), |(set, _)| set)
    }
}

fn default_true() -> bool {
    true
}
