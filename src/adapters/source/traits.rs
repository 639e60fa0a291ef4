//! Source platform lookup interface
//!
//! [`SourceStore`] abstracts where the source commerce data comes from. The
//! shipped implementation reads a snapshot file ([`super::snapshot`]);
//! tests build stores in memory.

use crate::domain::entities::{
    Catalog, Category, Customer, InventoryInformation, InventorySet, SellableItem, Shop,
};
use crate::domain::result::Result;
use async_trait::async_trait;

/// Read access to the source commerce data being migrated.
///
/// Entity lookups by ID return `Ok(None)` for unknown IDs; only genuine
/// store failures surface as errors.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// All shops/storefronts in the snapshot.
    async fn shops(&self) -> Result<Vec<Shop>>;

    /// All customers.
    async fn customers(&self) -> Result<Vec<Customer>>;

    /// All catalogs.
    async fn catalogs(&self) -> Result<Vec<Catalog>>;

    /// All categories.
    async fn categories(&self) -> Result<Vec<Category>>;

    /// All sellable items.
    async fn sellable_items(&self) -> Result<Vec<SellableItem>>;

    /// One sellable item by source entity ID.
    async fn sellable_item(&self, item_id: &str) -> Result<Option<SellableItem>>;

    /// The friendly IDs of a category's child categories.
    async fn category_children(&self, category_friendly_id: &str) -> Result<Vec<String>>;

    /// The sellable item IDs assigned to a category.
    async fn category_products(&self, category_friendly_id: &str) -> Result<Vec<String>>;

    /// The sellable item IDs assigned to a catalog.
    async fn catalog_products(&self, catalog_name: &str) -> Result<Vec<String>>;

    /// One inventory set (stock location) by ID.
    async fn inventory_set(&self, set_id: &str) -> Result<Option<InventorySet>>;

    /// One inventory information record by ID.
    async fn inventory_information(&self, info_id: &str)
        -> Result<Option<InventoryInformation>>;
}
