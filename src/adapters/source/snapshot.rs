//! Snapshot-file source store
//!
//! Reads the whole source platform export from a single JSON file at
//! startup and serves lookups from memory. A one-shot migration reads the
//! snapshot many times over (assignment stages re-resolve items by ID), so
//! trading memory for repeatable reads is the right call here.

use crate::domain::entities::{
    Catalog, Category, Customer, InventoryInformation, InventorySet, SellableItem, Shop,
};
use crate::domain::result::Result;
use crate::domain::ExportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::traits::SourceStore;

/// On-disk snapshot document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotDocument {
    pub shops: Vec<Shop>,
    pub customers: Vec<Customer>,
    pub catalogs: Vec<Catalog>,
    pub categories: Vec<Category>,
    pub sellable_items: Vec<SellableItem>,
    pub inventory_sets: Vec<InventorySet>,
    pub inventory_information: Vec<InventoryInformation>,

    /// Category friendly ID → child category friendly IDs
    pub category_children: HashMap<String, Vec<String>>,

    /// Category friendly ID → sellable item IDs
    pub category_products: HashMap<String, Vec<String>>,

    /// Catalog name → sellable item IDs
    pub catalog_products: HashMap<String, Vec<String>>,
}

/// In-memory [`SourceStore`] backed by a snapshot file
pub struct SnapshotStore {
    document: SnapshotDocument,
}

impl SnapshotStore {
    /// Loads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExportError::Source(format!(
                "Failed to read snapshot file {}: {}",
                path.display(),
                e
            ))
        })?;

        let document: SnapshotDocument = serde_json::from_str(&contents).map_err(|e| {
            ExportError::Source(format!(
                "Failed to parse snapshot file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            shops = document.shops.len(),
            customers = document.customers.len(),
            catalogs = document.catalogs.len(),
            categories = document.categories.len(),
            sellable_items = document.sellable_items.len(),
            "Loaded source snapshot"
        );

        Ok(Self { document })
    }

    /// Wraps an already-built document; used by tests.
    pub fn from_document(document: SnapshotDocument) -> Self {
        Self { document }
    }
}

#[async_trait]
impl SourceStore for SnapshotStore {
    async fn shops(&self) -> Result<Vec<Shop>> {
        Ok(self.document.shops.clone())
    }

    async fn customers(&self) -> Result<Vec<Customer>> {
        Ok(self.document.customers.clone())
    }

    async fn catalogs(&self) -> Result<Vec<Catalog>> {
        Ok(self.document.catalogs.clone())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.document.categories.clone())
    }

    async fn sellable_items(&self) -> Result<Vec<SellableItem>> {
        Ok(self.document.sellable_items.clone())
    }

    async fn sellable_item(&self, item_id: &str) -> Result<Option<SellableItem>> {
        Ok(self
            .document
            .sellable_items
            .iter()
            .find(|item| item.id == item_id)
            .cloned())
    }

    async fn category_children(&self, category_friendly_id: &str) -> Result<Vec<String>> {
        Ok(self
            .document
            .category_children
            .get(category_friendly_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn category_products(&self, category_friendly_id: &str) -> Result<Vec<String>> {
        Ok(self
            .document
            .category_products
            .get(category_friendly_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn catalog_products(&self, catalog_name: &str) -> Result<Vec<String>> {
        Ok(self
            .document
            .catalog_products
            .get(catalog_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn inventory_set(&self, set_id: &str) -> Result<Option<InventorySet>> {
        Ok(self
            .document
            .inventory_sets
            .iter()
            .find(|set| set.id == set_id)
            .cloned())
    }

    async fn inventory_information(
        &self,
        info_id: &str,
    ) -> Result<Option<InventoryInformation>> {
        Ok(self
            .document
            .inventory_information
            .iter()
            .find(|info| info.id == info_id)
            .cloned())
    }
}
