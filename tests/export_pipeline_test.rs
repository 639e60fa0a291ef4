//! Integration tests for the export pipeline
//!
//! These tests run the full orchestrator against an in-memory OrderCloud
//! fake and snapshot-backed source data, covering the get-or-create
//! convergence behavior, variant generation and matching, problem-object
//! skip propagation, and the counter conservation invariant.

use async_trait::async_trait;
use ocexport::adapters::ordercloud::models::{
    Address, AddressAssignment, Buyer, Catalog, CatalogAssignment, Category,
    CategoryProductAssignment, InventoryRecord, ListPage, ListPageMeta, Locale, LocaleAssignment,
    PartialCategory, PartialVariant, PriceSchedule, Product, ProductAssignment,
    ProductCatalogAssignment, SecurityProfile, SecurityProfileAssignment, Spec, SpecOption,
    SpecProductAssignment, User, UserGroup, UserGroupAssignment, Variant, VariantSpec,
};
use ocexport::adapters::ordercloud::OrderCloudApi;
use ocexport::adapters::source::{SnapshotDocument, SnapshotStore};
use ocexport::config::{
    ApplicationConfig, BuyerPolicy, CatalogPolicy, ExportSettings, ImportMode, LineQuantityPolicy,
    LoggingConfig, OcExportConfig, OrderCloudConfig, ProductPolicy, SourceConfig, UserPolicy,
    secret_string,
};
use ocexport::core::{ExportResult, Orchestrator};
use ocexport::domain::{OrderCloudError, Result as ApiResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Everything the fake marketplace remembers across calls.
#[derive(Default)]
struct RemoteState {
    buyers: HashMap<String, Buyer>,
    security_profiles: HashMap<String, SecurityProfile>,
    users: HashMap<String, User>,
    catalogs: HashMap<String, Catalog>,
    categories: HashMap<(String, String), Category>,
    products: HashMap<String, Product>,
    price_schedules: HashMap<String, PriceSchedule>,
    admin_addresses: HashMap<String, Address>,
    specs: HashMap<String, Spec>,
    spec_options: HashMap<String, Vec<SpecOption>>,
    spec_assignments: HashMap<String, Vec<String>>,
    variants: HashMap<String, Vec<Variant>>,
    variant_patches: Vec<(String, String, PartialVariant)>,
    inventory_records: Vec<(String, Option<String>, InventoryRecord)>,
    calls: Vec<String>,
    fail: HashSet<String>,
}

impl RemoteState {
    fn check_fail(&self, key: &str) -> ApiResult<()> {
        if self.fail.contains(key) {
            return Err(OrderCloudError::Api {
                status: 500,
                message: format!("injected failure for {key}"),
            }
            .into());
        }
        Ok(())
    }
}

fn not_found(what: &str) -> ocexport::domain::ExportError {
    OrderCloudError::NotFound(what.to_string()).into()
}

/// In-memory [`OrderCloudApi`] with call recording and failure injection.
#[derive(Default)]
struct FakeOrderCloud {
    state: Mutex<RemoteState>,
}

impl FakeOrderCloud {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes the call identified by `key` (e.g. "save_product:Item3") fail
    /// with an injected 500.
    fn fail_on(&self, key: &str) {
        self.state.lock().unwrap().fail.insert(key.to_string());
    }

    fn call_count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn product(&self, product_id: &str) -> Option<Product> {
        self.state.lock().unwrap().products.get(product_id).cloned()
    }

    fn user(&self, user_id: &str) -> Option<User> {
        self.state.lock().unwrap().users.get(user_id).cloned()
    }

    fn variant_patch(&self, product_id: &str, variant_id: &str) -> Option<PartialVariant> {
        self.state
            .lock()
            .unwrap()
            .variant_patches
            .iter()
            .rev()
            .find(|(p, v, _)| p == product_id && v == variant_id)
            .map(|(_, _, patch)| patch.clone())
    }

    fn price_schedule(&self, schedule_id: &str) -> Option<PriceSchedule> {
        self.state
            .lock()
            .unwrap()
            .price_schedules
            .get(schedule_id)
            .cloned()
    }

    fn category(&self, catalog_id: &str, category_id: &str) -> Option<Category> {
        self.state
            .lock()
            .unwrap()
            .categories
            .get(&(catalog_id.to_string(), category_id.to_string()))
            .cloned()
    }

    fn admin_address(&self, address_id: &str) -> Option<Address> {
        self.state
            .lock()
            .unwrap()
            .admin_addresses
            .get(address_id)
            .cloned()
    }

    fn inventory_records(&self) -> Vec<(String, Option<String>, InventoryRecord)> {
        self.state.lock().unwrap().inventory_records.clone()
    }
}

#[async_trait]
impl OrderCloudApi for FakeOrderCloud {
    async fn get_buyer(&self, buyer_id: &str) -> ApiResult<Buyer> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("get_buyer:{buyer_id}"));
        s.check_fail(&format!("get_buyer:{buyer_id}"))?;
        s.buyers
            .get(buyer_id)
            .cloned()
            .ok_or_else(|| not_found("Buyer"))
    }

    async fn save_buyer(&self, buyer: &Buyer) -> ApiResult<Buyer> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("save_buyer:{}", buyer.id));
        s.check_fail(&format!("save_buyer:{}", buyer.id))?;
        s.buyers.insert(buyer.id.clone(), buyer.clone());
        Ok(buyer.clone())
    }

    async fn get_security_profile(&self, profile_id: &str) -> ApiResult<SecurityProfile> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("get_security_profile:{profile_id}"));
        s.security_profiles
            .get(profile_id)
            .cloned()
            .ok_or_else(|| not_found("SecurityProfile"))
    }

    async fn save_security_profile(&self, profile: &SecurityProfile) -> ApiResult<SecurityProfile> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("save_security_profile:{}", profile.id));
        s.check_fail(&format!("save_security_profile:{}", profile.id))?;
        s.security_profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile.clone())
    }

    async fn save_security_profile_assignment(
        &self,
        assignment: &SecurityProfileAssignment,
    ) -> ApiResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!(
            "save_security_profile_assignment:{}",
            assignment.buyer_id
        ));
        s.check_fail(&format!(
            "save_security_profile_assignment:{}",
            assignment.buyer_id
        ))
    }

    async fn save_locale(&self, locale: &Locale) -> ApiResult<Locale> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("save_locale:{}", locale.id));
        s.check_fail(&format!("save_locale:{}", locale.id))?;
        Ok(locale.clone())
    }

    async fn save_locale_assignment(&self, assignment: &LocaleAssignment) -> ApiResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls
            .push(format!("save_locale_assignment:{}", assignment.locale_id));
        s.check_fail(&format!("save_locale_assignment:{}", assignment.locale_id))
    }

    async fn save_user_group(&self, buyer_id: &str, group: &UserGroup) -> ApiResult<UserGroup> {
        let mut s = self.state.lock().unwrap();
        s.calls
            .push(format!("save_user_group:{buyer_id}:{}", group.id));
        s.check_fail(&format!("save_user_group:{buyer_id}:{}", group.id))?;
        Ok(group.clone())
    }

    async fn save_user_group_assignment(
        &self,
        buyer_id: &str,
        assignment: &UserGroupAssignment,
    ) -> ApiResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!(
            "save_user_group_assignment:{buyer_id}:{}",
            assignment.user_id
        ));
        s.check_fail(&format!(
            "save_user_group_assignment:{buyer_id}:{}",
            assignment.user_id
        ))
    }

    async fn save_user(&self, buyer_id: &str, user: &User) -> ApiResult<User> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("save_user:{buyer_id}:{}", user.id));
        s.check_fail(&format!("save_user:{buyer_id}:{}", user.id))?;
        s.users.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    async fn save_address(&self, buyer_id: &str, address: &Address) -> ApiResult<Address> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("save_address:{buyer_id}:{}", address.id));
        s.check_fail(&format!("save_address:{buyer_id}:{}", address.id))?;
        Ok(address.clone())
    }

    async fn save_address_assignment(
        &self,
        buyer_id: &str,
        assignment: &AddressAssignment,
    ) -> ApiResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!(
            "save_address_assignment:{buyer_id}:{}",
            assignment.address_id
        ));
        s.check_fail(&format!(
            "save_address_assignment:{buyer_id}:{}",
            assignment.address_id
        ))
    }

    async fn get_admin_address(&self, address_id: &str) -> ApiResult<Address> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("get_admin_address:{address_id}"));
        s.admin_addresses
            .get(address_id)
            .cloned()
            .ok_or_else(|| not_found("Address"))
    }

    async fn save_admin_address(&self, address: &Address) -> ApiResult<Address> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("save_admin_address:{}", address.id));
        s.check_fail(&format!("save_admin_address:{}", address.id))?;
        s.admin_addresses.insert(address.id.clone(), address.clone());
        Ok(address.clone())
    }

    async fn get_catalog(&self, catalog_id: &str) -> ApiResult<Catalog> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("get_catalog:{catalog_id}"));
        s.catalogs
            .get(catalog_id)
            .cloned()
            .ok_or_else(|| not_found("Catalog"))
    }

    async fn save_catalog(&self, catalog: &Catalog) -> ApiResult<Catalog> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("save_catalog:{}", catalog.id));
        s.check_fail(&format!("save_catalog:{}", catalog.id))?;
        s.catalogs.insert(catalog.id.clone(), catalog.clone());
        Ok(catalog.clone())
    }

    async fn save_catalog_assignment(&self, assignment: &CatalogAssignment) -> ApiResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls
            .push(format!("save_catalog_assignment:{}", assignment.catalog_id));
        s.check_fail(&format!("save_catalog_assignment:{}", assignment.catalog_id))
    }

    async fn save_product_catalog_assignment(
        &self,
        assignment: &ProductCatalogAssignment,
    ) -> ApiResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!(
            "save_product_catalog_assignment:{}:{}",
            assignment.catalog_id, assignment.product_id
        ));
        s.check_fail(&format!(
            "save_product_catalog_assignment:{}:{}",
            assignment.catalog_id, assignment.product_id
        ))
    }

    async fn get_category(&self, catalog_id: &str, category_id: &str) -> ApiResult<Category> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("get_category:{catalog_id}:{category_id}"));
        s.categories
            .get(&(catalog_id.to_string(), category_id.to_string()))
            .cloned()
            .ok_or_else(|| not_found("Category"))
    }

    async fn save_category(&self, catalog_id: &str, category: &Category) -> ApiResult<Category> {
        let mut s = self.state.lock().unwrap();
        s.calls
            .push(format!("save_category:{catalog_id}:{}", category.id));
        s.check_fail(&format!("save_category:{catalog_id}:{}", category.id))?;
        s.categories.insert(
            (catalog_id.to_string(), category.id.clone()),
            category.clone(),
        );
        Ok(category.clone())
    }

    async fn patch_category(
        &self,
        catalog_id: &str,
        category_id: &str,
        partial: &PartialCategory,
    ) -> ApiResult<Category> {
        let mut s = self.state.lock().unwrap();
        s.calls
            .push(format!("patch_category:{catalog_id}:{category_id}"));
        s.check_fail(&format!("patch_category:{catalog_id}:{category_id}"))?;
        let key = (catalog_id.to_string(), category_id.to_string());
        let mut category = s
            .categories
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found("Category"))?;
        if let Some(parent_id) = &partial.parent_id {
            category.parent_id = Some(parent_id.clone());
        }
        s.categories.insert(key, category.clone());
        Ok(category)
    }

    async fn save_category_product_assignment(
        &self,
        catalog_id: &str,
        assignment: &CategoryProductAssignment,
    ) -> ApiResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!(
            "save_category_product_assignment:{catalog_id}:{}:{}",
            assignment.category_id, assignment.product_id
        ));
        s.check_fail(&format!(
            "save_category_product_assignment:{catalog_id}:{}:{}",
            assignment.category_id, assignment.product_id
        ))
    }

    async fn get_product(&self, product_id: &str) -> ApiResult<Product> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("get_product:{product_id}"));
        s.check_fail(&format!("get_product:{product_id}"))?;
        s.products
            .get(product_id)
            .cloned()
            .ok_or_else(|| not_found("Product"))
    }

    async fn save_product(&self, product: &Product) -> ApiResult<Product> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("save_product:{}", product.id));
        s.check_fail(&format!("save_product:{}", product.id))?;
        s.products.insert(product.id.clone(), product.clone());
        Ok(product.clone())
    }

    async fn save_product_assignment(&self, assignment: &ProductAssignment) -> ApiResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!(
            "save_product_assignment:{}:{}",
            assignment.product_id, assignment.buyer_id
        ));
        s.check_fail(&format!(
            "save_product_assignment:{}:{}",
            assignment.product_id, assignment.buyer_id
        ))
    }

    async fn save_spec(&self, spec: &Spec) -> ApiResult<Spec> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("save_spec:{}", spec.id));
        s.check_fail(&format!("save_spec:{}", spec.id))?;
        s.specs.insert(spec.id.clone(), spec.clone());
        Ok(spec.clone())
    }

    async fn save_spec_option(&self, spec_id: &str, option: &SpecOption) -> ApiResult<SpecOption> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("save_spec_option:{spec_id}:{}", option.id));
        s.check_fail(&format!("save_spec_option:{spec_id}:{}", option.id))?;
        s.spec_options
            .entry(spec_id.to_string())
            .or_default()
            .push(option.clone());
        Ok(option.clone())
    }

    async fn save_spec_product_assignment(
        &self,
        assignment: &SpecProductAssignment,
    ) -> ApiResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!(
            "save_spec_product_assignment:{}:{}",
            assignment.spec_id, assignment.product_id
        ));
        s.check_fail(&format!(
            "save_spec_product_assignment:{}:{}",
            assignment.spec_id, assignment.product_id
        ))?;
        s.spec_assignments
            .entry(assignment.product_id.clone())
            .or_default()
            .push(assignment.spec_id.clone());
        Ok(())
    }

    async fn save_price_schedule(&self, schedule: &PriceSchedule) -> ApiResult<PriceSchedule> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("save_price_schedule:{}", schedule.id));
        s.check_fail(&format!("save_price_schedule:{}", schedule.id))?;
        s.price_schedules.insert(schedule.id.clone(), schedule.clone());
        Ok(schedule.clone())
    }

    /// Generates the cartesian product of the product's assigned specs, the
    /// way the real API does.
    async fn generate_variants(&self, product_id: &str) -> ApiResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("generate_variants:{product_id}"));
        s.check_fail(&format!("generate_variants:{product_id}"))?;

        let spec_ids = s.spec_assignments.get(product_id).cloned().unwrap_or_default();
        let mut combos: Vec<Vec<VariantSpec>> = vec![vec![]];
        for spec_id in &spec_ids {
            let name = s.specs.get(spec_id).map(|sp| sp.name.clone()).unwrap_or_default();
            let options = s.spec_options.get(spec_id).cloned().unwrap_or_default();
            let mut next = Vec::new();
            for combo in &combos {
                for option in &options {
                    let mut combo = combo.clone();
                    combo.push(VariantSpec {
                        spec_id: spec_id.clone(),
                        name: name.clone(),
                        value: option.value.clone(),
                    });
                    next.push(combo);
                }
            }
            combos = next;
        }

        let variants = combos
            .into_iter()
            .map(|specs| {
                let suffix: Vec<&str> = specs.iter().map(|sp| sp.value.as_str()).collect();
                Variant {
                    id: format!("{product_id}-{}", suffix.join("-")),
                    active: true,
                    specs,
                }
            })
            .collect();
        s.variants.insert(product_id.to_string(), variants);
        Ok(())
    }

    async fn list_variants(&self, product_id: &str, page: u32) -> ApiResult<ListPage<Variant>> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("list_variants:{product_id}:{page}"));
        s.check_fail(&format!("list_variants:{product_id}"))?;
        let items = s.variants.get(product_id).cloned().unwrap_or_default();
        Ok(ListPage {
            meta: ListPageMeta {
                page: 1,
                total_pages: 1,
                total_count: items.len() as u32,
            },
            items,
        })
    }

    async fn patch_variant(
        &self,
        product_id: &str,
        variant_id: &str,
        partial: &PartialVariant,
    ) -> ApiResult<Variant> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("patch_variant:{product_id}:{variant_id}"));
        s.check_fail(&format!("patch_variant:{product_id}:{variant_id}"))?;
        s.variant_patches
            .push((product_id.to_string(), variant_id.to_string(), partial.clone()));
        Ok(Variant {
            id: variant_id.to_string(),
            active: partial.active.unwrap_or(true),
            specs: vec![],
        })
    }

    async fn save_inventory_record(
        &self,
        product_id: &str,
        record: &InventoryRecord,
    ) -> ApiResult<InventoryRecord> {
        let mut s = self.state.lock().unwrap();
        s.calls
            .push(format!("save_inventory_record:{product_id}:{}", record.id));
        s.check_fail(&format!("save_inventory_record:{product_id}:{}", record.id))?;
        s.inventory_records
            .push((product_id.to_string(), None, record.clone()));
        Ok(record.clone())
    }

    async fn save_variant_inventory_record(
        &self,
        product_id: &str,
        variant_id: &str,
        record: &InventoryRecord,
    ) -> ApiResult<InventoryRecord> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!(
            "save_variant_inventory_record:{product_id}:{variant_id}:{}",
            record.id
        ));
        s.check_fail(&format!(
            "save_variant_inventory_record:{product_id}:{variant_id}:{}",
            record.id
        ))?;
        s.inventory_records.push((
            product_id.to_string(),
            Some(variant_id.to_string()),
            record.clone(),
        ));
        Ok(record.clone())
    }
}

fn test_config(import_mode: ImportMode) -> Arc<OcExportConfig> {
    Arc::new(OcExportConfig {
        application: ApplicationConfig::default(),
        ordercloud: OrderCloudConfig {
            api_url: "https://sandboxapi.ordercloud.io".to_string(),
            auth_url: "https://sandboxauth.ordercloud.io".to_string(),
            client_id: "client".to_string(),
            client_secret: secret_string("secret".to_string()),
            timeout_seconds: 30,
            page_size: 20,
        },
        source: SourceConfig {
            snapshot_path: "unused.json".to_string(),
        },
        export: ExportSettings {
            import_mode,
            ..ExportSettings::default()
        },
        buyers: vec![BuyerPolicy {
            storefront: "Storefront".to_string(),
            domain: "Storefront.Com".to_string(),
            currencies: vec!["USD".to_string()],
            default_currency: "USD".to_string(),
        }],
        catalog: CatalogPolicy {
            default_buyer: "Storefront".to_string(),
        },
        products: ProductPolicy {
            multi_inventory: false,
            inventory_set: "Default".to_string(),
            default_currency: "USD".to_string(),
        },
        users: UserPolicy::default(),
        order: LineQuantityPolicy::default(),
        logging: LoggingConfig::default(),
    })
}

fn snapshot(json: &str) -> Arc<SnapshotStore> {
    let document: SnapshotDocument = serde_json::from_str(json).unwrap();
    Arc::new(SnapshotStore::from_document(document))
}

async fn run(
    client: &Arc<FakeOrderCloud>,
    source: &Arc<SnapshotStore>,
    config: &Arc<OcExportConfig>,
) -> ExportResult {
    let orchestrator = Orchestrator::new(
        Arc::clone(client) as Arc<dyn OrderCloudApi>,
        Arc::clone(source) as Arc<dyn ocexport::adapters::source::SourceStore>,
        Arc::clone(config),
    );
    orchestrator.run().await
}

const SIMPLE_SNAPSHOT: &str = r#"{
    "shops": [{"id": "Storefront", "name": "Storefront Shop", "currencies": ["USD"]}],
    "catalogs": [{"id": "cat-1", "name": "Catalog1", "display_name": "Catalog One"}],
    "categories": [{"id": "c-1", "friendly_id": "Catalog1-Shoes", "display_name": "Shoes"}],
    "sellable_items": [{
        "id": "item-1",
        "friendly_id": "Item1",
        "display_name": "Item One",
        "pricing": [{"currency_code": "USD", "amount": 19.99}],
        "inventory": [{"inventory_set_id": "Default", "inventory_information_id": "inv-1"}]
    }],
    "inventory_information": [{"id": "inv-1", "friendly_id": "Default-Item1", "quantity": 5}],
    "category_products": {"Catalog1-Shoes": ["item-1"]},
    "catalog_products": {"Catalog1": ["item-1"]}
}"#;

#[tokio::test]
async fn test_full_run_creates_everything_once() {
    let client = FakeOrderCloud::new();
    let source = snapshot(SIMPLE_SNAPSHOT);
    let config = test_config(ImportMode::Create);

    let result = run(&client, &source, &config).await;

    assert_eq!(result.buyers.created, 1);
    assert_eq!(result.security_profiles.created, 1);
    assert_eq!(result.security_profile_assignments.created, 1);
    assert_eq!(result.buyer_groups.created, 1);
    assert_eq!(result.locales.created, 1);
    assert_eq!(result.locale_assignments.created, 1);
    assert_eq!(result.catalogs.created, 1);
    assert_eq!(result.categories.created, 1);
    assert_eq!(result.products.created, 1);
    assert_eq!(result.price_schedules.created, 1);
    assert_eq!(result.product_assignments.created, 1);
    assert_eq!(result.category_product_assignments.created, 1);
    // One buyer catalog assignment plus one product-to-catalog assignment
    assert_eq!(result.catalog_assignments.created, 2);

    assert!(result.is_successful());
    assert!(result.is_conserved());

    let product = client.product("Item1").unwrap();
    assert_eq!(product.name, "Item One");
    assert_eq!(
        product.default_price_schedule_id.as_deref(),
        Some("Item1_USD")
    );
    let inventory = product.inventory.unwrap();
    assert!(!inventory.variant_level_tracking);
    assert_eq!(inventory.quantity_available, Some(5));

    let schedule = client.price_schedule("Item1_USD").unwrap();
    assert_eq!(schedule.currency, "USD");
    assert_eq!(schedule.price_breaks.len(), 1);
    assert_eq!(schedule.price_breaks[0].price, 19.99);
}

#[tokio::test]
async fn test_second_run_converges_to_not_changed() {
    let client = FakeOrderCloud::new();
    let source = snapshot(SIMPLE_SNAPSHOT);
    let config = test_config(ImportMode::Create);

    let first = run(&client, &source, &config).await;
    assert!(first.is_successful());

    let second = run(&client, &source, &config).await;

    assert_eq!(second.buyers.not_changed, 1);
    assert_eq!(second.buyers.created, 0);
    assert_eq!(second.security_profiles.not_changed, 1);
    assert_eq!(second.catalogs.not_changed, 1);
    assert_eq!(second.categories.not_changed, 1);
    assert_eq!(second.products.not_changed, 1);
    assert_eq!(second.products.created, 0);
    // Existing product in create mode: no schedule or assignment rewrites
    assert_eq!(second.price_schedules.processed, 0);
    assert_eq!(second.product_assignments.processed, 0);

    assert!(second.is_successful());
    assert!(second.is_conserved());
}

#[tokio::test]
async fn test_update_mode_overwrites_existing_product() {
    let client = FakeOrderCloud::new();
    let source = snapshot(SIMPLE_SNAPSHOT);

    let first = run(&client, &source, &test_config(ImportMode::Create)).await;
    assert_eq!(first.products.created, 1);

    let second = run(&client, &source, &test_config(ImportMode::Update)).await;

    assert_eq!(second.products.updated, 1);
    assert_eq!(second.products.created, 0);
    assert_eq!(second.price_schedules.created, 1);
    assert!(second.is_successful());
    assert!(second.is_conserved());
}

const VARIANT_SNAPSHOT: &str = r#"{
    "shops": [{"id": "Storefront", "name": "Storefront Shop", "currencies": ["USD"]}],
    "sellable_items": [{
        "id": "item-2",
        "friendly_id": "Item2",
        "display_name": "Item Two",
        "pricing": [{"currency_code": "USD", "amount": 30.0}],
        "variations": [
            {
                "id": "Item2_57",
                "color": "Red",
                "size": "M",
                "pricing": [{"currency_code": "USD", "amount": 31.0}],
                "inventory": [{"inventory_set_id": "Default", "inventory_information_id": "inv-2"}]
            },
            {
                "id": "Item2_58",
                "color": "Blue",
                "size": "L",
                "pricing": [{"currency_code": "USD", "amount": 32.0}],
                "inventory": [{"inventory_set_id": "Default", "inventory_information_id": "inv-3"}]
            }
        ]
    }],
    "inventory_information": [
        {"id": "inv-2", "friendly_id": "Default-Item2Red", "quantity": 3},
        {"id": "inv-3", "friendly_id": "Default-Item2Blue", "quantity": 4}
    ]
}"#;

#[tokio::test]
async fn test_variant_generation_matching_and_disabling() {
    let client = FakeOrderCloud::new();
    let source = snapshot(VARIANT_SNAPSHOT);
    let config = test_config(ImportMode::Create);

    let result = run(&client, &source, &config).await;

    assert_eq!(result.specs.created, 2);
    assert_eq!(result.spec_options.created, 4);
    assert_eq!(result.spec_product_assignments.created, 2);

    // Generation yields the full Color x Size grid (4 variants); the two
    // with matching source variations are patched, the two spurious
    // combinations are disabled.
    assert_eq!(result.variants.patched, 2);
    assert_eq!(result.variants.updated, 2);
    assert_eq!(result.variants.errored, 0);

    // Matched variants are re-keyed to their source variation IDs, so the
    // xp schedule keys resolve against the variant.
    let matched = client.variant_patch("Item2", "Item2-Red-M").unwrap();
    assert_eq!(matched.id.as_deref(), Some("Item2_57"));
    assert_eq!(matched.active, Some(true));
    assert_eq!(matched.inventory.unwrap().quantity_available, Some(3));
    assert_eq!(
        matched.xp.unwrap().price_schedules,
        vec!["Item2_Item2_57_USD".to_string()]
    );

    let spurious = client.variant_patch("Item2", "Item2-Red-L").unwrap();
    assert_eq!(spurious.id, None);
    assert_eq!(spurious.active, Some(false));

    // Product schedule plus one per priced variation
    assert_eq!(result.price_schedules.created, 3);
    assert!(client.price_schedule("Item2_Item2_58_USD").is_some());

    let product = client.product("Item2").unwrap();
    let inventory = product.inventory.unwrap();
    assert!(inventory.variant_level_tracking);
    assert_eq!(inventory.quantity_available, None);

    assert!(result.is_successful());
    assert!(result.is_conserved());
}

const MULTI_INVENTORY_SNAPSHOT: &str = r#"{
    "shops": [{"id": "Storefront", "name": "Storefront Shop", "currencies": ["USD"]}],
    "sellable_items": [{
        "id": "item-5",
        "friendly_id": "Item5",
        "pricing": [{"currency_code": "USD", "amount": 12.0}],
        "inventory": [
            {"inventory_set_id": "Warehouse1", "inventory_information_id": "inv-10"},
            {"inventory_set_id": "Warehouse2", "inventory_information_id": "inv-11"}
        ]
    }],
    "inventory_sets": [
        {"id": "Warehouse1", "display_name": "Warehouse One"},
        {"id": "Warehouse2", "display_name": "Warehouse Two"}
    ],
    "inventory_information": [
        {"id": "inv-10", "friendly_id": "Warehouse1-Item5", "quantity": 7},
        {"id": "inv-11", "friendly_id": "Warehouse2-Item5", "quantity": 9}
    ]
}"#;

#[tokio::test]
async fn test_multi_inventory_records_per_stock_location() {
    let client = FakeOrderCloud::new();
    let source = snapshot(MULTI_INVENTORY_SNAPSHOT);
    let mut config = (*test_config(ImportMode::Create)).clone();
    config.products.multi_inventory = true;
    let config = Arc::new(config);

    let result = run(&client, &source, &config).await;

    // One admin address per inventory set, one record per association.
    assert_eq!(result.admin_addresses.created, 2);
    assert_eq!(result.inventory_records.created, 2);

    let address = client.admin_address("Warehouse1").unwrap();
    assert_eq!(address.address_name.as_deref(), Some("Warehouse One"));

    let records = client.inventory_records();
    let (product_id, variant_id, record) = records
        .iter()
        .find(|(_, _, r)| r.id == "Warehouse1_Item5")
        .unwrap();
    assert_eq!(product_id, "Item5");
    assert_eq!(*variant_id, None);
    assert_eq!(record.address_id, "Warehouse1");
    assert_eq!(record.quantity_available, 7);

    // The product itself carries no quantity; the records do.
    let product = client.product("Item5").unwrap();
    let inventory = product.inventory.unwrap();
    assert!(inventory.enabled);
    assert_eq!(inventory.quantity_available, None);

    assert!(result.is_successful());
    assert!(result.is_conserved());
}

const CATEGORY_TREE_SNAPSHOT: &str = r#"{
    "shops": [{"id": "Storefront", "name": "Storefront Shop", "currencies": ["USD"]}],
    "catalogs": [{"id": "cat-1", "name": "Catalog1"}],
    "categories": [
        {"id": "c-1", "friendly_id": "Catalog1-Shoes", "display_name": "Shoes"},
        {"id": "c-2", "friendly_id": "Catalog1-Kids", "display_name": "Kids"},
        {"id": "c-3", "friendly_id": "Catalog1-Hidden", "display_name": "Hidden", "published": false}
    ],
    "category_children": {"Catalog1-Shoes": ["Catalog1-Kids", "Catalog1-Hidden"]}
}"#;

#[tokio::test]
async fn test_unpublished_child_category_is_not_reparented() {
    let client = FakeOrderCloud::new();
    let source = snapshot(CATEGORY_TREE_SNAPSHOT);
    let config = test_config(ImportMode::Create);

    let result = run(&client, &source, &config).await;

    assert_eq!(result.categories.created, 2);
    assert_eq!(result.categories.skipped, 1);

    // The published child is re-parented; the unpublished one was never
    // created remotely, so no patch is attempted for it.
    assert_eq!(result.category_assignments.patched, 1);
    assert_eq!(result.category_assignments.skipped, 1);
    assert_eq!(result.category_assignments.errored, 0);
    assert_eq!(client.call_count("patch_category:Catalog1:Hidden"), 0);

    let kids = client.category("Catalog1", "Kids").unwrap();
    assert_eq!(kids.parent_id.as_deref(), Some("Shoes"));

    assert!(result.is_successful());
    assert!(result.is_conserved());
}

const PROBLEM_SNAPSHOT: &str = r#"{
    "shops": [{"id": "Storefront", "name": "Storefront Shop", "currencies": ["USD"]}],
    "catalogs": [{"id": "cat-1", "name": "Catalog1"}],
    "categories": [{"id": "c-1", "friendly_id": "Catalog1-Shoes", "display_name": "Shoes"}],
    "sellable_items": [{
        "id": "item-3",
        "friendly_id": "Item3",
        "pricing": [{"currency_code": "USD", "amount": 10.0}]
    }],
    "category_products": {"Catalog1-Shoes": ["item-3"]},
    "catalog_products": {"Catalog1": ["item-3"]}
}"#;

#[tokio::test]
async fn test_problem_product_assignments_are_skipped() {
    let client = FakeOrderCloud::new();
    client.fail_on("save_product:Item3");
    let source = snapshot(PROBLEM_SNAPSHOT);
    let config = test_config(ImportMode::Create);

    let result = run(&client, &source, &config).await;

    assert_eq!(result.products.errored, 1);
    assert_eq!(result.category_product_assignments.skipped, 1);
    assert_eq!(result.category_product_assignments.created, 0);
    // The buyer catalog assignment still lands; the product assignment is
    // skipped without a remote call.
    assert_eq!(result.catalog_assignments.created, 1);
    assert_eq!(result.catalog_assignments.skipped, 1);

    assert_eq!(client.call_count("save_category_product_assignment"), 0);
    assert_eq!(client.call_count("save_product_catalog_assignment"), 0);

    assert!(!result.is_successful());
    assert!(result.is_conserved());
}

const CUSTOMER_SNAPSHOT: &str = r#"{
    "shops": [{"id": "Storefront", "name": "Storefront Shop", "currencies": ["USD"]}],
    "customers": [
        {
            "id": "cust-1",
            "friendly_id": "Customer1",
            "domain": "Storefront.Com",
            "login_name": "alice",
            "first_name": "Alice",
            "email": "alice@example.com",
            "addresses": [{
                "address_name": "Home",
                "address1": "1 Main St",
                "city": "Springfield",
                "country_code": "US",
                "is_primary": true
            }]
        },
        {
            "id": "cust-2",
            "friendly_id": "Customer2",
            "domain": "Storefront.Com",
            "login_name": "bob",
            "email": "bob@example.com",
            "account_status": "InactiveAccount"
        },
        {
            "id": "cust-3",
            "friendly_id": "Customer3",
            "domain": "Other.Com",
            "login_name": "carol",
            "email": "carol@example.com"
        }
    ]
}"#;

#[tokio::test]
async fn test_customers_reuse_cached_buyer() {
    let client = FakeOrderCloud::new();
    let source = snapshot(CUSTOMER_SNAPSHOT);
    let config = test_config(ImportMode::Create);

    let result = run(&client, &source, &config).await;

    // The buyer is resolved exactly once; customers hit the run cache.
    assert_eq!(client.call_count("get_buyer:"), 1);
    assert_eq!(client.call_count("save_buyer:"), 1);
    assert_eq!(result.buyers.processed, 1);

    assert_eq!(result.buyer_users.created, 2);
    assert_eq!(result.buyer_users.skipped, 1);
    assert_eq!(result.buyer_addresses.created, 1);
    assert_eq!(result.buyer_address_assignments.created, 1);
    assert_eq!(result.buyer_group_assignments.created, 2);

    // Name defaults fill the gaps; inactive accounts export as inactive.
    let alice = client.user("Customer1").unwrap();
    assert_eq!(alice.first_name, "Alice");
    assert_eq!(alice.last_name, "LastName");
    assert!(alice.active);

    let bob = client.user("Customer2").unwrap();
    assert_eq!(bob.first_name, "FirstName");
    assert!(!bob.active);

    assert!(result.is_successful());
    assert!(result.is_conserved());
}

#[tokio::test]
async fn test_unpublished_entities_are_skipped() {
    let client = FakeOrderCloud::new();
    let source = snapshot(
        r#"{
            "shops": [{"id": "Storefront", "name": "Storefront Shop", "currencies": ["USD"]}],
            "categories": [{"id": "c-1", "friendly_id": "Catalog1-Hidden", "published": false}],
            "sellable_items": [{"id": "item-4", "friendly_id": "Item4", "published": false}]
        }"#,
    );
    let config = test_config(ImportMode::Create);

    let result = run(&client, &source, &config).await;

    assert_eq!(result.categories.skipped, 1);
    assert_eq!(result.products.skipped, 1);
    assert_eq!(client.call_count("get_product:"), 0);
    assert_eq!(client.call_count("get_category:"), 0);

    assert!(result.is_successful());
    assert!(result.is_conserved());
}

#[tokio::test]
async fn test_disabled_stages_do_not_run() {
    let client = FakeOrderCloud::new();
    let source = snapshot(SIMPLE_SNAPSHOT);

    let mut config = (*test_config(ImportMode::Create)).clone();
    config.export.process_products = false;
    config.export.process_category_assignments = false;
    config.export.process_catalog_assignments = false;
    let config = Arc::new(config);

    let result = run(&client, &source, &config).await;

    assert_eq!(result.products.processed, 0);
    assert_eq!(result.category_product_assignments.processed, 0);
    assert_eq!(client.call_count("get_product:"), 0);
    assert_eq!(result.catalogs.created, 1);

    assert!(result.is_successful());
    assert!(result.is_conserved());
}

#[tokio::test]
async fn test_failed_buyer_does_not_stop_the_run() {
    let client = FakeOrderCloud::new();
    client.fail_on("save_buyer:Storefront");
    let source = snapshot(SIMPLE_SNAPSHOT);
    let config = test_config(ImportMode::Create);

    let result = run(&client, &source, &config).await;

    assert_eq!(result.buyers.errored, 1);
    // Later stages still ran to completion.
    assert_eq!(result.catalogs.created, 1);
    assert_eq!(result.products.created, 1);

    assert!(!result.is_successful());
    assert!(result.is_conserved());
    assert!(result.run_errors.is_empty());
}
