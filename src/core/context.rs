//! Run context
//!
//! [`RunContext`] carries everything a stage needs: the remote client, the
//! source store, the loaded configuration, the accumulating result, the
//! problem-object set, and run-scoped caches of remote resources that many
//! entities resolve repeatedly (buyers, security profiles, admin
//! addresses). All state is explicit; stages receive `&mut RunContext`
//! rather than reaching into ambient storage.

use crate::adapters::ordercloud::models::{Address, Buyer, SecurityProfile};
use crate::adapters::ordercloud::OrderCloudApi;
use crate::adapters::source::SourceStore;
use crate::config::OcExportConfig;
use crate::core::result::{ExportResult, ProblemObjects};
use std::collections::HashMap;
use std::sync::Arc;

/// Mutable state of one export run.
pub struct RunContext {
    pub client: Arc<dyn OrderCloudApi>,
    pub source: Arc<dyn SourceStore>,
    pub config: Arc<OcExportConfig>,

    pub result: ExportResult,
    pub problem_objects: ProblemObjects,

    buyers: HashMap<String, Buyer>,
    security_profiles: HashMap<String, SecurityProfile>,
    admin_addresses: HashMap<String, Address>,
}

impl RunContext {
    pub fn new(
        client: Arc<dyn OrderCloudApi>,
        source: Arc<dyn SourceStore>,
        config: Arc<OcExportConfig>,
    ) -> Self {
        Self {
            client,
            source,
            config,
            result: ExportResult::new(),
            problem_objects: ProblemObjects::default(),
            buyers: HashMap::new(),
            security_profiles: HashMap::new(),
            admin_addresses: HashMap::new(),
        }
    }

    /// A buyer resolved earlier in this run, if any.
    pub fn cached_buyer(&self, buyer_id: &str) -> Option<&Buyer> {
        self.buyers.get(buyer_id)
    }

    pub fn cache_buyer(&mut self, buyer: Buyer) {
        self.buyers.insert(buyer.id.clone(), buyer);
    }

    /// A security profile resolved earlier in this run, if any.
    pub fn cached_security_profile(&self, profile_id: &str) -> Option<&SecurityProfile> {
        self.security_profiles.get(profile_id)
    }

    pub fn cache_security_profile(&mut self, profile: SecurityProfile) {
        self.security_profiles.insert(profile.id.clone(), profile);
    }

    /// An admin address resolved earlier in this run, if any.
    pub fn cached_admin_address(&self, address_id: &str) -> Option<&Address> {
        self.admin_addresses.get(address_id)
    }

    pub fn cache_admin_address(&mut self, address: Address) {
        self.admin_addresses.insert(address.id.clone(), address);
    }
}
