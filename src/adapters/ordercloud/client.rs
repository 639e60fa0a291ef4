//! OrderCloud HTTP client
//!
//! Reqwest-backed implementation of [`OrderCloudApi`]. Authenticates once
//! via the OAuth2 client-credentials grant and attaches the bearer token to
//! every request. HTTP status codes map onto the error taxonomy: 404 is
//! `NotFound` (the expected get-or-create signal), 401/403 are
//! `Authentication`, everything else non-2xx is `Api`.

use crate::config::OrderCloudConfig;
use crate::domain::result::Result;
use crate::domain::{ExportError, OrderCloudError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::api::OrderCloudApi;
use super::models::{
    Address, AddressAssignment, Buyer, Catalog, CatalogAssignment, Category,
    CategoryProductAssignment, InventoryRecord, ListPage, Locale, LocaleAssignment,
    PartialCategory, PartialVariant, PriceSchedule, Product, ProductAssignment,
    ProductCatalogAssignment, SecurityProfile, SecurityProfileAssignment, Spec, SpecOption,
    SpecProductAssignment, User, UserGroup, UserGroupAssignment, Variant,
};

/// OAuth2 token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// HTTP implementation of [`OrderCloudApi`]
pub struct OrderCloudClient {
    api_url: String,
    client: Client,
    access_token: String,
    page_size: u32,
}

impl OrderCloudClient {
    /// Connects to OrderCloud: builds the HTTP client and performs the
    /// client-credentials token exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the token
    /// exchange fails.
    pub async fn connect(config: &OrderCloudConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                ExportError::OrderCloud(OrderCloudError::Configuration(e.to_string()))
            })?;

        let access_token = Self::authenticate(&client, config).await?;

        tracing::info!(api_url = %config.api_url, "Authenticated with OrderCloud");

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client,
            access_token,
            page_size: config.page_size,
        })
    }

    async fn authenticate(client: &Client, config: &OrderCloudConfig) -> Result<String> {
        let token_url = format!("{}/oauth/token", config.auth_url.trim_end_matches('/'));

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose_secret().as_ref()),
            ("scope", "FullAccess"),
        ];

        let response = client
            .post(&token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                ExportError::OrderCloud(OrderCloudError::Network(format!(
                    "Token request failed: {e}"
                )))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::OrderCloud(OrderCloudError::Authentication(
                format!("Token exchange failed with status {status}: {body}"),
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ExportError::OrderCloud(OrderCloudError::Deserialization(e.to_string()))
        })?;

        Ok(token.access_token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.api_url)
    }

    /// Sends a request and decodes the JSON response body.
    async fn request_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        resource: &str,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(method, path, body, resource).await?;
        response.json::<T>().await.map_err(|e| {
            ExportError::OrderCloud(OrderCloudError::Deserialization(format!(
                "{resource}: {e}"
            )))
        })
    }

    /// Sends a request and discards the response body.
    async fn request_empty<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        resource: &str,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, path, body, resource).await.map(|_| ())
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        resource: &str,
    ) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);

        tracing::debug!(method = %method, url = %url, "OrderCloud request");

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            ExportError::OrderCloud(OrderCloudError::Network(e.to_string()))
        })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(ExportError::OrderCloud(OrderCloudError::NotFound(
                resource.to_string(),
            ))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                Err(ExportError::OrderCloud(OrderCloudError::Authentication(
                    format!("{resource}: {body}"),
                )))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ExportError::OrderCloud(OrderCloudError::Api {
                    status: status.as_u16(),
                    message: format!("{resource}: {body}"),
                }))
            }
        }
    }
}

#[async_trait]
impl OrderCloudApi for OrderCloudClient {
    async fn get_buyer(&self, buyer_id: &str) -> Result<Buyer> {
        self.request_json::<Buyer, ()>(
            Method::GET,
            &format!("buyers/{buyer_id}"),
            None,
            &format!("Buyer '{buyer_id}'"),
        )
        .await
    }

    async fn save_buyer(&self, buyer: &Buyer) -> Result<Buyer> {
        self.request_json(
            Method::PUT,
            &format!("buyers/{}", buyer.id),
            Some(buyer),
            &format!("Buyer '{}'", buyer.id),
        )
        .await
    }

    async fn get_security_profile(&self, profile_id: &str) -> Result<SecurityProfile> {
        self.request_json::<SecurityProfile, ()>(
            Method::GET,
            &format!("securityprofiles/{profile_id}"),
            None,
            &format!("SecurityProfile '{profile_id}'"),
        )
        .await
    }

    async fn save_security_profile(&self, profile: &SecurityProfile) -> Result<SecurityProfile> {
        self.request_json(
            Method::PUT,
            &format!("securityprofiles/{}", profile.id),
            Some(profile),
            &format!("SecurityProfile '{}'", profile.id),
        )
        .await
    }

    async fn save_security_profile_assignment(
        &self,
        assignment: &SecurityProfileAssignment,
    ) -> Result<()> {
        self.request_empty(
            Method::POST,
            "securityprofiles/assignments",
            Some(assignment),
            &format!(
                "SecurityProfileAssignment '{}'",
                assignment.security_profile_id
            ),
        )
        .await
    }

    async fn save_locale(&self, locale: &Locale) -> Result<Locale> {
        self.request_json(
            Method::PUT,
            &format!("locales/{}", locale.id),
            Some(locale),
            &format!("Locale '{}'", locale.id),
        )
        .await
    }

    async fn save_locale_assignment(&self, assignment: &LocaleAssignment) -> Result<()> {
        self.request_empty(
            Method::POST,
            "locales/assignments",
            Some(assignment),
            &format!("LocaleAssignment '{}'", assignment.locale_id),
        )
        .await
    }

    async fn save_user_group(&self, buyer_id: &str, group: &UserGroup) -> Result<UserGroup> {
        self.request_json(
            Method::PUT,
            &format!("buyers/{buyer_id}/usergroups/{}", group.id),
            Some(group),
            &format!("UserGroup '{}'", group.id),
        )
        .await
    }

    async fn save_user_group_assignment(
        &self,
        buyer_id: &str,
        assignment: &UserGroupAssignment,
    ) -> Result<()> {
        self.request_empty(
            Method::POST,
            &format!("buyers/{buyer_id}/usergroups/assignments"),
            Some(assignment),
            &format!("UserGroupAssignment '{}'", assignment.user_group_id),
        )
        .await
    }

    async fn save_user(&self, buyer_id: &str, user: &User) -> Result<User> {
        self.request_json(
            Method::PUT,
            &format!("buyers/{buyer_id}/users/{}", user.id),
            Some(user),
            &format!("User '{}'", user.id),
        )
        .await
    }

    async fn save_address(&self, buyer_id: &str, address: &Address) -> Result<Address> {
        self.request_json(
            Method::PUT,
            &format!("buyers/{buyer_id}/addresses/{}", address.id),
            Some(address),
            &format!("Address '{}'", address.id),
        )
        .await
    }

    async fn save_address_assignment(
        &self,
        buyer_id: &str,
        assignment: &AddressAssignment,
    ) -> Result<()> {
        self.request_empty(
            Method::POST,
            &format!("buyers/{buyer_id}/addresses/assignments"),
            Some(assignment),
            &format!("AddressAssignment '{}'", assignment.address_id),
        )
        .await
    }

    async fn get_admin_address(&self, address_id: &str) -> Result<Address> {
        self.request_json::<Address, ()>(
            Method::GET,
            &format!("addresses/{address_id}"),
            None,
            &format!("AdminAddress '{address_id}'"),
        )
        .await
    }

    async fn save_admin_address(&self, address: &Address) -> Result<Address> {
        self.request_json(
            Method::PUT,
            &format!("addresses/{}", address.id),
            Some(address),
            &format!("AdminAddress '{}'", address.id),
        )
        .await
    }

    async fn get_catalog(&self, catalog_id: &str) -> Result<Catalog> {
        self.request_json::<Catalog, ()>(
            Method::GET,
            &format!("catalogs/{catalog_id}"),
            None,
            &format!("Catalog '{catalog_id}'"),
        )
        .await
    }

    async fn save_catalog(&self, catalog: &Catalog) -> Result<Catalog> {
        self.request_json(
            Method::PUT,
            &format!("catalogs/{}", catalog.id),
            Some(catalog),
            &format!("Catalog '{}'", catalog.id),
        )
        .await
    }

    async fn save_catalog_assignment(&self, assignment: &CatalogAssignment) -> Result<()> {
        self.request_empty(
            Method::POST,
            "catalogs/assignments",
            Some(assignment),
            &format!("CatalogAssignment '{}'", assignment.catalog_id),
        )
        .await
    }

    async fn save_product_catalog_assignment(
        &self,
        assignment: &ProductCatalogAssignment,
    ) -> Result<()> {
        self.request_empty(
            Method::POST,
            "catalogs/productassignments",
            Some(assignment),
            &format!(
                "ProductCatalogAssignment '{}/{}'",
                assignment.catalog_id, assignment.product_id
            ),
        )
        .await
    }

    async fn get_category(&self, catalog_id: &str, category_id: &str) -> Result<Category> {
        self.request_json::<Category, ()>(
            Method::GET,
            &format!("catalogs/{catalog_id}/categories/{category_id}"),
            None,
            &format!("Category '{catalog_id}/{category_id}'"),
        )
        .await
    }

    async fn save_category(&self, catalog_id: &str, category: &Category) -> Result<Category> {
        self.request_json(
            Method::PUT,
            &format!("catalogs/{catalog_id}/categories/{}", category.id),
            Some(category),
            &format!("Category '{catalog_id}/{}'", category.id),
        )
        .await
    }

    async fn patch_category(
        &self,
        catalog_id: &str,
        category_id: &str,
        partial: &PartialCategory,
    ) -> Result<Category> {
        self.request_json(
            Method::PATCH,
            &format!("catalogs/{catalog_id}/categories/{category_id}"),
            Some(partial),
            &format!("Category '{catalog_id}/{category_id}'"),
        )
        .await
    }

    async fn save_category_product_assignment(
        &self,
        catalog_id: &str,
        assignment: &CategoryProductAssignment,
    ) -> Result<()> {
        self.request_empty(
            Method::POST,
            &format!("catalogs/{catalog_id}/categories/productassignments"),
            Some(assignment),
            &format!(
                "CategoryProductAssignment '{}/{}'",
                assignment.category_id, assignment.product_id
            ),
        )
        .await
    }

    async fn get_product(&self, product_id: &str) -> Result<Product> {
        self.request_json::<Product, ()>(
            Method::GET,
            &format!("products/{product_id}"),
            None,
            &format!("Product '{product_id}'"),
        )
        .await
    }

    async fn save_product(&self, product: &Product) -> Result<Product> {
        self.request_json(
            Method::PUT,
            &format!("products/{}", product.id),
            Some(product),
            &format!("Product '{}'", product.id),
        )
        .await
    }

    async fn save_product_assignment(&self, assignment: &ProductAssignment) -> Result<()> {
        self.request_empty(
            Method::POST,
            "products/assignments",
            Some(assignment),
            &format!("ProductAssignment '{}'", assignment.product_id),
        )
        .await
    }

    async fn save_spec(&self, spec: &Spec) -> Result<Spec> {
        self.request_json(
            Method::PUT,
            &format!("specs/{}", spec.id),
            Some(spec),
            &format!("Spec '{}'", spec.id),
        )
        .await
    }

    async fn save_spec_option(&self, spec_id: &str, option: &SpecOption) -> Result<SpecOption> {
        self.request_json(
            Method::PUT,
            &format!("specs/{spec_id}/options/{}", option.id),
            Some(option),
            &format!("SpecOption '{spec_id}/{}'", option.id),
        )
        .await
    }

    async fn save_spec_product_assignment(&self, assignment: &SpecProductAssignment) -> Result<()> {
        self.request_empty(
            Method::POST,
            "specs/productassignments",
            Some(assignment),
            &format!(
                "SpecProductAssignment '{}/{}'",
                assignment.spec_id, assignment.product_id
            ),
        )
        .await
    }

    async fn save_price_schedule(&self, schedule: &PriceSchedule) -> Result<PriceSchedule> {
        self.request_json(
            Method::PUT,
            &format!("priceschedules/{}", schedule.id),
            Some(schedule),
            &format!("PriceSchedule '{}'", schedule.id),
        )
        .await
    }

    async fn generate_variants(&self, product_id: &str) -> Result<()> {
        self.request_empty::<()>(
            Method::POST,
            &format!("products/{product_id}/variants/generate?overwriteExisting=true"),
            None,
            &format!("Variants for '{product_id}'"),
        )
        .await
    }

    async fn list_variants(&self, product_id: &str, page: u32) -> Result<ListPage<Variant>> {
        self.request_json::<ListPage<Variant>, ()>(
            Method::GET,
            &format!(
                "products/{product_id}/variants?page={page}&pageSize={}",
                self.page_size
            ),
            None,
            &format!("Variants for '{product_id}'"),
        )
        .await
    }

    async fn patch_variant(
        &self,
        product_id: &str,
        variant_id: &str,
        partial: &PartialVariant,
    ) -> Result<Variant> {
        self.request_json(
            Method::PATCH,
            &format!("products/{product_id}/variants/{variant_id}"),
            Some(partial),
            &format!("Variant '{product_id}/{variant_id}'"),
        )
        .await
    }

    async fn save_inventory_record(
        &self,
        product_id: &str,
        record: &InventoryRecord,
    ) -> Result<InventoryRecord> {
        self.request_json(
            Method::PUT,
            &format!("products/{product_id}/inventoryrecords/{}", record.id),
            Some(record),
            &format!("InventoryRecord '{product_id}/{}'", record.id),
        )
        .await
    }

    async fn save_variant_inventory_record(
        &self,
        product_id: &str,
        variant_id: &str,
        record: &InventoryRecord,
    ) -> Result<InventoryRecord> {
        self.request_json(
            Method::PUT,
            &format!(
                "products/{product_id}/variants/{variant_id}/inventoryrecords/{}",
                record.id
            ),
            Some(record),
            &format!("InventoryRecord '{product_id}/{variant_id}/{}'", record.id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config_for(server: &mockito::ServerGuard) -> OrderCloudConfig {
        OrderCloudConfig {
            api_url: server.url(),
            auth_url: server.url(),
            client_id: "client-id".to_string(),
            client_secret: secret_string("client-secret".to_string()),
            timeout_seconds: 5,
            page_size: 20,
        }
    }

    fn token_mock(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "test-token", "token_type": "bearer"}"#)
            .create()
    }

    #[tokio::test]
    async fn test_connect_exchanges_client_credentials() {
        let mut server = mockito::Server::new_async().await;
        let token = token_mock(&mut server);

        let client = OrderCloudClient::connect(&config_for(&server)).await.unwrap();
        token.assert();
        assert_eq!(client.access_token, "test-token");
    }

    #[tokio::test]
    async fn test_connect_fails_on_rejected_credentials() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(401)
            .with_body("invalid_client")
            .create();

        let result = OrderCloudClient::connect(&config_for(&server)).await;
        assert!(matches!(
            result,
            Err(ExportError::OrderCloud(OrderCloudError::Authentication(_)))
        ));
    }

    #[tokio::test]
    async fn test_get_buyer_maps_404_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        token_mock(&mut server);
        server
            .mock("GET", "/v1/buyers/Missing")
            .with_status(404)
            .create();

        let client = OrderCloudClient::connect(&config_for(&server)).await.unwrap();
        let result = client.get_buyer("Missing").await;

        match result {
            Err(ExportError::OrderCloud(err)) => assert!(err.is_not_found()),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_save_buyer_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        token_mock(&mut server);
        let put = server
            .mock("PUT", "/v1/buyers/Storefront")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ID": "Storefront", "Name": "Storefront", "Active": true}"#)
            .create();

        let client = OrderCloudClient::connect(&config_for(&server)).await.unwrap();
        let buyer = Buyer {
            id: "Storefront".to_string(),
            name: "Storefront".to_string(),
            active: true,
        };
        let saved = client.save_buyer(&buyer).await.unwrap();

        put.assert();
        assert_eq!(saved.id, "Storefront");
    }

    #[tokio::test]
    async fn test_server_error_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        token_mock(&mut server);
        server
            .mock("GET", "/v1/products/Broken")
            .with_status(500)
            .with_body("boom")
            .create();

        let client = OrderCloudClient::connect(&config_for(&server)).await.unwrap();
        let result = client.get_product("Broken").await;

        match result {
            Err(ExportError::OrderCloud(OrderCloudError::Api { status, .. })) => {
                assert_eq!(status, 500);
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }
}
