//! Catalog platform access seam.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::types::{GeneratedMetadata, Policy, PolicySlug, ProductSnapshot};

/// Read/write access to the catalog platform.
///
/// The production implementation wraps the platform's GraphQL API and lives
/// with the rest of the platform integration, outside this core. Everything
/// here is written against this trait so that integration stays swappable.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one product, `None` if it does not exist.
    async fn get_product(&self, shop: &str, product_id: &str) -> Result<Option<ProductSnapshot>>;

    /// All of a shop's policies.
    async fn list_policies(&self, shop: &str) -> Result<Vec<Policy>>;

    /// One policy by slug, `None` if the shop has not published it.
    async fn get_policy(&self, shop: &str, slug: PolicySlug) -> Result<Option<Policy>> {
        let policies = self.list_policies(shop).await?;
        Ok(policies.into_iter().find(|p| p.slug == slug))
    }

    /// Write generated SEO metadata back to a product.
    async fn update_metadata(
        &self,
        shop: &str,
        product_id: &str,
        metadata: &GeneratedMetadata,
    ) -> Result<()>;

    /// Write alt text for one product image.
    async fn set_image_alt_text(
        &self,
        shop: &str,
        product_id: &str,
        image_id: &str,
        alt_text: &str,
    ) -> Result<()>;
}

/// In-memory catalog used by tests and demos.
pub struct InMemoryCatalog {
    products: RwLock<HashMap<(String, String), ProductSnapshot>>,
    policies: RwLock<HashMap<String, Vec<Policy>>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
            policies: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a product.
    pub async fn insert_product(&self, shop: &str, product: ProductSnapshot) {
        let mut products = self.products.write().await;
        products.insert((shop.to_string(), product.id.clone()), product);
    }

    /// Insert or replace a policy.
    pub async fn insert_policy(&self, shop: &str, policy: Policy) {
        let mut policies = self.policies.write().await;
        let shop_policies = policies.entry(shop.to_string()).or_default();
        shop_policies.retain(|p| p.slug != policy.slug);
        shop_policies.push(policy);
    }

    /// Remove a product.
    pub async fn remove_product(&self, shop: &str, product_id: &str) {
        let mut products = self.products.write().await;
        products.remove(&(shop.to_string(), product_id.to_string()));
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn get_product(&self, shop: &str, product_id: &str) -> Result<Option<ProductSnapshot>> {
        let products = self.products.read().await;
        Ok(products
            .get(&(shop.to_string(), product_id.to_string()))
            .cloned())
    }

    async fn list_policies(&self, shop: &str) -> Result<Vec<Policy>> {
        let policies = self.policies.read().await;
        Ok(policies.get(shop).cloned().unwrap_or_default())
    }

    async fn update_metadata(
        &self,
        shop: &str,
        product_id: &str,
        metadata: &GeneratedMetadata,
    ) -> Result<()> {
        let mut products = self.products.write().await;
        if let Some(product) = products.get_mut(&(shop.to_string(), product_id.to_string())) {
            product.metadata = metadata.clone();
            debug!("Updated metadata for {shop}/{product_id}");
        }
        Ok(())
    }

    async fn set_image_alt_text(
        &self,
        shop: &str,
        product_id: &str,
        image_id: &str,
        alt_text: &str,
    ) -> Result<()> {
        let mut products = self.products.write().await;
        if let Some(product) = products.get_mut(&(shop.to_string(), product_id.to_string())) {
            if let Some(image) = product.images.iter_mut().find(|i| i.id == image_id) {
                image.alt_text = Some(alt_text.to_string());
                debug!("Set alt text for {shop}/{product_id}/{image_id}");
            }
        }
        Ok(())
    }
}
