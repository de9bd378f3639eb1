//! The webhook-driven content pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use shopchat_catalog::CatalogClient;
use shopchat_completions::CompletionProvider;
use shopchat_embeddings::EmbeddingStore;
use shopchat_ledger::{JobLedger, MetricsLedger};

use crate::error::{PipelineError, Result};
use crate::event::{ProductEvent, ProductEventKind};
use crate::generator::SeoGenerator;

/// Handles product webhook events: generates missing SEO metadata and alt
/// text, writes them back to the catalog, and keeps the embedding store in
/// sync.
///
/// Deliveries for the same (shop, product) are serialized through a
/// per-entity lock, so two concurrent replays cannot both decide generation
/// is needed. Deliveries for different products proceed in parallel.
pub struct ContentPipeline {
    catalog: Arc<dyn CatalogClient>,
    generator: SeoGenerator,
    embeddings: Arc<EmbeddingStore>,
    metrics: Arc<MetricsLedger>,
    jobs: Arc<JobLedger>,
    entity_locks: Mutex<HashMap<(String, String), Arc<Mutex<()>>>>,
}

impl ContentPipeline {
    /// Wire up a pipeline from its collaborators.
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        completions: Arc<dyn CompletionProvider>,
        embeddings: Arc<EmbeddingStore>,
        metrics: Arc<MetricsLedger>,
        jobs: Arc<JobLedger>,
    ) -> Self {
        Self {
            catalog,
            generator: SeoGenerator::new(completions),
            embeddings,
            metrics,
            jobs,
            entity_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Process one webhook delivery. Replaying the same event is safe:
    /// every write is an upsert and already-generated content is skipped.
    pub async fn handle_event(&self, shop: &str, event: &ProductEvent) -> Result<()> {
        let lock = self.entity_lock(shop, &event.product_id).await;
        let _guard = lock.lock().await;

        match event.kind {
            ProductEventKind::Deleted => {
                self.embeddings.delete(shop, &event.product_id).await;
                info!("removed embedding for deleted product {shop}/{}", event.product_id);
                self.record_processed(shop, event, false).await;
                Ok(())
            }
            ProductEventKind::Created | ProductEventKind::Updated => {
                self.refresh_product(shop, event).await
            }
        }
    }

    async fn refresh_product(&self, shop: &str, event: &ProductEvent) -> Result<()> {
        let product = self
            .catalog
            .get_product(shop, &event.product_id)
            .await?
            .ok_or_else(|| PipelineError::ProductNotFound(event.product_id.clone()))?;

        let was_complete = product.metadata.is_complete();
        if was_complete {
            // Metadata already generated; refresh the embedding so the
            // index picks up title/description edits.
            self.embeddings
                .upsert_product(
                    shop,
                    &product.id,
                    &product.title,
                    product.description.as_deref(),
                    product.metadata.features.clone(),
                    product.metadata.use_cases.clone(),
                    product.metadata.faqs.clone(),
                )
                .await?;
        } else {
            self.generate_and_store(shop, &product).await?;
        }

        // Alt text sub-task: images are independent; a failure on one is
        // logged and skipped, never aborting the rest.
        for image in product.images.iter().filter(|i| needs_alt_text(i)) {
            match self
                .generator
                .generate_alt_text(&image.url, &product.title)
                .await
            {
                Some(alt) => {
                    if let Err(err) = self
                        .catalog
                        .set_image_alt_text(shop, &product.id, &image.id, &alt)
                        .await
                    {
                        warn!("failed to write alt text for image {}: {err}", image.id);
                    }
                }
                None => {
                    warn!("skipped alt text for image {} of {}", image.id, product.id);
                }
            }
        }

        self.record_processed(shop, event, was_complete).await;
        Ok(())
    }

    async fn generate_and_store(
        &self,
        shop: &str,
        product: &shopchat_catalog::ProductSnapshot,
    ) -> Result<()> {
        let job = self
            .jobs
            .create(
                shop,
                "seo_generation",
                Some(serde_json::json!({"productId": product.id})),
            )
            .await;
        if let Err(err) = self.jobs.start(&job.id).await {
            warn!("failed to mark job {} running: {err}", job.id);
        }

        match self.generator.generate_product_seo(product).await {
            Some(metadata) => {
                self.catalog
                    .update_metadata(shop, &product.id, &metadata)
                    .await?;
                self.embeddings
                    .upsert_product(
                        shop,
                        &product.id,
                        &product.title,
                        product.description.as_deref(),
                        metadata.features.clone(),
                        metadata.use_cases.clone(),
                        metadata.faqs.clone(),
                    )
                    .await?;
                if let Err(err) = self
                    .jobs
                    .complete(&job.id, Some(serde_json::json!({"generated": true})))
                    .await
                {
                    warn!("failed to mark job {} completed: {err}", job.id);
                }
                info!("generated SEO metadata for {shop}/{}", product.id);
            }
            None => {
                // Nothing is written; the product keeps whatever metadata
                // it already had. The platform will redeliver or the next
                // edit retries.
                if let Err(err) = self
                    .jobs
                    .fail(&job.id, "generation produced no usable output")
                    .await
                {
                    warn!("failed to mark job {} failed: {err}", job.id);
                }
                warn!("SEO generation yielded nothing usable for {shop}/{}", product.id);
            }
        }

        Ok(())
    }

    async fn record_processed(&self, shop: &str, event: &ProductEvent, had_metadata: bool) {
        self.metrics
            .record(
                shop,
                "products_processed",
                1.0,
                Some(serde_json::json!({
                    "action": event.kind,
                    "productId": event.product_id,
                    "hasAiSeo": had_metadata,
                })),
            )
            .await;
    }

    async fn entity_lock(&self, shop: &str, product_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.entity_locks.lock().await;
        Arc::clone(
            locks
                .entry((shop.to_string(), product_id.to_string()))
                .or_default(),
        )
    }
}

fn needs_alt_text(image: &shopchat_catalog::ProductImage) -> bool {
    image.alt_text.as_deref().is_none_or(|alt| alt.trim().is_empty())
}
