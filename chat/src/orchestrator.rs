//! The per-turn conversation state machine.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shopchat_catalog::{AssistantAction, CatalogClient, PolicySlug};
use shopchat_completions::{
    ChatMessage, CompletionProvider, CompletionReply, CompletionRequest, FunctionCall, FunctionDef,
};
use shopchat_embeddings::{EmbeddingStore, EntityKind, SimilaritySearch};
use shopchat_ledger::{
    CachedAnswer, MetricsLedger, ResponseCache, SettingsStore, ShopSettings, TranscriptMessage,
    TranscriptStore,
};

use crate::error::{ChatError, Result};
use crate::fallback::{self, FallbackChooser, random_chooser};
use crate::functions::{self, FunctionArgs};
use crate::related;
use crate::turn::{ChatRequest, ChatResponse};

/// Reply text when the model produced no usable content.
const DEFAULT_REPLY: &str = "I apologize, but I couldn't process your request.";

/// Reply text when executing a function failed.
const DISPATCH_ERROR_REPLY: &str =
    "I encountered an error while processing your request. Please try again.";

/// What dispatching a function call produced.
enum DispatchOutcome {
    /// The proposed function is not in the offered catalog; never executed.
    Ignored,

    /// Executed, but the referenced entity/policy was absent (or the
    /// arguments did not validate): no action block, conversation continues.
    NoAction,

    /// Executed successfully.
    Action(AssistantAction),

    /// Execution raised an error; converted to an apology, never rethrown.
    Failed,
}

/// The conversation orchestrator.
///
/// One instance is constructed at process start with all collaborators
/// injected, then shared across requests. A turn holds no state outside the
/// stores it is handed; two concurrent turns for the same cache key will
/// both call the provider and both write the cache — accepted.
pub struct ChatOrchestrator {
    settings: Arc<SettingsStore>,
    cache: Arc<ResponseCache>,
    embeddings: Arc<EmbeddingStore>,
    search: SimilaritySearch,
    completions: Arc<dyn CompletionProvider>,
    catalog: Arc<dyn CatalogClient>,
    metrics: Arc<MetricsLedger>,
    transcripts: Arc<TranscriptStore>,
    fallback_chooser: FallbackChooser,
}

impl ChatOrchestrator {
    /// Wire up an orchestrator from its collaborators.
    pub fn new(
        settings: Arc<SettingsStore>,
        cache: Arc<ResponseCache>,
        embeddings: Arc<EmbeddingStore>,
        completions: Arc<dyn CompletionProvider>,
        catalog: Arc<dyn CatalogClient>,
        metrics: Arc<MetricsLedger>,
        transcripts: Arc<TranscriptStore>,
    ) -> Self {
        let search = SimilaritySearch::new(Arc::clone(&embeddings));
        Self {
            settings,
            cache,
            embeddings,
            search,
            completions,
            catalog,
            metrics,
            transcripts,
            fallback_chooser: random_chooser(),
        }
    }

    /// Replace the fallback chooser (deterministic in tests).
    pub fn with_fallback_chooser(mut self, chooser: FallbackChooser) -> Self {
        self.fallback_chooser = chooser;
        self
    }

    /// Run one chat turn.
    pub async fn handle(&self, shop: &str, request: ChatRequest) -> Result<ChatResponse> {
        // RECEIVED: reject malformed input before any external call.
        request.validate()?;

        let settings = self.settings.get_or_create(shop).await;
        if !settings.chat_enabled {
            return Err(ChatError::ChatDisabled);
        }
        if !self.completions.is_available() {
            error!("completion provider not configured (shop {shop})");
            return Err(ChatError::ProviderNotConfigured);
        }

        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| format!("session_{}", Uuid::new_v4()));

        // CACHE_CHECK
        let product_id = request.product_id.as_deref();
        if let Some(hit) = self.cache.get(shop, &request.message, product_id).await {
            debug!("cache hit for shop {shop}");
            return Ok(ChatResponse {
                message: hit.answer,
                actions: hit.actions,
                session_id,
                cached: true,
                diagnostic: None,
            });
        }

        // CONTEXT_BUILD
        let context_messages = self.build_context(shop, &settings, product_id).await;
        let mut messages = context_messages.clone();
        messages.push(ChatMessage::user(&request.message));

        let offered = functions::available_functions(&settings);

        // COMPLETION_CALL
        let completion = CompletionRequest::new(messages)
            .with_functions(offered.clone())
            .with_max_tokens(settings.max_tokens)
            .with_temperature(settings.temperature);

        let reply = match self.completions.complete(completion).await {
            Ok(reply) => reply,
            Err(err) => {
                // RESPOND(fallback): the turn still succeeds; detail goes
                // into the diagnostic field only.
                warn!("completion call failed for shop {shop}: {err}");
                return Ok(ChatResponse {
                    message: fallback::pick(&self.fallback_chooser).to_string(),
                    actions: None,
                    session_id,
                    cached: false,
                    diagnostic: Some(err.to_string()),
                });
            }
        };

        // ACTION_DISPATCH (at most one function call per turn)
        let (answer, actions) = match reply {
            CompletionReply::Text(text) => (text, None),
            CompletionReply::FunctionCall(call) => {
                match self.dispatch(shop, &settings, &call, &offered).await {
                    DispatchOutcome::Action(action) => (action_ack(&action), Some(action)),
                    DispatchOutcome::NoAction | DispatchOutcome::Ignored => {
                        (DEFAULT_REPLY.to_string(), None)
                    }
                    DispatchOutcome::Failed => (DISPATCH_ERROR_REPLY.to_string(), None),
                }
            }
        };

        // CACHE_WRITE
        self.cache
            .set(
                shop,
                &request.message,
                product_id,
                CachedAnswer {
                    answer: answer.clone(),
                    actions: actions.clone(),
                },
                None,
            )
            .await;

        // METRIC_RECORD
        self.metrics
            .record(
                shop,
                "chat_messages",
                1.0,
                Some(serde_json::json!({
                    "hasActions": actions.is_some(),
                    "productId": product_id,
                })),
            )
            .await;

        // TRANSCRIPT_WRITE: only with retention on and a caller-supplied
        // session id.
        if settings.transcript_retention {
            if let Some(ref caller_session) = request.session_id {
                self.write_transcript(
                    shop,
                    caller_session,
                    &context_messages,
                    &request,
                    &answer,
                    actions.as_ref(),
                )
                .await;
            }
        }

        info!("handled chat turn for shop {shop}");

        Ok(ChatResponse {
            message: answer,
            actions,
            session_id,
            cached: false,
            diagnostic: None,
        })
    }

    /// Build the system messages that ground the completion call.
    async fn build_context(
        &self,
        shop: &str,
        settings: &ShopSettings,
        product_id: Option<&str>,
    ) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(system_prompt(settings))];

        // A missing embedding is not an error; the turn just runs
        // ungrounded.
        if let Some(product_id) = product_id {
            if let Some(embedding) = self.embeddings.get(shop, product_id).await {
                let faqs = embedding
                    .faqs
                    .iter()
                    .map(|faq| format!("{}: {}", faq.q, faq.a))
                    .collect::<Vec<_>>()
                    .join("\n");

                messages.push(ChatMessage::system(format!(
                    "Current product: {}\nFeatures: {}\nUse cases: {}\nFAQs:\n{faqs}",
                    embedding.title,
                    embedding.features.join(", "),
                    embedding.use_cases.join(", "),
                )));
            }
        }

        messages
    }

    /// Execute one proposed function call.
    async fn dispatch(
        &self,
        shop: &str,
        settings: &ShopSettings,
        call: &FunctionCall,
        offered: &[FunctionDef],
    ) -> DispatchOutcome {
        if !offered.iter().any(|f| f.name == call.name) {
            warn!("ignoring function {} not in offered catalog", call.name);
            return DispatchOutcome::Ignored;
        }

        let Some(args) = functions::parse_arguments(&call.name, &call.arguments) else {
            debug!(
                "unparseable arguments for {}: {}",
                call.name, call.arguments
            );
            return DispatchOutcome::NoAction;
        };

        match args {
            FunctionArgs::GetProduct(args) => self.get_product(shop, args).await,
            FunctionArgs::GetRelated(args) => {
                self.get_related(shop, &args.product_id).await
            }
            FunctionArgs::GetPolicy(args) => self.get_policy(shop, &args.slug).await,
            FunctionArgs::AddToCart(args) => {
                // Double-checked against settings even though the function
                // is only offered when allowed.
                if !settings.allow_add_to_cart {
                    return DispatchOutcome::Ignored;
                }
                DispatchOutcome::Action(AssistantAction::AddToCart {
                    variant_id: args.variant_id,
                    quantity: args.quantity,
                })
            }
            FunctionArgs::FindSize(args) => {
                let recommendation = recommend_size(args.body_measurements.as_ref());
                DispatchOutcome::Action(AssistantAction::SizeRecommendation {
                    product_id: args.product_id,
                    measurements: args.body_measurements,
                    recommendation,
                })
            }
        }
    }

    async fn get_product(
        &self,
        shop: &str,
        args: functions::GetProductArgs,
    ) -> DispatchOutcome {
        let product_id = match (args.product_id, args.query) {
            (Some(id), _) => Some(id),
            (None, Some(query)) => match self
                .search
                .search_kind(shop, &query, 1, EntityKind::Product)
                .await
            {
                Ok(hits) => hits.into_iter().next().map(|hit| hit.entity.entity_id),
                Err(err) => {
                    warn!("product search failed for shop {shop}: {err}");
                    return DispatchOutcome::Failed;
                }
            },
            (None, None) => None,
        };

        let Some(product_id) = product_id else {
            return DispatchOutcome::NoAction;
        };

        match self.catalog.get_product(shop, &product_id).await {
            Ok(Some(product)) => DispatchOutcome::Action(AssistantAction::ProductInfo { product }),
            Ok(None) => DispatchOutcome::NoAction,
            Err(err) => {
                warn!("product lookup failed for shop {shop}: {err}");
                DispatchOutcome::Failed
            }
        }
    }

    async fn get_related(&self, shop: &str, product_id: &str) -> DispatchOutcome {
        let Some(embedding) = self.embeddings.get(shop, product_id).await else {
            return DispatchOutcome::NoAction;
        };

        let suggestions = related::related_suggestions(
            self.completions.as_ref(),
            &embedding.features,
            &embedding.use_cases,
        )
        .await;

        if suggestions.is_empty() {
            return DispatchOutcome::NoAction;
        }
        DispatchOutcome::Action(AssistantAction::RelatedProducts { suggestions })
    }

    async fn get_policy(&self, shop: &str, slug: &str) -> DispatchOutcome {
        let Ok(slug) = slug.parse::<PolicySlug>() else {
            return DispatchOutcome::NoAction;
        };

        match self.catalog.get_policy(shop, slug).await {
            Ok(Some(policy)) => DispatchOutcome::Action(AssistantAction::PolicyInfo { policy }),
            Ok(None) => DispatchOutcome::NoAction,
            Err(err) => {
                warn!("policy lookup failed for shop {shop}: {err}");
                DispatchOutcome::Failed
            }
        }
    }

    async fn write_transcript(
        &self,
        shop: &str,
        session_id: &str,
        context_messages: &[ChatMessage],
        request: &ChatRequest,
        answer: &str,
        actions: Option<&AssistantAction>,
    ) {
        let mut messages: Vec<TranscriptMessage> = context_messages
            .iter()
            .map(|m| TranscriptMessage::new(role_name(m), &m.content))
            .collect();
        messages.push(TranscriptMessage::new("user", &request.message));
        messages.push(TranscriptMessage::new("assistant", answer));

        let metadata = serde_json::json!({
            "productId": request.product_id,
            "context": request.context,
            "actions": actions,
        });

        self.transcripts
            .append(shop, session_id, messages, Some(metadata))
            .await;
    }
}

fn role_name(message: &ChatMessage) -> &'static str {
    match message.role {
        shopchat_completions::Role::System => "system",
        shopchat_completions::Role::User => "user",
        shopchat_completions::Role::Assistant => "assistant",
    }
}

/// The standing system prompt, shaped by shop settings.
fn system_prompt(settings: &ShopSettings) -> String {
    format!(
        "You are a helpful AI assistant for an e-commerce store.\n\n\
         Guidelines:\n\
         - Be helpful, accurate, and conversational\n\
         - Focus on product information, sizing, materials, compatibility, \
         shipping, and returns\n\
         - Avoid medical, financial, or legal advice\n\
         - Use the brand tone: {}\n\
         - Incorporate brand words: {}\n\
         - Avoid blocked words: {}",
        settings.tone_preset,
        settings.brand_words.join(", "),
        settings.blocklist.join(", "),
    )
}

/// Short acknowledgement text for a dispatched action.
fn action_ack(action: &AssistantAction) -> String {
    match action {
        AssistantAction::ProductInfo { product } => {
            format!("Here's what I found about {}.", product.title)
        }
        AssistantAction::RelatedProducts { .. } => {
            "Here are a few things that pair well with this.".to_string()
        }
        AssistantAction::PolicyInfo { policy } => {
            format!("Here's our {} policy.", policy.title.to_lowercase())
        }
        AssistantAction::AddToCart { .. } => {
            "I've prepared that for your cart — confirm to add it.".to_string()
        }
        AssistantAction::SizeRecommendation { recommendation, .. } => recommendation.clone(),
    }
}

/// Placeholder size heuristic. No accuracy contract; a real implementation
/// would consult the product's size chart.
fn recommend_size(measurements: Option<&std::collections::HashMap<String, f64>>) -> String {
    let chest = measurements.and_then(|m| m.get("chest")).copied();
    match chest {
        Some(c) if c < 90.0 => "Based on your measurements, size S should fit best.".to_string(),
        Some(c) if c < 100.0 => "Based on your measurements, size M should fit best.".to_string(),
        Some(c) if c < 110.0 => "Based on your measurements, size L should fit best.".to_string(),
        Some(_) => "Based on your measurements, size XL should fit best.".to_string(),
        None => "Based on typical fit, we recommend size M. Share your chest measurement \
                 for a closer match."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{FALLBACK_RESPONSES, fixed_chooser};
    use crate::test_support::{ScriptedCompletions, StubEmbeddings};
    use pretty_assertions::assert_eq;
    use shopchat_catalog::{InMemoryCatalog, Policy, ProductSnapshot};

    struct Harness {
        orchestrator: ChatOrchestrator,
        settings: Arc<SettingsStore>,
        cache: Arc<ResponseCache>,
        embeddings: Arc<EmbeddingStore>,
        catalog: Arc<InMemoryCatalog>,
        metrics: Arc<MetricsLedger>,
        transcripts: Arc<TranscriptStore>,
        completions: Arc<ScriptedCompletions>,
    }

    fn harness(completions: ScriptedCompletions) -> Harness {
        let settings = Arc::new(SettingsStore::new());
        let cache = Arc::new(ResponseCache::new());
        let embeddings = Arc::new(EmbeddingStore::new(Arc::new(StubEmbeddings::new(8))));
        let catalog = Arc::new(InMemoryCatalog::new());
        let metrics = Arc::new(MetricsLedger::new());
        let transcripts = Arc::new(TranscriptStore::new());
        let completions = Arc::new(completions);

        let orchestrator = ChatOrchestrator::new(
            Arc::clone(&settings),
            Arc::clone(&cache),
            Arc::clone(&embeddings),
            Arc::clone(&completions) as Arc<dyn CompletionProvider>,
            Arc::clone(&catalog) as Arc<dyn CatalogClient>,
            Arc::clone(&metrics),
            Arc::clone(&transcripts),
        )
        .with_fallback_chooser(fixed_chooser(0));

        Harness {
            orchestrator,
            settings,
            cache,
            embeddings,
            catalog,
            metrics,
            transcripts,
            completions,
        }
    }

    async fn set_settings(h: &Harness, mutate: impl FnOnce(&mut ShopSettings)) {
        let mut settings = h.settings.get_or_create("shop-a").await;
        mutate(&mut settings);
        h.settings.upsert(settings).await;
    }

    #[tokio::test]
    async fn test_validation_runs_before_any_provider_call() {
        let h = harness(ScriptedCompletions::text("hi"));

        let result = h
            .orchestrator
            .handle("shop-a", ChatRequest::new(""))
            .await;

        assert!(matches!(result, Err(ChatError::Validation(_))));
        assert!(h.completions.seen_requests().is_empty());
    }

    #[tokio::test]
    async fn test_plain_text_turn_writes_cache_and_metric() {
        let h = harness(ScriptedCompletions::text("We ship worldwide!"));

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("Do you ship to Japan?"))
            .await
            .unwrap();

        assert_eq!(response.message, "We ship worldwide!");
        assert!(response.actions.is_none());
        assert!(!response.cached);
        assert!(response.diagnostic.is_none());

        let cached = h
            .cache
            .get("shop-a", "do you ship to japan?", None)
            .await
            .unwrap();
        assert_eq!(cached.answer, "We ship worldwide!");
        assert_eq!(h.metrics.today("shop-a", "chat_messages").await, 1.0);
    }

    #[tokio::test]
    async fn test_second_identical_question_is_served_from_cache() {
        let h = harness(ScriptedCompletions::text("We ship worldwide!"));

        h.orchestrator
            .handle("shop-a", ChatRequest::new("Do you ship to Japan?"))
            .await
            .unwrap();
        let second = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("  do you ship to JAPAN?"))
            .await
            .unwrap();

        assert!(second.cached);
        assert_eq!(second.message, "We ship worldwide!");
        // Only the first turn reached the provider.
        assert_eq!(h.completions.seen_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_restrict_to_qa_offers_no_functions_and_yields_no_actions() {
        let h = harness(ScriptedCompletions::text("Our return window is 30 days."));
        set_settings(&h, |s| s.restrict_to_qa = true).await;

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("What is your return policy?"))
            .await
            .unwrap();

        assert!(response.actions.is_none());
        let requests = h.completions.seen_requests();
        assert!(requests[0].functions.is_empty());
    }

    #[tokio::test]
    async fn test_policy_function_call_emits_policy_action() {
        let h = harness(ScriptedCompletions::function_call(
            "get_policy",
            r#"{"slug": "returns"}"#,
        ));
        h.catalog
            .insert_policy(
                "shop-a",
                Policy {
                    slug: PolicySlug::Returns,
                    title: "Returns".to_string(),
                    content: "30 days, free of charge".to_string(),
                },
            )
            .await;

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("What is your return policy?"))
            .await
            .unwrap();

        match response.actions {
            Some(AssistantAction::PolicyInfo { ref policy }) => {
                assert_eq!(policy.slug, PolicySlug::Returns);
            }
            ref other => panic!("expected policy action, got {other:?}"),
        }

        // The catalog offered to the provider contains the policy function.
        let requests = h.completions.seen_requests();
        assert!(requests[0].functions.iter().any(|f| f.name == "get_policy"));
    }

    #[tokio::test]
    async fn test_missing_policy_yields_plain_text() {
        let h = harness(ScriptedCompletions::function_call(
            "get_policy",
            r#"{"slug": "warranty"}"#,
        ));

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("Warranty terms?"))
            .await
            .unwrap();

        assert!(response.actions.is_none());
        assert_eq!(response.message, DEFAULT_REPLY);
    }

    #[tokio::test]
    async fn test_function_not_in_catalog_is_ignored() {
        // add_to_cart proposed while allow_add_to_cart is off (default).
        let h = harness(ScriptedCompletions::function_call(
            "add_to_cart",
            r#"{"variantId": "v1", "quantity": 1}"#,
        ));

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("Add it to my cart"))
            .await
            .unwrap();

        assert!(response.actions.is_none());
    }

    #[tokio::test]
    async fn test_add_to_cart_emits_intent_when_allowed() {
        let h = harness(ScriptedCompletions::function_call(
            "add_to_cart",
            r#"{"variantId": "v1", "quantity": 2}"#,
        ));
        set_settings(&h, |s| s.allow_add_to_cart = true).await;

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("Add two to my cart"))
            .await
            .unwrap();

        match response.actions {
            Some(AssistantAction::AddToCart {
                ref variant_id,
                quantity,
            }) => {
                assert_eq!(variant_id, "v1");
                assert_eq!(quantity, 2);
            }
            ref other => panic!("expected cart intent, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_product_by_id() {
        let h = harness(ScriptedCompletions::function_call(
            "get_product",
            r#"{"productId": "p1"}"#,
        ));
        h.catalog
            .insert_product("shop-a", ProductSnapshot::new("p1", "Trail Shoes"))
            .await;

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("Tell me about p1"))
            .await
            .unwrap();

        match response.actions {
            Some(AssistantAction::ProductInfo { ref product }) => {
                assert_eq!(product.id, "p1");
            }
            ref other => panic!("expected product action, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_product_by_query_goes_through_similarity_search() {
        let h = harness(ScriptedCompletions::function_call(
            "get_product",
            r#"{"query": "Trail Shoes"}"#,
        ));
        h.embeddings
            .upsert_product("shop-a", "p1", "Trail Shoes", None, vec![], vec![], vec![])
            .await
            .unwrap();
        h.catalog
            .insert_product("shop-a", ProductSnapshot::new("p1", "Trail Shoes"))
            .await;

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("Got trail shoes?"))
            .await
            .unwrap();

        match response.actions {
            Some(AssistantAction::ProductInfo { ref product }) => {
                assert_eq!(product.id, "p1");
            }
            ref other => panic!("expected product action, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_related_generates_suggestions() {
        let h = harness(ScriptedCompletions::function_call_then_text(
            "get_related",
            r#"{"productId": "p1"}"#,
            r#"[{"category": "Socks", "reason": "Worn together", "overlap_score": 0.8}]"#,
        ));
        h.embeddings
            .upsert_product(
                "shop-a",
                "p1",
                "Trail Shoes",
                None,
                vec!["breathable".to_string()],
                vec!["running".to_string()],
                vec![],
            )
            .await
            .unwrap();

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("What goes with these?"))
            .await
            .unwrap();

        match response.actions {
            Some(AssistantAction::RelatedProducts { ref suggestions }) => {
                assert_eq!(suggestions.len(), 1);
                assert_eq!(suggestions[0].category, "Socks");
            }
            ref other => panic!("expected related products, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_size_returns_recommendation() {
        let h = harness(ScriptedCompletions::function_call(
            "find_size",
            r#"{"productId": "p1", "bodyMeasurements": {"chest": 95.0}}"#,
        ));

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("What size should I get?"))
            .await
            .unwrap();

        match response.actions {
            Some(AssistantAction::SizeRecommendation {
                ref recommendation, ..
            }) => {
                assert!(recommendation.contains("size M"));
            }
            ref other => panic!("expected size recommendation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_failure_yields_fallback_with_same_shape() {
        let h = harness(ScriptedCompletions::failing());

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("Hello?"))
            .await
            .unwrap();

        assert_eq!(response.message, FALLBACK_RESPONSES[0]);
        assert!(response.actions.is_none());
        assert!(!response.cached);
        // Error detail lives only in the diagnostic field, and is not the
        // raw provider body.
        assert!(response.diagnostic.is_some());

        // Fallback turns are not cached and not counted as handled.
        assert!(h.cache.get("shop-a", "hello?", None).await.is_none());
        assert_eq!(h.metrics.today("shop-a", "chat_messages").await, 0.0);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_a_configuration_error() {
        let h = harness(ScriptedCompletions::unavailable());

        let result = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("Hello?"))
            .await;

        assert!(matches!(result, Err(ChatError::ProviderNotConfigured)));
    }

    #[tokio::test]
    async fn test_chat_disabled_shop_rejects_turns() {
        let h = harness(ScriptedCompletions::text("hi"));
        set_settings(&h, |s| s.chat_enabled = false).await;

        let result = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("Hello?"))
            .await;

        assert!(matches!(result, Err(ChatError::ChatDisabled)));
    }

    #[tokio::test]
    async fn test_transcript_written_only_with_retention_and_session() {
        let h = harness(ScriptedCompletions::text("hi there"));
        set_settings(&h, |s| s.transcript_retention = true).await;

        h.orchestrator
            .handle(
                "shop-a",
                ChatRequest::new("hello").with_session_id("sess-1"),
            )
            .await
            .unwrap();

        let transcript = h.transcripts.get("shop-a", "sess-1").await.unwrap();
        let roles: Vec<&str> = transcript
            .messages
            .iter()
            .map(|m| m.role.as_str())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
    }

    #[tokio::test]
    async fn test_no_transcript_without_caller_session_id() {
        let h = harness(ScriptedCompletions::text("hi there"));
        set_settings(&h, |s| s.transcript_retention = true).await;

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("hello"))
            .await
            .unwrap();

        // A session id was generated for the response...
        assert!(response.session_id.starts_with("session_"));
        // ...but nothing was persisted under it.
        assert!(h
            .transcripts
            .get("shop-a", &response.session_id)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_product_context_grounds_the_completion() {
        let h = harness(ScriptedCompletions::text("It fits great"));
        h.embeddings
            .upsert_product(
                "shop-a",
                "p1",
                "Trail Shoes",
                Some("Grippy and light"),
                vec!["breathable mesh".to_string()],
                vec!["trail running".to_string()],
                vec![],
            )
            .await
            .unwrap();

        h.orchestrator
            .handle(
                "shop-a",
                ChatRequest::new("Will these fit wide feet?").with_product_id("p1"),
            )
            .await
            .unwrap();

        let requests = h.completions.seen_requests();
        let system_texts: Vec<&str> = requests[0]
            .messages
            .iter()
            .filter(|m| matches!(m.role, shopchat_completions::Role::System))
            .map(|m| m.content.as_str())
            .collect();
        assert!(system_texts.iter().any(|t| t.contains("Trail Shoes")));
        assert!(system_texts.iter().any(|t| t.contains("breathable mesh")));
    }

    #[tokio::test]
    async fn test_cached_answer_survives_catalog_update_until_expiry() {
        // Accepted trade-off: no cache invalidation on catalog change.
        let h = harness(ScriptedCompletions::text("It costs $10"));

        h.orchestrator
            .handle("shop-a", ChatRequest::new("How much is it?"))
            .await
            .unwrap();

        // The product changes; the cached answer does not.
        h.catalog
            .insert_product("shop-a", ProductSnapshot::new("p1", "Now $20"))
            .await;

        let response = h
            .orchestrator
            .handle("shop-a", ChatRequest::new("How much is it?"))
            .await
            .unwrap();
        assert!(response.cached);
        assert_eq!(response.message, "It costs $10");
    }
}
