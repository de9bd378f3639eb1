//! The settings-gated function catalog.
//!
//! Which functions the model is offered depends only on shop settings,
//! never on the message: `restrict_to_qa` empties the catalog entirely
//! (read-only functions included), and `add_to_cart` additionally needs
//! `allow_add_to_cart`. A function the model proposes that is not in the
//! offered catalog is ignored by the orchestrator.

use std::collections::HashMap;

use serde::Deserialize;

use shopchat_completions::FunctionDef;
use shopchat_ledger::ShopSettings;

/// Function name: product lookup.
pub const GET_PRODUCT: &str = "get_product";

/// Function name: related-product suggestions.
pub const GET_RELATED: &str = "get_related";

/// Function name: policy lookup.
pub const GET_POLICY: &str = "get_policy";

/// Function name: cart intent.
pub const ADD_TO_CART: &str = "add_to_cart";

/// Function name: size recommendation.
pub const FIND_SIZE: &str = "find_size";

/// Build the function catalog offered for this shop's settings.
pub fn available_functions(settings: &ShopSettings) -> Vec<FunctionDef> {
    if settings.restrict_to_qa {
        return Vec::new();
    }

    let mut functions = vec![
        FunctionDef::new(
            GET_PRODUCT,
            "Get product information by ID or search query",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "productId": {"type": "string", "description": "Product ID"},
                    "query": {"type": "string", "description": "Search query"},
                },
            }),
        ),
        FunctionDef::new(
            GET_RELATED,
            "Get related products based on features and use cases",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "productId": {"type": "string", "description": "Product ID"},
                },
                "required": ["productId"],
            }),
        ),
        FunctionDef::new(
            GET_POLICY,
            "Get store policy information (shipping, returns, warranty, privacy)",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "slug": {
                        "type": "string",
                        "description": "Policy slug (shipping, returns, warranty, privacy)",
                    },
                },
                "required": ["slug"],
            }),
        ),
    ];

    if settings.allow_add_to_cart {
        functions.push(FunctionDef::new(
            ADD_TO_CART,
            "Add a product variant to the cart",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "variantId": {"type": "string", "description": "Variant ID"},
                    "quantity": {
                        "type": "number",
                        "description": "Quantity to add",
                        "minimum": 1,
                    },
                },
                "required": ["variantId", "quantity"],
            }),
        ));
    }

    functions.push(FunctionDef::new(
        FIND_SIZE,
        "Find the right size for a product based on measurements",
        serde_json::json!({
            "type": "object",
            "properties": {
                "productId": {"type": "string", "description": "Product ID"},
                "bodyMeasurements": {
                    "type": "object",
                    "description": "Body measurements (chest, waist, hips, etc.)",
                    "additionalProperties": {"type": "number"},
                },
            },
            "required": ["productId"],
        }),
    ));

    functions
}

/// Arguments for `get_product`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductArgs {
    /// Product id, when the model knows it.
    #[serde(default)]
    pub product_id: Option<String>,

    /// Free-text search query, otherwise.
    #[serde(default)]
    pub query: Option<String>,
}

/// Arguments for `get_related`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRelatedArgs {
    /// Product to find companions for.
    pub product_id: String,
}

/// Arguments for `get_policy`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetPolicyArgs {
    /// Policy slug text; parsed into a known slug at dispatch.
    pub slug: String,
}

/// Arguments for `add_to_cart`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartArgs {
    /// Variant to add.
    pub variant_id: String,

    /// Quantity, at least 1.
    pub quantity: u32,
}

/// Arguments for `find_size`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindSizeArgs {
    /// Product the shopper is sizing.
    pub product_id: String,

    /// Optional body measurements in centimeters.
    #[serde(default)]
    pub body_measurements: Option<HashMap<String, f64>>,
}

/// Parsed, validated arguments for one function call.
#[derive(Debug, Clone)]
pub enum FunctionArgs {
    /// `get_product`.
    GetProduct(GetProductArgs),

    /// `get_related`.
    GetRelated(GetRelatedArgs),

    /// `get_policy`.
    GetPolicy(GetPolicyArgs),

    /// `add_to_cart`.
    AddToCart(AddToCartArgs),

    /// `find_size`.
    FindSize(FindSizeArgs),
}

/// Parse a function call's raw arguments JSON.
///
/// The arguments come straight from the completion provider, so they are
/// untrusted: anything that does not deserialize cleanly (or violates a
/// field constraint) is a parse failure, reported as `None` here and turned
/// into an apology upstream — never an exception.
pub fn parse_arguments(name: &str, raw: &str) -> Option<FunctionArgs> {
    match name {
        GET_PRODUCT => serde_json::from_str(raw).ok().map(FunctionArgs::GetProduct),
        GET_RELATED => serde_json::from_str(raw).ok().map(FunctionArgs::GetRelated),
        GET_POLICY => serde_json::from_str(raw).ok().map(FunctionArgs::GetPolicy),
        ADD_TO_CART => {
            let args: AddToCartArgs = serde_json::from_str(raw).ok()?;
            if args.quantity < 1 {
                return None;
            }
            Some(FunctionArgs::AddToCart(args))
        }
        FIND_SIZE => serde_json::from_str(raw).ok().map(FunctionArgs::FindSize),
        _ => None,
    }
}
