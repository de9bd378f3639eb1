//! HTTP route handlers.

use serde::Deserialize;

use crate::error::{ApiError, Result};

pub mod chat;
pub mod feed;
pub mod health;
pub mod settings;
pub mod webhooks;

/// Query parameters identifying the shop.
///
/// Shop identity normally arrives through the platform session; this core
/// takes it as an explicit parameter since auth is an external collaborator.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    /// The shop identifier.
    pub shop: Option<String>,
}

/// Extract the shop or fail with a client error.
pub fn require_shop(query: &ShopQuery) -> Result<&str> {
    query
        .shop
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing shop parameter".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_shop_is_a_client_error() {
        assert!(require_shop(&ShopQuery { shop: None }).is_err());
        assert!(require_shop(&ShopQuery {
            shop: Some("  ".to_string())
        })
        .is_err());
        assert_eq!(
            require_shop(&ShopQuery {
                shop: Some("shop-a".to_string())
            })
            .unwrap(),
            "shop-a"
        );
    }
}
