//! JSON-LD structured data for the feed export.

use serde_json::{Value, json};

use shopchat_catalog::{GeneratedMetadata, ProductSnapshot};

/// Build the Product (with Offer), FAQPage and BreadcrumbList JSON-LD
/// blocks for one feed entry.
pub fn for_product(shop: &str, product: &ProductSnapshot, metadata: &GeneratedMetadata) -> Value {
    let base_url = format!("https://{shop}");
    let product_url = format!("{base_url}/products/{}", product.handle);

    let main_variant = product.variants.first();
    let main_image = product.images.first();

    let product_jsonld = json!({
        "@context": "https://schema.org",
        "@type": "Product",
        "@id": product_url,
        "name": product.title,
        "description": product.description,
        "image": main_image.map(|i| i.url.clone()),
        "brand": {
            "@type": "Brand",
            "name": product.vendor,
        },
        "category": product.product_type,
        "sku": main_variant.and_then(|v| v.sku.clone()),
        "offers": {
            "@type": "Offer",
            "url": product_url,
            "priceCurrency": main_variant.map(|v| v.currency.clone()),
            "price": main_variant.map(|v| v.price.clone()),
            "availability": if main_variant.is_some_and(|v| v.available_for_sale) {
                "https://schema.org/InStock"
            } else {
                "https://schema.org/OutOfStock"
            },
        },
    });

    let faq_jsonld = json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": metadata
            .faqs
            .iter()
            .map(|faq| json!({
                "@type": "Question",
                "name": faq.q,
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": faq.a,
                },
            }))
            .collect::<Vec<_>>(),
    });

    let breadcrumb_jsonld = json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": [
            {
                "@type": "ListItem",
                "position": 1,
                "name": "Home",
                "item": base_url,
            },
            {
                "@type": "ListItem",
                "position": 2,
                "name": product.product_type.as_deref().unwrap_or("Products"),
                "item": format!("{base_url}/collections/all"),
            },
            {
                "@type": "ListItem",
                "position": 3,
                "name": product.title,
                "item": product_url,
            },
        ],
    });

    json!({
        "product": product_jsonld,
        "faq": faq_jsonld,
        "breadcrumb": breadcrumb_jsonld,
    })
}
