//! Product records emitted by the harvest
//!
//! A [`ProductRecord`] is the only value that crosses the output boundary.
//! Its serialized field set is fixed: `name`, `url`, `price`, `image`,
//! `in_stock`, `category`.

use serde::{Deserialize, Serialize};
use url::Url;

/// Placeholder stored in `in_stock` when a card carries no availability hint
///
/// Consumers must read it as "unknown", not "out of stock".
pub const STOCK_UNSPECIFIED: &str = "Уточняйте";

/// One product listing recovered from a category page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product title; never empty
    pub name: String,

    /// Product detail page
    pub url: Option<Url>,

    /// Price digits with whitespace separators stripped, decimal separator kept
    pub price: Option<String>,

    /// Product image
    pub image: Option<Url>,

    /// Availability text, or the stock placeholder
    pub in_stock: String,

    /// Label of the category the card was found in
    pub category: String,
}

impl ProductRecord {
    /// Tags the record with the category it was crawled from
    pub fn in_category(mut self, label: &str) -> Self {
        self.category = label.to_string();
        self
    }

    /// Stable identity used to tell repeated cards from new ones
    ///
    /// The product URL when known, the name otherwise.
    pub fn key(&self) -> String {
        match &self.url {
            Some(url) => url.to_string(),
            None => format!("name:{}", self.name),
        }
    }

    /// Returns true if the stock field holds the given placeholder
    pub fn stock_is_unspecified(&self, placeholder: &str) -> bool {
        self.in_stock == placeholder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: Option<&str>) -> ProductRecord {
        ProductRecord {
            name: "Насос Aquaviva".to_string(),
            url: url.map(|u| Url::parse(u).unwrap()),
            price: Some("12990".to_string()),
            image: None,
            in_stock: STOCK_UNSPECIFIED.to_string(),
            category: String::new(),
        }
    }

    #[test]
    fn test_key_prefers_url() {
        let product = record(Some("https://shop.example.com/pump.html"));
        assert_eq!(product.key(), "https://shop.example.com/pump.html");
    }

    #[test]
    fn test_key_falls_back_to_name() {
        let product = record(None);
        assert_eq!(product.key(), "name:Насос Aquaviva");
    }

    #[test]
    fn test_in_category() {
        let product = record(None).in_category("Насосы");
        assert_eq!(product.category, "Насосы");
    }

    #[test]
    fn test_serialized_field_set() {
        let product = record(Some("https://shop.example.com/pump.html")).in_category("Насосы");
        let value = serde_json::to_value(&product).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["category", "image", "in_stock", "name", "price", "url"]
        );
        assert_eq!(object["url"], "https://shop.example.com/pump.html");
    }
}
