//! Product card extraction
//!
//! Each field is recovered by an ordered list of named strategies. A strategy
//! is a pure function of the card; the first one that produces a value wins.
//! The lists are public so every fallback can be inspected and tested on its
//! own.

use crate::crawler::selectors::{
    class_matches, collapsed_text, descendant_elements, find_by_class, raw_text,
    CURRENCY_AMOUNT, IMAGE_ATTRIBUTES, IMG, PRICE_AMOUNT, PRICE_HINT, STOCK_HINT, TITLE_HINT,
    TITLE_TAGS,
};
use crate::product::ProductRecord;
use crate::url::resolve_link;
use scraper::ElementRef;
use url::Url;

/// Locates the element holding the product name
pub type ElementStrategy = for<'a> fn(ElementRef<'a>) -> Option<ElementRef<'a>>;

/// Recovers a raw text value from a card
pub type TextStrategy = fn(ElementRef<'_>) -> Option<String>;

/// Name/URL strategies, in priority order
pub static NAME_STRATEGIES: &[(&str, ElementStrategy)] = &[
    ("titled-element", titled_element),
    ("first-link", first_link),
];

/// Price text strategies, in priority order
pub static PRICE_STRATEGIES: &[(&str, TextStrategy)] = &[
    ("price-class", price_class_text),
    ("currency-text", currency_text),
];

/// Stock text strategies, in priority order
pub static STOCK_STRATEGIES: &[(&str, TextStrategy)] = &[("stock-class", stock_class_text)];

/// Turns product cards into [`ProductRecord`]s
#[derive(Debug, Clone)]
pub struct Extractor {
    base_url: Url,
    stock_placeholder: String,
}

impl Extractor {
    /// Creates an extractor resolving links against `base_url`
    pub fn new(base_url: Url, stock_placeholder: impl Into<String>) -> Self {
        Self {
            base_url,
            stock_placeholder: stock_placeholder.into(),
        }
    }

    /// Extracts one record from a card
    ///
    /// Returns None when no name can be recovered. The category is left empty
    /// for the crawler to fill in.
    pub fn extract(&self, card: ElementRef<'_>) -> Option<ProductRecord> {
        let (strategy, name_element) = NAME_STRATEGIES
            .iter()
            .find_map(|(label, strategy)| strategy(card).map(|element| (*label, element)))?;
        let name = collapsed_text(&name_element);
        tracing::trace!("Name '{}' found by {}", name, strategy);

        let url = link_of(name_element).and_then(|href| resolve_link(href, &self.base_url));

        let price = PRICE_STRATEGIES
            .iter()
            .filter_map(|(_, strategy)| strategy(card))
            .find_map(|text| normalize_price(&text));

        let image = image_source(card).and_then(|src| resolve_link(src, &self.base_url));

        let in_stock = STOCK_STRATEGIES
            .iter()
            .find_map(|(_, strategy)| strategy(card))
            .unwrap_or_else(|| self.stock_placeholder.clone());

        Some(ProductRecord {
            name,
            url,
            price,
            image,
            in_stock,
            category: String::new(),
        })
    }
}

/// Whether any name strategy recovers a name from `card`
pub fn names_product(card: ElementRef<'_>) -> bool {
    NAME_STRATEGIES.iter().any(|(_, strategy)| strategy(card).is_some())
}

/// Descendant with a title-like class on a title-capable tag
///
/// Elements without text are passed over, so empty badges and title
/// wrappers fall through to the next candidate.
pub fn titled_element(card: ElementRef<'_>) -> Option<ElementRef<'_>> {
    descendant_elements(card).find(|e| {
        TITLE_TAGS.contains(&e.value().name())
            && class_matches(e, &TITLE_HINT)
            && has_text(e)
    })
}

/// First hyperlink in the card with visible text
///
/// Image-only links, such as the photo link that usually opens a card, are
/// skipped.
pub fn first_link(card: ElementRef<'_>) -> Option<ElementRef<'_>> {
    descendant_elements(card).find(|e| is_link(e) && has_text(e))
}

/// Text of the first element with a price-like class
pub fn price_class_text(card: ElementRef<'_>) -> Option<String> {
    find_by_class(card, &PRICE_HINT)
        .map(|e| raw_text(&e))
        .filter(|text| !text.is_empty())
}

/// First text node in the card carrying a currency amount
pub fn currency_text(card: ElementRef<'_>) -> Option<String> {
    card.text()
        .find(|text| CURRENCY_AMOUNT.is_match(text))
        .map(|text| text.trim().to_string())
}

/// Text of the first element with an availability-like class
pub fn stock_class_text(card: ElementRef<'_>) -> Option<String> {
    find_by_class(card, &STOCK_HINT)
        .map(|e| collapsed_text(&e))
        .filter(|text| !text.is_empty())
}

/// Normalizes the first amount in a price text
///
/// Whitespace separators (including no-break and thin spaces) are removed;
/// the decimal separator is kept as written.
///
/// # Examples
///
/// ```
/// use catalog_harvester::crawler::normalize_price;
///
/// assert_eq!(normalize_price("12 990,50 ₽"), Some("12990,50".to_string()));
/// assert_eq!(normalize_price("Цена по запросу"), None);
/// ```
pub fn normalize_price(text: &str) -> Option<String> {
    let amount = PRICE_AMOUNT.find(text)?;
    Some(
        amount
            .as_str()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect(),
    )
}

/// href of the name element, or of the first link inside it
fn link_of(element: ElementRef<'_>) -> Option<&str> {
    if element.value().name() == "a" {
        if let Some(href) = element.value().attr("href") {
            return Some(href);
        }
    }
    descendant_elements(element)
        .find(is_link)
        .and_then(|a| a.value().attr("href"))
}

fn is_link(element: &ElementRef<'_>) -> bool {
    element.value().name() == "a" && element.value().attr("href").is_some()
}

fn has_text(element: &ElementRef<'_>) -> bool {
    element.text().any(|text| !text.trim().is_empty())
}

/// Source of the first image, skipping inline data and placeholder images
fn image_source(card: ElementRef<'_>) -> Option<&str> {
    let img = card.select(&IMG).next()?;
    IMAGE_ATTRIBUTES
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:") && !src.contains("placeholder"))
}
