//! Structural role hints for catalog markup
//!
//! Storefront themes rename their CSS classes freely, so cards and fields are
//! located by matching class names against loose patterns instead of fixed
//! selectors. Update this file when the target site changes its theme.

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

/// Product card containers
pub static CARD_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)product-item|catalog-item|item-card|products-grid__item").unwrap()
});

/// Product title elements
pub static TITLE_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)name|title|header").unwrap());

/// Tags a title element may carry
pub const TITLE_TAGS: &[&str] = &["a", "div", "h2", "h3", "h4", "span"];

/// Price elements
pub static PRICE_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)price|cost|sum").unwrap());

/// Availability elements
pub static STOCK_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)stock|availability").unwrap());

/// "Next page" links
pub static NEXT_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)next|forward").unwrap());

/// Pagination containers
pub static PAGER_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)pagination|pager").unwrap());

/// First amount in a price text: digits, inner whitespace separators, optional decimals
pub static PRICE_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d\s]*(?:[.,]\d+)?").unwrap());

/// An amount followed by a ruble marker
pub static CURRENCY_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\s*(?:руб|₽|р\.)").unwrap());

/// Image attributes in lookup order, lazy-load variants last
pub const IMAGE_ATTRIBUTES: &[&str] = &["src", "data-src", "data-original", "data-lazy", "data-lazy-src"];

pub static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());

pub static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

pub static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Returns true if any class of the element matches the hint
pub fn class_matches(element: &ElementRef<'_>, hint: &Regex) -> bool {
    element.value().classes().any(|class| hint.is_match(class))
}

/// Iterates the strict descendants of an element, in document order
pub fn descendant_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// First strict descendant whose class matches the hint
pub fn find_by_class<'a>(element: ElementRef<'a>, hint: &Regex) -> Option<ElementRef<'a>> {
    descendant_elements(element).find(|e| class_matches(e, hint))
}

/// Visible text with whitespace runs collapsed to single spaces
pub fn collapsed_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Visible text with only the outer whitespace trimmed
pub fn raw_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
