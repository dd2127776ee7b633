use url::Url;

/// Query parameter carrying the page number on category listings
pub const PAGE_PARAM: &str = "p";

/// Resolves an href to an absolute HTTP(S) URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - invalid URLs or non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is dropped.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use catalog_harvester::url::resolve_link;
///
/// let base = Url::parse("https://shop.example.com/").unwrap();
/// let url = resolve_link("/pumps.html#top", &base).unwrap();
/// assert_eq!(url.as_str(), "https://shop.example.com/pumps.html");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    absolute.set_fragment(None);
    Some(absolute)
}

/// Builds the URL of one page of a category listing
///
/// Page 1 is the bare category URL; later pages carry `?p=<N>`, replacing any
/// page number already present.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use catalog_harvester::url::page_url;
///
/// let category = Url::parse("https://shop.example.com/pumps.html").unwrap();
/// assert_eq!(page_url(&category, 1).as_str(), "https://shop.example.com/pumps.html");
/// assert_eq!(page_url(&category, 3).as_str(), "https://shop.example.com/pumps.html?p=3");
/// ```
pub fn page_url(category_url: &Url, page: u32) -> Url {
    if page <= 1 {
        return category_url.clone();
    }

    let retained: Vec<(String, String)> = category_url
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = category_url.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(PAGE_PARAM, &page.to_string());
    }
    url
}
