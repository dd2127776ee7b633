use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use catalog_harvester::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if `url` is served by the same host (and explicit port) as `site`
///
/// The scheme is ignored so that `http://` links on an `https://` site are
/// still recognized as belonging to it.
pub fn is_same_site(url: &Url, site: &Url) -> bool {
    match (extract_domain(url), extract_domain(site)) {
        (Some(host), Some(site_host)) => host == site_host && url.port() == site.port(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Url {
        Url::parse("https://shop.example.com/").unwrap()
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_same_site() {
        let url = Url::parse("https://shop.example.com/pumps.html").unwrap();
        assert!(is_same_site(&url, &site()));
    }

    #[test]
    fn test_same_site_ignores_scheme_and_case() {
        let url = Url::parse("http://SHOP.example.com/pumps.html").unwrap();
        assert!(is_same_site(&url, &site()));
    }

    #[test]
    fn test_subdomain_is_other_site() {
        let url = Url::parse("https://blog.shop.example.com/post.html").unwrap();
        assert!(!is_same_site(&url, &site()));
    }

    #[test]
    fn test_port_must_match() {
        let local = Url::parse("http://127.0.0.1:4000/").unwrap();
        let same = Url::parse("http://127.0.0.1:4000/a.html").unwrap();
        let other = Url::parse("http://127.0.0.1:4001/a.html").unwrap();
        assert!(is_same_site(&same, &local));
        assert!(!is_same_site(&other, &local));
    }
}
