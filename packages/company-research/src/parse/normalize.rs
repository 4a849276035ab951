//! URL normalization and same-site checks.
//!
//! The normalized form is the crawl's dedup key: `scheme://host[:port]path`,
//! lower-cased, with query and fragment dropped and the trailing slash
//! trimmed (except for the bare root, which keeps `/`).

use url::Url;

/// Path suffixes that never point at an HTML page.
const ASSET_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".bmp", ".css", ".js",
    ".json", ".xml", ".zip", ".gz", ".rar", ".7z", ".mp4", ".mp3", ".avi", ".mov", ".doc",
    ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".hwp", ".woff", ".woff2", ".ttf", ".eot",
];

/// Canonicalize a URL to its dedup key.
///
/// Unparseable input falls back to the trimmed, lower-cased string so every
/// URL still has a stable key.
pub fn normalize_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return url.trim().to_lowercase();
    };

    let host = parsed.host_str().unwrap_or_default();
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
    let path = parsed.path();
    let path = if path == "/" {
        path
    } else {
        path.trim_end_matches('/')
    };

    format!("{}://{}{}{}", parsed.scheme(), host, port, path).to_lowercase()
}

/// Turn a bare domain into a seed URL, prefixing `https://` when no scheme
/// is given.
pub fn seed_url(domain: &str) -> String {
    let domain = domain.trim();
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{}", domain.trim_end_matches('/'))
    }
}

/// Host of `url` without a leading `www.`, lower-cased.
pub fn site_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Whether `url` belongs to the site whose bare host is `host`.
pub fn same_site(url: &Url, host: &str) -> bool {
    url.host_str()
        .map(|h| {
            let h = h.to_lowercase();
            h.strip_prefix("www.").unwrap_or(&h) == host
        })
        .unwrap_or(false)
}

/// Like [`same_site`], but also accepts any subdomain of `host`
/// (`ir.example.com` for `example.com`).
pub fn within_site(url: &Url, host: &str) -> bool {
    if same_site(url, host) {
        return true;
    }
    url.host_str()
        .map(|h| h.to_lowercase().ends_with(&format!(".{}", host)))
        .unwrap_or(false)
}

/// Whether the path points at a static asset or document file.
pub fn is_asset_path(path: &str) -> bool {
    let path = path.to_lowercase();
    ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Whether a raw `href` is something other than a navigable page link.
pub fn is_non_page_href(href: &str) -> bool {
    let href = href.trim().to_lowercase();
    href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_trailing_slash_collapse() {
        assert_eq!(
            normalize_url("HTTPS://Example.com/a/b/"),
            normalize_url("https://example.com/a/b")
        );
    }

    #[test]
    fn test_root_keeps_slash() {
        assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
        assert_eq!(normalize_url("https://example.com"), "https://example.com/");
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        assert_eq!(
            normalize_url("https://example.com/about?utm=x#team"),
            "https://example.com/about"
        );
    }

    #[test]
    fn test_non_default_port_kept() {
        assert_eq!(
            normalize_url("http://localhost:8080/a/"),
            "http://localhost:8080/a"
        );
        assert_eq!(normalize_url("https://example.com:443/a"), "https://example.com/a");
    }

    #[test]
    fn test_unparseable_falls_back() {
        assert_eq!(normalize_url("  Not A Url "), "not a url");
    }

    #[test]
    fn test_seed_url() {
        assert_eq!(seed_url("example.com"), "https://example.com");
        assert_eq!(seed_url("http://example.com"), "http://example.com");
    }

    #[test]
    fn test_same_site_ignores_www() {
        let host = site_host("https://www.Example.com/").unwrap();
        assert_eq!(host, "example.com");
        assert!(same_site(&Url::parse("https://example.com/a").unwrap(), &host));
        assert!(same_site(&Url::parse("https://www.example.com/b").unwrap(), &host));
        assert!(!same_site(&Url::parse("https://blog.example.com/").unwrap(), &host));
        assert!(!same_site(&Url::parse("https://other.com/").unwrap(), &host));
    }

    #[test]
    fn test_within_site_accepts_subdomains() {
        let url = |u: &str| Url::parse(u).unwrap();
        assert!(within_site(&url("https://www.example.com/"), "example.com"));
        assert!(within_site(&url("https://ir.example.com/q3"), "example.com"));
        assert!(within_site(&url("https://Investors.Example.com/"), "example.com"));
        assert!(!within_site(&url("https://notexample.com/"), "example.com"));
        assert!(!within_site(&url("https://example.com.evil.io/"), "example.com"));
    }

    #[test]
    fn test_asset_and_href_filters() {
        assert!(is_asset_path("/files/Brochure.PDF"));
        assert!(!is_asset_path("/products"));
        assert!(is_non_page_href("mailto:info@example.com"));
        assert!(is_non_page_href("#top"));
        assert!(!is_non_page_href("/about"));
    }
}
