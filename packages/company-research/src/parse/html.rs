//! HTML page parser.
//!
//! Extracts the title, visible text and same-site outbound links of a page.
//! Links can be extracted flat or with the structural section they sit in
//! (nav, main, header, footer, other), inferred by walking up to
//! [`MAX_ANCESTOR_DEPTH`] ancestor elements.
//!
//! `scraper::Html` is not `Send`, so everything here is synchronous and
//! returns owned values; callers parse between await points.

use indexmap::IndexMap;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use super::normalize::{is_asset_path, is_non_page_href, normalize_url, same_site};
use crate::types::page::{LinkCandidate, LinkSection, ScrapedPage};

/// How many ancestors the section heuristic inspects.
pub const MAX_ANCESTOR_DEPTH: usize = 10;

/// Anchor text is cut to this many characters.
const MAX_ANCHOR_CHARS: usize = 100;

/// Elements whose text is never visible.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "svg"];

/// id/class keywords per section, checked in tie-break order.
const SECTION_KEYWORDS: &[(LinkSection, &[&str])] = &[
    (LinkSection::Nav, &["nav", "menu", "gnb", "lnb"]),
    (LinkSection::Main, &["main", "content", "article"]),
    (LinkSection::Header, &["header", "masthead", "topbar"]),
    (LinkSection::Footer, &["footer", "copyright", "bottom"]),
];

/// A parsed page plus the links it offers to the next depth.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub page: ScrapedPage,
    pub links: Vec<LinkCandidate>,
}

/// Parse a fetched page.
///
/// `site` is the bare host links must stay on. With `contextual` set each
/// link carries its structural section, otherwise every link is `other`.
pub fn parse_page(
    html: &str,
    url: &str,
    depth: usize,
    site: &str,
    max_text_chars: usize,
    contextual: bool,
) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_default();
    let text = extract_text(&document, max_text_chars);
    let links = match Url::parse(url) {
        Ok(base) => extract_links(&document, &base, site, contextual),
        Err(_) => Vec::new(),
    };

    ParsedPage {
        page: ScrapedPage::new(url, title, text, depth),
        links,
    }
}

/// Page title from `<title>`, falling back to the first `<h1>`.
pub fn extract_title(document: &Html) -> Option<String> {
    ["title", "h1"].iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        document
            .select(&selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    })
}

/// Visible text of the document, whitespace-collapsed and truncated.
pub fn extract_text(document: &Html, max_chars: usize) -> String {
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);
    truncate_chars(&collapse_whitespace(&raw), max_chars)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if HIDDEN_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// Same-site page links, de-duplicated by normalized URL (first wins).
pub fn extract_links(
    document: &Html,
    base: &Url,
    site: &str,
    contextual: bool,
) -> Vec<LinkCandidate> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links: IndexMap<String, LinkCandidate> = IndexMap::new();

    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if is_non_page_href(href) {
            continue;
        }

        let Ok(mut resolved) = base.join(href.trim()) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https")
            || !same_site(&resolved, site)
            || is_asset_path(resolved.path())
        {
            continue;
        }
        resolved.set_fragment(None);

        let key = normalize_url(resolved.as_str());
        if links.contains_key(&key) {
            continue;
        }

        let section = if contextual {
            classify_section(anchor)
        } else {
            LinkSection::Other
        };
        links.insert(
            key,
            LinkCandidate::new(resolved.to_string(), anchor_text(anchor), section),
        );
    }

    links.into_values().collect()
}

/// Infer the structural section of an element from its ancestors.
///
/// The nearest ancestor with any hint decides. At one ancestor the tag
/// name wins over an ARIA role, which wins over id/class keywords, and
/// keywords are tried in nav, main, header, footer order.
pub fn classify_section(element: ElementRef<'_>) -> LinkSection {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(MAX_ANCESTOR_DEPTH)
        .find_map(section_hint)
        .unwrap_or_default()
}

fn section_hint(element: ElementRef<'_>) -> Option<LinkSection> {
    let el = element.value();

    match el.name() {
        "nav" => return Some(LinkSection::Nav),
        "main" => return Some(LinkSection::Main),
        "header" => return Some(LinkSection::Header),
        "footer" => return Some(LinkSection::Footer),
        _ => {}
    }

    if let Some(role) = el.attr("role") {
        match role.trim().to_lowercase().as_str() {
            "navigation" | "menubar" => return Some(LinkSection::Nav),
            "main" => return Some(LinkSection::Main),
            "banner" => return Some(LinkSection::Header),
            "contentinfo" => return Some(LinkSection::Footer),
            _ => {}
        }
    }

    let hints: Vec<String> = el
        .id()
        .into_iter()
        .chain(el.classes())
        .map(str::to_lowercase)
        .collect();
    if hints.is_empty() {
        return None;
    }

    SECTION_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            hints
                .iter()
                .any(|hint| keywords.iter().any(|kw| hint.contains(kw)))
        })
        .map(|(section, _)| *section)
}

fn anchor_text(anchor: ElementRef<'_>) -> String {
    let text = collapse_whitespace(&anchor.text().collect::<String>());
    let text = if text.is_empty() {
        anchor
            .value()
            .attr("title")
            .or_else(|| anchor.value().attr("aria-label"))
            .map(collapse_whitespace)
            .unwrap_or_default()
    } else {
        text
    };
    truncate_chars(&text, MAX_ANCHOR_CHARS)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head><title> Acme Corp | Home </title><style>.x{}</style></head>
          <body>
            <header><a href="/login">Login</a></header>
            <nav><ul><li><a href="/about">About us</a></li></ul></nav>
            <div id="main-content">
              <p>We build   bridges.</p>
              <a href="/products/">Products</a>
              <a href="https://www.acme.com/cases#top">Cases</a>
              <a href="/products">Products again</a>
              <a href="https://other.com/x">External</a>
              <a href="/brochure.pdf">Brochure</a>
              <a href="mailto:hi@acme.com">Mail</a>
            </div>
            <div role="contentinfo"><a href="/privacy">Privacy</a></div>
            <section><a href="/misc">Misc</a></section>
            <script>var hidden = "do not index";</script>
          </body>
        </html>
    "#;

    fn parsed(contextual: bool) -> ParsedPage {
        parse_page(PAGE, "https://acme.com/", 0, "acme.com", 20_000, contextual)
    }

    fn section_of(page: &ParsedPage, path: &str) -> Option<LinkSection> {
        page.links
            .iter()
            .find(|l| l.url.ends_with(path))
            .map(|l| l.section)
    }

    #[test]
    fn test_title_and_text() {
        let page = parsed(false);
        assert_eq!(page.page.title, "Acme Corp | Home");
        assert!(page.page.text_content.contains("We build bridges."));
        assert!(!page.page.text_content.contains("do not index"));
        assert!(!page.page.text_content.contains(".x{}"));
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let document = Html::parse_document("<html><body><h1>Widget Co</h1></body></html>");
        assert_eq!(extract_title(&document).as_deref(), Some("Widget Co"));
    }

    #[test]
    fn test_links_filtered_and_deduplicated() {
        let page = parsed(false);
        let urls: Vec<&str> = page.links.iter().map(|l| l.url.as_str()).collect();

        assert!(urls.contains(&"https://www.acme.com/cases"));
        assert!(!urls.iter().any(|u| u.contains("other.com")));
        assert!(!urls.iter().any(|u| u.ends_with(".pdf")));
        assert!(!urls.iter().any(|u| u.starts_with("mailto")));
        assert_eq!(urls.iter().filter(|u| u.contains("/products")).count(), 1);
        assert!(page.links.iter().all(|l| l.section == LinkSection::Other));
    }

    #[test]
    fn test_contextual_sections() {
        let page = parsed(true);
        assert_eq!(section_of(&page, "/login"), Some(LinkSection::Header));
        assert_eq!(section_of(&page, "/about"), Some(LinkSection::Nav));
        assert_eq!(section_of(&page, "/products/"), Some(LinkSection::Main));
        assert_eq!(section_of(&page, "/privacy"), Some(LinkSection::Footer));
        assert_eq!(section_of(&page, "/misc"), Some(LinkSection::Other));
    }

    #[test]
    fn test_same_ancestor_tie_break() {
        let html = r#"<div class="footer-nav"><a href="/x">X</a></div>"#;
        let page = parse_page(html, "https://acme.com/", 0, "acme.com", 100, true);
        assert_eq!(page.links[0].section, LinkSection::Nav);
    }

    #[test]
    fn test_text_truncated() {
        let page = parse_page("<p>abcdefghij</p>", "https://acme.com/", 1, "acme.com", 4, false);
        assert_eq!(page.page.text_content, "abcd");
        assert_eq!(page.page.depth, 1);
    }

    #[test]
    fn test_anchor_text_fallback() {
        let html = r#"<a href="/team" aria-label="Our team"><img src="t.png"></a>"#;
        let page = parse_page(html, "https://acme.com/", 0, "acme.com", 100, false);
        assert_eq!(page.links[0].anchor_text, "Our team");
    }
}
