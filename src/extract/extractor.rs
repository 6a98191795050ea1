//! Extracts link candidates and the title from fetched HTML
//!
//! The whole served document is parsed, including markup that a
//! browser would hide behind collapsed menus or `display: none`
//! containers, so links revealed by client-side toggles are still
//! found without executing any scripts.

use crate::state::LinkType;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Anchors inside these containers are navigation chrome.
const NAV_SELECTOR: &str = "nav a[href], header a[href], footer a[href], \
     [role='navigation'] a[href], .nav a[href], .navbar a[href], \
     .menu a[href], .sidebar a[href], .breadcrumb a[href]";

/// Anchors inside site-wide announcement strips.
const ANNOUNCEMENT_SELECTOR: &str = ".announcement a[href], .announcements a[href], \
     .alert a[href], .alert-banner a[href], .site-banner a[href]";

/// A link found on a page, ready to hand to the registry
#[derive(Debug, Clone, PartialEq)]
pub struct LinkCandidate {
    /// Absolute URL resolved against the page URL
    pub url: String,

    /// Anchor text, if any was present
    pub text: Option<String>,

    /// Type guessed from the URL extension
    pub type_hint: LinkType,
}

/// Everything pulled out of one HTML page
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// The page title (from the <title> tag)
    pub title: Option<String>,

    /// Link candidates in document order, deduplicated per page
    pub candidates: Vec<LinkCandidate>,
}

/// Parses HTML and extracts the title and link candidates
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags in the page body, hidden or not
/// - Document links (pdf, docx, xlsx) wherever they appear, even in
///   navigation menus
///
/// **Exclude:**
/// - Page links inside navigation chrome (nav, header, footer,
///   menus, sidebars, breadcrumbs)
/// - Anything inside announcement banners
/// - `javascript:`, `mailto:`, `tel:`, `data:` schemes
/// - Fragment-only anchors
pub fn extract_page(html: &str, page_url: &Url) -> PageContent {
    let document = Html::parse_document(html);

    let nav_urls = urls_matching(&document, NAV_SELECTOR, page_url);
    let announcement_urls = urls_matching(&document, ANNOUNCEMENT_SELECTOR, page_url);

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    if let Ok(anchor_selector) = Selector::parse("a[href]") {
        for element in document.select(&anchor_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_link(href, page_url) else {
                continue;
            };

            if announcement_urls.contains(&url) {
                continue;
            }

            let type_hint = LinkType::from_extension(&url);

            // Documents in menus are still worth cataloging
            if !type_hint.is_document() && nav_urls.contains(&url) {
                continue;
            }

            if !seen.insert(url.clone()) {
                continue;
            }

            candidates.push(LinkCandidate {
                url,
                text: anchor_text(&element),
                type_hint,
            });
        }
    }

    PageContent {
        title: extract_title(&document),
        candidates,
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn anchor_text(element: &ElementRef) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !text.is_empty() {
        return Some(text);
    }
    element
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

/// Resolved URLs of every anchor matching the selector
fn urls_matching(document: &Html, selector: &str, page_url: &Url) -> HashSet<String> {
    let mut urls = HashSet::new();
    if let Ok(selector) = Selector::parse(selector) {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, page_url) {
                    urls.insert(url);
                }
            }
        }
    }
    urls
}

/// Resolves an href to an absolute http(s) URL, or None to skip it
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url.to_string()),
        _ => None,
    }
}
