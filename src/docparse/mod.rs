//! Document parsing
//!
//! Dispatches fetched document bytes to a format-specific parser and
//! harvests any URLs embedded in them, so links buried inside PDFs
//! and Office files join the catalog like links on a page would.

mod office;
mod pdf;

use crate::state::LinkType;
use regex::Regex;
use std::sync::OnceLock;

/// A URL found inside a document
#[derive(Debug, Clone, PartialEq)]
pub struct DocLink {
    pub url: String,
    pub text: Option<String>,
}

/// Outcome of parsing one document
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Extracted plain text, empty when extraction had nothing to give
    pub text: String,

    /// URLs found in annotations, relationship parts, or the text
    pub links: Vec<DocLink>,

    /// True when the bytes could not be read as the declared format
    pub failed: bool,
}

impl ParseResult {
    pub(crate) fn failure() -> Self {
        Self {
            failed: true,
            ..Self::default()
        }
    }
}

/// Parses document bytes according to their declared type
pub fn parse_document(bytes: &[u8], link_type: LinkType) -> ParseResult {
    match link_type {
        LinkType::Pdf => pdf::parse_pdf(bytes),
        LinkType::Docx | LinkType::Xlsx => office::parse_office(bytes),
        LinkType::Page | LinkType::Broken => ParseResult::default(),
    }
}

/// Picks a link type from the URL extension, then the Content-Type
/// header when the URL alone is ambiguous
pub fn infer_type(url: &str, content_type: Option<&str>) -> LinkType {
    let from_url = LinkType::from_extension(url);
    if from_url != LinkType::Page {
        return from_url;
    }

    match content_type.map(|ct| ct.split(';').next().unwrap_or(ct).trim()) {
        Some("application/pdf") => LinkType::Pdf,
        Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        | Some("application/msword") => LinkType::Docx,
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        | Some("application/vnd.ms-excel") => LinkType::Xlsx,
        _ => LinkType::Page,
    }
}

fn url_pattern() -> &'static Regex {
    static URL_PATTERN: OnceLock<Regex> = OnceLock::new();
    URL_PATTERN
        .get_or_init(|| Regex::new(r"https?://[-\w.]+(?:/[-\w./?%&=+~#]*)?").expect("url regex"))
}

/// Harvests http(s) URLs mentioned in extracted text
pub(crate) fn harvest_urls(text: &str, out: &mut Vec<DocLink>) {
    for m in url_pattern().find_iter(text) {
        let url = m.as_str().trim_end_matches(['.', ',', ')', ';']);
        if out.iter().all(|l| l.url != url) {
            out.push(DocLink {
                url: url.to_string(),
                text: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_type_prefers_extension() {
        assert_eq!(
            infer_type("https://example.com/a.pdf", Some("text/html")),
            LinkType::Pdf
        );
    }

    #[test]
    fn test_infer_type_from_content_type() {
        assert_eq!(
            infer_type(
                "https://example.com/download?id=3",
                Some("application/pdf; charset=binary")
            ),
            LinkType::Pdf
        );
        assert_eq!(
            infer_type(
                "https://example.com/report",
                Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
            ),
            LinkType::Xlsx
        );
        assert_eq!(
            infer_type("https://example.com/report", Some("text/html")),
            LinkType::Page
        );
        assert_eq!(infer_type("https://example.com/report", None), LinkType::Page);
    }

    #[test]
    fn test_harvest_urls() {
        let mut links = Vec::new();
        harvest_urls(
            "See https://example.com/a and (https://example.com/b). Plain text.",
            &mut links,
        );
        let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/a", "https://example.com/b"]);
    }

    #[test]
    fn test_harvest_dedupes() {
        let mut links = Vec::new();
        harvest_urls("https://example.com/a https://example.com/a", &mut links);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_parse_garbage_pdf_fails() {
        let result = parse_document(b"not a pdf", LinkType::Pdf);
        assert!(result.failed);
        assert!(result.links.is_empty());
    }

    #[test]
    fn test_parse_garbage_office_fails() {
        let result = parse_document(b"not a zip", LinkType::Docx);
        assert!(result.failed);
    }
}
