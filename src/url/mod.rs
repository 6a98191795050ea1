//! URL handling: normalization, site filters, filename sanitization

mod filters;
mod normalize;

pub use filters::SiteFilterSet;
pub use normalize::normalize_url;

/// Converts a URL into a string safe to use as a filename
///
/// Keeps the host and path, replaces characters that are invalid in
/// filenames with underscores, and caps the length.
pub fn sanitize_url_for_filename(url: &::url::Url) -> String {
    let mut base = url.host_str().unwrap_or("unknown").to_string();

    let path = url.path();
    if !path.is_empty() && path != "/" {
        base.push_str(path.trim_end_matches('/'));
    }

    let sanitized: String = base
        .chars()
        .map(|c| match c {
            '/' | '\\' | '*' | '?' | ':' | '"' | '<' | '>' | '|' | '.' | ' ' => '_',
            _ => c,
        })
        .collect();

    sanitized.chars().take(100).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::url::Url;

    #[test]
    fn test_sanitize_basic() {
        let url = Url::parse("https://example.com/docs/report").unwrap();
        assert_eq!(sanitize_url_for_filename(&url), "example_com_docs_report");
    }

    #[test]
    fn test_sanitize_root() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(sanitize_url_for_filename(&url), "example_com");
    }

    #[test]
    fn test_sanitize_length_cap() {
        let long_path = "a/".repeat(120);
        let url = Url::parse(&format!("https://example.com/{}", long_path)).unwrap();
        assert!(sanitize_url_for_filename(&url).len() <= 100);
    }
}
