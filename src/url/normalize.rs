use crate::UrlError;
use url::Url;

/// Normalizes a URL into its deduplication form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or non-HTTP(S)
/// 2. Lowercase the scheme and host (the `url` crate does this on parse)
/// 3. Remove the trailing slash from the path (except for the root `/`)
/// 4. Remove the fragment
/// 5. Keep the query string unchanged
///
/// Two URLs that normalize to the same string are the same link for
/// deduplication purposes.
///
/// # Examples
///
/// ```
/// use linkmap::url::normalize_url;
///
/// let url = normalize_url("HTTPS://Example.COM/About/#team").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/About");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    // Trailing slash: /about/ and /about are the same resource
    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }

    url.set_fragment(None);

    Ok(url)
}
