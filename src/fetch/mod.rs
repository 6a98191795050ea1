//! Page and document fetching

mod fetcher;

pub use fetcher::{build_http_client, fetch_url, FetchResult};
