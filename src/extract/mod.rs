//! HTML link extraction

mod extractor;

pub use extractor::{extract_page, LinkCandidate, PageContent};
