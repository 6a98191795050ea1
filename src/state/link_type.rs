/// Link classification for discovered resources
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of resource a link points to
///
/// `Broken` is terminal: a resource confirmed unreachable or unparseable.
/// A broken link is always marked processed and never has children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// A regular web page (HTML)
    Page,

    /// A PDF document
    Pdf,

    /// A Word document (.docx or legacy .doc)
    Docx,

    /// An Excel document (.xlsx or legacy .xls)
    Xlsx,

    /// A confirmed unreachable or unparseable resource
    Broken,
}

impl LinkType {
    /// Returns true for the document variants handled by the parser dispatcher
    pub fn is_document(&self) -> bool {
        matches!(self, Self::Pdf | Self::Docx | Self::Xlsx)
    }

    /// Classifies a URL by its path extension
    ///
    /// Query strings are ignored when inspecting the extension. Anything
    /// without a recognized document extension is a `Page`.
    pub fn from_extension(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();

        if path.ends_with(".pdf") {
            Self::Pdf
        } else if path.ends_with(".docx") || path.ends_with(".doc") {
            Self::Docx
        } else if path.ends_with(".xlsx") || path.ends_with(".xls") {
            Self::Xlsx
        } else {
            Self::Page
        }
    }

    /// Converts the link type to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Broken => "broken",
        }
    }

    /// Parses a link type from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "page" => Some(Self::Page),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "xlsx" => Some(Self::Xlsx),
            "broken" => Some(Self::Broken),
            _ => None,
        }
    }

    /// Returns all possible link types
    pub fn all_types() -> Vec<Self> {
        vec![Self::Page, Self::Pdf, Self::Docx, Self::Xlsx, Self::Broken]
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
