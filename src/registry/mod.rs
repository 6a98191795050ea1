//! Link registry: the deduplicating store of discovered links
//!
//! This module owns persistence for jobs, links, and site filters:
//! - SQLite database initialization and schema management
//! - Atomic check-and-insert link registration (exactly-once per URL per job)
//! - Frontier queries and per-job counters
//! - The `LinkRegistry` facade the orchestrator talks to

mod facade;
mod schema;
mod sqlite;
mod traits;

pub use facade::LinkRegistry;
pub use schema::initialize_schema;
pub use sqlite::SqliteStore;
pub use traits::{StorageError, StorageResult, Store};

use crate::state::{JobStatus, LinkType};
use uuid::Uuid;

/// A discovered link belonging to a job
#[derive(Debug, Clone)]
pub struct LinkRecord {
    /// Stable opaque identifier, assigned at first discovery, never reused
    pub id: Uuid,
    pub job_id: i64,
    /// Normalized absolute URL; unique within the job
    pub url: String,
    pub link_text: Option<String>,
    pub link_type: LinkType,
    /// Click distance from a start URL; start URLs are depth 0
    pub depth: u32,
    /// Location of a saved artifact (fetched HTML or downloaded document)
    pub file_path: Option<String>,
    pub processed: bool,
    /// First-discovery parent; a link has at most one parent per job
    pub parent_id: Option<Uuid>,
    pub created_at: String,
}

/// A crawl job
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: i64,
    pub name: String,
    pub start_urls: Vec<String>,
    pub max_depth: u32,
    pub output_dir: String,
    pub status: JobStatus,
    pub current_depth: u32,
    pub total_links: u64,
    pub processed_links: u64,
    pub failure_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Aggregated link counts for a job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCounts {
    pub total: u64,
    pub pages: u64,
    pub documents: u64,
    pub broken: u64,
    pub processed: u64,
}
