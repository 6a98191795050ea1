//! Store trait and error types
//!
//! The `Store` trait is the persistence boundary for jobs, links, and site
//! filters. The crawler only talks to it through `LinkRegistry`; the CLI and
//! export layers query it directly.

use crate::registry::{JobRecord, LinkCounts, LinkRecord};
use crate::state::{JobStatus, LinkType};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Job not found: {0}")]
    JobNotFound(i64),

    #[error("Link not found: {0}")]
    LinkNotFound(Uuid),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
pub trait Store {
    // ===== Job Management =====

    /// Creates a new crawl job in `pending` status
    ///
    /// Returns the ID of the newly created job.
    fn create_job(
        &mut self,
        name: &str,
        start_urls: &[String],
        max_depth: u32,
        output_dir: &str,
    ) -> StorageResult<i64>;

    /// Gets a job by ID
    fn get_job(&self, job_id: i64) -> StorageResult<JobRecord>;

    /// Lists all jobs, most recent first
    fn list_jobs(&self) -> StorageResult<Vec<JobRecord>>;

    /// Updates the status of a job
    fn update_job_status(&mut self, job_id: i64, status: JobStatus) -> StorageResult<()>;

    /// Marks a job as failed with a reason string
    fn set_job_failure(&mut self, job_id: i64, reason: &str) -> StorageResult<()>;

    /// Updates the current depth of a job
    fn update_job_depth(&mut self, job_id: i64, depth: u32) -> StorageResult<()>;

    /// Deletes a job; its links cascade
    fn delete_job(&mut self, job_id: i64) -> StorageResult<()>;

    // ===== Link Management =====

    /// Atomic check-and-insert for a link
    ///
    /// If a link with this (job, url) pair already exists, returns it with
    /// `is_new = false` and mutates nothing. Otherwise creates the link with
    /// a fresh UUID and returns `is_new = true`. The insert and the lookup
    /// run inside one transaction so the exactly-once-per-URL invariant
    /// holds under concurrent callers.
    #[allow(clippy::too_many_arguments)]
    fn insert_or_get_link(
        &mut self,
        job_id: i64,
        url: &str,
        link_text: Option<&str>,
        link_type: LinkType,
        parent_id: Option<Uuid>,
        depth: u32,
    ) -> StorageResult<(LinkRecord, bool)>;

    /// Gets a link by ID
    fn get_link(&self, link_id: Uuid) -> StorageResult<LinkRecord>;

    /// Gets all links for a job, shallowest first
    fn links_for_job(&self, job_id: i64) -> StorageResult<Vec<LinkRecord>>;

    /// Gets all unprocessed links at a given depth (the frontier)
    fn unprocessed_at_depth(&self, job_id: i64, depth: u32) -> StorageResult<Vec<LinkRecord>>;

    /// Marks a link as processed; idempotent
    fn mark_processed(&mut self, link_id: Uuid) -> StorageResult<()>;

    /// Marks a link as broken: terminal type, processed, no artifact
    fn mark_broken(&mut self, link_id: Uuid) -> StorageResult<()>;

    /// Records the path of a saved artifact for a link
    fn set_link_file_path(&mut self, link_id: Uuid, path: &str) -> StorageResult<()>;

    /// Reclassifies a link, used when the served Content-Type disagrees
    /// with the type guessed from the URL
    fn set_link_type(&mut self, link_id: Uuid, link_type: LinkType) -> StorageResult<()>;

    /// Sets the link text only if none was recorded at discovery
    fn backfill_link_text(&mut self, link_id: Uuid, text: &str) -> StorageResult<()>;

    /// Gets the IDs of a link's children, in discovery order
    fn child_ids(&self, link_id: Uuid) -> StorageResult<Vec<Uuid>>;

    /// Aggregated link counts for a job
    fn counts(&self, job_id: i64) -> StorageResult<LinkCounts>;

    // ===== Site Filters =====

    /// Adds a filter fragment; duplicates are ignored
    fn add_filter(&mut self, fragment: &str) -> StorageResult<()>;

    /// Removes a filter fragment; returns true if it was present
    fn remove_filter(&mut self, fragment: &str) -> StorageResult<bool>;

    /// Lists all filter fragments
    fn list_filters(&self) -> StorageResult<Vec<String>>;
}
