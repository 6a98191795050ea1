//! Job control and progress tracking
//!
//! A [`JobController`] is handed out before a job starts so other
//! tasks (a ctrl-c handler, a status poller) can observe and stop the
//! crawl. All fields are atomics: polling never touches the database
//! and never blocks the crawl loop.

use crate::registry::LinkCounts;
use crate::state::JobStatus;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::info;

/// Snapshot of a running job, readable at any time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobStatusSnapshot {
    pub status: JobStatus,
    pub current_depth: u32,
    pub max_depth: u32,
    pub total_links: u64,
    pub total_pages: u64,
    pub total_documents: u64,
    pub total_broken: u64,
    pub processed_links: u64,
}

fn status_to_code(status: JobStatus) -> u8 {
    match status {
        JobStatus::Pending => 0,
        JobStatus::Processing => 1,
        JobStatus::Completed => 2,
        JobStatus::Failed => 3,
        JobStatus::Stopped => 4,
    }
}

fn status_from_code(code: u8) -> JobStatus {
    match code {
        0 => JobStatus::Pending,
        1 => JobStatus::Processing,
        2 => JobStatus::Completed,
        3 => JobStatus::Failed,
        _ => JobStatus::Stopped,
    }
}

#[derive(Debug, Default)]
pub(crate) struct JobProgress {
    status: AtomicU8,
    current_depth: AtomicU32,
    max_depth: AtomicU32,
    total_links: AtomicU64,
    total_pages: AtomicU64,
    total_documents: AtomicU64,
    total_broken: AtomicU64,
    processed_links: AtomicU64,
}

impl JobProgress {
    pub(crate) fn set_status(&self, status: JobStatus) {
        self.status.store(status_to_code(status), Ordering::Release);
    }

    pub(crate) fn status(&self) -> JobStatus {
        status_from_code(self.status.load(Ordering::Acquire))
    }

    pub(crate) fn set_depth(&self, depth: u32) {
        self.current_depth.store(depth, Ordering::Release);
    }

    pub(crate) fn set_max_depth(&self, max_depth: u32) {
        self.max_depth.store(max_depth, Ordering::Release);
    }

    pub(crate) fn record_counts(&self, counts: &LinkCounts) {
        self.total_links.store(counts.total, Ordering::Release);
        self.total_pages.store(counts.pages, Ordering::Release);
        self.total_documents
            .store(counts.documents, Ordering::Release);
        self.total_broken.store(counts.broken, Ordering::Release);
        self.processed_links
            .store(counts.processed, Ordering::Release);
    }
}

/// Handle for observing and stopping a crawl job
#[derive(Clone)]
pub struct JobController {
    stop: Arc<AtomicBool>,
    progress: Arc<JobProgress>,
}

impl JobController {
    pub(crate) fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(JobProgress::default()),
        }
    }

    pub(crate) fn progress(&self) -> &JobProgress {
        &self.progress
    }

    /// Asks the running job to stop at the next link boundary.
    ///
    /// Returns true when the request took effect. Requests against a
    /// job that is not processing are ignored.
    pub fn request_stop(&self) -> bool {
        if !self.progress.status().can_stop() {
            info!(status = %self.progress.status(), "stop request ignored");
            return false;
        }
        self.stop.store(true, Ordering::Release);
        info!("stop requested");
        true
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Current job state without touching the database
    pub fn status(&self) -> JobStatusSnapshot {
        JobStatusSnapshot {
            status: self.progress.status(),
            current_depth: self.progress.current_depth.load(Ordering::Acquire),
            max_depth: self.progress.max_depth.load(Ordering::Acquire),
            total_links: self.progress.total_links.load(Ordering::Acquire),
            total_pages: self.progress.total_pages.load(Ordering::Acquire),
            total_documents: self.progress.total_documents.load(Ordering::Acquire),
            total_broken: self.progress.total_broken.load(Ordering::Acquire),
            processed_links: self.progress.processed_links.load(Ordering::Acquire),
        }
    }
}

impl Default for JobController {
    fn default() -> Self {
        Self::new()
    }
}
