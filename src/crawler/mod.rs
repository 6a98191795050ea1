//! Crawl orchestration
//!
//! This module drives a crawl job: breadth-first traversal of the
//! frontier, fetching and parsing each link, and recording everything
//! through the registry. Job control (stop requests, status polling)
//! lives in [`jobs`], the traversal itself in [`orchestrator`].

mod jobs;
mod orchestrator;

pub use jobs::{JobController, JobStatusSnapshot};
pub use orchestrator::Orchestrator;
