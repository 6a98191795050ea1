//! Breadth-first crawl orchestrator
//!
//! Processes one job at a time: every unprocessed link at the current
//! depth is fetched, parsed, and marked, with newly discovered links
//! registered one depth deeper. Links registered at `max_depth` stay
//! in the catalog but are never fetched, so the depth bound limits
//! fetching, not recording.

use crate::docparse::{self, parse_document};
use crate::extract::extract_page;
use crate::fetch::{fetch_url, FetchResult};
use crate::registry::{JobRecord, LinkRecord, LinkRegistry, SqliteStore, Store};
use crate::state::{JobStatus, LinkType};
use crate::url::{normalize_url, sanitize_url_for_filename, SiteFilterSet};
use crate::{export, LinkmapError, Result};
use crate::crawler::JobController;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use url::Url;

/// Drives one crawl job from pending to a terminal state
pub struct Orchestrator {
    store: Arc<Mutex<SqliteStore>>,
    registry: LinkRegistry,
    client: Client,
    controller: JobController,
}

impl Orchestrator {
    pub fn new(store: Arc<Mutex<SqliteStore>>, filters: Arc<SiteFilterSet>, client: Client) -> Self {
        let registry = LinkRegistry::new(Arc::clone(&store), filters);
        Self {
            store,
            registry,
            client,
            controller: JobController::new(),
        }
    }

    /// Handle for stop requests and status polling
    pub fn controller(&self) -> JobController {
        self.controller.clone()
    }

    /// Runs the job to completion, stop, or failure.
    ///
    /// A job that is not pending is left untouched; starting it twice
    /// is a no-op, not an error. Any storage or I/O failure mid-crawl
    /// marks the job failed before the error is returned.
    pub async fn run(&self, job_id: i64) -> Result<JobRecord> {
        let job = self.store.lock().unwrap().get_job(job_id)?;
        if !job.status.can_start() {
            warn!(job_id, status = %job.status, "job is not pending, refusing to start");
            return Ok(job);
        }

        self.store
            .lock()
            .unwrap()
            .update_job_status(job_id, JobStatus::Processing)?;
        self.controller.progress().set_status(JobStatus::Processing);
        self.controller.progress().set_max_depth(job.max_depth);
        info!(job_id, name = %job.name, max_depth = job.max_depth, "job started");

        let artifact_dir = PathBuf::from(&job.output_dir).join(format!("job_{}", job.id));

        match self.crawl(&job, &artifact_dir).await {
            Ok(final_status) => {
                self.store
                    .lock()
                    .unwrap()
                    .update_job_status(job_id, final_status)?;
                self.controller.progress().set_status(final_status);
                self.export_catalog(job_id, &artifact_dir)?;
                let job = self.store.lock().unwrap().get_job(job_id)?;
                info!(job_id, status = %final_status, total_links = job.total_links, "job finished");
                Ok(job)
            }
            Err(err) => {
                warn!(job_id, %err, "job failed");
                self.store
                    .lock()
                    .unwrap()
                    .set_job_failure(job_id, &err.to_string())?;
                self.controller.progress().set_status(JobStatus::Failed);
                Err(err)
            }
        }
    }

    async fn crawl(&self, job: &JobRecord, artifact_dir: &Path) -> Result<JobStatus> {
        std::fs::create_dir_all(artifact_dir)?;

        // Start URLs enter at depth 0 and bypass the site filters
        let mut seeded = 0;
        for start_url in &job.start_urls {
            if self
                .registry
                .register(job.id, start_url, None, None, None, 0)?
                .is_some()
            {
                seeded += 1;
            }
        }
        if seeded == 0 {
            return Err(LinkmapError::JobSetup(
                "no valid start URLs".to_string(),
            ));
        }
        self.sync_progress(job.id)?;

        let mut stopped = false;
        for depth in 0..job.max_depth {
            if self.controller.stop_requested() {
                stopped = true;
                break;
            }

            let frontier = self.registry.frontier(job.id, depth)?;
            if frontier.is_empty() {
                // Deeper links only appear while processing this depth,
                // so an empty frontier means the crawl is exhausted.
                break;
            }

            self.store.lock().unwrap().update_job_depth(job.id, depth)?;
            self.controller.progress().set_depth(depth);
            info!(job_id = job.id, depth, links = frontier.len(), "processing depth");

            for link in frontier {
                if self.controller.stop_requested() {
                    stopped = true;
                    break;
                }
                self.process_link(&link, artifact_dir).await?;
                self.sync_progress(job.id)?;
            }
            if stopped {
                break;
            }
        }

        Ok(if stopped {
            JobStatus::Stopped
        } else {
            JobStatus::Completed
        })
    }

    async fn process_link(&self, link: &LinkRecord, artifact_dir: &Path) -> Result<()> {
        debug!(url = %link.url, depth = link.depth, "fetching");

        let result = fetch_url(&self.client, &link.url).await;
        let FetchResult::Success {
            final_url,
            content_type,
            body,
            ..
        } = result
        else {
            warn!(url = %link.url, ?result, "marking broken");
            self.registry.mark_broken(link.id)?;
            return Ok(());
        };

        // A link recorded as a page may turn out to serve a document
        let effective_type = if link.link_type == LinkType::Page {
            docparse::infer_type(&final_url, Some(&content_type))
        } else {
            link.link_type
        };

        if effective_type.is_document() {
            if effective_type != link.link_type {
                debug!(url = %link.url, kind = %effective_type, "reclassified by content type");
                self.registry.set_type(link.id, effective_type)?;
            }
            self.process_document(link, effective_type, &body, artifact_dir)?;
        } else {
            self.process_page(link, &final_url, &body, artifact_dir)?;
        }

        self.record_redirect_alias(link, &final_url)
    }

    /// Records a redirect destination under the link that reached it.
    ///
    /// The destination enters the catalog already processed, sharing
    /// the artifact of the fetch that followed the redirect, so a
    /// later direct discovery of the final URL dedups instead of
    /// refetching.
    fn record_redirect_alias(&self, link: &LinkRecord, final_url: &str) -> Result<()> {
        let Ok(normalized) = normalize_url(final_url) else {
            return Ok(());
        };
        let normalized = normalized.to_string();
        if normalized == link.url {
            return Ok(());
        }

        let fetched = self.store.lock().unwrap().get_link(link.id)?;
        if fetched.link_type == LinkType::Broken {
            return Ok(());
        }

        let Some((alias, is_new)) = self.registry.register(
            link.job_id,
            &normalized,
            fetched.link_text.as_deref(),
            Some(fetched.link_type),
            Some(link.id),
            link.depth,
        )?
        else {
            return Ok(());
        };

        if is_new {
            if let Some(path) = &fetched.file_path {
                self.registry.set_file_path(alias.id, path)?;
            }
            self.registry.mark_processed(alias.id)?;
            debug!(from = %link.url, to = %normalized, "recorded redirect destination");
        }
        Ok(())
    }

    fn process_page(
        &self,
        link: &LinkRecord,
        final_url: &str,
        body: &[u8],
        artifact_dir: &Path,
    ) -> Result<()> {
        let page_url = Url::parse(final_url)?;

        let path = artifact_dir.join(artifact_file_name(&page_url, link, "html"));
        std::fs::write(&path, body)?;
        self.registry
            .set_file_path(link.id, &path.to_string_lossy())?;

        let html = String::from_utf8_lossy(body);
        let content = extract_page(&html, &page_url);

        if let Some(title) = &content.title {
            self.registry.backfill_link_text(link.id, title)?;
        }

        for candidate in content.candidates {
            self.registry.register(
                link.job_id,
                &candidate.url,
                candidate.text.as_deref(),
                Some(candidate.type_hint),
                Some(link.id),
                link.depth + 1,
            )?;
        }

        self.registry.mark_processed(link.id)
    }

    fn process_document(
        &self,
        link: &LinkRecord,
        link_type: LinkType,
        body: &[u8],
        artifact_dir: &Path,
    ) -> Result<()> {
        let parsed = parse_document(body, link_type);
        if parsed.failed {
            warn!(url = %link.url, kind = %link_type, "unparseable document, marking broken");
            self.registry.mark_broken(link.id)?;
            return Ok(());
        }

        let doc_url = Url::parse(&link.url)?;
        let extension = match link_type {
            LinkType::Pdf => "pdf",
            LinkType::Docx => "docx",
            LinkType::Xlsx => "xlsx",
            LinkType::Page | LinkType::Broken => "bin",
        };
        let path = artifact_dir.join(artifact_file_name(&doc_url, link, extension));
        std::fs::write(&path, body)?;
        self.registry
            .set_file_path(link.id, &path.to_string_lossy())?;

        for doc_link in parsed.links {
            self.registry.register(
                link.job_id,
                &doc_link.url,
                doc_link.text.as_deref(),
                None,
                Some(link.id),
                link.depth + 1,
            )?;
        }

        self.registry.mark_processed(link.id)
    }

    fn sync_progress(&self, job_id: i64) -> Result<()> {
        let counts = self.registry.counts(job_id)?;
        self.controller.progress().record_counts(&counts);
        Ok(())
    }

    fn export_catalog(&self, job_id: i64, artifact_dir: &Path) -> Result<()> {
        let job = self.store.lock().unwrap().get_job(job_id)?;
        let links = self.registry.links_for_job(job_id)?;
        let catalog = export::build_export(&job, &links);

        export::write_json(&catalog, &artifact_dir.join("export.json"))?;
        let counts = self.registry.counts(job_id)?;
        export::write_report(&catalog, &counts, &artifact_dir.join("report.md"))?;
        Ok(())
    }
}

/// Artifact filename for one link.
///
/// The sanitized stem is lossy (queries are dropped, punctuation is
/// collapsed), so the link id is appended to keep distinct URLs from
/// sharing a file.
fn artifact_file_name(url: &Url, link: &LinkRecord, extension: &str) -> String {
    let tag = link.id.simple().to_string();
    format!(
        "{}_{}.{}",
        sanitize_url_for_filename(url),
        &tag[..8],
        extension
    )
}
