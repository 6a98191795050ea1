//! Registry facade
//!
//! Wraps the store behind the single entry point crawl code uses to
//! record discoveries. Normalization, site filtering, and dedup all
//! happen here so callers never hand raw hrefs to the database.

use crate::registry::traits::Store;
use crate::registry::{LinkCounts, LinkRecord, SqliteStore};
use crate::state::LinkType;
use crate::url::{normalize_url, SiteFilterSet};
use crate::Result;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// Deduplicating link registry for a crawl job
#[derive(Clone)]
pub struct LinkRegistry {
    store: Arc<Mutex<SqliteStore>>,
    filters: Arc<SiteFilterSet>,
}

impl LinkRegistry {
    pub fn new(store: Arc<Mutex<SqliteStore>>, filters: Arc<SiteFilterSet>) -> Self {
        Self { store, filters }
    }

    /// Records a discovered URL for a job.
    ///
    /// Returns `Ok(None)` when the URL is dropped (unparseable, or
    /// matched by a site filter), otherwise the stored record and
    /// whether this call created it. A duplicate URL returns the
    /// existing record untouched, so the first discovery wins for
    /// depth, link text, and parent.
    ///
    /// Start URLs are registered at depth 0 and bypass site filters.
    pub fn register(
        &self,
        job_id: i64,
        raw_url: &str,
        link_text: Option<&str>,
        type_hint: Option<LinkType>,
        parent_id: Option<Uuid>,
        depth: u32,
    ) -> Result<Option<(LinkRecord, bool)>> {
        let normalized = match normalize_url(raw_url) {
            Ok(url) => url,
            Err(err) => {
                debug!(url = raw_url, %err, "dropping unparseable url");
                return Ok(None);
            }
        };
        let url = normalized.to_string();

        if depth > 0 && self.filters.matches(&url) {
            debug!(url = %url, "dropping filtered url");
            return Ok(None);
        }

        let link_type = type_hint.unwrap_or_else(|| LinkType::from_extension(&url));
        let text = link_text.map(str::trim).filter(|t| !t.is_empty());

        let mut store = self.store.lock().unwrap();
        let (record, is_new) =
            store.insert_or_get_link(job_id, &url, text, link_type, parent_id, depth)?;
        Ok(Some((record, is_new)))
    }

    pub fn mark_processed(&self, link_id: Uuid) -> Result<()> {
        self.store.lock().unwrap().mark_processed(link_id)?;
        Ok(())
    }

    pub fn mark_broken(&self, link_id: Uuid) -> Result<()> {
        self.store.lock().unwrap().mark_broken(link_id)?;
        Ok(())
    }

    pub fn set_file_path(&self, link_id: Uuid, path: &str) -> Result<()> {
        self.store.lock().unwrap().set_link_file_path(link_id, path)?;
        Ok(())
    }

    pub fn set_type(&self, link_id: Uuid, link_type: LinkType) -> Result<()> {
        self.store.lock().unwrap().set_link_type(link_id, link_type)?;
        Ok(())
    }

    pub fn backfill_link_text(&self, link_id: Uuid, text: &str) -> Result<()> {
        self.store.lock().unwrap().backfill_link_text(link_id, text)?;
        Ok(())
    }

    /// Unprocessed links at the given depth, in discovery order
    pub fn frontier(&self, job_id: i64, depth: u32) -> Result<Vec<LinkRecord>> {
        let links = self.store.lock().unwrap().unprocessed_at_depth(job_id, depth)?;
        Ok(links)
    }

    pub fn links_for_job(&self, job_id: i64) -> Result<Vec<LinkRecord>> {
        let links = self.store.lock().unwrap().links_for_job(job_id)?;
        Ok(links)
    }

    pub fn counts(&self, job_id: i64) -> Result<LinkCounts> {
        let counts = self.store.lock().unwrap().counts(job_id)?;
        Ok(counts)
    }
}
