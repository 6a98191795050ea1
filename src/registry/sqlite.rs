//! SQLite store implementation

use crate::registry::schema::initialize_schema;
use crate::registry::traits::{StorageError, StorageResult, Store};
use crate::registry::{JobRecord, LinkCounts, LinkRecord};
use crate::state::{JobStatus, LinkType};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use uuid::Uuid;

const LINK_COLUMNS: &str =
    "id, job_id, url, link_text, type, depth, file_path, processed, parent_id, created_at";

const JOB_COLUMNS: &str = "id, name, start_urls, max_depth, output_dir, status, current_depth, \
     total_links, processed_links, failure_reason, created_at, updated_at";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a database at the given path
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (used by tests)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_link(row: &Row) -> rusqlite::Result<LinkRecord> {
    let id: String = row.get(0)?;
    let parent_id: Option<String> = row.get(8)?;
    let type_str: String = row.get(4)?;

    Ok(LinkRecord {
        id: parse_uuid(&id)?,
        job_id: row.get(1)?,
        url: row.get(2)?,
        link_text: row.get(3)?,
        link_type: LinkType::from_db_string(&type_str).unwrap_or(LinkType::Broken),
        depth: row.get(5)?,
        file_path: row.get(6)?,
        processed: row.get(7)?,
        parent_id: parent_id.as_deref().map(parse_uuid).transpose()?,
        created_at: row.get(9)?,
    })
}

fn row_to_job(row: &Row) -> rusqlite::Result<JobRecord> {
    let start_urls: String = row.get(2)?;
    let status_str: String = row.get(5)?;

    Ok(JobRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        start_urls: start_urls
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        max_depth: row.get(3)?,
        output_dir: row.get(4)?,
        status: JobStatus::from_db_string(&status_str).unwrap_or(JobStatus::Failed),
        current_depth: row.get(6)?,
        total_links: row.get::<_, i64>(7)? as u64,
        processed_links: row.get::<_, i64>(8)? as u64,
        failure_reason: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

impl Store for SqliteStore {
    // ===== Job Management =====

    fn create_job(
        &mut self,
        name: &str,
        start_urls: &[String],
        max_depth: u32,
        output_dir: &str,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO jobs (name, start_urls, max_depth, output_dir, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                name,
                start_urls.join("\n"),
                max_depth,
                output_dir,
                JobStatus::Pending.to_db_string(),
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_job(&self, job_id: i64) -> StorageResult<JobRecord> {
        let sql = format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS);
        self.conn
            .query_row(&sql, params![job_id], row_to_job)
            .optional()?
            .ok_or(StorageError::JobNotFound(job_id))
    }

    fn list_jobs(&self) -> StorageResult<Vec<JobRecord>> {
        let sql = format!("SELECT {} FROM jobs ORDER BY id DESC", JOB_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let jobs = stmt
            .query_map([], row_to_job)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }

    fn update_job_status(&mut self, job_id: i64, status: JobStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE jobs SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, job_id],
        )?;
        Ok(())
    }

    fn set_job_failure(&mut self, job_id: i64, reason: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE jobs SET status = ?1, failure_reason = ?2, updated_at = ?3 WHERE id = ?4",
            params![JobStatus::Failed.to_db_string(), reason, now, job_id],
        )?;
        Ok(())
    }

    fn update_job_depth(&mut self, job_id: i64, depth: u32) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE jobs SET current_depth = ?1, updated_at = ?2 WHERE id = ?3",
            params![depth, now, job_id],
        )?;
        Ok(())
    }

    fn delete_job(&mut self, job_id: i64) -> StorageResult<()> {
        // Links cascade via the foreign key
        self.conn
            .execute("DELETE FROM jobs WHERE id = ?1", params![job_id])?;
        Ok(())
    }

    // ===== Link Management =====

    fn insert_or_get_link(
        &mut self,
        job_id: i64,
        url: &str,
        link_text: Option<&str>,
        link_type: LinkType,
        parent_id: Option<Uuid>,
        depth: u32,
    ) -> StorageResult<(LinkRecord, bool)> {
        let tx = self.conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4();

        let inserted = tx.execute(
            "INSERT INTO links (id, job_id, url, link_text, type, depth, parent_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(job_id, url) DO NOTHING",
            params![
                id.to_string(),
                job_id,
                url,
                link_text,
                link_type.to_db_string(),
                depth,
                parent_id.map(|p| p.to_string()),
                now
            ],
        )?;

        if inserted == 1 {
            tx.execute(
                "UPDATE jobs SET total_links = total_links + 1, updated_at = ?1 WHERE id = ?2",
                params![now, job_id],
            )?;
        }

        let sql = format!(
            "SELECT {} FROM links WHERE job_id = ?1 AND url = ?2",
            LINK_COLUMNS
        );
        let record = tx.query_row(&sql, params![job_id, url], row_to_link)?;
        tx.commit()?;

        Ok((record, inserted == 1))
    }

    fn get_link(&self, link_id: Uuid) -> StorageResult<LinkRecord> {
        let sql = format!("SELECT {} FROM links WHERE id = ?1", LINK_COLUMNS);
        self.conn
            .query_row(&sql, params![link_id.to_string()], row_to_link)
            .optional()?
            .ok_or(StorageError::LinkNotFound(link_id))
    }

    fn links_for_job(&self, job_id: i64) -> StorageResult<Vec<LinkRecord>> {
        let sql = format!(
            "SELECT {} FROM links WHERE job_id = ?1 ORDER BY depth, created_at",
            LINK_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let links = stmt
            .query_map(params![job_id], row_to_link)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    fn unprocessed_at_depth(&self, job_id: i64, depth: u32) -> StorageResult<Vec<LinkRecord>> {
        let sql = format!(
            "SELECT {} FROM links WHERE job_id = ?1 AND depth = ?2 AND processed = 0
             ORDER BY created_at",
            LINK_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let links = stmt
            .query_map(params![job_id, depth], row_to_link)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    fn mark_processed(&mut self, link_id: Uuid) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        let exists: Option<i64> = tx
            .query_row(
                "SELECT job_id FROM links WHERE id = ?1",
                params![link_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let job_id = exists.ok_or(StorageError::LinkNotFound(link_id))?;

        // Second call is a no-op: only the false -> true transition counts
        let changed = tx.execute(
            "UPDATE links SET processed = 1 WHERE id = ?1 AND processed = 0",
            params![link_id.to_string()],
        )?;
        if changed == 1 {
            let now = Utc::now().to_rfc3339();
            tx.execute(
                "UPDATE jobs SET processed_links = processed_links + 1, updated_at = ?1
                 WHERE id = ?2",
                params![now, job_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn mark_broken(&mut self, link_id: Uuid) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        let row: Option<(i64, bool)> = tx
            .query_row(
                "SELECT job_id, processed FROM links WHERE id = ?1",
                params![link_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (job_id, was_processed) = row.ok_or(StorageError::LinkNotFound(link_id))?;

        tx.execute(
            "UPDATE links SET type = ?1, processed = 1, file_path = NULL WHERE id = ?2",
            params![LinkType::Broken.to_db_string(), link_id.to_string()],
        )?;
        if !was_processed {
            let now = Utc::now().to_rfc3339();
            tx.execute(
                "UPDATE jobs SET processed_links = processed_links + 1, updated_at = ?1
                 WHERE id = ?2",
                params![now, job_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn set_link_file_path(&mut self, link_id: Uuid, path: &str) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE links SET file_path = ?1 WHERE id = ?2",
            params![path, link_id.to_string()],
        )?;
        Ok(())
    }

    fn set_link_type(&mut self, link_id: Uuid, link_type: LinkType) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE links SET type = ?1 WHERE id = ?2",
            params![link_type.to_db_string(), link_id.to_string()],
        )?;
        Ok(())
    }

    fn backfill_link_text(&mut self, link_id: Uuid, text: &str) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE links SET link_text = ?1
             WHERE id = ?2 AND (link_text IS NULL OR link_text = '')",
            params![text, link_id.to_string()],
        )?;
        Ok(())
    }

    fn child_ids(&self, link_id: Uuid) -> StorageResult<Vec<Uuid>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM links WHERE parent_id = ?1 ORDER BY created_at")?;
        let ids = stmt
            .query_map(params![link_id.to_string()], |row| {
                let id: String = row.get(0)?;
                parse_uuid(&id)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn counts(&self, job_id: i64) -> StorageResult<LinkCounts> {
        let counts = self.conn.query_row(
            "SELECT COUNT(*),
                    IFNULL(SUM(CASE WHEN type = 'page' THEN 1 ELSE 0 END), 0),
                    IFNULL(SUM(CASE WHEN type IN ('pdf', 'docx', 'xlsx') THEN 1 ELSE 0 END), 0),
                    IFNULL(SUM(CASE WHEN type = 'broken' THEN 1 ELSE 0 END), 0),
                    IFNULL(SUM(processed), 0)
             FROM links WHERE job_id = ?1",
            params![job_id],
            |row| {
                Ok(LinkCounts {
                    total: row.get::<_, i64>(0)? as u64,
                    pages: row.get::<_, i64>(1)? as u64,
                    documents: row.get::<_, i64>(2)? as u64,
                    broken: row.get::<_, i64>(3)? as u64,
                    processed: row.get::<_, i64>(4)? as u64,
                })
            },
        )?;
        Ok(counts)
    }

    // ===== Site Filters =====

    fn add_filter(&mut self, fragment: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO site_filters (url, created_at) VALUES (?1, ?2)
             ON CONFLICT(url) DO NOTHING",
            params![fragment, now],
        )?;
        Ok(())
    }

    fn remove_filter(&mut self, fragment: &str) -> StorageResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM site_filters WHERE url = ?1", params![fragment])?;
        Ok(removed > 0)
    }

    fn list_filters(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM site_filters ORDER BY url")?;
        let filters = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_job() -> (SqliteStore, i64) {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let job_id = store
            .create_job(
                "test",
                &["https://example.com".to_string()],
                2,
                "./artifacts",
            )
            .unwrap();
        (store, job_id)
    }

    #[test]
    fn test_create_and_get_job() {
        let (store, job_id) = store_with_job();
        let job = store.get_job(job_id).unwrap();
        assert_eq!(job.name, "test");
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.max_depth, 2);
        assert_eq!(job.start_urls, vec!["https://example.com".to_string()]);
        assert_eq!(job.total_links, 0);
    }

    #[test]
    fn test_get_missing_job() {
        let store = SqliteStore::new_in_memory().unwrap();
        assert!(matches!(
            store.get_job(42),
            Err(StorageError::JobNotFound(42))
        ));
    }

    #[test]
    fn test_insert_link_is_new_once() {
        let (mut store, job_id) = store_with_job();

        let (first, is_new) = store
            .insert_or_get_link(
                job_id,
                "https://example.com/a",
                Some("A"),
                LinkType::Page,
                None,
                0,
            )
            .unwrap();
        assert!(is_new);

        let (second, is_new) = store
            .insert_or_get_link(
                job_id,
                "https://example.com/a",
                Some("other text"),
                LinkType::Pdf,
                None,
                1,
            )
            .unwrap();
        assert!(!is_new);

        // The existing record is untouched by the second call
        assert_eq!(first.id, second.id);
        assert_eq!(second.depth, 0);
        assert_eq!(second.link_type, LinkType::Page);
        assert_eq!(second.link_text.as_deref(), Some("A"));

        assert_eq!(store.get_job(job_id).unwrap().total_links, 1);
    }

    #[test]
    fn test_same_url_different_jobs() {
        let (mut store, job_a) = store_with_job();
        let job_b = store
            .create_job("other", &["https://example.com".to_string()], 1, "./out")
            .unwrap();

        let (_, new_a) = store
            .insert_or_get_link(job_a, "https://example.com/x", None, LinkType::Page, None, 0)
            .unwrap();
        let (_, new_b) = store
            .insert_or_get_link(job_b, "https://example.com/x", None, LinkType::Page, None, 0)
            .unwrap();

        assert!(new_a);
        assert!(new_b, "dedup key is job-scoped");
    }

    #[test]
    fn test_parent_child_edges() {
        let (mut store, job_id) = store_with_job();

        let (parent, _) = store
            .insert_or_get_link(job_id, "https://example.com/", None, LinkType::Page, None, 0)
            .unwrap();
        let (child_a, _) = store
            .insert_or_get_link(
                job_id,
                "https://example.com/a",
                None,
                LinkType::Page,
                Some(parent.id),
                1,
            )
            .unwrap();
        let (child_b, _) = store
            .insert_or_get_link(
                job_id,
                "https://example.com/b.pdf",
                None,
                LinkType::Pdf,
                Some(parent.id),
                1,
            )
            .unwrap();

        let children = store.child_ids(parent.id).unwrap();
        assert_eq!(children, vec![child_a.id, child_b.id]);
        assert_eq!(child_a.parent_id, Some(parent.id));
    }

    #[test]
    fn test_mark_processed_idempotent() {
        let (mut store, job_id) = store_with_job();
        let (link, _) = store
            .insert_or_get_link(job_id, "https://example.com/a", None, LinkType::Page, None, 0)
            .unwrap();

        store.mark_processed(link.id).unwrap();
        store.mark_processed(link.id).unwrap();

        let link = store.get_link(link.id).unwrap();
        assert!(link.processed);
        assert_eq!(store.get_job(job_id).unwrap().processed_links, 1);
    }

    #[test]
    fn test_mark_processed_missing_link() {
        let (mut store, _) = store_with_job();
        let ghost = Uuid::new_v4();
        assert!(matches!(
            store.mark_processed(ghost),
            Err(StorageError::LinkNotFound(_))
        ));
    }

    #[test]
    fn test_mark_broken() {
        let (mut store, job_id) = store_with_job();
        let (link, _) = store
            .insert_or_get_link(
                job_id,
                "https://example.com/gone.pdf",
                None,
                LinkType::Pdf,
                None,
                1,
            )
            .unwrap();
        store.set_link_file_path(link.id, "/tmp/gone.pdf").unwrap();

        store.mark_broken(link.id).unwrap();

        let link = store.get_link(link.id).unwrap();
        assert_eq!(link.link_type, LinkType::Broken);
        assert!(link.processed);
        assert_eq!(link.file_path, None);
        assert!(store.child_ids(link.id).unwrap().is_empty());
    }

    #[test]
    fn test_frontier_query() {
        let (mut store, job_id) = store_with_job();
        let (a, _) = store
            .insert_or_get_link(job_id, "https://example.com/a", None, LinkType::Page, None, 1)
            .unwrap();
        store
            .insert_or_get_link(job_id, "https://example.com/b", None, LinkType::Page, None, 1)
            .unwrap();
        store
            .insert_or_get_link(job_id, "https://example.com/c", None, LinkType::Page, None, 2)
            .unwrap();

        store.mark_processed(a.id).unwrap();

        let frontier = store.unprocessed_at_depth(job_id, 1).unwrap();
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier[0].url, "https://example.com/b");
    }

    #[test]
    fn test_counts() {
        let (mut store, job_id) = store_with_job();
        store
            .insert_or_get_link(job_id, "https://example.com/", None, LinkType::Page, None, 0)
            .unwrap();
        let (doc, _) = store
            .insert_or_get_link(
                job_id,
                "https://example.com/a.pdf",
                None,
                LinkType::Pdf,
                None,
                1,
            )
            .unwrap();
        let (broken, _) = store
            .insert_or_get_link(job_id, "https://example.com/b", None, LinkType::Page, None, 1)
            .unwrap();
        store.mark_broken(broken.id).unwrap();
        store.mark_processed(doc.id).unwrap();

        let counts = store.counts(job_id).unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.pages, 1);
        assert_eq!(counts.documents, 1);
        assert_eq!(counts.broken, 1);
        assert_eq!(counts.processed, 2);
    }

    #[test]
    fn test_delete_job_cascades() {
        let (mut store, job_id) = store_with_job();
        store
            .insert_or_get_link(job_id, "https://example.com/", None, LinkType::Page, None, 0)
            .unwrap();

        store.delete_job(job_id).unwrap();

        assert!(store.get_job(job_id).is_err());
        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_filters_roundtrip() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.add_filter("ads.example.com").unwrap();
        store.add_filter("ads.example.com").unwrap();
        store.add_filter("tracker.io").unwrap();

        assert_eq!(
            store.list_filters().unwrap(),
            vec!["ads.example.com".to_string(), "tracker.io".to_string()]
        );

        assert!(store.remove_filter("tracker.io").unwrap());
        assert!(!store.remove_filter("tracker.io").unwrap());
        assert_eq!(store.list_filters().unwrap().len(), 1);
    }

    #[test]
    fn test_backfill_link_text() {
        let (mut store, job_id) = store_with_job();
        let (link, _) = store
            .insert_or_get_link(job_id, "https://example.com/", None, LinkType::Page, None, 0)
            .unwrap();

        store.backfill_link_text(link.id, "Home").unwrap();
        assert_eq!(
            store.get_link(link.id).unwrap().link_text.as_deref(),
            Some("Home")
        );

        // Existing text is not overwritten
        store.backfill_link_text(link.id, "Other").unwrap();
        assert_eq!(
            store.get_link(link.id).unwrap().link_text.as_deref(),
            Some("Home")
        );
    }
}
