//! Database schema definitions
//!
//! All SQL schema for the linkmap database lives here.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Crawl jobs
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    start_urls TEXT NOT NULL,
    max_depth INTEGER NOT NULL,
    output_dir TEXT NOT NULL,
    status TEXT NOT NULL,
    current_depth INTEGER NOT NULL DEFAULT 0,
    total_links INTEGER NOT NULL DEFAULT 0,
    processed_links INTEGER NOT NULL DEFAULT 0,
    failure_reason TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Discovered links, deduplicated per job by normalized URL
CREATE TABLE IF NOT EXISTS links (
    id TEXT PRIMARY KEY,
    job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
    url TEXT NOT NULL,
    link_text TEXT,
    type TEXT NOT NULL,
    depth INTEGER NOT NULL,
    file_path TEXT,
    processed INTEGER NOT NULL DEFAULT 0,
    parent_id TEXT REFERENCES links(id),
    created_at TEXT NOT NULL,
    UNIQUE(job_id, url)
);

CREATE INDEX IF NOT EXISTS idx_links_job ON links(job_id);
CREATE INDEX IF NOT EXISTS idx_links_frontier ON links(job_id, depth, processed);
CREATE INDEX IF NOT EXISTS idx_links_parent ON links(parent_id);

-- Process-wide site filters (URL exclusion fragments)
CREATE TABLE IF NOT EXISTS site_filters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
