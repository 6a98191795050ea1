//! Export and reporting
//!
//! Turns the link catalog for a finished job into a JSON export file,
//! a markdown report, and terminal statistics.

mod report;
pub mod stats;

pub use report::{format_report, write_report};
pub use stats::{print_statistics, JobStatistics};

use crate::registry::{JobRecord, LinkRecord};
use crate::state::{JobStatus, LinkType};
use crate::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use uuid::Uuid;

/// One catalog entry in the JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLink {
    pub uuid: Uuid,
    pub url: String,
    pub link_text: Option<String>,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub depth: u32,
    pub file_path: Option<String>,
    pub processed: bool,
    pub parent: Option<Uuid>,
    pub children: Vec<Uuid>,
}

/// The full export for one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobExport {
    pub job_id: i64,
    pub job_name: String,
    pub status: JobStatus,
    pub max_depth: u32,
    pub generated_at: String,
    /// Links whose parent is not in the catalog (the start URLs)
    pub roots: Vec<Uuid>,
    pub links: Vec<ExportedLink>,
}

/// Builds the export structure from a job and its links
///
/// Child lists are derived from the parent edges, so every link appears
/// exactly once in `links` and the tree can be walked from `roots`.
pub fn build_export(job: &JobRecord, links: &[LinkRecord]) -> JobExport {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in links {
        if let Some(parent) = link.parent_id {
            children.entry(parent).or_default().push(link.id);
        }
    }

    let roots = links
        .iter()
        .filter(|l| l.parent_id.is_none())
        .map(|l| l.id)
        .collect();

    let exported = links
        .iter()
        .map(|link| ExportedLink {
            uuid: link.id,
            url: link.url.clone(),
            link_text: link.link_text.clone(),
            link_type: link.link_type,
            depth: link.depth,
            file_path: link.file_path.clone(),
            processed: link.processed,
            parent: link.parent_id,
            children: children.remove(&link.id).unwrap_or_default(),
        })
        .collect();

    JobExport {
        job_id: job.id,
        job_name: job.name.clone(),
        status: job.status,
        max_depth: job.max_depth,
        generated_at: Utc::now().to_rfc3339(),
        roots,
        links: exported,
    }
}

/// Writes the export as pretty-printed JSON
pub fn write_json(export: &JobExport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, export)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobRecord {
        JobRecord {
            id: 1,
            name: "test".to_string(),
            start_urls: vec!["https://example.com/".to_string()],
            max_depth: 2,
            output_dir: "./artifacts".to_string(),
            status: JobStatus::Completed,
            current_depth: 2,
            total_links: 3,
            processed_links: 3,
            failure_reason: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:05:00Z".to_string(),
        }
    }

    fn link(id: Uuid, url: &str, parent: Option<Uuid>, depth: u32) -> LinkRecord {
        LinkRecord {
            id,
            job_id: 1,
            url: url.to_string(),
            link_text: None,
            link_type: LinkType::Page,
            depth,
            file_path: None,
            processed: true,
            parent_id: parent,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_children_derived_from_parents() {
        let root = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let links = vec![
            link(root, "https://example.com/", None, 0),
            link(a, "https://example.com/a", Some(root), 1),
            link(b, "https://example.com/b", Some(root), 1),
        ];

        let export = build_export(&job(), &links);

        assert_eq!(export.roots, vec![root]);
        assert_eq!(export.links[0].children, vec![a, b]);
        assert!(export.links[1].children.is_empty());
        assert_eq!(export.links[1].parent, Some(root));
    }

    #[test]
    fn test_json_roundtrip() {
        let root = Uuid::new_v4();
        let links = vec![link(root, "https://example.com/", None, 0)];
        let export = build_export(&job(), &links);

        let json = serde_json::to_string(&export).unwrap();
        let parsed: JobExport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.job_name, "test");
        assert_eq!(parsed.links.len(), 1);
        assert_eq!(parsed.links[0].uuid, root);
    }

    #[test]
    fn test_type_serialized_lowercase() {
        let root = Uuid::new_v4();
        let mut record = link(root, "https://example.com/r.pdf", None, 1);
        record.link_type = LinkType::Pdf;
        let export = build_export(&job(), &[record]);

        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains(r#""type":"pdf""#));
        assert!(json.contains(r#""status":"completed""#));
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/export.json");
        let export = build_export(&job(), &[]);

        write_json(&export, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"job_name\""));
    }
}
