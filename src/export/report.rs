//! Markdown report generation

use crate::export::JobExport;
use crate::registry::LinkCounts;
use crate::state::LinkType;
use crate::Result;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

/// Writes a markdown report next to the JSON export
pub fn write_report(export: &JobExport, counts: &LinkCounts, output_path: &Path) -> Result<()> {
    let markdown = format_report(export, counts);
    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;
    Ok(())
}

/// Formats a job's catalog as a markdown report
pub fn format_report(export: &JobExport, counts: &LinkCounts) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Link Catalog: {}\n\n", export.job_name));

    md.push_str("## Job Information\n\n");
    md.push_str(&format!("- **Job ID**: {}\n", export.job_id));
    md.push_str(&format!("- **Status**: {}\n", export.status));
    md.push_str(&format!("- **Max Depth**: {}\n", export.max_depth));
    md.push_str(&format!("- **Generated**: {}\n\n", export.generated_at));

    md.push_str("## Link Counts\n\n");
    md.push_str("| Kind | Count |\n");
    md.push_str("|------|-------|\n");
    md.push_str(&format!("| Total | {} |\n", counts.total));
    md.push_str(&format!("| Pages | {} |\n", counts.pages));
    md.push_str(&format!("| Documents | {} |\n", counts.documents));
    md.push_str(&format!("| Broken | {} |\n", counts.broken));
    md.push_str(&format!("| Processed | {} |\n\n", counts.processed));

    let broken: Vec<_> = export
        .links
        .iter()
        .filter(|l| l.link_type == LinkType::Broken)
        .collect();
    if !broken.is_empty() {
        md.push_str("## Broken Links\n\n");
        for link in &broken {
            match &link.link_text {
                Some(text) => md.push_str(&format!("- [{}]({}) (depth {})\n", text, link.url, link.depth)),
                None => md.push_str(&format!("- {} (depth {})\n", link.url, link.depth)),
            }
        }
        md.push('\n');
    }

    md.push_str("## Link Tree\n\n");
    let by_id: HashMap<Uuid, usize> = export
        .links
        .iter()
        .enumerate()
        .map(|(index, link)| (link.uuid, index))
        .collect();
    for root in &export.roots {
        render_subtree(export, &by_id, *root, 0, &mut md);
    }

    md
}

fn render_subtree(
    export: &JobExport,
    by_id: &HashMap<Uuid, usize>,
    id: Uuid,
    indent: usize,
    md: &mut String,
) {
    let Some(&index) = by_id.get(&id) else {
        return;
    };
    let link = &export.links[index];

    let label = link.link_text.as_deref().unwrap_or(&link.url);
    let marker = match link.link_type {
        LinkType::Broken => " [broken]",
        LinkType::Pdf => " [pdf]",
        LinkType::Docx => " [docx]",
        LinkType::Xlsx => " [xlsx]",
        LinkType::Page => "",
    };
    md.push_str(&format!(
        "{}- {} <{}>{}\n",
        "  ".repeat(indent),
        label,
        link.url,
        marker
    ));

    for child in &link.children {
        render_subtree(export, by_id, *child, indent + 1, md);
    }
}
