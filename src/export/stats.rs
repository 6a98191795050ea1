//! Terminal statistics for the --stats mode

use crate::registry::{JobRecord, LinkCounts, LinkRecord};
use std::collections::BTreeMap;

/// Statistics summary for one job
#[derive(Debug, Clone)]
pub struct JobStatistics {
    pub counts: LinkCounts,

    /// Link counts keyed by depth
    pub links_by_depth: BTreeMap<u32, u64>,
}

impl JobStatistics {
    pub fn from_links(counts: LinkCounts, links: &[LinkRecord]) -> Self {
        let mut links_by_depth = BTreeMap::new();
        for link in links {
            *links_by_depth.entry(link.depth).or_insert(0) += 1;
        }
        Self {
            counts,
            links_by_depth,
        }
    }
}

/// Prints job statistics to stdout
pub fn print_statistics(job: &JobRecord, stats: &JobStatistics) {
    println!("Job #{}: {}", job.id, job.name);
    println!("  Status:    {}", job.status);
    println!("  Max depth: {}", job.max_depth);
    println!();
    println!("  Links total:     {}", stats.counts.total);
    println!("  Pages:           {}", stats.counts.pages);
    println!("  Documents:       {}", stats.counts.documents);
    println!("  Broken:          {}", stats.counts.broken);
    println!("  Processed:       {}", stats.counts.processed);
    println!();
    println!("  By depth:");
    for (depth, count) in &stats.links_by_depth {
        println!("    depth {}: {}", depth, count);
    }
    if let Some(reason) = &job.failure_reason {
        println!();
        println!("  Failure reason: {}", reason);
    }
}
