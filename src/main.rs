//! Linkmap main entry point
//!
//! Command-line interface for running crawl jobs and inspecting their
//! results.

use clap::Parser;
use linkmap::config::{load_config, Config};
use linkmap::export::{print_statistics, JobStatistics};
use linkmap::registry::Store;
use linkmap::url::SiteFilterSet;
use linkmap::{Orchestrator, SqliteStore};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Linkmap: a website link cataloger
///
/// Linkmap crawls a site breadth-first from its start URLs, catalogs
/// every discovered link (pages, PDFs, Word and Excel documents,
/// broken links) with parent/child relationships, and exports the
/// catalog as JSON with a markdown report.
#[derive(Parser, Debug)]
#[command(name = "linkmap")]
#[command(version)]
#[command(about = "A website link cataloger", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["stats", "export_report"])]
    dry_run: bool,

    /// Show statistics for the most recent job and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_report"])]
    stats: bool,

    /// Regenerate the export and report for the most recent job and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_report: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_report {
        handle_export_report(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkmap=info,warn"),
            1 => EnvFilter::new("linkmap=debug,info"),
            2 => EnvFilter::new("linkmap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: shows what the job would do
fn handle_dry_run(config: &Config) {
    println!("=== Linkmap Dry Run ===\n");

    println!("Job:");
    println!("  Name: {}", config.job.name);
    println!("  Max depth: {}", config.job.max_depth);
    println!("  Output dir: {}", config.job.output_dir);

    println!("\nStart URLs ({}):", config.job.start_urls.len());
    for url in &config.job.start_urls {
        println!("  {}", url);
    }

    println!("\nFetch:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  User agent: {}", config.fetch.user_agent);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    if !config.filter.is_empty() {
        println!("\nSite filters ({}):", config.filter.len());
        for entry in &config.filter {
            println!("  {}", entry.url);
        }
    }
}

/// Handles --stats: prints statistics for the most recent job
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;

    let jobs = store.list_jobs()?;
    let Some(job) = jobs.first() else {
        println!("No jobs found in {}", config.output.database_path);
        return Ok(());
    };

    if !job.status.is_terminal() {
        println!("Job #{} is still {}; counts are partial", job.id, job.status);
    }
    let counts = store.counts(job.id)?;
    let links = store.links_for_job(job.id)?;
    let stats = JobStatistics::from_links(counts, &links);
    print_statistics(job, &stats);
    Ok(())
}

/// Handles --export-report: rewrites the export files for the most recent job
fn handle_export_report(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;

    let jobs = store.list_jobs()?;
    let Some(job) = jobs.first() else {
        println!("No jobs found in {}", config.output.database_path);
        return Ok(());
    };

    let links = store.links_for_job(job.id)?;
    let counts = store.counts(job.id)?;
    let catalog = linkmap::export::build_export(job, &links);

    let artifact_dir = PathBuf::from(&job.output_dir).join(format!("job_{}", job.id));
    std::fs::create_dir_all(&artifact_dir)?;
    let export_path = artifact_dir.join("export.json");
    let report_path = artifact_dir.join("report.md");
    linkmap::export::write_json(&catalog, &export_path)?;
    linkmap::export::write_report(&catalog, &counts, &report_path)?;

    println!("Wrote {}", export_path.display());
    println!("Wrote {}", report_path.display());
    Ok(())
}

/// Handles the default mode: create a job from the config and run it
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let mut store = open_store(&config)?;

    // Config filters are persisted, then the full stored set is used
    for entry in &config.filter {
        store.add_filter(&entry.url)?;
    }
    let filters = Arc::new(SiteFilterSet::from_entries(store.list_filters()?));

    let job_id = store.create_job(
        &config.job.name,
        &config.job.start_urls,
        config.job.max_depth,
        &config.job.output_dir,
    )?;

    let client =
        linkmap::fetch::build_http_client(&config.fetch.user_agent, config.fetch.timeout_secs)?;
    let orchestrator = Orchestrator::new(Arc::new(Mutex::new(store)), filters, client);

    let controller = orchestrator.controller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current link");
            controller.request_stop();
        }
    });

    let job = orchestrator.run(job_id).await?;
    let snapshot = orchestrator.controller().status();

    println!("Job #{} finished: {}", job.id, job.status);
    println!("  Links:     {}", snapshot.total_links);
    println!("  Pages:     {}", snapshot.total_pages);
    println!("  Documents: {}", snapshot.total_documents);
    println!("  Broken:    {}", snapshot.total_broken);
    println!(
        "  Catalog:   {}/job_{}/export.json",
        job.output_dir, job.id
    );

    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<SqliteStore> {
    let path = Path::new(&config.output.database_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(SqliteStore::new(path)?)
}
