use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub job: JobConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub filter: Vec<FilterEntry>,
}

/// Crawl job definition
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Human-readable job name
    pub name: String,

    /// URLs the crawl starts from (depth 0)
    #[serde(rename = "start-urls")]
    pub start_urls: Vec<String>,

    /// Depth bound: links at this depth are recorded but not fetched
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Directory where page and document artifacts are saved
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

/// One site filter entry: a substring that excludes matching URLs
#[derive(Debug, Clone, Deserialize)]
pub struct FilterEntry {
    pub url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_output_dir() -> String {
    "./artifacts".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("linkmap/{}", env!("CARGO_PKG_VERSION"))
}

fn default_database_path() -> String {
    "./linkmap.db".to_string()
}
