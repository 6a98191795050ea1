use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate it
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[job]
name = "district site"
start-urls = ["https://example.com/"]
max-depth = 3
output-dir = "./artifacts"

[fetch]
timeout-secs = 20
user-agent = "linkmap-test/0.1"

[output]
database-path = "./test.db"

[[filter]]
url = "ads.example.com"
"#;
        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.job.name, "district site");
        assert_eq!(config.job.max_depth, 3);
        assert_eq!(config.fetch.timeout_secs, 20);
        assert_eq!(config.output.database_path, "./test.db");
        assert_eq!(config.filter.len(), 1);
        assert_eq!(config.filter[0].url, "ads.example.com");
    }

    #[test]
    fn test_defaults_fill_optional_sections() {
        let config_content = r#"
[job]
name = "minimal"
start-urls = ["https://example.com/"]
max-depth = 2
"#;
        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.job.output_dir, "./artifacts");
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(config.fetch.user_agent.starts_with("linkmap/"));
        assert_eq!(config.output.database_path, "./linkmap.db");
        assert!(config.filter.is_empty());
    }

    #[test]
    fn test_invalid_toml_fails() {
        let file = create_temp_config("[job\nname = ");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/config.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_empty_start_urls_rejected() {
        let config_content = r#"
[job]
name = "empty"
start-urls = []
max-depth = 1
"#;
        let file = create_temp_config(config_content);
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
