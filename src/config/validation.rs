use crate::config::types::{Config, FetchConfig, JobConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_job_config(&config.job)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;

    for entry in &config.filter {
        if entry.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "filter url cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_job_config(config: &JobConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "job name cannot be empty".to_string(),
        ));
    }

    if config.start_urls.is_empty() {
        return Err(ConfigError::Validation(
            "job must have at least one start URL".to_string(),
        ));
    }

    for start_url in &config.start_urls {
        let url = Url::parse(start_url).map_err(|e| {
            ConfigError::Validation(format!("invalid start URL '{}': {}", start_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "start URL '{}' must use http or https",
                start_url
            )));
        }
    }

    // max_depth = 0 is allowed: start URLs are recorded but never fetched

    if config.output_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::FilterEntry;

    fn valid_config() -> Config {
        Config {
            job: JobConfig {
                name: "test".to_string(),
                start_urls: vec!["https://example.com/".to_string()],
                max_depth: 2,
                output_dir: "./artifacts".to_string(),
            },
            fetch: FetchConfig::default(),
            output: OutputConfig::default(),
            filter: Vec::new(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut config = valid_config();
        config.job.name = "   ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_ftp_start_url_rejected() {
        let mut config = valid_config();
        config.job.start_urls = vec!["ftp://example.com/".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_depth_allowed() {
        let mut config = valid_config();
        config.job.max_depth = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = valid_config();
        config.fetch.timeout_secs = 0;
        assert!(validate(&config).is_err());
        config.fetch.timeout_secs = 301;
        assert!(validate(&config).is_err());
        config.fetch.timeout_secs = 300;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_blank_filter_rejected() {
        let mut config = valid_config();
        config.filter = vec![FilterEntry {
            url: "".to_string(),
        }];
        assert!(validate(&config).is_err());
    }
}
