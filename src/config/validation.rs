use crate::config::types::{Config, CrawlOptions, OutputConfig, UserAgentConfig};
use crate::ConfigError;

/// Upper bound for either worker pool
const MAX_CONCURRENCY: usize = 100;

/// Upper bound for the per-request timeout (seconds)
const MAX_TIMEOUT_SECS: u64 = 300;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_options(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl tuning options
fn validate_crawl_options(options: &CrawlOptions) -> Result<(), ConfigError> {
    validate_concurrency("sitemap_concurrency", options.sitemap_concurrency)?;
    validate_concurrency("page_concurrency", options.page_concurrency)?;

    if options.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            options.max_pages
        )));
    }

    if options.request_timeout_secs < 1 || options.request_timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, options.request_timeout_secs
        )));
    }

    if let Some(deadline) = options.crawl_deadline_secs {
        if deadline < 1 {
            return Err(ConfigError::Validation(format!(
                "crawl_deadline_secs must be >= 1, got {}",
                deadline
            )));
        }
    }

    Ok(())
}

fn validate_concurrency(name: &str, value: usize) -> Result<(), ConfigError> {
    if value < 1 || value > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_CONCURRENCY, value
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
