use crate::config::types::{Config, CrawlerConfig, DocSeed, IndexConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_index_config(&config.index)?;
    validate_docs(&config.docs)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be >= 1, got {}",
            config.fetch_timeout_secs
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
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

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.download_path.is_empty() {
        return Err(ConfigError::Validation(
            "download_path cannot be empty".to_string(),
        ));
    }

    if config.index_path.is_empty() {
        return Err(ConfigError::Validation(
            "index_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    // Levenshtein automata are only built up to distance 2
    if config.fuzzy_distance > 2 {
        return Err(ConfigError::Validation(format!(
            "fuzzy_distance must be between 0 and 2, got {}",
            config.fuzzy_distance
        )));
    }

    if config.writer_heap_mb < 15 {
        return Err(ConfigError::Validation(format!(
            "writer_heap_mb must be >= 15, got {}",
            config.writer_heap_mb
        )));
    }

    Ok(())
}

/// Validates documentation seed entries
fn validate_docs(docs: &[DocSeed]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for doc in docs {
        validate_path_component("name", &doc.name)?;
        validate_path_component("version", &doc.version)?;

        if !names.insert(doc.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate docs entry '{}'",
                doc.name
            )));
        }

        let url = Url::parse(&doc.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", doc.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use HTTP or HTTPS",
                doc.url
            )));
        }
    }

    Ok(())
}

/// Names and versions become directory names under the download path
fn validate_path_component(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!(
            "docs {} cannot be empty",
            field
        )));
    }

    if value == "." || value == ".." || value.contains(['/', '\\', ':']) {
        return Err(ConfigError::Validation(format!(
            "docs {} '{}' must be a single path component",
            field, value
        )));
    }

    Ok(())
}
