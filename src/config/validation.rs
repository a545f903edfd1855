use crate::config::types::{Config, CrawlerConfig, HubEntry, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    if config.scheduler.tick_seconds < 1 {
        return Err(ConfigError::Validation(
            "tick_seconds must be >= 1".to_string(),
        ));
    }
    validate_hubs(&config.hubs)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates hub entries
///
/// Selector strings are deliberately not checked; they are opaque until used.
fn validate_hubs(hubs: &[HubEntry]) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for hub in hubs {
        if hub.id < 1 {
            return Err(ConfigError::Validation(format!(
                "Hub id must be positive, got {}",
                hub.id
            )));
        }

        if !seen_ids.insert(hub.id) {
            return Err(ConfigError::Validation(format!(
                "Duplicate hub id {}",
                hub.id
            )));
        }

        if hub.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Hub {} must have a name",
                hub.id
            )));
        }

        let url = Url::parse(&hub.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid hub URL '{}': {}", hub.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Hub URL '{}' must use HTTP or HTTPS",
                hub.url
            )));
        }

        if hub.fetch_interval <= 0 || hub.fetch_interval > i64::from(u32::MAX) {
            return Err(ConfigError::Validation(format!(
                "fetch_interval for hub '{}' must be a positive number of minutes, got {}",
                hub.name, hub.fetch_interval
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
