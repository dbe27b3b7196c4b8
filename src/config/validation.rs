use crate::config::types::{
    CacheConfig, Config, CrawlerConfig, PerformanceConfig, SearchConsoleConfig, ServerConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_cache_config(&config.cache)?;
    validate_server_config(&config.server)?;
    validate_performance_config(&config.performance)?;
    validate_search_console_config(&config.search_console)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_duration_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "max_duration_secs must be >= 1, got {}",
            config.max_duration_secs
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 300, got {}",
            config.request_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
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

/// Validates cache bounds
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.max_entries < 1 {
        return Err(ConfigError::Validation(
            "cache max_entries must be >= 1".to_string(),
        ));
    }

    if config.max_history < 1 {
        return Err(ConfigError::Validation(
            "cache max_history must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("Invalid server bind address '{}': {}", config.bind, e))
    })?;
    Ok(())
}

fn validate_performance_config(config: &PerformanceConfig) -> Result<(), ConfigError> {
    validate_http_endpoint("performance endpoint", &config.endpoint)?;

    if matches!(&config.api_key, Some(key) if key.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "performance api_key cannot be blank".to_string(),
        ));
    }

    Ok(())
}

fn validate_search_console_config(config: &SearchConsoleConfig) -> Result<(), ConfigError> {
    validate_http_endpoint("search console endpoint", &config.endpoint)
}

/// Validates that an endpoint is an absolute HTTP(S) URL
fn validate_http_endpoint(label: &str, endpoint: &str) -> Result<(), ConfigError> {
    let url = Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", label, endpoint, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} must use HTTP or HTTPS, got '{}'",
            label, endpoint
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_crawler_name_rules() {
        let mut config = UserAgentConfig::default();
        assert!(validate_user_agent_config(&config).is_ok());

        config.crawler_name = "Bad Name".to_string();
        assert!(validate_user_agent_config(&config).is_err());

        config.crawler_name = String::new();
        assert!(validate_user_agent_config(&config).is_err());
    }

    #[test]
    fn test_zero_budgets_rejected() {
        let mut config = CrawlerConfig::default();
        config.max_pages = 0;
        assert!(validate_crawler_config(&config).is_err());

        let mut config = CrawlerConfig::default();
        config.max_duration_secs = 0;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_bind_address() {
        let mut config = ServerConfig::default();
        assert!(validate_server_config(&config).is_ok());

        config.bind = "localhost".to_string();
        assert!(validate_server_config(&config).is_err());
    }

    #[test]
    fn test_endpoint_scheme() {
        assert!(validate_http_endpoint("x", "https://example.com/api").is_ok());
        assert!(validate_http_endpoint("x", "ftp://example.com/api").is_err());
        assert!(validate_http_endpoint("x", "not a url").is_err());
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let config = PerformanceConfig {
            api_key: Some("  ".to_string()),
            ..PerformanceConfig::default()
        };
        assert!(validate_performance_config(&config).is_err());
    }
}
