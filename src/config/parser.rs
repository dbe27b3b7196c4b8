use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable holding the PageSpeed Insights API key
pub const PAGESPEED_API_KEY_VAR: &str = "PAGESPEED_API_KEY";

/// Environment variable overriding the cache freshness window (seconds)
pub const CACHE_DURATION_VAR: &str = "CACHE_DURATION_SECONDS";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitelens::config::load_config;
///
/// let config = load_config(Path::new("sitelens.toml")).unwrap();
/// println!("Max pages: {}", config.crawler.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    finish(config)
}

/// Builds the default configuration, with environment overrides applied
pub fn default_config() -> Result<Config, ConfigError> {
    finish(Config::default())
}

fn finish(mut config: Config) -> Result<Config, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Applies environment overrides using the given variable lookup
///
/// `PAGESPEED_API_KEY` sets the performance API key and
/// `CACHE_DURATION_SECONDS` sets the cache freshness window.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(PAGESPEED_API_KEY_VAR).filter(|k| !k.trim().is_empty()) {
        config.performance.api_key = Some(key);
    }

    if let Some(raw) = lookup(CACHE_DURATION_VAR) {
        config.cache.ttl_seconds = raw.trim().parse().map_err(|_| {
            ConfigError::Validation(format!(
                "{} must be a whole number of seconds, got '{}'",
                CACHE_DURATION_VAR, raw
            ))
        })?;
    }

    Ok(())
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs can be told apart by configuration.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::ResolveMode;
    use std::collections::HashMap;
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
[crawler]
default-depth = 2
max-pages = 50
max-duration-secs = 30
request-timeout-secs = 5
resolve-mode = "origin-root"

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"

[cache]
ttl-seconds = 60
max-entries = 10
max-history = 5

[server]
bind = "0.0.0.0:8080"

[storage]
database-path = "./test.db"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.default_depth, 2);
        assert_eq!(config.crawler.max_pages, 50);
        assert_eq!(config.crawler.resolve_mode, ResolveMode::OriginRoot);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(config.cache.max_history, 5);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.storage.database_path.as_deref(), Some("./test.db"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawler.max_pages, 200);
        assert_eq!(config.cache.max_entries, 1000);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/sitelens.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
max-pages = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (PAGESPEED_API_KEY_VAR, "secret"),
            (CACHE_DURATION_VAR, "120"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.performance.api_key.as_deref(), Some("secret"));
        assert_eq!(config.cache.ttl_seconds, 120);
    }

    #[test]
    fn test_env_override_bad_duration() {
        let mut config = Config::default();
        let result = apply_env_overrides(&mut config, |k| {
            (k == CACHE_DURATION_VAR).then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
