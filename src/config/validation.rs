use crate::config::types::{
    ChunkerConfig, Config, CrawlerConfig, OutputConfig, RendererKind, SiteEntry, UserAgentConfig,
};
use crate::url::{normalize_url, SiteScope};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_chunker_config(&config.chunker)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_sites(&config.sites)?;
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

    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 32 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages must be between 1 and 32, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.fetch_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_ms must be >= 1000ms, got {}ms",
            config.fetch_timeout_ms
        )));
    }

    if config.renderer == RendererKind::Browser && !cfg!(feature = "browser") {
        return Err(ConfigError::Validation(
            "renderer = \"browser\" requires docsift to be built with the `browser` feature"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validates chunker configuration
fn validate_chunker_config(config: &ChunkerConfig) -> Result<(), ConfigError> {
    if config.max_chunk_size < 50 {
        return Err(ConfigError::Validation(format!(
            "max_chunk_size must be >= 50, got {}",
            config.max_chunk_size
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
    if config.corpus_path.is_empty() {
        return Err(ConfigError::Validation(
            "corpus_path cannot be empty".to_string(),
        ));
    }

    if config.queue_path.is_empty() {
        return Err(ConfigError::Validation(
            "queue_path cannot be empty".to_string(),
        ));
    }

    if config.corpus_path == config.queue_path {
        return Err(ConfigError::Validation(
            "corpus_path and queue_path must differ".to_string(),
        ));
    }

    Ok(())
}

/// Validates site entries: base URLs, seeds and path patterns
fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] entry is required".to_string(),
        ));
    }

    for site in sites {
        normalize_url(&site.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", site.base_url, e))
        })?;

        if site.include_paths.is_empty() {
            return Err(ConfigError::InvalidPattern(format!(
                "Site '{}' must have at least one include path",
                site.base_url
            )));
        }

        for pattern in &site.include_paths {
            validate_path_pattern(pattern)?;
        }

        let scope = SiteScope::from_sites(std::slice::from_ref(site)).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", site.base_url, e))
        })?;

        for seed in site.seed_urls() {
            let normalized = normalize_url(seed).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
            })?;

            // A seed the scope rejects would leave the frontier empty
            if !scope.admits(&normalized) {
                return Err(ConfigError::Validation(format!(
                    "Seed URL '{}' is outside site '{}' (include paths: {})",
                    seed,
                    site.base_url,
                    site.include_paths.join(", ")
                )));
            }
        }
    }

    Ok(())
}

/// Validates an include-path pattern
fn validate_path_pattern(pattern: &str) -> Result<(), ConfigError> {
    if !pattern.starts_with('/') {
        return Err(ConfigError::InvalidPattern(format!(
            "Include path '{}' must start with '/'",
            pattern
        )));
    }

    if pattern.contains(char::is_whitespace) {
        return Err(ConfigError::InvalidPattern(format!(
            "Include path '{}' cannot contain whitespace",
            pattern
        )));
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

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
