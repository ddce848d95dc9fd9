use crate::config::types::{
    CatalogConfig, ConcurrencyConfig, Config, FetchConfig, ImageConfig, LibraryConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

const MAX_WORKERS: usize = 64;
const MAX_PAGE_WIDTH: u32 = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_library_config(&config.library)?;
    validate_fetch_config(&config.fetch)?;
    validate_concurrency_config(&config.concurrency)?;
    validate_image_config(&config.images)?;
    Ok(())
}

fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if config.listing_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "listing-selector cannot be empty".to_string(),
        ));
    }

    Selector::parse(&config.listing_selector).map_err(|e| {
        ConfigError::Validation(format!(
            "listing-selector '{}' is not a valid CSS selector: {:?}",
            config.listing_selector, e
        ))
    })?;

    Ok(())
}

fn validate_library_config(config: &LibraryConfig) -> Result<(), ConfigError> {
    if config.root.trim().is_empty() {
        return Err(ConfigError::Validation(
            "library root cannot be empty".to_string(),
        ));
    }

    let name = config.sentinel_name.as_str();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "sentinel-name must be a plain file name, got '{}'",
            name
        )));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_concurrency_config(config: &ConcurrencyConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("series-workers", config.series_workers),
        ("image-workers", config.image_workers),
    ] {
        if !(1..=MAX_WORKERS).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_WORKERS, value
            )));
        }
    }

    Ok(())
}

fn validate_image_config(config: &ImageConfig) -> Result<(), ConfigError> {
    if config.page_width == 0 || config.page_width > MAX_PAGE_WIDTH {
        return Err(ConfigError::Validation(format!(
            "page-width must be between 1 and {}, got {}",
            MAX_PAGE_WIDTH, config.page_width
        )));
    }

    if !(1..=100).contains(&config.jpeg_quality) {
        return Err(ConfigError::Validation(format!(
            "jpeg-quality must be between 1 and 100, got {}",
            config.jpeg_quality
        )));
    }

    if config.resolution_dpi == 0 {
        return Err(ConfigError::Validation(
            "resolution-dpi must be >= 1".to_string(),
        ));
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
    fn test_rejects_non_http_base_url() {
        let mut config = Config::default();
        config.catalog.base_url = "ftp://catalog.example.com".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let mut config = Config::default();
        config.catalog.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_selector() {
        let mut config = Config::default();
        config.catalog.listing_selector = "ul[[".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_sentinel_with_separator() {
        let mut config = Config::default();
        config.library.sentinel_name = "meta/url.txt".to_string();
        assert!(validate(&config).is_err());

        config.library.sentinel_name = "..".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_worker_bounds() {
        let mut config = Config::default();
        config.concurrency.image_workers = 0;
        assert!(validate(&config).is_err());

        config.concurrency.image_workers = MAX_WORKERS + 1;
        assert!(validate(&config).is_err());

        config.concurrency.image_workers = MAX_WORKERS;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_image_bounds() {
        let mut config = Config::default();
        config.images.jpeg_quality = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.images.page_width = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.images.resolution_dpi = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.fetch.timeout_secs = 0;
        assert!(validate(&config).is_err());
    }
}
