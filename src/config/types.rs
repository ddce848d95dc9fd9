use serde::Deserialize;

/// Main configuration structure for Comic-Sync
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub library: LibraryConfig,
    pub fetch: FetchConfig,
    pub concurrency: ConcurrencyConfig,
    pub images: ImageConfig,
}

/// Remote catalog layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CatalogConfig {
    /// Catalog root; searches go to `{base_url}/?story={term}&s=&type=comic`
    pub base_url: String,

    /// CSS selector of the container holding series or issue links
    pub listing_selector: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://readallcomics.com".to_string(),
            listing_selector: "ul.list-story".to_string(),
        }
    }
}

/// Local library layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LibraryConfig {
    /// Directory holding one folder per series
    pub root: String,

    /// File name of the per-series origin URL sentinel
    pub sentinel_name: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: "Comics".to_string(),
            sentinel_name: "url.txt".to_string(),
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 10,
            user_agent: format!("comic-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Worker pool bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConcurrencyConfig {
    /// Concurrent series listings and issue syncs
    pub series_workers: usize,

    /// Concurrent page-image fetches, shared by all issues
    pub image_workers: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            series_workers: 10,
            image_workers: 8,
        }
    }
}

/// Page normalization and document output
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ImageConfig {
    /// Every page is resized to this width, keeping its aspect ratio
    pub page_width: u32,

    /// JPEG quality used when embedding pages in the PDF
    pub jpeg_quality: u8,

    /// Pixels per inch used to lay pages out in the PDF
    pub resolution_dpi: u32,

    /// Try to salvage JPEG pages whose data ends early
    pub tolerate_truncated: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            page_width: 800,
            jpeg_quality: 85,
            resolution_dpi: 100,
            tolerate_truncated: true,
        }
    }
}
