use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ScraperError, ScraperResult};

pub const DEFAULT_TARGET_URL: &str = "https://www.kijijiautos.ca/cars/best-first-cars/";
pub const DEFAULT_FILE_STEM: &str = "kijiji_autos_data";
const CONFIG_FILE_NAME: &str = "kijiji-autos.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub browser: BrowserConfig,
    pub scraping: ScrapingConfig,
    pub selectors: SelectorConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowserConfig {
    /// Browser executable to launch instead of the bundled Chromium
    pub driver_path: Option<PathBuf>,
    pub headless: bool,
    pub page_timeout_seconds: u64,
    /// Pause after navigation before the first scroll
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrapingConfig {
    pub target_url: String,
    pub max_listings: usize,
    pub wait_timeout_seconds: u64,
    pub max_scrolls: usize,
    pub scroll_pause_ms: u64,
    pub user_agent: String,
}

/// CSS selectors used to locate listings and their fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    pub listing: String,
    pub title: String,
    /// Tried in order; the first visible match wins
    pub price: Vec<String>,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub output_directory: PathBuf,
    pub file_stem: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub console_enabled: bool,
    pub file_enabled: bool,
    pub log_directory: PathBuf,
    pub max_files: usize,
    pub include_targets: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            driver_path: None,
            headless: false,
            page_timeout_seconds: 60,
            settle_delay_ms: 3000,
        }
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            max_listings: 100,
            wait_timeout_seconds: 10,
            max_scrolls: 4,
            scroll_pause_ms: 1500,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0".to_string(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing: r#"[data-testid="SearchResultListItem"]"#.to_string(),
            title: "h2.G2jAym".to_string(),
            price: vec![
                r#"span[data-testid="searchResultItemPrice"]"#.to_string(),
                "div.g3uM7V.gcN7dZ div.h3uM7V span.G2jAym".to_string(),
                r#"div[data-testid="VehicleListItem-price"] div.h3uM7V span.G2jAym"#.to_string(),
            ],
            image: "div.b1E1YI img.q1E1YI".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("."),
            file_stem: DEFAULT_FILE_STEM.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_enabled: true,
            file_enabled: false,
            log_directory: get_data_directory().join("logs"),
            max_files: 5,
            include_targets: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            scraping: ScrapingConfig::default(),
            selectors: SelectorConfig::default(),
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ScrapingConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_seconds)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }
}

impl ExportConfig {
    /// Path of the output file for the given extension
    pub fn output_path(&self, extension: &str) -> PathBuf {
        self.output_directory.join(format!("{}.{}", self.file_stem, extension))
    }
}

impl AppConfig {
    /// Load `explicit` if given, else the default file if it exists, else defaults.
    ///
    /// Nothing is logged here: logging is configured from the result, so the
    /// caller reports the returned source once logging is up.
    pub async fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = get_config_path();
                if !default_path.exists() {
                    return Ok((Self::default(), ConfigSource::Defaults));
                }
                default_path
            }
        };

        let config = Self::load_from_file(&path).await?;
        Ok((config, ConfigSource::File(path)))
    }

    /// Load configuration from specific file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let config: AppConfig = toml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ScraperResult<()> {
        let url = url::Url::parse(&self.scraping.target_url).map_err(|e| {
            ScraperError::config(format!("Invalid target_url '{}': {}", self.scraping.target_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScraperError::config(format!(
                "Unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        if self.scraping.max_listings == 0 {
            return Err(ScraperError::config("Scraping max_listings must be > 0"));
        }

        if self.scraping.wait_timeout_seconds == 0 {
            return Err(ScraperError::config("Scraping wait_timeout_seconds must be > 0"));
        }

        if self.selectors.listing.trim().is_empty()
            || self.selectors.title.trim().is_empty()
            || self.selectors.image.trim().is_empty()
        {
            return Err(ScraperError::config("Listing, title and image selectors must not be empty"));
        }

        if self.selectors.price.is_empty() {
            return Err(ScraperError::config("At least one price selector must be configured"));
        }

        if self.selectors.price.iter().any(|s| s.trim().is_empty()) {
            return Err(ScraperError::config("Price selectors must not be empty"));
        }

        if self.export.file_stem.trim().is_empty() {
            return Err(ScraperError::config("Export file_stem must not be empty"));
        }

        Ok(())
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "Configuration loaded from: {}", path.display()),
            ConfigSource::Defaults => f.write_str("No configuration file found, using defaults"),
        }
    }
}

/// Get the default data directory
fn get_data_directory() -> PathBuf {
    directories::ProjectDirs::from("ca", "kijiji-autos", "scraper")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("data"))
}

/// Get the configuration file path
pub fn get_config_path() -> PathBuf {
    directories::ProjectDirs::from("ca", "kijiji-autos", "scraper")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join(CONFIG_FILE_NAME))
}

/// Environment-based configuration overrides
pub struct ConfigOverrides;

impl ConfigOverrides {
    /// Apply environment variable overrides to configuration
    pub fn apply(config: &mut AppConfig) {
        Self::apply_from(config, |key| std::env::var(key).ok());
    }

    /// Apply overrides read through `lookup`, so tests need not touch the process env
    pub fn apply_from<F>(config: &mut AppConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("KAS_TARGET_URL") {
            config.scraping.target_url = url;
        }

        if let Some(driver_path) = lookup("KAS_DRIVER_PATH") {
            config.browser.driver_path = Some(PathBuf::from(driver_path));
        }

        if let Some(headless) = lookup("KAS_HEADLESS") {
            config.browser.headless = matches!(headless.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(output_dir) = lookup("KAS_OUTPUT_DIR") {
            config.export.output_directory = PathBuf::from(output_dir);
        }

        if let Some(max_str) = lookup("KAS_MAX_LISTINGS") {
            if let Ok(max) = max_str.parse::<usize>() {
                config.scraping.max_listings = max;
            }
        }

        if let Some(log_level) = lookup("KAS_LOG_LEVEL") {
            config.logging.level = log_level;
        }
    }
}
