use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use kijiji_autos_scraper::config::{AppConfig, ConfigOverrides};
use kijiji_autos_scraper::logging;
use kijiji_autos_scraper::{DriverMode, KijijiAutosApp};

#[derive(Parser)]
#[command(name = "kijiji-autos-scraper")]
#[command(about = "Scrape Kijiji Autos listings to JSON and CSV")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[arg(short, long, help = "Configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Listings page to scrape")]
    url: Option<String>,

    #[arg(long, help = "Browser executable to launch")]
    driver_path: Option<PathBuf>,

    #[arg(long, help = "Run the browser without a window")]
    headless: Option<bool>,

    #[arg(short, long, help = "Directory for the JSON and CSV files")]
    output_dir: Option<PathBuf>,

    #[arg(long, help = "Maximum number of listings to extract")]
    max_listings: Option<usize>,

    #[arg(long, help = "Fetch the page over HTTP instead of driving a browser")]
    static_html: bool,

    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.url {
            config.scraping.target_url = url.clone();
        }
        if let Some(path) = &self.driver_path {
            config.browser.driver_path = Some(path.clone());
        }
        if let Some(headless) = self.headless {
            config.browser.headless = headless;
        }
        if let Some(dir) = &self.output_dir {
            config.export.output_directory = dir.clone();
        }
        if let Some(max) = self.max_listings {
            config.scraping.max_listings = max;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }

    fn driver_mode(&self) -> DriverMode {
        if self.static_html {
            DriverMode::StaticHtml
        } else {
            DriverMode::Browser
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, source) = AppConfig::load(cli.config.as_deref()).await?;
    ConfigOverrides::apply(&mut config);
    cli.apply(&mut config);

    logging::init_logging(&config.logging)?;
    info!("Kijiji Autos Scraper v{}", env!("CARGO_PKG_VERSION"));
    info!("{}", source);

    let app = KijijiAutosApp::new(config)?;
    let outcome = app.run(cli.driver_mode()).await;

    // Fatal errors were already logged; the process still ends normally
    if outcome.is_success() {
        info!("Run {} finished", app.run_id());
    }

    Ok(())
}
