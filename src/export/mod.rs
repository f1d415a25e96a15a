use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod csv_exporter;
pub mod json_exporter;

use crate::config::ExportConfig;
use crate::error::ScraperResult;
use crate::scraper::ListingRecord;

/// Writes scraped listings to the configured output files
pub struct ExportManager {
    config: ExportConfig,
}

/// Export format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl ExportFormat {
    /// Every run writes these, in this order
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Json, ExportFormat::Csv];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Export statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportStats {
    pub format: ExportFormat,
    pub file_path: PathBuf,
    pub record_count: usize,
    pub file_size_bytes: u64,
    pub export_duration_ms: u64,
}

/// Internal export result
#[derive(Debug)]
pub(crate) struct InternalExportStats {
    pub file_size_bytes: u64,
}

impl ExportManager {
    pub fn new(config: &ExportConfig) -> ScraperResult<Self> {
        std::fs::create_dir_all(&config.output_directory)?;

        Ok(Self {
            config: config.clone(),
        })
    }

    pub fn output_path(&self, format: ExportFormat) -> PathBuf {
        self.config.output_path(format.extension())
    }

    /// Export records to one format
    pub async fn export(&self, records: &[ListingRecord], format: ExportFormat) -> ScraperResult<ExportStats> {
        let output_path = self.output_path(format);
        debug!("Exporting {} records to {} as {}", records.len(), output_path.display(), format);

        let start_time = std::time::Instant::now();

        let stats = match format {
            ExportFormat::Json => json_exporter::export_json(records, &output_path).await?,
            ExportFormat::Csv => csv_exporter::export_csv(records, &output_path).await?,
        };

        info!("Saved {} listings to {}", records.len(), display_name(&output_path));

        Ok(ExportStats {
            format,
            file_path: output_path,
            record_count: records.len(),
            file_size_bytes: stats.file_size_bytes,
            export_duration_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Export records to every format. The first failure aborts the rest.
    pub async fn export_all(&self, records: &[ListingRecord]) -> ScraperResult<Vec<ExportStats>> {
        let mut all_stats = Vec::with_capacity(ExportFormat::ALL.len());

        for format in ExportFormat::ALL {
            all_stats.push(self.export(records, format).await?);
        }

        Ok(all_stats)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
