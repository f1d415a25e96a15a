use serde_json::to_writer_pretty;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use super::InternalExportStats;
use crate::error::ScraperResult;
use crate::scraper::ListingRecord;

/// Write records as a pretty-printed JSON array.
///
/// Two-space indentation; non-ASCII text is written as-is, not escaped.
pub async fn export_json(records: &[ListingRecord], output_path: &Path) -> ScraperResult<InternalExportStats> {
    debug!("Exporting {} records to JSON: {}", records.len(), output_path.display());

    let mut writer = BufWriter::new(File::create(output_path)?);
    to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    drop(writer);

    let file_size = tokio::fs::metadata(output_path).await?.len();

    Ok(InternalExportStats {
        file_size_bytes: file_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_json_export_keys() {
        let records = vec![ListingRecord {
            title: "2019 Toyota Yaris".to_string(),
            price: "$14,000".to_string(),
            img_url: "https://img.example.com/yaris.jpg".to_string(),
        }];

        let temp_file = NamedTempFile::new().unwrap();
        let stats = export_json(&records, temp_file.path()).await.unwrap();
        assert!(stats.file_size_bytes > 0);

        let contents = std::fs::read_to_string(temp_file.path()).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), 1);

        let keys: Vec<&String> = parsed[0].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        for key in ["title", "price", "img_url"] {
            assert!(parsed[0].get(key).is_some(), "missing key {}", key);
        }
    }

    #[tokio::test]
    async fn test_json_export_formatting() {
        let records = vec![ListingRecord {
            title: "Mazda CX-3 · Très propre".to_string(),
            price: "12 500 $".to_string(),
            img_url: "N/A".to_string(),
        }];

        let temp_file = NamedTempFile::new().unwrap();
        export_json(&records, temp_file.path()).await.unwrap();

        let contents = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(contents.contains("Très propre"));
        assert!(!contents.contains("\\u"));
        assert!(contents.starts_with("[\n  {\n    \"title\""));
    }

    #[tokio::test]
    async fn test_empty_json_export() {
        let temp_file = NamedTempFile::new().unwrap();
        export_json(&[], temp_file.path()).await.unwrap();

        let contents = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(contents, "[]");
    }
}
