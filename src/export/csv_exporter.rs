use csv::WriterBuilder;
use std::path::Path;
use tracing::debug;

use super::InternalExportStats;
use crate::error::ScraperResult;
use crate::scraper::ListingRecord;

/// Column order of the CSV output
pub const CSV_HEADER: [&str; 3] = ["title", "price", "img_url"];

/// Write records as CSV with a fixed header.
///
/// The header is written even when there are no records.
pub async fn export_csv(records: &[ListingRecord], output_path: &Path) -> ScraperResult<InternalExportStats> {
    debug!("Exporting {} records to CSV: {}", records.len(), output_path.display());

    // Headers are written by hand so an empty export still has them
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(output_path)?;

    writer.write_record(CSV_HEADER)?;

    for record in records {
        writer.serialize(record)?;
    }

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
    use tempfile::NamedTempFile;

    fn record(title: &str, price: &str, img_url: &str) -> ListingRecord {
        ListingRecord {
            title: title.to_string(),
            price: price.to_string(),
            img_url: img_url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_csv_export() {
        let records = vec![
            record("2014 Honda Accord", "$9,800", "https://img.example.com/accord.jpg"),
            record("2010 Mini Cooper", "N/A", "N/A"),
        ];

        let temp_file = NamedTempFile::new().unwrap();
        let stats = export_csv(&records, temp_file.path()).await.unwrap();
        assert!(stats.file_size_bytes > 0);

        let contents = std::fs::read_to_string(temp_file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), records.len() + 1);
        assert_eq!(lines[0], "title,price,img_url");
        assert_eq!(lines[1], "2014 Honda Accord,\"$9,800\",https://img.example.com/accord.jpg");
        assert_eq!(lines[2], "2010 Mini Cooper,N/A,N/A");
    }

    #[tokio::test]
    async fn test_empty_csv_has_header() {
        let temp_file = NamedTempFile::new().unwrap();
        export_csv(&[], temp_file.path()).await.unwrap();

        let contents = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(contents.trim_end(), "title,price,img_url");
    }

    #[tokio::test]
    async fn test_csv_reads_back() {
        let records = vec![record("Jeep \"Trail\" Edition", "$22,000", "N/A")];

        let temp_file = NamedTempFile::new().unwrap();
        export_csv(&records, temp_file.path()).await.unwrap();

        let mut reader = csv::Reader::from_path(temp_file.path()).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());

        let parsed: Vec<ListingRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(parsed, records);
    }
}
