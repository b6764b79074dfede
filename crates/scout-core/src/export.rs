//! CSV and JSON export of search results, plus CSV import.
//!
//! Absent fields are written as [`NOT_SPECIFIED`] so every row carries
//! every column; reading a CSV back maps the placeholder to `None`.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::JobListing;

/// Written in place of any absent field.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Output format, picked from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(AppError::ExportError(format!(
                "Unsupported export file {}: use a .csv or .json extension",
                path.display()
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "URL")]
    url: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Requirements")]
    requirements: String,
    #[serde(rename = "Experience Level")]
    experience_level: String,
    #[serde(rename = "Relevance Score")]
    relevance_score: String,
}

fn or_placeholder(value: Option<&str>) -> String {
    value.unwrap_or(NOT_SPECIFIED).to_string()
}

fn from_placeholder(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == NOT_SPECIFIED {
        None
    } else {
        Some(value)
    }
}

impl From<&JobListing> for CsvRow {
    fn from(listing: &JobListing) -> Self {
        Self {
            title: listing.title.clone(),
            url: or_placeholder(listing.url.as_deref()),
            location: or_placeholder(listing.location.as_deref()),
            description: listing.description.clone(),
            requirements: or_placeholder(listing.requirements.as_deref()),
            experience_level: or_placeholder(listing.experience_level.as_deref()),
            relevance_score: listing
                .relevance_score
                .map(|s| s.to_string())
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        }
    }
}

impl TryFrom<CsvRow> for JobListing {
    type Error = AppError;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let relevance_score = match from_placeholder(row.relevance_score) {
            Some(raw) => Some(raw.trim().parse::<u8>().map_err(|_| {
                AppError::ExportError(format!("Invalid relevance score '{raw}'"))
            })?),
            None => None,
        };
        Ok(JobListing {
            title: row.title,
            url: from_placeholder(row.url),
            location: from_placeholder(row.location),
            description: row.description,
            requirements: from_placeholder(row.requirements),
            experience_level: from_placeholder(row.experience_level),
            relevance_score,
        })
    }
}

/// Write listings as CSV with a header row.
pub fn write_csv<W: Write>(listings: &[JobListing], writer: W) -> Result<(), AppError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for listing in listings {
        csv_writer.serialize(CsvRow::from(listing))?;
    }
    csv_writer
        .flush()
        .map_err(|e| AppError::ExportError(e.to_string()))?;
    Ok(())
}

/// Read listings written by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<JobListing>, AppError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<CsvRow>()
        .map(|row| JobListing::try_from(row?))
        .collect()
}

pub fn export_csv(path: &Path, listings: &[JobListing]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::ExportError(format!("Failed to create {}: {e}", path.display()))
    })?;
    write_csv(listings, file)?;
    tracing::info!(path = %path.display(), count = listings.len(), "Exported listings to CSV");
    Ok(())
}

pub fn import_csv(path: &Path) -> Result<Vec<JobListing>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::ExportError(format!("Failed to open {}: {e}", path.display())))?;
    read_csv(file)
}

/// JSON export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonExport {
    pub generated_at: DateTime<Utc>,
    pub company: String,
    pub career_url: Option<String>,
    pub job_listings: Vec<JobListing>,
}

impl JsonExport {
    pub fn new(company: &str, career_url: Option<&str>, listings: &[JobListing]) -> Self {
        Self {
            generated_at: Utc::now(),
            company: company.to_string(),
            career_url: career_url.map(str::to_string),
            job_listings: listings.to_vec(),
        }
    }
}

pub fn export_json(path: &Path, document: &JsonExport) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::ExportError(format!("Failed to create {}: {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, document)?;
    tracing::info!(
        path = %path.display(),
        count = document.job_listings.len(),
        "Exported listings to JSON"
    );
    Ok(())
}

/// Export to `path`, choosing the format from its extension.
pub fn export_to_path(
    path: &Path,
    company: &str,
    career_url: Option<&str>,
    listings: &[JobListing],
) -> Result<ExportFormat, AppError> {
    let format = ExportFormat::from_path(path)?;
    match format {
        ExportFormat::Csv => export_csv(path, listings)?,
        ExportFormat::Json => export_json(path, &JsonExport::new(company, career_url, listings))?,
    }
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_listing() -> JobListing {
        JobListing {
            title: "Rust Engineer".into(),
            url: Some("https://acme.com/jobs/1".into()),
            location: Some("Berlin, Germany".into()),
            description: "Build the \"core\" platform".into(),
            requirements: Some("Rust, Tokio".into()),
            experience_level: Some("Senior".into()),
            relevance_score: Some(6),
        }
    }

    #[test]
    fn test_csv_round_trip_preserves_fields() {
        let sparse = JobListing::new("Designer", "Draws things");
        let listings = vec![full_listing(), sparse];

        let mut buf = Vec::new();
        write_csv(&listings, &mut buf).unwrap();
        let back = read_csv(buf.as_slice()).unwrap();

        assert_eq!(back, listings);
    }

    #[test]
    fn test_absent_fields_written_as_placeholder() {
        let mut buf = Vec::new();
        write_csv(&[JobListing::new("Designer", "Draws things")], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("Title,URL,Location,Description,Requirements,Experience Level,Relevance Score")
        );
        assert_eq!(
            lines.next(),
            Some(
                "Designer,Not specified,Not specified,Draws things,Not specified,Not specified,Not specified"
            )
        );
    }

    #[test]
    fn test_bad_score_is_export_error() {
        let csv = "Title,URL,Location,Description,Requirements,Experience Level,Relevance Score\n\
                   A,Not specified,Not specified,d,Not specified,Not specified,eleventy\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::ExportError(_)));
    }

    #[test]
    fn test_export_to_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let listings = vec![full_listing()];

        let csv_path = dir.path().join("jobs.csv");
        assert_eq!(
            export_to_path(&csv_path, "Acme", None, &listings).unwrap(),
            ExportFormat::Csv
        );
        assert_eq!(import_csv(&csv_path).unwrap(), listings);

        let json_path = dir.path().join("jobs.JSON");
        export_to_path(&json_path, "Acme", Some("https://acme.com/careers"), &listings).unwrap();
        let doc: JsonExport =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(doc.company, "Acme");
        assert_eq!(doc.career_url.as_deref(), Some("https://acme.com/careers"));
        assert_eq!(doc.job_listings, listings);

        let err = export_to_path(&dir.path().join("jobs.txt"), "Acme", None, &listings)
            .unwrap_err();
        assert!(err.to_string().contains(".csv or .json"));
    }
}
