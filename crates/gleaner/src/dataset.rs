// ABOUTME: Persistence helpers for collected records: CSV export and reload, run summary, sample profile.
// ABOUTME: Also validates persisted records for missing required fields, reporting row numbers.

//! Dataset persistence.
//!
//! Records are flattened to one CSV row each with the columns
//! `url,title,content,date,images,timestamp`. Image URLs are joined by a
//! single space, which never occurs inside a resolved URL. Files are written
//! with a UTF-8 byte order mark so spreadsheet tools pick the right encoding.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::GleanError;
use crate::options::MAX_TITLE_DISPLAY;
use crate::record::ScrapedRecord;
use crate::text::truncate_display;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Flat CSV form of a record.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    url: String,
    title: String,
    content: String,
    date: String,
    images: String,
    timestamp: String,
}

impl From<&ScrapedRecord> for CsvRow {
    fn from(r: &ScrapedRecord) -> Self {
        Self {
            url: r.url.clone(),
            title: r.title.clone(),
            content: r.content.clone(),
            date: r.date.clone(),
            images: r.images.join(" "),
            timestamp: r.timestamp.clone(),
        }
    }
}

impl From<CsvRow> for ScrapedRecord {
    fn from(row: CsvRow) -> Self {
        Self {
            url: row.url,
            title: row.title,
            content: row.content,
            date: row.date,
            images: row.images.split_whitespace().map(str::to_string).collect(),
            timestamp: row.timestamp,
        }
    }
}

fn export_err(path: &str, op: &str, e: impl Into<anyhow::Error>) -> GleanError {
    GleanError::export(path, op, Some(e.into()))
}

/// Writes records as CSV (with header and BOM) to any writer.
pub fn write_csv<W: Write>(records: &[ScrapedRecord], mut out: W) -> Result<(), GleanError> {
    out.write_all(UTF8_BOM)
        .map_err(|e| export_err("", "WriteCsv", e))?;
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer
            .serialize(CsvRow::from(record))
            .map_err(|e| export_err("", "WriteCsv", e))?;
    }
    writer.flush().map_err(|e| export_err("", "WriteCsv", e))?;
    Ok(())
}

/// Saves records to a CSV file. Saving nothing is an error.
pub fn export_csv(records: &[ScrapedRecord], path: impl AsRef<Path>) -> Result<(), GleanError> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    if records.is_empty() {
        return Err(GleanError::export(
            shown,
            "ExportCsv",
            Some(anyhow::anyhow!("no data to save")),
        ));
    }
    let file = File::create(path).map_err(|e| export_err(&shown, "ExportCsv", e))?;
    write_csv(records, BufWriter::new(file)).map_err(|mut e| {
        e.url = shown.clone();
        e
    })?;
    tracing::info!(path = %shown, rows = records.len(), "records exported");
    Ok(())
}

/// Loads records previously written by [`export_csv`].
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<ScrapedRecord>, GleanError> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(GleanError::export(
            shown,
            "LoadCsv",
            Some(anyhow::anyhow!("file not found")),
        ));
    }
    let bytes = fs::read(path).map_err(|e| export_err(&shown, "LoadCsv", e))?;
    let data = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

    let mut reader = csv::Reader::from_reader(data);
    let records = reader
        .deserialize::<CsvRow>()
        .map(|row| row.map(ScrapedRecord::from))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| export_err(&shown, "LoadCsv", e))?;
    tracing::info!(path = %shown, rows = records.len(), "records loaded");
    Ok(records)
}

/// Writes key/value rows as a two-column CSV.
pub fn write_key_values<W: Write>(
    rows: &[(&str, String)],
    header: (&str, &str),
    out: W,
) -> Result<(), GleanError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([header.0, header.1])
        .map_err(|e| export_err("", "WriteKeyValues", e))?;
    for (key, value) in rows {
        writer
            .write_record([*key, value.as_str()])
            .map_err(|e| export_err("", "WriteKeyValues", e))?;
    }
    writer
        .flush()
        .map_err(|e| export_err("", "WriteKeyValues", e))?;
    Ok(())
}

/// Counts for one run, with the time the summary was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub generated_date: String,
    pub generated_time: String,
}

impl RunSummary {
    pub fn new(total: usize, succeeded: usize, at: DateTime<Local>) -> Self {
        Self {
            total,
            succeeded,
            failed: total.saturating_sub(succeeded),
            generated_date: at.format("%Y-%m-%d").to_string(),
            generated_time: at.format("%H:%M:%S").to_string(),
        }
    }

    /// Summary of already persisted records, where a record without a title counts as failed.
    pub fn from_records(records: &[ScrapedRecord], at: DateTime<Local>) -> Self {
        let succeeded = records.iter().filter(|r| !r.title.is_empty()).count();
        Self::new(records.len(), succeeded, at)
    }

    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total URLs", self.total.to_string()),
            ("Succeeded", self.succeeded.to_string()),
            ("Failed", self.failed.to_string()),
            ("Generated on", self.generated_date.clone()),
            ("Generated at", self.generated_time.clone()),
        ]
    }
}

/// Shape of a data set, taken from its first record and averages over all records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleProfile {
    pub sample_url: String,
    pub sample_title: String,
    pub avg_content_chars: usize,
    pub avg_images: usize,
    pub timestamp_format: &'static str,
}

impl SampleProfile {
    /// `None` for an empty data set.
    pub fn from_records(records: &[ScrapedRecord]) -> Option<Self> {
        let first = records.first()?;
        let n = records.len();
        let content_chars: usize = records.iter().map(|r| r.content.chars().count()).sum();
        let images: usize = records.iter().map(|r| r.images.len()).sum();
        Some(Self {
            sample_url: first.url.clone(),
            sample_title: truncate_display(&first.title, MAX_TITLE_DISPLAY),
            avg_content_chars: content_chars / n,
            avg_images: images / n,
            timestamp_format: "YYYY-MM-DD HH:MM:SS",
        })
    }

    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Sample URL", self.sample_url.clone()),
            ("Sample title", self.sample_title.clone()),
            (
                "Average content length",
                format!("{} chars", self.avg_content_chars),
            ),
            ("Average image count", format!("{} images", self.avg_images)),
            ("Timestamp format", self.timestamp_format.to_string()),
        ]
    }
}

/// Writes the run summary and, when there is data, the sample profile as one key/value CSV.
pub fn export_summary(
    summary: &RunSummary,
    profile: Option<&SampleProfile>,
    path: impl AsRef<Path>,
) -> Result<(), GleanError> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    let mut rows = summary.rows();
    if let Some(profile) = profile {
        rows.extend(profile.rows());
    }
    let file = File::create(path).map_err(|e| export_err(&shown, "ExportSummary", e))?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM)
        .map_err(|e| export_err(&shown, "ExportSummary", e))?;
    write_key_values(&rows, ("Field", "Value"), out).map_err(|mut e| {
        e.url = shown.clone();
        e
    })
}

/// A required field a persisted record can be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Url,
    Title,
    Content,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequiredField::Url => "URL",
            RequiredField::Title => "title",
            RequiredField::Content => "content",
        };
        write!(f, "{}", s)
    }
}

/// One problem found while validating records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    NoData,
    /// `row` is 1-based.
    MissingField { row: usize, field: RequiredField },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::NoData => write!(f, "no data"),
            ValidationIssue::MissingField { row, field } => {
                write!(f, "row {}: missing {}", row, field)
            }
        }
    }
}

/// Result of [`validate_records`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    /// Rows that carry a URL.
    pub valid_count: usize,
    pub total_count: usize,
}

/// Checks every record for a URL, title and content. Never fails.
pub fn validate_records(records: &[ScrapedRecord]) -> ValidationReport {
    if records.is_empty() {
        return ValidationReport {
            valid: false,
            issues: vec![ValidationIssue::NoData],
            valid_count: 0,
            total_count: 0,
        };
    }

    let mut issues = Vec::new();
    let mut valid_count = 0;
    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        if record.url.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                row,
                field: RequiredField::Url,
            });
        } else {
            valid_count += 1;
        }
        if record.title.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                row,
                field: RequiredField::Title,
            });
        }
        if record.content.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                row,
                field: RequiredField::Content,
            });
        }
    }

    ValidationReport {
        valid: issues.is_empty(),
        issues,
        valid_count,
        total_count: records.len(),
    }
}
