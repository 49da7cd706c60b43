use super::{StatisticsData, TimeRange};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while serializing or writing an export artifact
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    timestamp: String,
    time_range: TimeRange,
    statistics: &'a StatisticsData,
}

/// Two-section CSV: colors, a blank line, then the hourly series
pub fn export_csv(data: &StatisticsData) -> Result<String, ExportError> {
    let mut colors = csv::Writer::from_writer(Vec::new());
    colors.write_record(["Color", "Count", "Percentage"])?;
    for item in &data.cubes_by_color {
        colors.write_record([
            item.color.clone(),
            item.count.to_string(),
            format!("{}%", item.percentage),
        ])?;
    }

    let mut hourly = csv::Writer::from_writer(Vec::new());
    hourly.write_record(["Hour", "Cubes", "Efficiency"])?;
    for item in &data.hourly_data {
        hourly.write_record([
            item.hour.clone(),
            item.cubes.to_string(),
            format!("{}%", item.efficiency),
        ])?;
    }

    let mut bytes = finish(colors)?;
    bytes.push(b'\n');
    bytes.extend(finish(hourly)?);
    Ok(String::from_utf8(bytes)?)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))
}

/// Pretty-printed `{timestamp, timeRange, statistics}` document
pub fn export_json(
    data: &StatisticsData,
    range: TimeRange,
    timestamp: DateTime<Utc>,
) -> Result<String, ExportError> {
    let document = ExportDocument {
        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        time_range: range,
        statistics: data,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Download name of an export artifact
pub fn export_file_name(range: TimeRange, format: ExportFormat) -> String {
    format!("cube-sorting-statistics-{}.{}", range.as_str(), format.extension())
}

/// Write an export artifact into `dir` and return its path
pub fn export_to_path(
    dir: impl AsRef<Path>,
    data: &StatisticsData,
    range: TimeRange,
    format: ExportFormat,
    timestamp: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    let contents = match format {
        ExportFormat::Csv => export_csv(data)?,
        ExportFormat::Json => export_json(data, range, timestamp)?,
    };
    let path = dir.as_ref().join(export_file_name(range, format));
    std::fs::write(&path, contents)?;
    Ok(path)
}
