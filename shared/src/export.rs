//! CSV export of calculations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::CalculationResult;
use crate::types::fixed2;

pub const GRADE_CSV_HEADER: [&str; 5] = ["Grade", "Boxes", "Rate_per_box", "Gross", "Profit_per_box"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV writer error: {0}")]
    Writer(String),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One CSV line per grade of a calculation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GradeCsvRow {
    #[serde(rename = "Grade")]
    pub grade: String,
    #[serde(rename = "Boxes")]
    pub boxes: u32,
    #[serde(rename = "Rate_per_box")]
    pub rate_per_box: Decimal,
    #[serde(rename = "Gross")]
    pub gross: Decimal,
    #[serde(rename = "Profit_per_box")]
    pub profit_per_box: String,
}

pub fn grade_csv_rows(result: &CalculationResult) -> Vec<GradeCsvRow> {
    result
        .grades
        .iter()
        .map(|g| GradeCsvRow {
            grade: g.note.clone(),
            boxes: g.boxes,
            rate_per_box: g.rate,
            gross: g.gross,
            profit_per_box: fixed2(g.profit_per_box.unwrap_or(Decimal::ZERO)),
        })
        .collect()
}

/// Grade table of a calculation; the header is written even with no grades
pub fn grades_csv(result: &CalculationResult) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(GRADE_CSV_HEADER)?;
    for row in grade_csv_rows(result) {
        wtr.serialize(row)?;
    }
    finish(wtr)
}

/// Render any serializable rows, header taken from the field names
pub fn to_csv<T: Serialize>(rows: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Writer(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// `anar-calculation-{unix_millis}.csv`
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("anar-calculation-{}.csv", at.timestamp_millis())
}
