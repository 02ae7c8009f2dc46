//! CSV loaders for the sales fact table and time dimension

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::{ColumnNames, DataSources};
use crate::error::{Error, Result};
use crate::models::{SaleRecord, TimeRecord};

/// Raw inputs as loaded from disk
#[derive(Debug, Clone, Default)]
pub struct RawData {
    pub sales: Vec<SaleRecord>,
    pub time: Vec<TimeRecord>,
}

/// Locate a column by header name (whitespace-insensitive at the edges)
fn column_index(headers: &StringRecord, name: &str, table: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| {
            Error::DataLoad(format!(
                "{} table has no '{}' column (found: {})",
                table,
                name,
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
}

fn csv_error(table: &str, e: csv::Error) -> Error {
    Error::DataLoad(format!("Malformed {} CSV: {}", table, e))
}

/// Parse the sales fact table
pub fn load_sales<R: Read>(reader: R, columns: &ColumnNames) -> Result<Vec<SaleRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| csv_error("sales", e))?.clone();
    let key_idx = column_index(&headers, &columns.date_key, "sales")?;
    let revenue_idx = column_index(&headers, &columns.revenue, "sales")?;

    let mut sales = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| csv_error("sales", e))?;
        // Row numbers are 1-based and skip the header line
        let line = row + 2;

        let date_key = record
            .get(key_idx)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::DataLoad(format!("sales row {}: missing date key", line)))?;

        let revenue_str = record
            .get(revenue_idx)
            .ok_or_else(|| Error::DataLoad(format!("sales row {}: missing revenue", line)))?;
        let revenue = parse_amount(revenue_str)
            .map_err(|e| Error::DataLoad(format!("sales row {}: {}", line, e)))?;

        sales.push(SaleRecord { date_key, revenue });
    }

    debug!("Parsed {} sales records", sales.len());
    Ok(sales)
}

/// Parse the time dimension table
pub fn load_time_dimension<R: Read>(reader: R, columns: &ColumnNames) -> Result<Vec<TimeRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| csv_error("time", e))?.clone();
    let key_idx = column_index(&headers, &columns.date_key, "time")?;
    let date_idx = column_index(&headers, &columns.calendar_date, "time")?;

    let mut rows = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| csv_error("time", e))?;
        let line = row + 2;

        let date_key = record
            .get(key_idx)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::DataLoad(format!("time row {}: missing date key", line)))?;

        let date_str = record
            .get(date_idx)
            .ok_or_else(|| Error::DataLoad(format!("time row {}: missing date", line)))?;
        let date = parse_date(date_str)
            .map_err(|e| Error::DataLoad(format!("time row {}: {}", line, e)))?;

        rows.push(TimeRecord { date_key, date });
    }

    debug!("Parsed {} time dimension records", rows.len());
    Ok(rows)
}

fn open(path: &Path, table: &str) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| {
        Error::DataLoad(format!(
            "Unable to open {} file {}: {}",
            table,
            path.display(),
            e
        ))
    })?;
    Ok(BufReader::new(file))
}

/// Load both tables from the configured paths
pub fn load_sources(sources: &DataSources) -> Result<RawData> {
    let sales = load_sales(open(&sources.sales_path, "sales")?, &sources.columns)?;
    let time = load_time_dimension(open(&sources.time_path, "time")?, &sources.columns)?;
    Ok(RawData { sales, time })
}

/// SHA-256 over both input files, identifying a dataset
pub fn fingerprint(sources: &DataSources) -> Result<String> {
    let mut hasher = Sha256::new();
    for (path, table) in [(&sources.sales_path, "sales"), (&sources.time_path, "time")] {
        let mut reader = open(path, table)?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        // Length prefix keeps the two files from running together
        hasher.update((buf.len() as u64).to_be_bytes());
        hasher.update(&buf);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Parse a calendar date in any of the commonly exported layouts
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    // Four-digit year layouts first; `%Y` also accepts "24", so short
    // years are rejected here and left to the `%y` layouts below
    let long_year_formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%d/%m/%Y", // 15/01/2024 (European)
        "%d-%m-%Y", // 15-01-2024
    ];

    for fmt in long_year_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if has_long_year(date) {
                return Ok(date);
            }
        }
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            if has_long_year(dt.date()) {
                return Ok(dt.date());
            }
        }
    }

    let short_year_formats = [
        "%m/%d/%y", // 01/15/24
        "%d/%m/%y", // 15/01/24
        "%d-%m-%y", // 15-01-24
    ];

    for fmt in short_year_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::DataLoad(format!("Unable to parse date: {}", s)))
}

fn has_long_year(date: NaiveDate) -> bool {
    date.year() >= 1000
}

/// Parse a revenue amount, tolerating currency symbols and thousands separators
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', '€', '£', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    let amount = cleaned
        .parse::<f64>()
        .map_err(|_| Error::DataLoad(format!("Unable to parse amount: {}", s)))?;

    if !amount.is_finite() {
        return Err(Error::DataLoad(format!("Amount is not finite: {}", s)));
    }
    Ok(amount)
}
