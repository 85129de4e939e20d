//! Data
//!
//! Column-oriented tabular datasets loaded from delimited text, with one
//! designated date/time column and every other column typed by inference.
use crate::errors::DriftError;
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Cell values treated as missing, in addition to the empty string.
const MISSING_MARKERS: [&str; 7] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    DateTime,
    Integer,
    Float,
    Text,
}

impl ColumnType {
    /// Integer and float columns.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnType::DateTime => "datetime",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
        };
        f.write_str(s)
    }
}

/// Values of a single column. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    DateTime(Vec<Option<NaiveDateTime>>),
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::DateTime(_) => ColumnType::DateTime,
            ColumnData::Integer(_) => ColumnType::Integer,
            ColumnData::Float(_) => ColumnType::Float,
            ColumnData::Text(_) => ColumnType::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::DateTime(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A column of the same type with no values.
    pub fn empty_like(&self) -> Self {
        match self {
            ColumnData::DateTime(_) => ColumnData::DateTime(Vec::new()),
            ColumnData::Integer(_) => ColumnData::Integer(Vec::new()),
            ColumnData::Float(_) => ColumnData::Float(Vec::new()),
            ColumnData::Text(_) => ColumnData::Text(Vec::new()),
        }
    }
}

/// A named, homogeneously typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            data,
        }
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Finite non-missing values as `f64`, or `None` for non-numeric columns.
    /// NaN and infinities count as missing.
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        match &self.data {
            ColumnData::Integer(v) => Some(v.iter().flatten().map(|&x| x as f64).collect()),
            ColumnData::Float(v) => Some(v.iter().flatten().copied().filter(|x| x.is_finite()).collect()),
            _ => None,
        }
    }

    /// Non-missing values rendered as category labels.
    pub fn category_values(&self) -> Vec<String> {
        match &self.data {
            ColumnData::DateTime(v) => v.iter().flatten().map(|d| d.to_string()).collect(),
            ColumnData::Integer(v) => v.iter().flatten().map(|x| x.to_string()).collect(),
            ColumnData::Float(v) => v
                .iter()
                .flatten()
                .filter(|x| x.is_finite())
                .map(|x| x.to_string())
                .collect(),
            ColumnData::Text(v) => v.iter().flatten().cloned().collect(),
        }
    }
}

/// Ordered collection of equally long named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Build a dataset, checking every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self, DriftError> {
        let rows = columns.first().map(|c| c.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(DriftError::InvalidParameter(
                format!("column {}", bad.name),
                format!("{} rows", rows),
                format!("{} rows", bad.len()),
            ));
        }
        Ok(Dataset { columns, rows })
    }

    /// Load a delimited text file with a header row, parsing `date_column` as date/time.
    pub fn from_csv<P: AsRef<Path>>(path: P, date_column: &str) -> Result<Self, DriftError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| DriftError::io(&name, e))?;
        let dataset = Self::from_reader(BufReader::new(file), date_column, &name)?;
        debug!(
            "Loaded {} with {} rows and {} columns.",
            name,
            dataset.rows(),
            dataset.columns().len()
        );
        Ok(dataset)
    }

    /// Load delimited text from any reader. `source` names the input in errors.
    pub fn from_reader<R: Read>(reader: R, date_column: &str, source: &str) -> Result<Self, DriftError> {
        let parse_err = |reason: String| DriftError::Parse {
            path: source.to_string(),
            reason,
        };
        let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| parse_err(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let date_index = headers
            .iter()
            .position(|h| h == date_column)
            .ok_or_else(|| DriftError::mismatch(date_column, source, "date column not found in header"))?;

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for result in csv_reader.records() {
            let record = result.map_err(|e| parse_err(e.to_string()))?;
            for (col, field) in raw.iter_mut().zip(record.iter()) {
                col.push(field.trim().to_string());
            }
        }

        let mut columns = Vec::with_capacity(headers.len());
        for (i, (name, cells)) in headers.into_iter().zip(raw).enumerate() {
            let data = if i == date_index {
                parse_date_column(&name, &cells).map_err(&parse_err)?
            } else {
                infer_column(&cells)
            };
            columns.push(Column::new(name, data));
        }
        Dataset::new(columns)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Column names and types, in order.
    pub fn schema(&self) -> Vec<(String, ColumnType)> {
        self.columns.iter().map(|c| (c.name.clone(), c.column_type())).collect()
    }

    /// A zero-row dataset with the identical column sequence.
    pub fn empty_like(&self) -> Self {
        Dataset {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.empty_like()))
                .collect(),
            rows: 0,
        }
    }
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

/// Parse a single date or date/time value.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn parse_date_column(name: &str, cells: &[String]) -> Result<ColumnData, String> {
    let mut values = Vec::with_capacity(cells.len());
    for (row, cell) in cells.iter().enumerate() {
        match parse_datetime(cell) {
            Some(dt) => values.push(Some(dt)),
            // Header is line 1.
            None => return Err(format!("value '{}' in column {} at line {} is not a date", cell, name, row + 2)),
        }
    }
    Ok(ColumnData::DateTime(values))
}

fn infer_column(cells: &[String]) -> ColumnData {
    let present = || cells.iter().filter(|c| !is_missing(c));
    if present().all(|c| c.parse::<i64>().is_ok()) && present().next().is_some() {
        return ColumnData::Integer(
            cells
                .iter()
                .map(|c| if is_missing(c) { None } else { c.parse().ok() })
                .collect(),
        );
    }
    if present().all(|c| c.parse::<f64>().is_ok()) {
        return ColumnData::Float(
            cells
                .iter()
                .map(|c| if is_missing(c) { None } else { c.parse().ok() })
                .collect(),
        );
    }
    ColumnData::Text(
        cells
            .iter()
            .map(|c| if is_missing(c) { None } else { Some(c.clone()) })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BIKES: &str = "dteday,season,temp,weathersit\n\
        2011-01-01,1,0.344167,misty\n\
        2011-01-02,1,0.363478,misty\n\
        2011-01-03,1,,clear\n\
        2011-01-04,1,0.2,clear\n";

    #[test]
    fn test_load_infers_types() {
        let data = Dataset::from_reader(BIKES.as_bytes(), "dteday", "bikes").unwrap();
        assert_eq!(data.rows(), 4);
        assert_eq!(
            data.schema(),
            vec![
                ("dteday".to_string(), ColumnType::DateTime),
                ("season".to_string(), ColumnType::Integer),
                ("temp".to_string(), ColumnType::Float),
                ("weathersit".to_string(), ColumnType::Text),
            ]
        );
        let temp = data.column("temp").unwrap();
        assert_eq!(temp.numeric_values().unwrap().len(), 3);
        assert!(data.column("weathersit").unwrap().numeric_values().is_none());
    }

    #[test]
    fn test_non_finite_values_are_dropped() {
        let text = "dteday,temp\n2011-01-01,0.2\n2011-01-02,inf\n2011-01-03,-Infinity\n2011-01-04,0.4\n";
        let data = Dataset::from_reader(text.as_bytes(), "dteday", "bikes").unwrap();
        let temp = data.column("temp").unwrap();
        assert_eq!(temp.column_type(), ColumnType::Float);
        assert_eq!(temp.numeric_values().unwrap(), vec![0.2, 0.4]);
        assert_eq!(temp.category_values(), vec!["0.2".to_string(), "0.4".to_string()]);
    }

    #[test]
    fn test_date_column_values_parse() {
        let data = Dataset::from_reader(BIKES.as_bytes(), "dteday", "bikes").unwrap();
        match &data.column("dteday").unwrap().data {
            ColumnData::DateTime(v) => {
                assert!(v.iter().all(|d| d.is_some()));
                assert_eq!(v[2].unwrap().to_string(), "2011-01-03 00:00:00");
            }
            other => panic!("unexpected column {:?}", other),
        }
    }

    #[test]
    fn test_datetime_formats() {
        assert!(parse_datetime("2011-01-01 10:30:00").is_some());
        assert!(parse_datetime("2011-01-01T10:30:00.250").is_some());
        assert!(parse_datetime("2011/01/01").is_some());
        assert_eq!(parse_datetime("01/31/2011").unwrap().to_string(), "2011-01-31 00:00:00");
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn test_bad_date_is_parse_error() {
        let csv = "dteday,temp\n2011-01-01,0.1\nnot-a-date,0.2\n";
        let err = Dataset::from_reader(csv.as_bytes(), "dteday", "bad").unwrap_err();
        match err {
            DriftError::Parse { reason, .. } => assert!(reason.contains("line 3")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_date_column_is_mismatch() {
        let csv = "day,temp\n2011-01-01,0.1\n";
        let err = Dataset::from_reader(csv.as_bytes(), "dteday", "bad").unwrap_err();
        assert!(matches!(err, DriftError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_ragged_rows_are_parse_errors() {
        let csv = "dteday,temp\n2011-01-01,0.1,9\n";
        let err = Dataset::from_reader(csv.as_bytes(), "dteday", "bad").unwrap_err();
        assert!(matches!(err, DriftError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::from_csv("resources/does_not_exist.csv", "dteday").unwrap_err();
        assert!(matches!(err, DriftError::FileNotFound(_)));
    }

    #[test]
    fn test_from_csv_row_count_matches_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", BIKES).unwrap();
        let data = Dataset::from_csv(file.path(), "dteday").unwrap();
        assert_eq!(data.rows(), BIKES.lines().count() - 1);
    }

    #[test]
    fn test_empty_like_keeps_schema() {
        let data = Dataset::from_reader(BIKES.as_bytes(), "dteday", "bikes").unwrap();
        let empty = data.empty_like();
        assert_eq!(empty.rows(), 0);
        assert_eq!(empty.schema(), data.schema());
        assert!(empty.columns().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_unequal_columns_rejected() {
        let cols = vec![
            Column::new("a", ColumnData::Integer(vec![Some(1), Some(2)])),
            Column::new("b", ColumnData::Integer(vec![Some(1)])),
        ];
        assert!(Dataset::new(cols).is_err());
    }
}
