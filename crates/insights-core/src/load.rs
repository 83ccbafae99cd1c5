//! Dataset loading from CSV and spreadsheet files.
//!
//! Loading only reads cells and checks the header; typing the cells into
//! [`Record`](crate::record::Record)s is the preprocessor's job.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{Data, DataType, Reader, Xls, Xlsx};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::Column;

/// Supported dataset file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFormat {
    Csv,
    Xlsx,
    Xls,
}

impl DatasetFormat {
    /// File extensions accepted by the upload control.
    pub const EXTENSIONS: [&'static str; 3] = ["csv", "xlsx", "xls"];

    /// Detect the format from a file name's extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(DatasetFormat::Csv),
            Some("xlsx") => Ok(DatasetFormat::Xlsx),
            Some("xls") => Ok(DatasetFormat::Xls),
            _ => Err(Error::UnsupportedFormat(name.to_string())),
        }
    }
}

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// A remote file; must be fetched into an [`DatasetSource::Upload`] first.
    Url(String),
    /// File contents supplied by the user.
    Upload { file_name: String, bytes: Vec<u8> },
}

impl DatasetSource {
    /// Interpret a configured location: `http(s)://` is a URL, anything else a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DatasetSource::Url(location.to_string())
        } else {
            DatasetSource::Path(PathBuf::from(location))
        }
    }

    /// File name used for format detection and display.
    pub fn file_name(&self) -> String {
        match self {
            DatasetSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            DatasetSource::Url(url) => url_file_name(url).to_string(),
            DatasetSource::Upload { file_name, .. } => file_name.clone(),
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSource::Path(path) => write!(f, "{}", path.display()),
            DatasetSource::Url(url) => f.write_str(url),
            DatasetSource::Upload { file_name, .. } => write!(f, "upload {file_name}"),
        }
    }
}

/// Last path segment of a URL, without query string or fragment.
pub fn url_file_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

/// A single untyped cell as read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Text form of the cell, used for string columns and pass-through values.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => match data.as_date() {
                Some(date) => Cell::Date(date),
                None => Cell::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => match data.as_date() {
                Some(date) => Cell::Date(date),
                None => Cell::Text(s.clone()),
            },
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Text(format!("#{e:?}")),
        }
    }
}

/// Header plus untyped rows, straight from the file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Display name of the source (file name).
    pub source_name: String,
    /// Header names, trimmed, in file order.
    pub headers: Vec<String>,
    /// Data rows; every row has exactly `headers.len()` cells.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Index of a required column in the header.
    pub fn column_index(&self, column: Column) -> Option<usize> {
        self.headers.iter().position(|h| h == column.header())
    }
}

/// Load a dataset from a local path or uploaded bytes.
///
/// URL sources must be fetched by the caller first; they fail here with
/// [`Error::DataLoad`].
pub fn load(source: &DatasetSource) -> Result<RawTable> {
    match source {
        DatasetSource::Path(path) => {
            let name = source.file_name();
            let format = DatasetFormat::from_file_name(&name)?;
            let bytes = std::fs::read(path).map_err(|e| {
                Error::data_load(format!("cannot read {}: {}", path.display(), e))
            })?;
            tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
            load_with_format(&name, format, bytes)
        }
        DatasetSource::Upload { file_name, bytes } => load_bytes(file_name, bytes.clone()),
        DatasetSource::Url(url) => Err(Error::data_load(format!(
            "remote dataset {url} has not been fetched"
        ))),
    }
}

/// Load a dataset from in-memory file contents, detecting the format from the name.
pub fn load_bytes(file_name: &str, bytes: Vec<u8>) -> Result<RawTable> {
    let format = DatasetFormat::from_file_name(file_name)?;
    load_with_format(file_name, format, bytes)
}

fn load_with_format(name: &str, format: DatasetFormat, bytes: Vec<u8>) -> Result<RawTable> {
    let (headers, rows) = match format {
        DatasetFormat::Csv => read_csv(&bytes)?,
        DatasetFormat::Xlsx => {
            let workbook = Xlsx::new(Cursor::new(bytes))
                .map_err(|e| Error::data_load(format!("{name}: {e}")))?;
            read_workbook(name, workbook)?
        }
        DatasetFormat::Xls => {
            let workbook = Xls::new(Cursor::new(bytes))
                .map_err(|e| Error::data_load(format!("{name}: {e}")))?;
            read_workbook(name, workbook)?
        }
    };

    let table = RawTable {
        source_name: name.to_string(),
        headers,
        rows,
    };
    check_required_columns(&table)?;

    tracing::info!(
        "Loaded {} rows x {} columns from {} ({:?})",
        table.rows.len(),
        table.headers.len(),
        name,
        format
    );
    Ok(table)
}

fn read_csv(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<Cell>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::data_load(format!("malformed CSV header: {e}")))?
        .iter()
        .map(clean_header)
        .collect();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let record =
            record.map_err(|e| Error::data_load(format!("malformed CSV row {}: {e}", i + 2)))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok((headers, rows))
}

fn read_workbook<R, RS>(name: &str, mut workbook: R) -> Result<(Vec<String>, Vec<Vec<Cell>>)>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::data_load(format!("{name}: workbook has no worksheets")))?
        .map_err(|e| Error::data_load(format!("{name}: {e}")))?;

    let mut rows = range
        .rows()
        .skip_while(|row| row.iter().all(|c| matches!(c, Data::Empty)));

    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|c| clean_header(&Cell::from(c).to_text()))
            .collect(),
        None => return Err(Error::data_load(format!("{name}: first worksheet is empty"))),
    };

    let body = rows
        .filter(|row| !row.iter().all(|c| matches!(c, Data::Empty)))
        .map(|row| {
            let mut cells: Vec<Cell> = row.iter().map(Cell::from).collect();
            cells.resize(headers.len(), Cell::Empty);
            cells
        })
        .collect();

    Ok((headers, body))
}

fn clean_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

fn check_required_columns(table: &RawTable) -> Result<()> {
    let missing: Vec<&str> = Column::ALL
        .iter()
        .filter(|c| table.column_index(**c).is_none())
        .map(|c| c.header())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::data_load(format!(
            "{} is missing required columns: {}",
            table.source_name,
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Order Date,Region,State,City,Category,Sub-Category,Segment,Sales,Profit,Quantity";

    #[test]
    fn test_format_detection() {
        assert_eq!(DatasetFormat::from_file_name("a.csv").unwrap(), DatasetFormat::Csv);
        assert_eq!(DatasetFormat::from_file_name("B.XLSX").unwrap(), DatasetFormat::Xlsx);
        assert_eq!(DatasetFormat::from_file_name("c.xls").unwrap(), DatasetFormat::Xls);
        assert!(matches!(
            DatasetFormat::from_file_name("d.json"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            DatasetFormat::from_file_name("no_extension"),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            DatasetSource::parse("https://example.com/data/superstore.csv?x=1"),
            DatasetSource::Url("https://example.com/data/superstore.csv?x=1".to_string())
        );
        assert_eq!(
            DatasetSource::parse(" data/superstore.csv "),
            DatasetSource::Path(PathBuf::from("data/superstore.csv"))
        );
        assert_eq!(
            DatasetSource::parse("https://example.com/data/superstore.csv?x=1").file_name(),
            "superstore.csv"
        );
    }

    #[test]
    fn test_load_csv_bytes() {
        let csv = format!(
            "\u{feff}{HEADER},Order ID\n2023-01-05,East,New York,New York City,Tech,Phones,Consumer,100,10,2,CA-1\n"
        );
        let table = load_bytes("sales.csv", csv.into_bytes()).unwrap();
        assert_eq!(table.headers[0], "Order Date");
        assert_eq!(table.headers[10], "Order ID");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][1], Cell::Text("East".to_string()));
        assert_eq!(table.column_index(Column::Quantity), Some(9));
    }

    #[test]
    fn test_missing_columns() {
        let csv = "Order Date,Region\n2023-01-05,East\n";
        let err = load_bytes("sales.csv", csv.as_bytes().to_vec()).unwrap_err();
        match err {
            Error::DataLoad(msg) => {
                assert!(msg.contains("State"));
                assert!(msg.contains("Quantity"));
                assert!(!msg.contains("Region,"));
            }
            other => panic!("expected DataLoad, got {other:?}"),
        }
    }

    #[test]
    fn test_ragged_csv_is_data_load_error() {
        let csv = format!("{HEADER}\n2023-01-05,East\n");
        assert!(matches!(
            load_bytes("sales.csv", csv.into_bytes()),
            Err(Error::DataLoad(_))
        ));
    }

    #[test]
    fn test_garbage_spreadsheet_is_data_load_error() {
        let result = load_bytes("sales.xlsx", b"definitely not a zip archive".to_vec());
        assert!(matches!(result, Err(Error::DataLoad(_))));
    }

    #[test]
    fn test_missing_file() {
        let source = DatasetSource::Path(PathBuf::from("/nonexistent/superstore.csv"));
        assert!(matches!(load(&source), Err(Error::DataLoad(_))));
    }

    #[test]
    fn test_unfetched_url() {
        let source = DatasetSource::Url("https://example.com/s.csv".to_string());
        assert!(matches!(load(&source), Err(Error::DataLoad(_))));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(Cell::Number(42.0).to_text(), "42");
        assert_eq!(Cell::Number(2.5).to_text(), "2.5");
        assert!(Cell::Text("  ".to_string()).is_empty());
    }
}
