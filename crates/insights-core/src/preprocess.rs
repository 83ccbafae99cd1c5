//! Normalization of raw cells into typed records.
//!
//! Parses the order date of every row, types the numeric columns and
//! derives the dataset's date bounds.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::load::{Cell, RawTable};
use crate::record::{Column, Record, RecordTable};

/// What to do with rows whose order date cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    /// Fail the whole load.
    #[default]
    Strict,
    /// Drop the row and log a warning.
    SkipInvalid,
}

/// Earliest and latest order date in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    /// Bounds of a table, or `None` when it has no rows.
    pub fn of(table: &RecordTable) -> Option<Self> {
        let mut dates = table.records().iter().map(|r| r.order_date);
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { min, max })
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub table: RecordTable,
    pub bounds: Option<DateBounds>,
    /// Rows dropped under [`DatePolicy::SkipInvalid`].
    pub skipped_rows: usize,
}

const TEXT_DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const TEXT_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse a date written as text in any of the accepted forms.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            TEXT_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Convert a spreadsheet serial day number (1900 date system) to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.trunc() as u64))
}

fn parse_date_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date_text(s),
        Cell::Number(n) => excel_serial_to_date(*n),
        Cell::Empty => None,
    }
}

fn parse_number(cell: &Cell, column: Column, row: usize) -> Result<f64> {
    let value = match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        Cell::Empty | Cell::Date(_) => None,
    };
    value.filter(|v| v.is_finite()).ok_or_else(|| {
        Error::data_load(format!(
            "row {}: column {} is not a number ({})",
            row,
            column.header(),
            cell.to_text()
        ))
    })
}

fn parse_integer(cell: &Cell, column: Column, row: usize) -> Result<i64> {
    let value = parse_number(cell, column, row)?;
    if value.fract() == 0.0 {
        Ok(value as i64)
    } else {
        Err(Error::data_load(format!(
            "row {}: column {} is not a whole number ({})",
            row,
            column.header(),
            value
        )))
    }
}

/// Type every row of a raw table and derive the date bounds.
pub fn normalize(raw: RawTable, policy: DatePolicy) -> Result<Normalized> {
    let index = |column: Column| {
        raw.column_index(column).ok_or_else(|| {
            Error::data_load(format!("missing required column {}", column.header()))
        })
    };
    let positions: Vec<(Column, usize)> = Column::ALL
        .iter()
        .map(|c| index(*c).map(|i| (*c, i)))
        .collect::<Result<_>>()?;
    let pos = |column: Column| -> usize {
        positions
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, i)| *i)
            .unwrap_or_default()
    };
    let extra_positions: Vec<usize> = (0..raw.headers.len())
        .filter(|i| Column::from_header(&raw.headers[*i]).is_none())
        .collect();

    let mut records = Vec::with_capacity(raw.rows.len());
    let mut skipped_rows = 0;

    for (i, row) in raw.rows.iter().enumerate() {
        // data rows start on line 2
        let line = i + 2;
        let date_cell = &row[pos(Column::OrderDate)];
        let Some(order_date) = parse_date_cell(date_cell) else {
            match policy {
                DatePolicy::Strict => {
                    return Err(Error::data_load(format!(
                        "row {}: unparsable Order Date '{}'",
                        line,
                        date_cell.to_text()
                    )));
                }
                DatePolicy::SkipInvalid => {
                    skipped_rows += 1;
                    continue;
                }
            }
        };

        let text = |column: Column| row[pos(column)].to_text();
        records.push(Record {
            order_date,
            region: text(Column::Region),
            state: text(Column::State),
            city: text(Column::City),
            category: text(Column::Category),
            sub_category: text(Column::SubCategory),
            segment: text(Column::Segment),
            sales: parse_number(&row[pos(Column::Sales)], Column::Sales, line)?,
            profit: parse_number(&row[pos(Column::Profit)], Column::Profit, line)?,
            quantity: parse_integer(&row[pos(Column::Quantity)], Column::Quantity, line)?,
            extras: extra_positions.iter().map(|p| row[*p].to_text()).collect(),
        });
    }

    if skipped_rows > 0 {
        tracing::warn!(
            "Skipped {} of {} rows with unparsable Order Date in {}",
            skipped_rows,
            raw.rows.len(),
            raw.source_name
        );
    }

    let table = RecordTable::new(Some(raw.source_name), raw.headers, records);
    let bounds = DateBounds::of(&table);
    if let Some(b) = bounds {
        tracing::debug!("Order dates span {} to {}", b.min, b.max);
    }

    Ok(Normalized {
        table,
        bounds,
        skipped_rows,
    })
}
