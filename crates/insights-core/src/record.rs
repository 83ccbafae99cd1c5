//! The record table: the in-memory sales dataset.
//!
//! A [`RecordTable`] is built once per session (from the fallback dataset or
//! an upload) and never mutated afterwards. Everything downstream borrows it.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Columns every dataset must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    OrderDate,
    Region,
    State,
    City,
    Category,
    SubCategory,
    Segment,
    Sales,
    Profit,
    Quantity,
}

impl Column {
    /// All required columns, in canonical order.
    pub const ALL: [Column; 10] = [
        Column::OrderDate,
        Column::Region,
        Column::State,
        Column::City,
        Column::Category,
        Column::SubCategory,
        Column::Segment,
        Column::Sales,
        Column::Profit,
        Column::Quantity,
    ];

    /// Header text as it appears in the source file.
    pub fn header(self) -> &'static str {
        match self {
            Column::OrderDate => "Order Date",
            Column::Region => "Region",
            Column::State => "State",
            Column::City => "City",
            Column::Category => "Category",
            Column::SubCategory => "Sub-Category",
            Column::Segment => "Segment",
            Column::Sales => "Sales",
            Column::Profit => "Profit",
            Column::Quantity => "Quantity",
        }
    }

    /// Look up a required column by its header text.
    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.header() == header)
    }

    /// Whether the column holds a number.
    pub fn is_numeric(self) -> bool {
        matches!(self, Column::Sales | Column::Profit | Column::Quantity)
    }
}

/// Categorical dimension a view can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Region,
    State,
    City,
    Category,
    SubCategory,
    Segment,
    /// Calendar month of the order date, labeled `YYYY-MM`.
    Month,
}

impl Dimension {
    /// Display label for charts and tables.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::State => "State",
            Dimension::City => "City",
            Dimension::Category => "Category",
            Dimension::SubCategory => "Sub-Category",
            Dimension::Segment => "Segment",
            Dimension::Month => "Month-Year",
        }
    }
}

/// Numeric column that can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Sales,
    Profit,
    Quantity,
}

impl Measure {
    pub fn label(self) -> &'static str {
        match self {
            Measure::Sales => "Sales",
            Measure::Profit => "Profit",
            Measure::Quantity => "Quantity",
        }
    }
}

/// One row of the sales dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub order_date: NaiveDate,
    pub region: String,
    pub state: String,
    pub city: String,
    pub category: String,
    pub sub_category: String,
    pub segment: String,
    pub sales: f64,
    pub profit: f64,
    pub quantity: i64,
    /// Values of the pass-through columns, in header order.
    pub extras: Vec<String>,
}

impl Record {
    /// Grouping key for a dimension.
    pub fn dimension(&self, dimension: Dimension) -> Cow<'_, str> {
        match dimension {
            Dimension::Region => Cow::Borrowed(&self.region),
            Dimension::State => Cow::Borrowed(&self.state),
            Dimension::City => Cow::Borrowed(&self.city),
            Dimension::Category => Cow::Borrowed(&self.category),
            Dimension::SubCategory => Cow::Borrowed(&self.sub_category),
            Dimension::Segment => Cow::Borrowed(&self.segment),
            Dimension::Month => Cow::Owned(self.order_date.format("%Y-%m").to_string()),
        }
    }

    /// Value of a numeric column.
    pub fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Sales => self.sales,
            Measure::Profit => self.profit,
            Measure::Quantity => self.quantity as f64,
        }
    }

    /// Text rendering of a required column, as written on export.
    pub fn field_text(&self, column: Column) -> String {
        match column {
            Column::OrderDate => self.order_date.format("%Y-%m-%d").to_string(),
            Column::Region => self.region.clone(),
            Column::State => self.state.clone(),
            Column::City => self.city.clone(),
            Column::Category => self.category.clone(),
            Column::SubCategory => self.sub_category.clone(),
            Column::Segment => self.segment.clone(),
            Column::Sales => self.sales.to_string(),
            Column::Profit => self.profit.to_string(),
            Column::Quantity => self.quantity.to_string(),
        }
    }
}

/// Position of a header within a row: a required column or the n-th extra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSlot {
    Required(Column),
    Extra(usize),
}

/// An immutable, ordered sequence of records plus the original header layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordTable {
    source_name: Option<String>,
    headers: Vec<String>,
    slots: Vec<ColumnSlot>,
    records: Vec<Record>,
}

impl RecordTable {
    /// Build a table from headers (in file order) and typed records.
    ///
    /// `headers` must contain every required column; the remaining headers are
    /// treated as pass-through columns and map onto `Record::extras` in order.
    pub fn new(source_name: Option<String>, headers: Vec<String>, records: Vec<Record>) -> Self {
        let mut extra = 0;
        let slots = headers
            .iter()
            .map(|h| match Column::from_header(h) {
                Some(column) => ColumnSlot::Required(column),
                None => {
                    let slot = ColumnSlot::Extra(extra);
                    extra += 1;
                    slot
                }
            })
            .collect();

        Self {
            source_name,
            headers,
            slots,
            records,
        }
    }

    /// Table with only the required columns, in canonical order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let headers = Column::ALL.iter().map(|c| c.header().to_string()).collect();
        Self::new(None, headers, records)
    }

    /// Name of the file the table came from, if known.
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Header names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// What each header position holds.
    pub fn slots(&self) -> &[ColumnSlot] {
        &self.slots
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A row's cells as text, in header order.
    pub fn row_text(&self, record: &Record) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| match slot {
                ColumnSlot::Required(column) => record.field_text(*column),
                ColumnSlot::Extra(i) => record.extras.get(*i).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Compact record constructor for tests.
    pub fn record(date: &str, region: &str, category: &str, sales: f64) -> Record {
        Record {
            order_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            region: region.to_string(),
            state: format!("{region} State"),
            city: format!("{region} City"),
            category: category.to_string(),
            sub_category: format!("{category} Sub"),
            segment: "Consumer".to_string(),
            sales,
            profit: sales / 10.0,
            quantity: 1,
            extras: Vec::new(),
        }
    }
}
