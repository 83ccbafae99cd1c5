//! CSV export of the filtered view.

use crate::error::{Error, Result};
use crate::filter::FilteredView;

/// File name offered for the filtered download.
pub const EXPORT_FILE_NAME: &str = "Filtered_Data.csv";

/// MIME type of the export payload.
pub const EXPORT_MIME_TYPE: &str = "text/csv";

/// A serialized view ready for download.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub bytes: Vec<u8>,
    pub file_name: &'static str,
    pub mime_type: &'static str,
}

/// Serialize a view as UTF-8 CSV with the table's original header order.
pub fn export(view: &FilteredView<'_>) -> Result<Export> {
    let table = view.table();
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(table.headers())?;
    for record in view.iter() {
        writer.write_record(table.row_text(record))?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;

    tracing::debug!("Exported {} rows ({} bytes)", view.len(), bytes.len());

    Ok(Export {
        bytes,
        file_name: EXPORT_FILE_NAME,
        mime_type: EXPORT_MIME_TYPE,
    })
}
