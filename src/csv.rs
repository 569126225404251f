//! CSV output of joined rows

use crate::model::OutputRow;
use crate::QaError;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Quote a field when it holds a delimiter, quote or line break
fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn write_record<W: Write, S: AsRef<str>>(writer: &mut W, fields: &[S]) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")
}

/// Write a header line followed by one line per row
pub fn write_rows<W: Write>(writer: &mut W, rows: &[OutputRow]) -> Result<(), QaError> {
    write_record(writer, &OutputRow::column_headers())?;
    for row in rows {
        write_record(writer, &row.fields())?;
    }
    writer.flush()?;
    Ok(())
}

/// Save rows to a CSV file
pub fn save_rows<P: AsRef<Path>>(path: P, rows: &[OutputRow]) -> Result<(), QaError> {
    let mut writer = BufWriter::new(File::create(&path)?);
    write_rows(&mut writer, rows)?;
    log::info!("CSV file saved at {}", path.as_ref().display());
    Ok(())
}
