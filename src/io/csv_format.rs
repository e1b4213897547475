//! CSV output of ledger records
//!
//! Every command of the CLI prints its result as CSV: one header row taken from
//! the record's field names, then one row per record. A page that has more
//! items after it is followed by a blank line and a `next_cursor` block.

use crate::types::Page;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct CursorRow {
    next_cursor: i64,
}

/// Write records as CSV with a header row
///
/// Nothing is written for an empty slice.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a record could not be serialized or written
pub fn write_records<T: Serialize>(records: &[T], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(output);

    for record in records {
        writer
            .serialize(record)
            .map_err(|e| format!("Failed to write record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write a single record as CSV with a header row
pub fn write_record<T: Serialize>(record: &T, output: &mut dyn Write) -> Result<(), String> {
    write_records(std::slice::from_ref(record), output)
}

/// Write a page of records, then its next cursor when there is one
pub fn write_page<T: Serialize>(page: &Page<T>, output: &mut dyn Write) -> Result<(), String> {
    write_records(&page.items, output)?;

    if let Some(next_cursor) = page.next_cursor {
        writeln!(output).map_err(|e| format!("Failed to write output: {}", e))?;
        write_record(&CursorRow { next_cursor }, output)?;
    }

    Ok(())
}
