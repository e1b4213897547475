//! I/O module
//!
//! Handles CSV output of command results.

pub mod csv_format;

pub use csv_format::{write_page, write_record, write_records};
