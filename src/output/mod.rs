//! Output formatting

mod formatter;

pub use formatter::{OutputFormat, ReportFormatter};
