//! Output formatting module
//!
//! Renders run reports as a status tree, JSON or a summary line.

mod formatter;

pub use formatter::{write_reports_to_file, OutputFormat, ResultFormatter};
