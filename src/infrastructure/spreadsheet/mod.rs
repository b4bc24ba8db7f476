// ============================================================
// SPREADSHEET INFRASTRUCTURE
// ============================================================
// Workbook parsing and column profiling

mod column_profiler;
mod workbook_reader;

pub use column_profiler::ColumnProfiler;
pub use workbook_reader::WorkbookReader;

pub(crate) use column_profiler::{distinct_count, mean, median, numeric_values, sample_std};

use crate::domain::error::Result;
use crate::domain::profile::{ClassifiedColumn, ProfileConfig, ProfiledColumn};
use crate::domain::table::Table;

/// Parse spreadsheet bytes into a normalized table.
pub fn load(bytes: &[u8]) -> Result<Table> {
    WorkbookReader::new().load(bytes)
}

/// Profile every column with the default thresholds.
pub fn profile(table: &Table) -> Vec<ProfiledColumn> {
    ColumnProfiler::new(ProfileConfig::default()).profile(table)
}

/// Classify every column with the default thresholds.
pub fn classify(table: &Table) -> Vec<ClassifiedColumn> {
    ColumnProfiler::new(ProfileConfig::default()).classify(table)
}
