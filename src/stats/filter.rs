//! Record filter applied before aggregation.

use crate::data::{Dimension, RawRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Keep rows whose category equals the filter value.
    Include,
    /// Keep rows whose category differs from the filter value.
    Exclude,
    /// Keep every row.
    None,
}

pub struct RecordFilter;

impl RecordFilter {
    /// Select records by their `dimension` value. Input order is preserved.
    pub fn apply<'a>(
        rows: &'a [RawRecord],
        dimension: Dimension,
        value: &str,
        mode: FilterMode,
    ) -> Vec<&'a RawRecord> {
        match mode {
            FilterMode::None => rows.iter().collect(),
            FilterMode::Include => rows
                .iter()
                .filter(|r| r.category(dimension) == value)
                .collect(),
            FilterMode::Exclude => rows
                .iter()
                .filter(|r| r.category(dimension) != value)
                .collect(),
        }
    }
}
