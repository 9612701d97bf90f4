//! Data Processor Module
//! Converts the parsed uptake frame into typed records.

use crate::data::model::{required_columns, Dimension, DoseKind, RawRecord, POPULATION_COL};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing expected columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Cells that could not be read cleanly while converting a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadWarnings {
    /// Numeric cells that were empty or unparseable and read as zero.
    pub missing_counts: usize,
    /// Rows dropped because a category cell was empty.
    pub dropped_rows: usize,
}

impl LoadWarnings {
    pub fn is_clean(&self) -> bool {
        self.missing_counts == 0 && self.dropped_rows == 0
    }
}

/// Handles frame validation and conversion to records.
pub struct DataProcessor;

impl DataProcessor {
    /// Check that every column the dashboard reads is present.
    pub fn validate_columns(df: &DataFrame) -> Result<(), ProcessorError> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let missing: Vec<String> = required_columns()
            .into_iter()
            .filter(|name| !present.iter().any(|p| p == name))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProcessorError::MissingColumns(missing))
        }
    }

    /// Build one [`RawRecord`] per frame row.
    ///
    /// Category cells are trimmed; rows with any empty category are dropped.
    /// Numeric cells that are null, negative or non-finite are read as zero.
    pub fn to_records(df: &DataFrame) -> Result<(Vec<RawRecord>, LoadWarnings), ProcessorError> {
        Self::validate_columns(df)?;

        let areas = Self::text_column(df, Dimension::Area.column())?;
        let ethnic_groups = Self::text_column(df, Dimension::EthnicGroup.column())?;
        let age_groups = Self::text_column(df, Dimension::AgeGroup.column())?;
        let genders = Self::text_column(df, Dimension::Gender.column())?;
        let populations = Self::count_column(df, POPULATION_COL)?;
        let first_doses = Self::count_column(df, DoseKind::First.column())?;
        let second_doses = Self::count_column(df, DoseKind::Second.column())?;

        let mut warnings = LoadWarnings::default();
        let mut records = Vec::with_capacity(df.height());

        for i in 0..df.height() {
            let categories = (
                areas[i].clone(),
                ethnic_groups[i].clone(),
                age_groups[i].clone(),
                genders[i].clone(),
            );
            let (Some(area), Some(ethnic_group), Some(age_group), Some(gender)) = categories
            else {
                warnings.dropped_rows += 1;
                continue;
            };

            let mut count = |cell: Option<u64>| {
                cell.unwrap_or_else(|| {
                    warnings.missing_counts += 1;
                    0
                })
            };

            records.push(RawRecord {
                area,
                ethnic_group,
                age_group,
                gender,
                population: count(populations[i]),
                first_dose: count(first_doses[i]),
                second_dose: count(second_doses[i]),
            });
        }

        Ok((records, warnings))
    }

    fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, ProcessorError> {
        let column = df.column(name)?.cast(&DataType::String)?;
        let values = column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| {
                v.map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .collect();
        Ok(values)
    }

    fn count_column(df: &DataFrame, name: &str) -> Result<Vec<Option<u64>>, ProcessorError> {
        // Non-strict cast: unparseable cells become null
        let column = df.column(name)?.cast(&DataType::Float64)?;
        let values = column
            .f64()?
            .into_iter()
            .map(|v| {
                v.filter(|v| v.is_finite() && *v >= 0.0)
                    .map(|v| v.round() as u64)
            })
            .collect();
        Ok(values)
    }
}
