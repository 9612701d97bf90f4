//! Record Model
//! Typed rows of the uptake table and the categorical axes they are sliced by.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Source column holding population counts.
pub const POPULATION_COL: &str = "Population";

/// Categorical axis of the uptake table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    #[default]
    Area,
    EthnicGroup,
    AgeGroup,
    Gender,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Area,
        Dimension::EthnicGroup,
        Dimension::AgeGroup,
        Dimension::Gender,
    ];

    /// Name of the source column backing this dimension.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Area => "DHB of residence",
            Dimension::EthnicGroup => "Ethnic group",
            Dimension::AgeGroup => "Age group",
            Dimension::Gender => "Gender",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Area => "Area",
            Dimension::EthnicGroup => "Ethnic Group",
            Dimension::AgeGroup => "Age Group",
            Dimension::Gender => "Gender",
        }
    }

    /// Dimensions that may be used as a filter while grouping by `self`.
    pub fn others(self) -> impl Iterator<Item = Dimension> {
        Self::ALL.into_iter().filter(move |d| *d != self)
    }
}

/// Which administered dose drives the percent metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DoseKind {
    #[default]
    First,
    Second,
}

impl DoseKind {
    pub const ALL: [DoseKind; 2] = [DoseKind::First, DoseKind::Second];

    pub fn column(self) -> &'static str {
        match self {
            DoseKind::First => "First dose administered",
            DoseKind::Second => "Second dose administered",
        }
    }

    /// Axis title used by both chart backends.
    pub fn label(self) -> &'static str {
        match self {
            DoseKind::First => "Percent first dose",
            DoseKind::Second => "Percent second dose",
        }
    }
}

/// One row of the source table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RawRecord {
    pub area: String,
    pub ethnic_group: String,
    pub age_group: String,
    pub gender: String,
    pub population: u64,
    pub first_dose: u64,
    pub second_dose: u64,
}

impl RawRecord {
    /// Category value of this row along `dimension`.
    pub fn category(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Area => &self.area,
            Dimension::EthnicGroup => &self.ethnic_group,
            Dimension::AgeGroup => &self.age_group,
            Dimension::Gender => &self.gender,
        }
    }
}

/// Every column the loader requires, in source order.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols: Vec<&'static str> = Dimension::ALL.iter().map(|d| d.column()).collect();
    cols.push(DoseKind::First.column());
    cols.push(DoseKind::Second.column());
    cols.push(POPULATION_COL);
    cols
}
