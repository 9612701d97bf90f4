//! Comparison Builder
//! Pairs the aggregate for one filter value against the aggregate of everything else.

use crate::data::{Dimension, DoseKind, RawRecord};
use crate::stats::aggregator::{AggregateRow, Aggregator};
use crate::stats::filter::{FilterMode, RecordFilter};
use serde::{Deserialize, Serialize};

/// Which side of the comparison a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Partition {
    Selected,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub category: String,
    pub percent: f64,
    pub partition: Partition,
}

/// Two-partition table for dumbbell rendering. Selected rows precede Other rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDataset {
    pub group_by: Dimension,
    pub dose: DoseKind,
    pub filter_dimension: Dimension,
    pub filter_value: String,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonDataset {
    /// Legend label of a partition.
    pub fn partition_label(&self, partition: Partition) -> String {
        match partition {
            Partition::Selected => self.filter_value.clone(),
            Partition::Other => format!("Not {}", self.filter_value),
        }
    }

    /// Categories in first-appearance order across both partitions.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.category.as_str()) {
                seen.push(&row.category);
            }
        }
        seen
    }

    /// Percent of `category` within `partition`, if present.
    pub fn percent_of(&self, category: &str, partition: Partition) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.partition == partition && r.category == category)
            .map(|r| r.percent)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct ComparisonBuilder;

impl ComparisonBuilder {
    pub fn build(
        rows: &[RawRecord],
        group_by: Dimension,
        dose: DoseKind,
        filter_dimension: Dimension,
        filter_value: &str,
    ) -> ComparisonDataset {
        let selected = RecordFilter::apply(rows, filter_dimension, filter_value, FilterMode::Include);
        let other = RecordFilter::apply(rows, filter_dimension, filter_value, FilterMode::Exclude);

        let selected = Aggregator::aggregate(selected, group_by, dose);
        let other = Aggregator::aggregate(other, group_by, dose);

        let rows = Self::tag(selected, Partition::Selected)
            .chain(Self::tag(other, Partition::Other))
            .collect();

        ComparisonDataset {
            group_by,
            dose,
            filter_dimension,
            filter_value: filter_value.to_string(),
            rows,
        }
    }

    fn tag(rows: Vec<AggregateRow>, partition: Partition) -> impl Iterator<Item = ComparisonRow> {
        rows.into_iter().map(move |row| ComparisonRow {
            category: row.category,
            percent: row.percent,
            partition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(ds: &ComparisonDataset, partition: Partition) -> usize {
        ds.rows.iter().filter(|r| r.partition == partition).count()
    }

    fn rec(area: &str, ethnic: &str, population: u64, first: u64) -> RawRecord {
        RawRecord {
            area: area.to_string(),
            ethnic_group: ethnic.to_string(),
            age_group: "65+".to_string(),
            gender: "Female".to_string(),
            population,
            first_dose: first,
            second_dose: 0,
        }
    }

    fn sample() -> Vec<RawRecord> {
        vec![
            rec("Auckland", "Maori", 100, 80),
            rec("Auckland", "Asian", 100, 95),
            rec("Northland", "Maori", 50, 35),
            rec("Northland", "European / Other", 50, 45),
            rec("Overseas / Unknown", "Maori", 10, 1),
        ]
    }

    #[test]
    fn test_selected_rows_precede_other_rows() {
        let ds = ComparisonBuilder::build(
            &sample(),
            Dimension::Area,
            DoseKind::First,
            Dimension::EthnicGroup,
            "Maori",
        );

        let partitions: Vec<Partition> = ds.rows.iter().map(|r| r.partition).collect();
        assert_eq!(
            partitions,
            vec![
                Partition::Selected,
                Partition::Selected,
                Partition::Other,
                Partition::Other
            ]
        );
        assert_eq!(ds.percent_of("Auckland", Partition::Selected), Some(80.0));
        assert_eq!(ds.percent_of("Northland", Partition::Selected), Some(70.0));
        assert_eq!(ds.percent_of("Auckland", Partition::Other), Some(95.0));
        assert_eq!(ds.percent_of("Northland", Partition::Other), Some(90.0));
        assert_eq!(ds.percent_of("Overseas / Unknown", Partition::Selected), None);
    }

    #[test]
    fn test_row_count_matches_partition_aggregates() {
        let records = sample();
        let ds = ComparisonBuilder::build(
            &records,
            Dimension::Area,
            DoseKind::First,
            Dimension::EthnicGroup,
            "Asian",
        );

        let inc = RecordFilter::apply(&records, Dimension::EthnicGroup, "Asian", FilterMode::Include);
        let exc = RecordFilter::apply(&records, Dimension::EthnicGroup, "Asian", FilterMode::Exclude);
        let expected = Aggregator::aggregate(inc, Dimension::Area, DoseKind::First).len()
            + Aggregator::aggregate(exc, Dimension::Area, DoseKind::First).len();

        assert_eq!(ds.rows.len(), expected);
        assert_eq!(count(&ds, Partition::Selected), 1);
        assert_eq!(count(&ds, Partition::Other), 2);
    }

    #[test]
    fn test_categories_deduplicated() {
        let ds = ComparisonBuilder::build(
            &sample(),
            Dimension::Area,
            DoseKind::First,
            Dimension::EthnicGroup,
            "Maori",
        );
        assert_eq!(ds.categories(), vec!["Auckland", "Northland"]);
    }

    #[test]
    fn test_unknown_filter_value_leaves_selected_empty() {
        let ds = ComparisonBuilder::build(
            &sample(),
            Dimension::Area,
            DoseKind::First,
            Dimension::EthnicGroup,
            "Martian",
        );
        assert_eq!(count(&ds, Partition::Selected), 0);
        assert_eq!(count(&ds, Partition::Other), 2);
    }

    #[test]
    fn test_partition_labels() {
        let ds = ComparisonBuilder::build(&[], Dimension::Area, DoseKind::First, Dimension::Gender, "Male");
        assert!(ds.is_empty());
        assert_eq!(ds.partition_label(Partition::Selected), "Male");
        assert_eq!(ds.partition_label(Partition::Other), "Not Male");
    }
}
