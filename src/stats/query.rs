//! Dashboard Query
//! One full recomputation of the derived datasets for a selection.

use crate::data::{Dimension, DoseKind, RawRecord};
use crate::stats::aggregator::{AggregateRow, Aggregator};
use crate::stats::comparison::{ComparisonBuilder, ComparisonDataset};
use crate::stats::filter::{FilterMode, RecordFilter};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_THRESHOLD: f64 = 90.0;

/// A filter dimension paired with the value to compare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub dimension: Dimension,
    pub value: String,
}

/// Current state of the dashboard controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardQuery {
    pub dose: DoseKind,
    pub group_by: Dimension,
    pub filter: Option<FilterSelection>,
    /// Bars above this percent are drawn muted.
    pub threshold: f64,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            dose: DoseKind::default(),
            group_by: Dimension::default(),
            filter: None,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Datasets handed to the chart layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub dose: DoseKind,
    pub group_by: Dimension,
    pub bars: Vec<AggregateRow>,
    pub comparison: Option<ComparisonDataset>,
    pub threshold: f64,
}

impl DashboardQuery {
    /// The filter that actually applies. A filter on the group-by axis is ignored.
    pub fn effective_filter(&self) -> Option<&FilterSelection> {
        self.filter
            .as_ref()
            .filter(|f| f.dimension != self.group_by)
    }

    pub fn run(&self, rows: &[RawRecord]) -> DashboardView {
        let threshold = self.threshold.clamp(0.0, 100.0);

        let (bars, comparison) = match self.effective_filter() {
            Some(filter) => {
                let kept = RecordFilter::apply(rows, filter.dimension, &filter.value, FilterMode::Include);
                let bars = Aggregator::aggregate(kept, self.group_by, self.dose);
                let comparison = ComparisonBuilder::build(
                    rows,
                    self.group_by,
                    self.dose,
                    filter.dimension,
                    &filter.value,
                );
                (bars, Some(comparison))
            }
            None => (Aggregator::aggregate(rows, self.group_by, self.dose), None),
        };

        debug!(
            group_by = ?self.group_by,
            dose = ?self.dose,
            bars = bars.len(),
            compared = comparison.is_some(),
            "dashboard recomputed"
        );

        DashboardView {
            dose: self.dose,
            group_by: self.group_by,
            bars,
            comparison,
            threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(area: &str, gender: &str, population: u64, first: u64, second: u64) -> RawRecord {
        RawRecord {
            area: area.to_string(),
            ethnic_group: "Pacific Peoples".to_string(),
            age_group: "35-49".to_string(),
            gender: gender.to_string(),
            population,
            first_dose: first,
            second_dose: second,
        }
    }

    fn sample() -> Vec<RawRecord> {
        vec![
            rec("Auckland", "Female", 100, 90, 80),
            rec("Auckland", "Male", 50, 45, 40),
            rec("Wellington", "Female", 60, 60, 59),
            rec("Overseas / Unknown", "Male", 5, 1, 1),
        ]
    }

    #[test]
    fn test_default_query_groups_by_area() {
        let view = DashboardQuery::default().run(&sample());

        assert_eq!(view.bars.len(), 2);
        assert_eq!(view.bars[0].category, "Auckland");
        assert_eq!(view.bars[0].percent, 90.0);
        assert_eq!(view.bars[1].percent, 100.0);
        assert!(view.comparison.is_none());
        assert_eq!(view.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_filter_restricts_bars_and_builds_comparison() {
        let query = DashboardQuery {
            filter: Some(FilterSelection {
                dimension: Dimension::Gender,
                value: "Female".to_string(),
            }),
            ..DashboardQuery::default()
        };
        let view = query.run(&sample());

        assert_eq!(view.bars.len(), 2);
        assert_eq!(view.bars[0].population, 100);
        let comparison = view.comparison.unwrap();
        assert_eq!(comparison.filter_value, "Female");
        assert_eq!(comparison.rows.len(), 3);
    }

    #[test]
    fn test_filter_on_group_by_axis_is_ignored() {
        let query = DashboardQuery {
            filter: Some(FilterSelection {
                dimension: Dimension::Area,
                value: "Auckland".to_string(),
            }),
            ..DashboardQuery::default()
        };
        assert!(query.effective_filter().is_none());

        let view = query.run(&sample());
        assert_eq!(view.bars.len(), 2);
        assert!(view.comparison.is_none());
    }

    #[test]
    fn test_no_matching_rows_yields_empty_bars() {
        let query = DashboardQuery {
            dose: DoseKind::Second,
            group_by: Dimension::AgeGroup,
            filter: Some(FilterSelection {
                dimension: Dimension::Gender,
                value: "Another Gender".to_string(),
            }),
            threshold: 50.0,
        };
        let view = query.run(&sample());

        assert!(view.bars.is_empty());
        assert_eq!(view.comparison.as_ref().map(|c| c.rows.len()), Some(1));
    }

    #[test]
    fn test_threshold_is_clamped() {
        let query = DashboardQuery {
            threshold: 140.0,
            ..DashboardQuery::default()
        };
        assert_eq!(query.run(&[]).threshold, 100.0);
    }
}
