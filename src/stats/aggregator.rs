//! Uptake Aggregator
//! Groups records by one dimension and derives the dose percentage per group.

use crate::data::{Dimension, DoseKind, RawRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Area categories that are residual buckets rather than comparable regions.
pub const AREA_SENTINELS: [&str; 2] = ["Overseas / Unknown", "Various"];

/// Upper bound of the percent metric.
pub const MAX_PERCENT: f64 = 100.0;

/// Summed counts for one category of the group-by dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub category: String,
    pub population: u64,
    pub first_dose: u64,
    pub second_dose: u64,
    pub percent: f64,
}

impl AggregateRow {
    fn empty(category: &str) -> Self {
        Self {
            category: category.to_string(),
            population: 0,
            first_dose: 0,
            second_dose: 0,
            percent: 0.0,
        }
    }

    pub fn doses(&self, dose: DoseKind) -> u64 {
        match dose {
            DoseKind::First => self.first_dose,
            DoseKind::Second => self.second_dose,
        }
    }
}

/// Dose coverage of `population` in percent.
///
/// The ratio is rounded to three decimals (ties to even) before scaling, so
/// the result has one decimal place. Counts above population clamp to 100; an empty
/// population yields 0.
pub fn percent(doses: u64, population: u64) -> f64 {
    if population == 0 {
        return 0.0;
    }
    let ratio = doses as f64 / population as f64;
    let scaled = (ratio * 1000.0).round_ties_even() / 10.0;
    scaled.min(MAX_PERCENT)
}

/// Whether `category` is excluded from aggregates grouped by `dimension`.
pub fn is_sentinel(dimension: Dimension, category: &str) -> bool {
    dimension == Dimension::Area && AREA_SENTINELS.contains(&category)
}

/// Groups records and computes per-category totals.
pub struct Aggregator;

impl Aggregator {
    /// Sum records by `group_by` and derive the `dose` percentage.
    ///
    /// Output rows follow the order in which each category first appears.
    pub fn aggregate<'a, I>(rows: I, group_by: Dimension, dose: DoseKind) -> Vec<AggregateRow>
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        let mut index: HashMap<&'a str, usize> = HashMap::new();
        let mut groups: Vec<AggregateRow> = Vec::new();

        for record in rows {
            let category = record.category(group_by);
            if is_sentinel(group_by, category) {
                continue;
            }

            let slot = *index.entry(category).or_insert_with(|| {
                groups.push(AggregateRow::empty(category));
                groups.len() - 1
            });

            let group = &mut groups[slot];
            group.population += record.population;
            group.first_dose += record.first_dose;
            group.second_dose += record.second_dose;
        }

        for group in &mut groups {
            group.percent = percent(group.doses(dose), group.population);
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(area: &str, population: u64, first: u64, second: u64) -> RawRecord {
        RawRecord {
            area: area.to_string(),
            ethnic_group: "European / Other".to_string(),
            age_group: "50-64".to_string(),
            gender: "Male".to_string(),
            population,
            first_dose: first,
            second_dose: second,
        }
    }

    fn sample() -> Vec<RawRecord> {
        vec![
            rec("Auckland", 100, 90, 80),
            rec("Auckland", 50, 45, 40),
            rec("Wellington", 60, 60, 59),
        ]
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_groups_and_sums_by_area() {
        let rows = Aggregator::aggregate(&sample(), Dimension::Area, DoseKind::First);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Auckland");
        assert_eq!(rows[0].population, 150);
        assert_eq!(rows[0].first_dose, 135);
        assert_eq!(rows[0].second_dose, 120);
        assert!(approx(rows[0].percent, 90.0));
        assert_eq!(rows[1].category, "Wellington");
        assert!(approx(rows[1].percent, 100.0));
    }

    #[test]
    fn test_second_dose_percent() {
        let rows = Aggregator::aggregate(&sample(), Dimension::Area, DoseKind::Second);
        assert!(approx(rows[0].percent, 80.0));
        // 59 / 60 = 0.98333 -> 0.983 -> 98.3
        assert!(approx(rows[1].percent, 98.3));
    }

    #[test]
    fn test_zero_population_is_zero_percent() {
        let rows = Aggregator::aggregate(&[rec("Tairawhiti", 0, 5, 3)], Dimension::Area, DoseKind::First);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].percent, 0.0);
        assert!(!rows[0].percent.is_nan());
    }

    #[test]
    fn test_overcount_clamps_to_hundred() {
        let rows = Aggregator::aggregate(&[rec("Lakes", 100, 120, 101)], Dimension::Area, DoseKind::First);
        assert_eq!(rows[0].percent, 100.0);
    }

    #[test]
    fn test_area_sentinels_removed() {
        let mut records = sample();
        records.push(rec("Overseas / Unknown", 30, 10, 5));
        records.push(rec("Various", 10, 10, 10));

        let rows = Aggregator::aggregate(&records, Dimension::Area, DoseKind::First);
        let categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["Auckland", "Wellington"]);
    }

    #[test]
    fn test_sentinels_kept_for_other_dimensions() {
        let mut record = rec("Auckland", 10, 5, 5);
        record.gender = "Various".to_string();

        let rows = Aggregator::aggregate(&[record], Dimension::Gender, DoseKind::First);
        assert_eq!(rows[0].category, "Various");
    }

    #[test]
    fn test_population_conserved_outside_sentinels() {
        let mut records = sample();
        records.push(rec("Overseas / Unknown", 30, 10, 5));
        records.push(rec("Canterbury", 70, 20, 10));

        let expected: u64 = records
            .iter()
            .filter(|r| !is_sentinel(Dimension::Area, &r.area))
            .map(|r| r.population)
            .sum();
        let rows = Aggregator::aggregate(&records, Dimension::Area, DoseKind::First);
        let total: u64 = rows.iter().map(|r| r.population).sum();
        assert_eq!(total, expected);

        let by_gender = Aggregator::aggregate(&records, Dimension::Gender, DoseKind::First);
        let all: u64 = records.iter().map(|r| r.population).sum();
        assert_eq!(by_gender.iter().map(|r| r.population).sum::<u64>(), all);
    }

    #[test]
    fn test_percent_always_in_range() {
        let records = vec![
            rec("A", 0, 0, 0),
            rec("B", 1, 1000, 0),
            rec("C", 3, 1, 2),
            rec("D", 7, 0, 7),
            rec("E", 1_000_000, 999_999, 1),
        ];
        for dose in DoseKind::ALL {
            for row in Aggregator::aggregate(&records, Dimension::Area, dose) {
                assert!((0.0..=100.0).contains(&row.percent), "{row:?}");
            }
        }
    }

    #[test]
    fn test_reaggregating_output_is_fixed_point() {
        let first = Aggregator::aggregate(&sample(), Dimension::Area, DoseKind::First);
        let as_records: Vec<RawRecord> = first
            .iter()
            .map(|row| rec(&row.category, row.population, row.first_dose, row.second_dose))
            .collect();

        let second = Aggregator::aggregate(&as_records, Dimension::Area, DoseKind::First);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        let rows = Aggregator::aggregate(&Vec::new(), Dimension::AgeGroup, DoseKind::Second);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_percent_rounds_to_one_decimal() {
        // 1 / 3 = 0.3333 -> 0.333 -> 33.3
        assert!(approx(percent(1, 3), 33.3));
        // 2 / 3 = 0.6667 -> 0.667 -> 66.7
        assert!(approx(percent(2, 3), 66.7));
    }

    #[test]
    fn test_percent_ties_round_to_even() {
        // 1 / 16 = 0.0625 -> 0.062
        assert_eq!(percent(1, 16), 6.2);
        // 3 / 16 = 0.1875 -> 0.188
        assert_eq!(percent(3, 16), 18.8);
        // 1 / 8 = 0.125 is exact at three decimals
        assert_eq!(percent(1, 8), 12.5);
    }
}
