//! Command-line settings.

use crate::data::{Dimension, DoseKind, DEFAULT_SOURCE};
use crate::stats::{DashboardQuery, FilterSelection, DEFAULT_THRESHOLD};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// New Zealand COVID-19 vaccine uptake dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "nz-vaccine-stats",
    about = "New Zealand COVID-19 vaccine uptake dashboard",
    version
)]
pub struct Settings {
    /// Uptake CSV: an http(s) URL or a local path
    #[arg(long, env = "NZ_VACCINE_STATS_SOURCE", default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Seconds a loaded table is reused before refetching (0 disables caching)
    #[arg(long, default_value_t = 3600)]
    pub cache_ttl_secs: u64,

    /// Dose driving the percent metric
    #[arg(long, value_enum, default_value_t = DoseKind::First)]
    pub dose: DoseKind,

    /// Dimension shown on the category axis
    #[arg(long, value_enum, default_value_t = Dimension::Area)]
    pub group_by: Dimension,

    /// Dimension to compare on
    #[arg(long, value_enum, requires = "filter_value")]
    pub filter_dimension: Option<Dimension>,

    /// Value of the filter dimension to compare against everything else
    #[arg(long, requires = "filter_dimension")]
    pub filter_value: Option<String>,

    /// Highlight bars at or below this percentage (0-100)
    #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: f64,

    /// Write charts and JSON to this directory instead of opening the dashboard
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Exported image width in pixels
    #[arg(long, default_value_t = 1200, value_parser = clap::value_parser!(u32).range(200..=8000))]
    pub width: u32,

    /// Exported image height in pixels
    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(200..=8000))]
    pub height: u32,

    /// Logging level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0 and 100, got {value}"))
    }
}

impl Settings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Dashboard selection described by the command line.
    pub fn initial_query(&self) -> DashboardQuery {
        let filter = match (self.filter_dimension, &self.filter_value) {
            (Some(dimension), Some(value)) => Some(FilterSelection {
                dimension,
                value: value.clone(),
            }),
            _ => None,
        };
        DashboardQuery {
            dose: self.dose,
            group_by: self.group_by,
            filter,
            threshold: self.threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["nz-vaccine-stats"]).unwrap();
        assert_eq!(settings.source, DEFAULT_SOURCE);
        assert_eq!(settings.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(settings.initial_query(), DashboardQuery::default());
        assert!(settings.export.is_none());
        assert_eq!(settings.image_size(), (1200, 800));
    }

    #[test]
    fn test_selection_flags() {
        let settings = Settings::try_parse_from([
            "nz-vaccine-stats",
            "--dose",
            "second",
            "--group-by",
            "age-group",
            "--filter-dimension",
            "ethnic-group",
            "--filter-value",
            "Maori",
            "--threshold",
            "75",
        ])
        .unwrap();

        let query = settings.initial_query();
        assert_eq!(query.dose, DoseKind::Second);
        assert_eq!(query.group_by, Dimension::AgeGroup);
        assert_eq!(
            query.filter,
            Some(FilterSelection {
                dimension: Dimension::EthnicGroup,
                value: "Maori".to_string()
            })
        );
        assert_eq!(query.threshold, 75.0);
    }

    #[test]
    fn test_filter_value_requires_dimension() {
        let result = Settings::try_parse_from(["nz-vaccine-stats", "--filter-value", "Maori"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        assert!(Settings::try_parse_from(["nz-vaccine-stats", "--threshold", "120"]).is_err());
        assert!(Settings::try_parse_from(["nz-vaccine-stats", "--threshold", "abc"]).is_err());
    }

    #[test]
    fn test_unknown_dimension_rejected() {
        assert!(Settings::try_parse_from(["nz-vaccine-stats", "--group-by", "region"]).is_err());
    }
}
