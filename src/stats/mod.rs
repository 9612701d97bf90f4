//! Stats module - filtering, aggregation and comparison of uptake records

mod aggregator;
mod comparison;
mod filter;
mod query;

pub use aggregator::AggregateRow;
pub use comparison::{ComparisonDataset, Partition};
pub use query::{DashboardQuery, DashboardView, FilterSelection, DEFAULT_THRESHOLD};
