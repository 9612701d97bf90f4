//! Data module - uptake table loading, caching and record model

mod cache;
mod loader;
mod model;
mod processor;

pub use cache::SourceCache;
pub use loader::{DataLoader, Dataset, DEFAULT_SOURCE, SOURCE_REPOSITORY};
pub use model::{Dimension, DoseKind, RawRecord};
