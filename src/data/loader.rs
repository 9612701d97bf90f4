//! CSV Data Loader Module
//! Fetches the uptake table over HTTP (or from disk) and parses it with Polars.

use crate::data::model::{Dimension, RawRecord};
use crate::data::processor::{DataProcessor, LoadWarnings, ProcessorError};
use polars::prelude::*;
use std::io::Cursor;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Latest Ministry of Health uptake table.
pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/minhealthnz/nz-covid-data/main/vaccine-data/latest/dhb_residence_uptake.csv";

/// Human-facing link to the data repository.
pub const SOURCE_REPOSITORY: &str = "https://github.com/minhealthnz/nz-covid-data/";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Unexpected table layout: {0}")]
    Schema(#[from] ProcessorError),
}

/// Parsed uptake table plus provenance.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: String,
    pub records: Vec<RawRecord>,
    pub warnings: LoadWarnings,
    pub loaded_at: SystemTime,
}

impl Dataset {
    pub fn new(source: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            source: source.into(),
            records,
            warnings: LoadWarnings::default(),
            loaded_at: SystemTime::now(),
        }
    }

    /// Distinct values of `dimension` in first-appearance order.
    pub fn distinct_values(&self, dimension: Dimension) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for record in &self.records {
            let value = record.category(dimension);
            if !seen.iter().any(|v| v == value) {
                seen.push(value.to_string());
            }
        }
        seen
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn total_population(&self) -> u64 {
        self.records.iter().map(|r| r.population).sum()
    }
}

/// Handles retrieval and parsing of the uptake table.
pub struct DataLoader {
    client: reqwest::blocking::Client,
}

impl DataLoader {
    pub fn new() -> Result<Self, LoaderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(LoaderError::Client)?;
        Ok(Self { client })
    }

    /// Whether `source` names a remote resource rather than a local path.
    pub fn is_remote(source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }

    /// Load and convert the table at `source`.
    pub fn load(&self, source: &str) -> Result<Dataset, LoaderError> {
        info!(source = %source, "loading uptake table");

        let df = if Self::is_remote(source) {
            let bytes = self.fetch(source)?;
            Self::parse_csv_bytes(bytes)?
        } else {
            Self::read_csv_file(source)?
        };
        debug!(rows = df.height(), columns = df.width(), "parsed csv");

        let (records, warnings) = DataProcessor::to_records(&df)?;
        if !warnings.is_clean() {
            warn!(
                missing_counts = warnings.missing_counts,
                dropped_rows = warnings.dropped_rows,
                "uptake table has incomplete rows"
            );
        }
        info!(records = records.len(), "uptake table loaded");

        Ok(Dataset {
            warnings,
            ..Dataset::new(source, records)
        })
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoaderError> {
        let http_err = |source| LoaderError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response.bytes().map_err(http_err)?;
        debug!(url = %url, bytes = bytes.len(), "downloaded");
        Ok(bytes.to_vec())
    }

    /// Parse an in-memory CSV document.
    pub fn parse_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;
        Ok(df)
    }

    fn read_csv_file(path: &str) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Ok(df)
    }
}
