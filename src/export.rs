//! Headless export of the dashboard views to PNG and JSON files.

use crate::charts::{RenderError, StaticChartRenderer};
use crate::data::DataLoader;
use crate::settings::Settings;
use crate::stats::DashboardView;
use anyhow::Context;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Failed to serialize view: {0}")]
    Json(#[from] serde_json::Error),
}

/// One file produced by an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportJob {
    BarsPng,
    BarsJson,
    ComparisonPng,
    ComparisonJson,
}

impl ExportJob {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportJob::BarsPng => "bars.png",
            ExportJob::BarsJson => "bars.json",
            ExportJob::ComparisonPng => "comparison.png",
            ExportJob::ComparisonJson => "comparison.json",
        }
    }

    /// Files to produce for `view`; comparison files only when a comparison exists.
    pub fn plan(view: &DashboardView) -> Vec<ExportJob> {
        let mut jobs = vec![ExportJob::BarsPng, ExportJob::BarsJson];
        if view.comparison.is_some() {
            jobs.push(ExportJob::ComparisonPng);
            jobs.push(ExportJob::ComparisonJson);
        }
        jobs
    }

    fn run(self, view: &DashboardView, dir: &Path, size: (u32, u32)) -> Result<PathBuf, ExportError> {
        let path = dir.join(self.file_name());
        match (self, &view.comparison) {
            (ExportJob::BarsPng, _) => StaticChartRenderer::render_bars_png(view, &path, size)?,
            (ExportJob::BarsJson, _) => write_json(&path, &view.bars)?,
            (ExportJob::ComparisonPng, Some(comparison)) => {
                StaticChartRenderer::render_comparison_png(comparison, &path, size)?
            }
            (ExportJob::ComparisonJson, Some(comparison)) => write_json(&path, comparison)?,
            // Not planned without a comparison
            (ExportJob::ComparisonPng | ExportJob::ComparisonJson, None) => {}
        }
        Ok(path)
    }
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write every planned file for `view` into `dir`, rendering in parallel.
pub fn export_view(
    view: &DashboardView,
    dir: &Path,
    size: (u32, u32),
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    ExportJob::plan(view)
        .into_par_iter()
        .map(|job| job.run(view, dir, size))
        .collect()
}

/// Load the configured source, run the configured query and export it.
pub fn run(settings: &Settings, dir: &Path) -> anyhow::Result<()> {
    let loader = DataLoader::new().context("failed to build HTTP client")?;
    let dataset = loader
        .load(&settings.source)
        .with_context(|| format!("failed to load {}", settings.source))?;

    let view = settings.initial_query().run(&dataset.records);
    let written = export_view(&view, dir, settings.image_size())
        .with_context(|| format!("failed to export to {}", dir.display()))?;

    for path in &written {
        info!(path = %path.display(), "wrote");
    }
    info!(files = written.len(), "export complete");
    Ok(())
}
