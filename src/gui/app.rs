//! Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::StaticChartRenderer;
use crate::data::{DataLoader, Dataset, SourceCache};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, StatusKind};
use crate::settings::Settings;
use crate::stats::DashboardQuery;
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info};

/// Loading result from background thread
enum LoadResult {
    Complete(Dataset),
    Error(String),
}

/// Main application window.
pub struct VaccineStatsApp {
    source: String,
    image_size: (u32, u32),
    cache: SourceCache<Arc<Dataset>>,
    dataset: Option<Arc<Dataset>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
}

impl VaccineStatsApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        info!(ttl_secs = settings.cache_ttl().as_secs(), "dashboard starting");
        let mut app = Self::with_cache(
            settings.source.clone(),
            settings.image_size(),
            &settings.initial_query(),
            SourceCache::new(settings.cache_ttl()),
        );
        app.start_load();
        app
    }

    fn with_cache(
        source: String,
        image_size: (u32, u32),
        query: &DashboardQuery,
        cache: SourceCache<Arc<Dataset>>,
    ) -> Self {
        Self {
            source,
            image_size,
            cache,
            dataset: None,
            control_panel: ControlPanel::new(query),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
        }
    }

    /// Use the cached table when fresh, otherwise fetch it in a background thread.
    fn start_load(&mut self) {
        if self.load_rx.is_some() {
            return; // Already loading
        }

        let now = Instant::now();
        self.cache.evict_expired(now);
        if let Some(dataset) = self.cache.get(&self.source, now).cloned() {
            self.set_dataset(dataset);
            return;
        }

        self.control_panel.is_loading = true;
        self.control_panel
            .set_status(StatusKind::Info, "Downloading vaccine data...");

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let source = self.source.clone();

        thread::spawn(move || {
            let result = DataLoader::new().and_then(|loader| loader.load(&source));
            let message = match result {
                Ok(dataset) => LoadResult::Complete(dataset),
                Err(e) => {
                    error!(source = %source, error = %e, "load failed");
                    LoadResult::Error(e.to_string())
                }
            };
            let _ = tx.send(message);
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(dataset)) => {
                let dataset = Arc::new(dataset);
                self.cache
                    .insert(self.source.clone(), Arc::clone(&dataset), Instant::now());
                debug!(
                    entries = self.cache.len(),
                    ttl_secs = self.cache.ttl().as_secs(),
                    "cached table"
                );
                self.control_panel.is_loading = false;
                self.set_dataset(dataset);
            }
            Ok(LoadResult::Error(error)) => {
                self.control_panel.is_loading = false;
                self.control_panel
                    .set_status(StatusKind::Error, &format!("Error: {}", error));
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {
                // Put receiver back while still loading
                self.load_rx = Some(rx);
            }
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel.is_loading = false;
                self.control_panel
                    .set_status(StatusKind::Error, "Error: loader stopped unexpectedly");
            }
        }
    }

    fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.control_panel.set_status(
            StatusKind::Success,
            &format!("Loaded {} rows", dataset.row_count()),
        );
        self.dataset = Some(dataset);
        self.refresh_filter_values();
        self.recompute();
    }

    /// Handle filter dimension change - update available values
    fn refresh_filter_values(&mut self) {
        let values = match (&self.dataset, self.control_panel.filter_dimension) {
            (Some(dataset), Some(dimension)) => dataset.distinct_values(dimension),
            _ => Vec::new(),
        };
        self.control_panel.update_filter_values(values);
    }

    /// Rerun the pipeline for the current selection.
    fn recompute(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let view = self.control_panel.query().run(&dataset.records);
        self.chart_viewer.set_view(view);
    }

    /// Refetch in the background once the cached table goes stale.
    /// With caching disabled the table is only refetched on reload.
    fn refresh_if_stale(&mut self) {
        if self.cache.ttl().is_zero() || self.load_rx.is_some() || self.dataset.is_none() {
            return;
        }
        if self.cache.get(&self.source, Instant::now()).is_none() {
            info!(source = %self.source, "cached table expired, refreshing");
            self.start_load();
        }
    }

    fn handle_reload(&mut self) {
        self.cache.invalidate(&self.source);
        self.start_load();
    }

    /// Handle PNG export of the current charts
    fn handle_save_png(&mut self) {
        let Some(view) = &self.chart_viewer.view else {
            self.control_panel
                .set_status(StatusKind::Error, "No charts to save");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("vaccine_uptake.png")
            .save_file()
        else {
            return; // User cancelled
        };

        let mut written = vec![path.clone()];
        let mut result = StaticChartRenderer::render_bars_png(view, &path, self.image_size);
        if let Some(comparison) = view.comparison.as_ref().filter(|_| result.is_ok()) {
            let comparison_path = Self::comparison_path(&path);
            result = StaticChartRenderer::render_comparison_png(
                comparison,
                &comparison_path,
                self.image_size,
            );
            written.push(comparison_path);
        }

        match result {
            Ok(()) => {
                info!(files = written.len(), "saved charts");
                self.control_panel.set_status(
                    StatusKind::Success,
                    &format!("Saved {}", written[0].display()),
                );
            }
            Err(e) => {
                self.control_panel
                    .set_status(StatusKind::Error, &format!("Render error: {}", e));
            }
        }
    }

    /// `charts.png` -> `charts_comparison.png`
    fn comparison_path(path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "vaccine_uptake".to_string());
        path.with_file_name(format!("{}_comparison.png", stem))
    }
}

impl eframe::App for VaccineStatsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.load_rx.is_some() {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::SelectionChanged => {
                            self.recompute();
                            self.refresh_if_stale();
                        }
                        ControlPanelAction::FilterDimensionChanged => {
                            self.refresh_filter_values();
                            self.recompute();
                            self.refresh_if_stale();
                        }
                        ControlPanelAction::Reload => self.handle_reload(),
                        ControlPanelAction::SavePng => self.handle_save_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, self.dataset.as_deref());
        });
    }
}
