//! Static Chart Renderer
//! Draws the bar and dumbbell views to PNG files with plotters.
//!
//! Layout matches the interactive charts:
//! - percent axis fixed to 0..100 (with room for value labels)
//! - categories top to bottom in aggregate order
//! - bars colored against the highlight threshold

use crate::charts::palette;
use crate::stats::{ComparisonDataset, DashboardView, Partition};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use thiserror::Error;

const X_MAX: f64 = 108.0;
const FONT: &str = "sans-serif";
const EMPTY_NOTE: &str = "No rows match the current selection";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

/// Segment index for the `index`-th of `count` categories; the first is drawn on top.
fn band(index: usize, count: usize) -> usize {
    count - 1 - index
}

/// Width in pixels reserved for category labels.
fn label_area_width(labels: &[String]) -> u32 {
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    (longest * 8 + 20).clamp(60, 260)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the single-dimension bar view.
    pub fn render_bars_png(
        view: &DashboardView,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let title = format!("{} by {}", view.dose.label(), view.group_by.label());
        if view.bars.is_empty() {
            Self::draw_empty(&root, &title)?;
            return root.present().map_err(draw_err);
        }

        let count = view.bars.len();
        let labels: Vec<String> = view.bars.iter().map(|r| r.category.clone()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, (FONT, 22))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(label_area_width(&labels))
            .build_cartesian_2d(0f64..X_MAX, (0usize..count).into_segmented())
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(count)
            .y_label_formatter(&|v| Self::segment_label(&labels, v))
            .x_label_formatter(&|x| format!("{:.0}", x))
            .x_desc(view.dose.label())
            .y_desc(view.group_by.label())
            .draw()
            .map_err(draw_err)?;

        let threshold = view.threshold;
        chart
            .draw_series(view.bars.iter().enumerate().map(|(i, row)| {
                let y = band(i, count);
                let fill = rgb(palette::bar_color(row.percent, threshold));
                let mut bar = Rectangle::new(
                    [
                        (0.0, SegmentValue::Exact(y)),
                        (row.percent, SegmentValue::Exact(y + 1)),
                    ],
                    fill.filled(),
                );
                bar.set_margin(3, 3, 0, 0);
                bar
            }))
            .map_err(draw_err)?;

        let label_style = (FONT, 13)
            .into_font()
            .color(&rgb(palette::LABEL))
            .pos(Pos::new(HPos::Left, VPos::Center));
        chart
            .draw_series(view.bars.iter().enumerate().map(|(i, row)| {
                Text::new(
                    format!("{:.1}", row.percent),
                    (row.percent + 1.0, SegmentValue::CenterOf(band(i, count))),
                    label_style.clone(),
                )
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)
    }

    /// Render the two-partition dumbbell view.
    pub fn render_comparison_png(
        comparison: &ComparisonDataset,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let title = format!(
            "{} by {}: {} vs other {}",
            comparison.dose.label(),
            comparison.group_by.label(),
            comparison.filter_value,
            comparison.filter_dimension.label(),
        );
        let labels: Vec<String> = comparison
            .categories()
            .into_iter()
            .map(str::to_string)
            .collect();
        if labels.is_empty() {
            Self::draw_empty(&root, &title)?;
            return root.present().map_err(draw_err);
        }
        let count = labels.len();

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, (FONT, 20))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(label_area_width(&labels))
            .build_cartesian_2d(0f64..X_MAX, (0usize..count).into_segmented())
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(count)
            .y_label_formatter(&|v| Self::segment_label(&labels, v))
            .x_label_formatter(&|x| format!("{:.0}", x))
            .x_desc(comparison.dose.label())
            .y_desc(comparison.group_by.label())
            .draw()
            .map_err(draw_err)?;

        let connector = rgb(palette::CONNECTOR);
        chart
            .draw_series(labels.iter().enumerate().filter_map(|(i, category)| {
                let a = comparison.percent_of(category, Partition::Selected)?;
                let b = comparison.percent_of(category, Partition::Other)?;
                let y = SegmentValue::CenterOf(band(i, count));
                Some(PathElement::new(
                    vec![(a, y.clone()), (b, y)],
                    connector.stroke_width(3),
                ))
            }))
            .map_err(draw_err)?;

        for (partition, color) in [
            (Partition::Selected, rgb(palette::SELECTED)),
            (Partition::Other, rgb(palette::OTHER)),
        ] {
            chart
                .draw_series(labels.iter().enumerate().filter_map(|(i, category)| {
                    let p = comparison.percent_of(category, partition)?;
                    Some(Circle::new(
                        (p, SegmentValue::CenterOf(band(i, count))),
                        6,
                        color.filled(),
                    ))
                }))
                .map_err(draw_err)?
                .label(comparison.partition_label(partition))
                .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)
    }

    fn segment_label(labels: &[String], v: &SegmentValue<usize>) -> String {
        match v {
            SegmentValue::CenterOf(y) | SegmentValue::Exact(y) => labels
                .len()
                .checked_sub(1 + *y)
                .and_then(|i| labels.get(i))
                .cloned()
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        }
    }

    fn draw_empty<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        title: &str,
    ) -> Result<(), RenderError> {
        let (w, h) = root.dim_in_pixel();
        root.draw(&Text::new(
            title.to_string(),
            (w as i32 / 2, 30),
            (FONT, 22)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))
        .map_err(draw_err)?;
        root.draw(&Text::new(
            EMPTY_NOTE,
            (w as i32 / 2, h as i32 / 2),
            (FONT, 16)
                .into_font()
                .color(&rgb(palette::LABEL))
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))
        .map_err(draw_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dimension, DoseKind};

    #[test]
    fn test_band_puts_first_on_top() {
        assert_eq!(band(0, 4), 3);
        assert_eq!(band(3, 4), 0);
    }

    #[test]
    fn test_segment_label_maps_bands_to_categories() {
        let labels = vec!["Auckland".to_string(), "Northland".to_string()];
        assert_eq!(
            StaticChartRenderer::segment_label(&labels, &SegmentValue::CenterOf(1)),
            "Auckland"
        );
        assert_eq!(
            StaticChartRenderer::segment_label(&labels, &SegmentValue::CenterOf(0)),
            "Northland"
        );
        assert_eq!(
            StaticChartRenderer::segment_label(&labels, &SegmentValue::CenterOf(2)),
            ""
        );
        assert_eq!(
            StaticChartRenderer::segment_label(&labels, &SegmentValue::Last),
            ""
        );
    }

    #[test]
    fn test_empty_views_render_note() {
        let dir = tempfile::tempdir().unwrap();
        let view = DashboardView {
            dose: DoseKind::First,
            group_by: Dimension::Area,
            bars: Vec::new(),
            comparison: None,
            threshold: 90.0,
        };
        let bars = dir.path().join("bars.png");
        StaticChartRenderer::render_bars_png(&view, &bars, (400, 300)).unwrap();
        assert!(bars.metadata().unwrap().len() > 0);

        let comparison = ComparisonDataset {
            group_by: Dimension::Area,
            dose: DoseKind::First,
            filter_dimension: Dimension::Gender,
            filter_value: "Male".to_string(),
            rows: Vec::new(),
        };
        let path = dir.path().join("comparison.png");
        StaticChartRenderer::render_comparison_png(&comparison, &path, (400, 300)).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn test_label_area_width_bounds() {
        assert_eq!(label_area_width(&[]), 60);
        let long = vec!["x".repeat(200)];
        assert_eq!(label_area_width(&long), 260);
    }
}
