//! Charts module - Chart rendering

pub mod palette;
mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};
