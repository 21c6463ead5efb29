//! Charts module - chart rendering

mod renderer;

pub use renderer::{ChartRenderer, CHART_FILES};
