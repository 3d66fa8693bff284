//! Charts module - Static chart rendering

mod renderer;
mod theme;

pub use renderer::{ChartInputs, ChartKind, ChartRenderer};
pub use theme::ChartTheme;
