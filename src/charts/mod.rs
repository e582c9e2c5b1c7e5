//! Charts module - Chart rendering

mod plotter;

pub use plotter::{
    normalize, palette_color, sequential_color, size_radius, BoxGroup, ChartPlotter, Curve,
    ScatterLayer, ACCENT, HIGHLIGHT, PRIMARY, SECONDARY,
};
