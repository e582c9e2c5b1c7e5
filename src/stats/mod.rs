//! Stats module - Descriptive statistics, distributions and dataset summaries

mod calculator;
pub mod distribution;
pub mod summary;

pub use calculator::{Describe, StatsCalculator};
pub use summary::DatasetSummary;
