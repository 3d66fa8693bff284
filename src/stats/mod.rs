//! Stats module - aggregation, descriptive statistics and distributions

mod aggregator;
mod calculator;
mod distribution;

pub use aggregator::{sum_by, top_n, GroupTotal};
pub use calculator::{ColumnSummary, StatsCalculator};
pub use distribution::{kde_counts, Histogram};
