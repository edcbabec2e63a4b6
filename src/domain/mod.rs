// Domain layer - Metric data and pure transformations
pub mod aggregate;
pub mod metric;
pub mod stats;
