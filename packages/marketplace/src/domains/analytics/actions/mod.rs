mod aggregation;

pub use aggregation::{AggregationEngine, DEFAULT_MONTHS_BACK, DEFAULT_TOP_LOCATIONS};
