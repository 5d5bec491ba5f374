// Observability: metrics for the normalization pipeline

pub mod metrics;

pub use metrics::init;
