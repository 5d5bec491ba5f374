//! Simple metrics module for the normalization pipeline
//!
//! Recording goes through the `metrics` facade, so every call is a no-op until
//! a recorder is installed with [`init`].

use std::fmt;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::error::{Result, ScraperError};

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Pipeline metrics
    PipelineRuns,
    PipelineRowsReceived,
    PipelineRowsEmitted,
    PipelineRowsDropped,
    PipelinePassThrough,
    PipelineBatchSize,

    // Geocode metrics
    GeocodeCacheHits,
    GeocodeCacheMisses,
    GeocodeFailures,
    GeocodeLookupDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    /// Prometheus name of the metric
    pub fn as_str(&self) -> &'static str {
        match self {
            // Pipeline metrics
            MetricName::PipelineRuns => "sts_pipeline_runs_total",
            MetricName::PipelineRowsReceived => "sts_pipeline_rows_received_total",
            MetricName::PipelineRowsEmitted => "sts_pipeline_rows_emitted_total",
            MetricName::PipelineRowsDropped => "sts_pipeline_rows_dropped_total",
            MetricName::PipelinePassThrough => "sts_pipeline_pass_through_total",
            MetricName::PipelineBatchSize => "sts_pipeline_batch_size",

            // Geocode metrics
            MetricName::GeocodeCacheHits => "sts_geocode_cache_hits_total",
            MetricName::GeocodeCacheMisses => "sts_geocode_cache_misses_total",
            MetricName::GeocodeFailures => "sts_geocode_failures_total",
            MetricName::GeocodeLookupDuration => "sts_geocode_lookup_duration_seconds",
        }
    }

    /// Get all metric names as an iterator
    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            PipelineRuns,
            PipelineRowsReceived,
            PipelineRowsEmitted,
            PipelineRowsDropped,
            PipelinePassThrough,
            PipelineBatchSize,
            GeocodeCacheHits,
            GeocodeCacheMisses,
            GeocodeFailures,
            GeocodeLookupDuration,
        ]
        .into_iter()
    }
}

/// Install the Prometheus recorder and hand back a handle for rendering
pub fn init() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ScraperError::Config(format!("Failed to install Prometheus recorder: {}", e)))?;
    info!("Metrics system initialized");
    Ok(handle)
}

pub mod pipeline {
    use super::MetricName;

    /// Record a finished pipeline run
    pub fn run_completed(template: &str, outcome: &'static str) {
        ::metrics::counter!(
            MetricName::PipelineRuns.as_str(),
            "template" => template.to_string(),
            "outcome" => outcome
        )
        .increment(1);
    }

    /// Record how many raw rows a run started with
    pub fn rows_received(template: &str, count: usize) {
        ::metrics::counter!(MetricName::PipelineRowsReceived.as_str(), "template" => template.to_string())
            .increment(count as u64);
        ::metrics::histogram!(MetricName::PipelineBatchSize.as_str()).record(count as f64);
    }

    pub fn rows_emitted(template: &str, count: usize) {
        ::metrics::counter!(MetricName::PipelineRowsEmitted.as_str(), "template" => template.to_string())
            .increment(count as u64);
    }

    /// Record rows left out of the output, by reason
    pub fn rows_dropped(template: &str, reason: &'static str, count: usize) {
        if count == 0 {
            return;
        }
        ::metrics::counter!(
            MetricName::PipelineRowsDropped.as_str(),
            "template" => template.to_string(),
            "reason" => reason
        )
        .increment(count as u64);
    }

    /// Record an extractor result that had nothing to post-process
    pub fn pass_through(template: &str) {
        ::metrics::counter!(MetricName::PipelinePassThrough.as_str(), "template" => template.to_string())
            .increment(1);
    }
}

pub mod geocode {
    use super::MetricName;

    pub fn cache_hit() {
        ::metrics::counter!(MetricName::GeocodeCacheHits.as_str()).increment(1);
    }

    pub fn cache_miss() {
        ::metrics::counter!(MetricName::GeocodeCacheMisses.as_str()).increment(1);
    }

    pub fn failure() {
        ::metrics::counter!(MetricName::GeocodeFailures.as_str()).increment(1);
    }

    pub fn lookup_duration(secs: f64) {
        ::metrics::histogram!(MetricName::GeocodeLookupDuration.as_str()).record(secs);
    }
}
