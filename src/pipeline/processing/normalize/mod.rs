use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::app::ports::GeocodeResult;
use crate::observability::metrics;
use crate::pipeline::processing::dates::ParsedDate;
use crate::pipeline::processing::extract::{ExtractionOutcome, RawRow};

pub mod normalizers;

pub use normalizers::{MassShootingsNormalizer, SchoolShootingsNormalizer};

/// A cleaned, typed and enriched incident record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Fields of the raw row that the pipeline does not rewrite
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
    pub date: ParsedDate,
    pub deaths: String,
    pub injuries: String,
    pub perpetrator_died: bool,
    pub perpetrator_injured: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub geocode_results: GeocodeResult,
}

/// Result of post-processing one extractor result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProcessedFrame {
    /// Rows that survived validation, in input order
    Normalized(Vec<NormalizedRow>),
    /// The extractor result, untouched, when it held no row sequence
    PassThrough(Value),
}

impl ProcessedFrame {
    pub fn rows(&self) -> Option<&[NormalizedRow]> {
        match self {
            ProcessedFrame::Normalized(rows) => Some(rows),
            ProcessedFrame::PassThrough(_) => None,
        }
    }
}

/// Per-template transformation from raw rows to normalized rows
#[async_trait]
pub trait PostProcessor: Send + Sync {
    /// Key under which the extractor nests this template's rows
    fn root_key(&self) -> &str;

    /// Label used in logs and metrics
    fn name(&self) -> &str;

    /// Reduce raw rows into normalized rows, dropping invalid ones
    async fn reduce(&self, rows: Vec<RawRow>) -> Vec<NormalizedRow>;

    async fn process(&self, outcome: ExtractionOutcome) -> ProcessedFrame {
        match outcome {
            ExtractionOutcome::Rows(rows) => ProcessedFrame::Normalized(self.reduce(rows).await),
            ExtractionOutcome::NotFound(original) => {
                metrics::pipeline::pass_through(self.name());
                ProcessedFrame::PassThrough(original)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> NormalizedRow {
        let mut passthrough = Map::new();
        passthrough.insert("source_row".to_string(), json!(7));
        NormalizedRow {
            passthrough,
            date: ParsedDate::Unparseable,
            deaths: "4".to_string(),
            injuries: "2".to_string(),
            perpetrator_died: true,
            perpetrator_injured: false,
            description: "A shooting.".to_string(),
            location: Some("Somewhere, Texas".to_string()),
            geocode_results: GeocodeResult::new(),
        }
    }

    #[test]
    fn test_normalized_row_flattens_passthrough_fields() {
        let value = serde_json::to_value(sample_row()).unwrap();
        assert_eq!(value["source_row"], json!(7));
        assert_eq!(value["date"], Value::Null);
        assert_eq!(value["perpetrator_died"], json!(true));
        assert_eq!(value["geocode_results"], json!({}));
    }

    #[test]
    fn test_absent_location_is_omitted() {
        let row = NormalizedRow { location: None, ..sample_row() };
        let value = serde_json::to_value(row).unwrap();
        assert!(value.as_object().unwrap().get("location").is_none());
    }

    #[tokio::test]
    async fn test_computed_fields_win_over_raw_fields() {
        use crate::infra::geocode_client::OfflineGeocoder;
        use crate::pipeline::processing::enrich::{GeocodeCache, GeocodeEnricher};
        use std::sync::Arc;

        let enricher = GeocodeEnricher::new(Arc::new(OfflineGeocoder), Arc::new(GeocodeCache::new()));
        let normalizer = SchoolShootingsNormalizer::new(Arc::new(enricher));
        let rows = vec![RawRow::from_value(json!({
            "date": "May 18, 2018",
            "deaths": "10 (including perpetrator)",
            "injuries": "13",
            "description": "A shooting.",
            "perpetrator_died": "stale",
            "perpetrator_injured": "stale",
            "geocode_results": "stale"
        }))];

        let normalized = normalizer.reduce(rows).await;
        let text = serde_json::to_string(&normalized).unwrap();
        assert_eq!(text.matches("\"perpetrator_died\"").count(), 1);
        assert_eq!(text.matches("\"geocode_results\"").count(), 1);
        assert!(!text.contains("stale"));

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["perpetrator_died"], json!(true));
        assert_eq!(value[0]["geocode_results"], json!({}));
    }

    #[test]
    fn test_processed_frame_serializes_untagged() {
        let normalized = ProcessedFrame::Normalized(vec![sample_row()]);
        assert!(serde_json::to_value(&normalized).unwrap().is_array());

        let original = json!({ "unexpected": "shape" });
        let passed = ProcessedFrame::PassThrough(original.clone());
        assert_eq!(serde_json::to_value(&passed).unwrap(), original);
        assert!(passed.rows().is_none());
    }
}
