use std::sync::Arc;

use serde_json::Value;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::normalize::ProcessedFrame;
use crate::templates::TemplateRegistry;

/// Use case for running one extractor result through a template's post-processor
pub struct ProcessFrameUseCase {
    registry: Arc<TemplateRegistry>,
}

impl ProcessFrameUseCase {
    pub fn new(registry: Arc<TemplateRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Post-process `frame` with the template registered under `template_id`
    pub async fn run(&self, template_id: &str, frame: Value) -> Result<ProcessedFrame> {
        let template = self.registry.require(template_id)?;
        let run_id = Uuid::new_v4();
        let span = info_span!("process_frame", template = %template.id, %run_id);

        let processed = async move {
            let processed = template.post_process(frame).await;
            let outcome = match &processed {
                ProcessedFrame::Normalized(rows) => {
                    info!(rows = rows.len(), "Frame normalized");
                    "normalized"
                }
                ProcessedFrame::PassThrough(_) => {
                    info!(root_key = template.root_key(), "No row sequence found, passing frame through");
                    "pass_through"
                }
            };
            metrics::pipeline::run_completed(&template.id, outcome);
            processed
        }
        .instrument(span)
        .await;

        Ok(processed)
    }

    /// Parse extractor output text as JSON, then [`run`](Self::run) it
    pub async fn run_from_str(&self, template_id: &str, input: &str) -> Result<ProcessedFrame> {
        let frame: Value = serde_json::from_str(input)?;
        self.run(template_id, frame).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScraperError;
    use crate::infra::geocode_client::OfflineGeocoder;
    use crate::pipeline::processing::enrich::{GeocodeCache, GeocodeEnricher};
    use serde_json::json;

    fn use_case() -> ProcessFrameUseCase {
        let enricher = GeocodeEnricher::new(Arc::new(OfflineGeocoder), Arc::new(GeocodeCache::new()));
        let registry = TemplateRegistry::new(Arc::new(enricher)).unwrap();
        ProcessFrameUseCase::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_run_normalizes_rows() {
        let frame = json!({
            "mass_shootings_2019": [{
                "date": "August 3, 2019",
                "location": "El Paso, Texas",
                "deaths": "23[1]",
                "injuries": "23",
                "description": "Shooting at a store.[2]"
            }]
        });

        let processed = use_case().run("wikipedia-mass-shootings-2019", frame).await.unwrap();
        let rows = processed.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].deaths, "23");
    }

    #[tokio::test]
    async fn test_run_passes_through_missing_root_key() {
        let frame = json!({ "school_shootings": [] });
        let processed = use_case().run("wikipedia-mass-shootings-2018", frame.clone()).await.unwrap();
        assert_eq!(processed, ProcessedFrame::PassThrough(frame));
    }

    #[tokio::test]
    async fn test_unknown_template_is_error() {
        let result = use_case().run("wikipedia-nope", json!({})).await;
        assert!(matches!(result, Err(ScraperError::UnknownTemplate(_))));
    }

    #[tokio::test]
    async fn test_run_from_str_rejects_malformed_json() {
        let result = use_case().run_from_str("wikipedia-school-shootings", "{not json").await;
        assert!(matches!(result, Err(ScraperError::Json(_))));
    }
}
