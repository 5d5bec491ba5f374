use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::base::{assemble_row, CasualtyCounts, ReductionStats};
use crate::pipeline::processing::dates::DateResolver;
use crate::pipeline::processing::enrich::GeocodeEnricher;
use crate::pipeline::processing::extract::RawRow;
use crate::pipeline::processing::normalize::{NormalizedRow, PostProcessor};
use crate::pipeline::processing::quality_gate::{RecordValidator, RowDecision};

/// Normalizer shared by the mass shootings lists.
///
/// Casualty and description cells only have their citation markers removed.
/// When a window is set, rows must resolve strictly before it; rows whose
/// date cannot be resolved are dropped in that case.
pub struct MassShootingsNormalizer {
    root_key: String,
    window: Option<NaiveDateTime>,
    dates: DateResolver,
    enricher: Arc<GeocodeEnricher>,
}

impl MassShootingsNormalizer {
    pub fn new(
        root_key: impl Into<String>,
        window: Option<NaiveDateTime>,
        enricher: Arc<GeocodeEnricher>,
    ) -> Self {
        Self {
            root_key: root_key.into(),
            window,
            dates: DateResolver::new(),
            enricher,
        }
    }
}

#[async_trait]
impl PostProcessor for MassShootingsNormalizer {
    fn root_key(&self) -> &str {
        &self.root_key
    }

    fn name(&self) -> &str {
        &self.root_key
    }

    async fn reduce(&self, rows: Vec<RawRow>) -> Vec<NormalizedRow> {
        let mut stats = ReductionStats::new(rows.len());
        let mut normalized = Vec::with_capacity(rows.len());

        for row in &rows {
            let decision = RecordValidator::assess(row, &self.dates, self.window);
            stats.record(&decision);
            let RowDecision::Accept(accepted) = decision else {
                continue;
            };

            let casualties =
                CasualtyCounts::citations_stripped(&accepted.fields.deaths, &accepted.fields.injuries);
            normalized.push(assemble_row(row, accepted, casualties, &self.enricher).await);
        }

        stats.finish(self.name());
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{GeocodeResult, GeocoderPort};
    use crate::constants::{MASS_SHOOTINGS_2018_ROOT, MASS_SHOOTINGS_PRE_2018_ROOT};
    use crate::error::{Result, ScraperError};
    use crate::pipeline::processing::enrich::GeocodeCache;
    use serde_json::json;

    struct FailingGeocoder;

    #[async_trait]
    impl GeocoderPort for FailingGeocoder {
        async fn geocode(&self, _location: &str) -> Result<GeocodeResult> {
            Err(ScraperError::Geocode { message: "offline".to_string() })
        }
    }

    fn enricher() -> Arc<GeocodeEnricher> {
        Arc::new(GeocodeEnricher::new(Arc::new(FailingGeocoder), Arc::new(GeocodeCache::new())))
    }

    fn row(date: &str) -> RawRow {
        RawRow::from_value(json!({
            "date": date,
            "location": "Las Vegas, Nevada",
            "deaths": "3[4]",
            "injuries": "1 (including perpetrator)",
            "description": "Shooting at a concert.[5][6]"
        }))
    }

    #[tokio::test]
    async fn test_pre_2018_window_is_strict() {
        let boundary = DateResolver::new().epoch_boundary().unwrap();
        let normalizer = MassShootingsNormalizer::new(MASS_SHOOTINGS_PRE_2018_ROOT, Some(boundary), enricher());

        let rows = vec![
            row("December 31, 2017"),
            row("January 1, 2018 12:00 am"),
            row("March 3, 2018"),
            row("sometime in the 1990s"),
        ];
        let normalized = normalizer.reduce(rows).await;

        assert_eq!(normalized.len(), 1);
        let expected = chrono::NaiveDate::from_ymd_opt(2017, 12, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(normalized[0].date.as_datetime(), Some(expected));
    }

    #[tokio::test]
    async fn test_strips_citations_but_not_perpetrator_text() {
        let normalizer = MassShootingsNormalizer::new(MASS_SHOOTINGS_2018_ROOT, None, enricher());
        let normalized = normalizer.reduce(vec![row("March 3, 2018")]).await;

        assert_eq!(normalized.len(), 1);
        let first = &normalized[0];
        assert_eq!(first.deaths, "3");
        assert_eq!(first.injuries, "1 (including perpetrator)");
        assert_eq!(first.description, "Shooting at a concert.");
        assert!(!first.perpetrator_died);
        assert!(!first.perpetrator_injured);
        assert_eq!(first.location.as_deref(), Some("Las Vegas, Nevada"));
        assert!(first.geocode_results.is_empty());
    }

    #[tokio::test]
    async fn test_no_window_keeps_unparseable_dates() {
        let normalizer = MassShootingsNormalizer::new(MASS_SHOOTINGS_2018_ROOT, None, enricher());
        let normalized = normalizer.reduce(vec![row("n/a")]).await;
        assert_eq!(normalized.len(), 1);
        assert!(!normalized[0].date.is_resolved());
    }
}
