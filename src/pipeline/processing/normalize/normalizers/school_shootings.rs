use std::sync::Arc;

use async_trait::async_trait;

use super::base::{assemble_row, CasualtyCounts, ReductionStats};
use crate::constants::SCHOOL_SHOOTINGS_ROOT;
use crate::pipeline::processing::dates::DateResolver;
use crate::pipeline::processing::enrich::GeocodeEnricher;
use crate::pipeline::processing::extract::RawRow;
use crate::pipeline::processing::normalize::{NormalizedRow, PostProcessor};
use crate::pipeline::processing::quality_gate::{RecordValidator, RowDecision};

/// Normalizer for the school shootings list.
///
/// Casualty cells carry "(including perpetrator)" style annotations, which are
/// removed and turned into the `perpetrator_died` / `perpetrator_injured` flags.
/// All dates are kept.
pub struct SchoolShootingsNormalizer {
    dates: DateResolver,
    enricher: Arc<GeocodeEnricher>,
}

impl SchoolShootingsNormalizer {
    pub fn new(enricher: Arc<GeocodeEnricher>) -> Self {
        Self {
            dates: DateResolver::new(),
            enricher,
        }
    }
}

#[async_trait]
impl PostProcessor for SchoolShootingsNormalizer {
    fn root_key(&self) -> &str {
        SCHOOL_SHOOTINGS_ROOT
    }

    fn name(&self) -> &str {
        SCHOOL_SHOOTINGS_ROOT
    }

    async fn reduce(&self, rows: Vec<RawRow>) -> Vec<NormalizedRow> {
        let mut stats = ReductionStats::new(rows.len());
        let mut normalized = Vec::with_capacity(rows.len());

        for row in &rows {
            let decision = RecordValidator::assess(row, &self.dates, None);
            stats.record(&decision);
            let RowDecision::Accept(accepted) = decision else {
                continue;
            };

            let casualties =
                CasualtyCounts::with_perpetrator_flags(&accepted.fields.deaths, &accepted.fields.injuries);
            normalized.push(assemble_row(row, accepted, casualties, &self.enricher).await);
        }

        stats.finish(self.name());
        normalized
    }
}
