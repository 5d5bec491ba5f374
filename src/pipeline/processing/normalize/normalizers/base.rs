use tracing::debug;

use crate::app::ports::GeocodeResult;
use crate::constants::FIELD_LOCATION;
use crate::observability::metrics;
use crate::pipeline::processing::enrich::GeocodeEnricher;
use crate::pipeline::processing::extract::RawRow;
use crate::pipeline::processing::normalize::NormalizedRow;
use crate::pipeline::processing::quality_gate::{AcceptedRow, RowDecision};
use crate::pipeline::processing::text::{extract_perpetrator_parenthetical, strip_citations};

/// Cleaned casualty cells and the perpetrator flags derived from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasualtyCounts {
    pub deaths: String,
    pub injuries: String,
    pub perpetrator_died: bool,
    pub perpetrator_injured: bool,
}

impl CasualtyCounts {
    /// Strip perpetrator annotations, flagging each cell independently
    pub fn with_perpetrator_flags(deaths: &str, injuries: &str) -> Self {
        let deaths = extract_perpetrator_parenthetical(deaths);
        let injuries = extract_perpetrator_parenthetical(injuries);
        Self {
            deaths: deaths.cleaned,
            injuries: injuries.cleaned,
            perpetrator_died: deaths.found_perpetrator,
            perpetrator_injured: injuries.found_perpetrator,
        }
    }

    /// Strip citation brackets only; perpetrator flags stay false
    pub fn citations_stripped(deaths: &str, injuries: &str) -> Self {
        Self {
            deaths: strip_citations(deaths),
            injuries: strip_citations(injuries),
            perpetrator_died: false,
            perpetrator_injured: false,
        }
    }
}

/// Build the output record for a row that passed validation.
///
/// The raw `location` is geocoded exactly as extracted; rows without one get
/// an empty result and no provider call.
pub async fn assemble_row(
    row: &RawRow,
    accepted: AcceptedRow<'_>,
    casualties: CasualtyCounts,
    enricher: &GeocodeEnricher,
) -> NormalizedRow {
    let location = row.text(FIELD_LOCATION).map(|l| l.into_owned());
    let geocode_results = match &location {
        Some(location) => enricher.resolve(location).await,
        None => GeocodeResult::new(),
    };

    NormalizedRow {
        passthrough: row.passthrough(),
        date: accepted.date,
        deaths: casualties.deaths,
        injuries: casualties.injuries,
        perpetrator_died: casualties.perpetrator_died,
        perpetrator_injured: casualties.perpetrator_injured,
        description: strip_citations(&accepted.fields.description),
        location,
        geocode_results,
    }
}

/// Row counts for one reduction
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReductionStats {
    pub received: usize,
    pub emitted: usize,
    pub incomplete: usize,
    pub outside_window: usize,
}

impl ReductionStats {
    pub fn new(received: usize) -> Self {
        Self { received, ..Self::default() }
    }

    pub fn record(&mut self, decision: &RowDecision<'_>) {
        match decision {
            RowDecision::Accept(_) => self.emitted += 1,
            RowDecision::Incomplete => self.incomplete += 1,
            RowDecision::OutsideWindow => self.outside_window += 1,
        }
    }

    /// Emit metrics and a debug summary for the finished reduction
    pub fn finish(&self, template: &str) {
        metrics::pipeline::rows_received(template, self.received);
        metrics::pipeline::rows_emitted(template, self.emitted);
        metrics::pipeline::rows_dropped(template, RowDecision::Incomplete.as_str(), self.incomplete);
        metrics::pipeline::rows_dropped(
            template,
            RowDecision::OutsideWindow.as_str(),
            self.outside_window,
        );
        debug!(
            template,
            received = self.received,
            emitted = self.emitted,
            incomplete = self.incomplete,
            outside_window = self.outside_window,
            "Reduced extracted rows"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::dates::DateResolver;
    use crate::pipeline::processing::quality_gate::RecordValidator;

    #[test]
    fn test_perpetrator_flags_are_independent() {
        let counts = CasualtyCounts::with_perpetrator_flags("2 (including the perpetrator)", "5");
        assert_eq!(counts.deaths, "2");
        assert_eq!(counts.injuries, "5");
        assert!(counts.perpetrator_died);
        assert!(!counts.perpetrator_injured);
    }

    #[test]
    fn test_perpetrator_rule_leaves_citations() {
        let counts = CasualtyCounts::with_perpetrator_flags("1[3]", "0");
        assert_eq!(counts.deaths, "1[3]");
    }

    #[test]
    fn test_citation_rule_leaves_perpetrator_text() {
        let counts = CasualtyCounts::citations_stripped("3 (including perpetrator)[2]", "4[5]");
        assert_eq!(counts.deaths, "3 (including perpetrator)");
        assert_eq!(counts.injuries, "4");
        assert!(!counts.perpetrator_died);
        assert!(!counts.perpetrator_injured);
    }

    #[test]
    fn test_stats_record_decisions() {
        let row = RawRow::from_value(serde_json::json!({
            "date": "May 18, 2018",
            "deaths": "10",
            "injuries": "13",
            "description": "A shooting."
        }));
        let accepted = RecordValidator::assess(&row, &DateResolver::new(), None);

        let mut stats = ReductionStats::new(4);
        stats.record(&accepted);
        stats.record(&accepted);
        stats.record(&RowDecision::Incomplete);
        stats.record(&RowDecision::OutsideWindow);
        assert_eq!(
            stats,
            ReductionStats { received: 4, emitted: 2, incomplete: 1, outside_window: 1 }
        );
    }
}
