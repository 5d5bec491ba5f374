use std::sync::Arc;

use chrono::NaiveDateTime;

use super::{ExtractionSpec, Template};
use crate::constants::*;
use crate::pipeline::processing::enrich::GeocodeEnricher;
use crate::pipeline::processing::normalize::{MassShootingsNormalizer, SchoolShootingsNormalizer};

const SCHOOL_DESCRIPTION_COLUMN: usize = 5;
const MASS_DESCRIPTION_COLUMN: usize = 6;

pub fn school_shootings(enricher: Arc<GeocodeEnricher>) -> Template {
    Template::new(
        SCHOOL_SHOOTINGS_TEMPLATE,
        SCHOOL_SHOOTINGS_URL,
        ExtractionSpec::wikitable(SCHOOL_SHOOTINGS_ROOT, SCHOOL_DESCRIPTION_COLUMN),
        Arc::new(SchoolShootingsNormalizer::new(enricher)),
    )
}

/// The all-years list, restricted to incidents before `boundary`
pub fn mass_shootings_pre_2018(enricher: Arc<GeocodeEnricher>, boundary: NaiveDateTime) -> Template {
    mass_shootings(
        MASS_SHOOTINGS_PRE_2018_TEMPLATE,
        MASS_SHOOTINGS_URL,
        MASS_SHOOTINGS_PRE_2018_ROOT,
        Some(boundary),
        enricher,
    )
}

pub fn mass_shootings_2018(enricher: Arc<GeocodeEnricher>) -> Template {
    mass_shootings(
        MASS_SHOOTINGS_2018_TEMPLATE,
        MASS_SHOOTINGS_2018_URL,
        MASS_SHOOTINGS_2018_ROOT,
        None,
        enricher,
    )
}

pub fn mass_shootings_2019(enricher: Arc<GeocodeEnricher>) -> Template {
    mass_shootings(
        MASS_SHOOTINGS_2019_TEMPLATE,
        MASS_SHOOTINGS_2019_URL,
        MASS_SHOOTINGS_2019_ROOT,
        None,
        enricher,
    )
}

fn mass_shootings(
    id: &str,
    url: &str,
    root_key: &str,
    window: Option<NaiveDateTime>,
    enricher: Arc<GeocodeEnricher>,
) -> Template {
    Template::new(
        id,
        url,
        ExtractionSpec::wikitable(root_key, MASS_DESCRIPTION_COLUMN),
        Arc::new(MassShootingsNormalizer::new(root_key, window, enricher)),
    )
}
