// Pipeline processing: text cleanup, date resolution, validation, enrichment and normalization

pub mod dates;
pub mod enrich;
pub mod extract;
pub mod normalize;
pub mod quality_gate;
pub mod text;
