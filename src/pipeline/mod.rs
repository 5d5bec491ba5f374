// Data processing pipeline: raw extractor rows in, normalized records out

pub mod processing;
