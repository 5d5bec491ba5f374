//! Scrape templates: what to extract from a page and how to post-process it.
//!
//! Extraction itself happens outside this crate. A template only declares the
//! frame the extractor should apply and owns the post-processor that turns the
//! extractor's result into normalized rows.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::constants::{
    FIELD_DATE, FIELD_DEATHS, FIELD_DESCRIPTION, FIELD_INJURIES, FIELD_LOCATION,
    WIKIPEDIA_CONTAINER_SELECTOR, WIKITABLE_ROW_SELECTOR,
};
use crate::pipeline::processing::extract::ExtractionOutcome;
use crate::pipeline::processing::normalize::{PostProcessor, ProcessedFrame};

pub mod registry;
pub mod wikipedia;

pub use registry::TemplateRegistry;

/// A field name paired with the cell selector relative to its row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellSelector {
    pub field: String,
    pub selector: String,
}

impl CellSelector {
    pub fn new(field: impl Into<String>, selector: impl Into<String>) -> Self {
        Self { field: field.into(), selector: selector.into() }
    }

    /// The `n`th table cell of a row, counting from 1
    pub fn nth_cell(field: &str, n: usize) -> Self {
        Self::new(field, format!("td:nth-child({})", n))
    }
}

/// Declarative description of the table an extractor should pull rows from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionSpec {
    pub container_selector: String,
    pub root_key: String,
    pub row_selector: String,
    pub row_shape: Vec<CellSelector>,
    pub scrape_options: Map<String, Value>,
}

impl ExtractionSpec {
    /// Standard wikipedia list layout: date, location, deaths and injuries in
    /// the first four cells, the description in `description_column`.
    pub fn wikitable(root_key: &str, description_column: usize) -> Self {
        Self {
            container_selector: WIKIPEDIA_CONTAINER_SELECTOR.to_string(),
            root_key: root_key.to_string(),
            row_selector: WIKITABLE_ROW_SELECTOR.to_string(),
            row_shape: vec![
                CellSelector::nth_cell(FIELD_DATE, 1),
                CellSelector::nth_cell(FIELD_LOCATION, 2),
                CellSelector::nth_cell(FIELD_DEATHS, 3),
                CellSelector::nth_cell(FIELD_INJURIES, 4),
                CellSelector::nth_cell(FIELD_DESCRIPTION, description_column),
            ],
            scrape_options: Map::new(),
        }
    }

    /// Render the frame document handed to the extractor:
    /// `{root_key: {"_s": row_selector, "_d": [{field: selector, ...}]}}`
    pub fn to_frame(&self) -> Value {
        let shape: Map<String, Value> = self
            .row_shape
            .iter()
            .map(|cell| (cell.field.clone(), Value::String(cell.selector.clone())))
            .collect();

        let mut frame = Map::new();
        frame.insert(
            self.root_key.clone(),
            json!({ "_s": self.row_selector, "_d": [Value::Object(shape)] }),
        );
        Value::Object(frame)
    }
}

/// A named scrape target with its extraction frame and post-processor
#[derive(Clone)]
pub struct Template {
    pub id: String,
    pub source_url: String,
    pub extraction: ExtractionSpec,
    post_processor: Arc<dyn PostProcessor>,
}

impl Template {
    pub fn new(
        id: impl Into<String>,
        source_url: impl Into<String>,
        extraction: ExtractionSpec,
        post_processor: Arc<dyn PostProcessor>,
    ) -> Self {
        Self {
            id: id.into(),
            source_url: source_url.into(),
            extraction,
            post_processor,
        }
    }

    pub fn root_key(&self) -> &str {
        &self.extraction.root_key
    }

    pub fn post_processor(&self) -> &dyn PostProcessor {
        self.post_processor.as_ref()
    }

    /// Run the post-processor over one extractor result
    pub async fn post_process(&self, frame: Value) -> ProcessedFrame {
        let outcome = ExtractionOutcome::from_frame(frame, self.root_key());
        self.post_processor.process(outcome).await
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("id", &self.id)
            .field("source_url", &self.source_url)
            .field("extraction", &self.extraction)
            .field("post_processor", &self.post_processor.name())
            .finish()
    }
}
