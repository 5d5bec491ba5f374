use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    FIELD_DATE, FIELD_DEATHS, FIELD_DESCRIPTION, FIELD_GEOCODE_RESULTS, FIELD_INJURIES,
    FIELD_LOCATION, FIELD_PERPETRATOR_DIED, FIELD_PERPETRATOR_INJURED,
};

/// Fields the pipeline writes; everything else on a row passes through untouched
const NORMALIZED_FIELDS: [&str; 8] = [
    FIELD_DATE,
    FIELD_LOCATION,
    FIELD_DEATHS,
    FIELD_INJURIES,
    FIELD_DESCRIPTION,
    FIELD_PERPETRATOR_DIED,
    FIELD_PERPETRATOR_INJURED,
    FIELD_GEOCODE_RESULTS,
];

/// One unprocessed table row as produced by the frame extractor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    fields: Map<String, Value>,
}

impl RawRow {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Rows that are not JSON objects carry no fields at all.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Text of a field. Missing keys and JSON null are absent; other scalars
    /// are rendered as their JSON text.
    pub fn text(&self, name: &str) -> Option<Cow<'_, str>> {
        match self.fields.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    /// Every field except the ones the pipeline computes
    pub fn passthrough(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|(key, _)| !NORMALIZED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl From<Map<String, Value>> for RawRow {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// What the extractor handed back for one page
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// The root key held a sequence of rows
    Rows(Vec<RawRow>),
    /// The root key was missing or not a sequence; the original value is kept as-is
    NotFound(Value),
}

impl ExtractionOutcome {
    /// Split an extractor result on `root_key`.
    pub fn from_frame(frame: Value, root_key: &str) -> Self {
        let mut object = match frame {
            Value::Object(object) => object,
            other => return ExtractionOutcome::NotFound(other),
        };

        match object.remove(root_key) {
            Some(Value::Array(rows)) => {
                ExtractionOutcome::Rows(rows.into_iter().map(RawRow::from_value).collect())
            }
            Some(other) => {
                object.insert(root_key.to_string(), other);
                ExtractionOutcome::NotFound(Value::Object(object))
            }
            None => ExtractionOutcome::NotFound(Value::Object(object)),
        }
    }

}
