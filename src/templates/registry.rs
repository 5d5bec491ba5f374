use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{wikipedia, Template};
use crate::error::{Result, ScraperError};
use crate::pipeline::processing::dates::DateResolver;
use crate::pipeline::processing::enrich::GeocodeEnricher;

/// Registry of scrape templates, listed in registration order
pub struct TemplateRegistry {
    templates: Vec<Template>,
    index: HashMap<String, usize>,
}

impl TemplateRegistry {
    /// Create a registry with the built-in wikipedia templates.
    ///
    /// The pre-2018 boundary is resolved here, once, and shared by every run.
    pub fn new(enricher: Arc<GeocodeEnricher>) -> Result<Self> {
        let boundary = DateResolver::new().epoch_boundary()?;
        debug!(%boundary, "Resolved pre-2018 boundary");

        let mut registry = Self::empty();
        registry.register(wikipedia::school_shootings(enricher.clone()));
        registry.register(wikipedia::mass_shootings_pre_2018(enricher.clone(), boundary));
        registry.register(wikipedia::mass_shootings_2018(enricher.clone()));
        registry.register(wikipedia::mass_shootings_2019(enricher));
        Ok(registry)
    }

    pub fn empty() -> Self {
        Self { templates: Vec::new(), index: HashMap::new() }
    }

    /// Register a template, replacing any existing one with the same id
    pub fn register(&mut self, template: Template) {
        match self.index.get(&template.id) {
            Some(&position) => self.templates[position] = template,
            None => {
                self.index.insert(template.id.clone(), self.templates.len());
                self.templates.push(template);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.index.get(id).map(|&position| &self.templates[position])
    }

    /// Like [`get`](Self::get), but an unknown id is an error
    pub fn require(&self, id: &str) -> Result<&Template> {
        self.get(id).ok_or_else(|| ScraperError::UnknownTemplate(id.to_string()))
    }

    /// List all registered template ids
    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }
}
