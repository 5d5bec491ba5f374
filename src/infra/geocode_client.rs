use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::app::ports::{GeocodeResult, GeocoderPort};
use crate::config::GeocoderConfig;
use crate::error::{Result, ScraperError};

/// Geocoder backed by a Google-style geocode JSON endpoint such as the
/// Data Science Toolkit's `maps/api/geocode/json`.
pub struct DstkGeocoder {
    client: Client,
    base_url: String,
}

impl DstkGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client, base_url: config.base_url.clone() })
    }

    /// Request for one location; spaces in the address are sent as `+`
    fn request(&self, location: &str) -> Result<reqwest::Request> {
        Ok(self
            .client
            .get(&self.base_url)
            .query(&[("sensor", "false"), ("address", location)])
            .build()?)
    }
}

#[async_trait]
impl GeocoderPort for DstkGeocoder {
    async fn geocode(&self, location: &str) -> Result<GeocodeResult> {
        let request = self.request(location)?;
        debug!(url = %request.url(), "Requesting geocode");

        let response = self.client.execute(request).await?;
        if !response.status().is_success() {
            return Err(ScraperError::Geocode {
                message: format!("geocoder returned status {} for '{}'", response.status(), location),
            });
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

/// The provider answers with a JSON object; anything else is a failed lookup
fn parse_response(body: &str) -> Result<GeocodeResult> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(result)) => Ok(result),
        Ok(other) => Err(ScraperError::Geocode {
            message: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
        Err(e) => Err(ScraperError::Geocode { message: format!("malformed geocoder response: {}", e) }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Geocoder used when lookups are disabled. Every location resolves to an
/// empty result without leaving the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

#[async_trait]
impl GeocoderPort for OfflineGeocoder {
    async fn geocode(&self, _location: &str) -> Result<GeocodeResult> {
        Ok(GeocodeResult::new())
    }
}
