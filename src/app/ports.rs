use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;

/// Structured geocoder response: coordinates plus whatever metadata the provider returns
pub type GeocodeResult = Map<String, Value>;

/// External geocoding provider
#[async_trait]
pub trait GeocoderPort: Send + Sync {
    async fn geocode(&self, location: &str) -> Result<GeocodeResult>;
}
