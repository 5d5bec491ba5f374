// Adapters for the ports in `app::ports`
pub mod geocode_client;

pub use geocode_client::{DstkGeocoder, OfflineGeocoder};
