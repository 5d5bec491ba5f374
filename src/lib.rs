pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod infra;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod templates;

pub use app::ProcessFrameUseCase;
pub use error::{Result, ScraperError};
pub use templates::{Template, TemplateRegistry};
