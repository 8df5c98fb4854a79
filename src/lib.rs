pub mod api;
pub mod app_state;
pub mod avatar;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod health;
pub mod preview;
pub mod telemetry;

pub use extractor::Metadata;
pub use preview::{PreviewError, preview};
