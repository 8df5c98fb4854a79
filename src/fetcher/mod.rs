pub mod client;
pub mod errors;
pub mod pipeline;
pub mod types;

pub use client::{HttpFetcher, PageFetcher};
pub use errors::FetchError;
pub use pipeline::decode;
pub use types::{Charset, DecodedPage, RawPage};
