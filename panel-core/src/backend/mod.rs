// HTTP layer: typed client for the backend's request/response endpoints.

mod client;
mod error;
mod types;

pub use client::BackendClient;
pub use error::BackendError;
pub use types::{BackendConfig, InteractSection, RecordSection, ResultResponse, SourceSection};
