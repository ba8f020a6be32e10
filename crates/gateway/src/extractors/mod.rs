//! Custom request extractors.

mod client;
mod validated_json;

pub use client::ClientContext;
pub use validated_json::ValidatedJson;
