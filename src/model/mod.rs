//! Document model types shared by loaders, extractors and components.
//!
//! These are plain serde records so they can travel inside host `Data`
//! payloads between component ports.

mod extracted;
mod source;

pub use extracted::{Chunk, ComponentPayload, ExtractedDocument, Metadata};
pub use source::DocumentSource;
