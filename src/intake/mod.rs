//! Storage-triggered document intake: analysis, record construction, and persistence.

mod keys;
mod service;
pub mod types;

pub use keys::{record_key, source_locator};
pub use service::{IntakeApi, IntakeService};
pub use types::{
    ExtractedDocumentRecord, ExtractedEntity, IntakeError, IntakeEvent, IntakeOutcome,
};
