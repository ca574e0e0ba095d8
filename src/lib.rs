pub mod models;
pub mod pipeline;
pub mod processing;
pub mod utils;

pub use models::{DocumentType, ExtractedRecord};
pub use pipeline::ExtractionPipeline;
pub use utils::ExtractionError;
