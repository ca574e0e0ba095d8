pub mod data;

pub use data::{DocumentType, ExtractedRecord, FaceBox, MrzData};
