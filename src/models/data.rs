use serde::{Deserialize, Serialize};

/// Kind of travel document the recognized text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Visa,
    Passport,
}

/// The assembled output of one extraction call.
///
/// Every field is always present; a field the pipeline could not determine
/// is the empty string, never absent. `client_photo` is a JPEG data URI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub full_name: String,
    pub email: String,
    pub passport_number: String,
    pub visa_number: String,
    pub birth_date: String,
    pub client_photo: String,
}

/// Fields decoded from the two TD3 machine-readable lines of a passport.
/// Lives only for the duration of one extraction call.
#[derive(Debug, Clone, PartialEq)]
pub struct MrzData {
    pub passport_number: String,
    pub date_of_birth: String,
    pub date_of_expiry: String,
    pub nationality: String,
    pub sex: String,
    pub last_name: String,
    pub first_name: String,
}

/// Bounding box returned by a face detector, in pixel coordinates of the
/// image it was run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
