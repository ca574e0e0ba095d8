use crate::models::DocumentType;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Shapes that only occur inside a machine-readable zone: the TD3 line-1
    // prefix, or the line-2 run of document number + nationality + birth date
    static ref MRZ_SHAPE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"P<[A-Z]{3}").unwrap(),
        Regex::new(r"[A-Z0-9]{9}[A-Z]{3}[0-9]{7}").unwrap(),
    ];
}

// Keyword signals, tested in order: passport indicators win over visa
// indicators, and an unrecognizable document is treated as a visa
const PASSPORT_KEYWORDS: [&str; 5] = ["passport", "passeport", "جواز سفر", "royaume", "kingdom"];
const VISA_KEYWORDS: [&str; 5] = ["visa", "تأشيرة", "entry", "umrah", "hajj"];

/// Decide whether recognized text came from a visa or a passport.
/// Pure function of the text; never fails.
pub fn classify_document(text: &str) -> DocumentType {
    if MRZ_SHAPE_PATTERNS.iter().any(|p| p.is_match(text)) {
        return DocumentType::Passport;
    }

    let lowered = text.to_lowercase();
    if PASSPORT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return DocumentType::Passport;
    }
    if VISA_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return DocumentType::Visa;
    }

    DocumentType::Visa
}
