// Per-field parsers over raw recognized text. Each field tries an ordered
// list of patterns and settles for the first usable match; nothing here can
// fail the pipeline, a field that matches nothing is the empty string.
use crate::models::MrzData;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PASSPORT_NUMBER_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)passport\s*no\.?\s*[:#]?\s*([A-Z0-9]{5,15})").unwrap(),
        Regex::new(r"رقم\s*(?:ال)?جواز(?:\s*السفر)?\s*[:#]?\s*([A-Z0-9]{5,15})").unwrap(),
        Regex::new(r"\b([A-Z]{1,2}[0-9]{7,9})\b").unwrap(),
    ];

    static ref VISA_NUMBER_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)visa\s*no\.?\s*[:#]?\s*([0-9]{6,15})").unwrap(),
        Regex::new(r"رقم\s*التأشيرة\s*[:#]?\s*([0-9]{6,15})").unwrap(),
        Regex::new(r"\b([0-9]{10,12})\b").unwrap(),
    ];

    static ref BIRTH_DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:date\s*of\s*birth|birth\s*date|dob)\s*[:#]?\s*([0-9]{1,2}[/.\-][0-9]{1,2}[/.\-][0-9]{4})").unwrap(),
        Regex::new(r"تاريخ\s*الميلاد\s*[:#]?\s*([0-9]{1,2}[/.\-][0-9]{1,2}[/.\-][0-9]{4})").unwrap(),
        Regex::new(r"\b([0-9]{2}/[0-9]{2}/[0-9]{4})\b").unwrap(),
    ];

    static ref DATE_PARTS: Regex =
        Regex::new(r"([0-9]{1,2})[/.\-]([0-9]{1,2})[/.\-]([0-9]{4})").unwrap();

    // Everything between a name label and the next field label, possibly
    // spanning lines
    static ref NAME_SPAN_PATTERN: Regex = Regex::new(
        r"(?is)(?:\bfull\s*name\b|\bname\b|الاسم)\s*[:#]?\s*(.+?)(?:\bbirth\b|تاريخ|\bpassport\b|رقم|\bnationality\b|الجنسية|\bissue\b|\bvisa\b|\bduration\b)"
    ).unwrap();

    static ref NAME_LINE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(?:full\s*)?name\b\s*[:#.]?\s*(.+)").unwrap(),
        Regex::new(r"الاسم\s*[:#.]?\s*(.+)").unwrap(),
    ];

    static ref NAME_LABEL_STRIP: Regex =
        Regex::new(r"(?i)\b(?:full\s*name|name)\b|الاسم").unwrap();
}

// OCR noise that leaks into name candidates on Saudi visa scans
const NAME_NOISE_WORDS: [&str; 10] = [
    "ksa", "kingdom", "arabia", "saudi", "he", "al", "the", "visa", "digital", "embassy",
];

// A cleaned candidate that is nothing but one of these is no name at all
const REJECTED_NAME_WORDS: [&str; 6] = ["al", "he", "the", "of", "in", "by"];

// Lines that are visa headers rather than holder data
const HEADER_SKIP_WORDS_EN: [&str; 7] = [
    "kingdom", "ministry", "visa", "passport", "date", "duration", "place",
];
const HEADER_SKIP_WORDS_AR: [&str; 8] = [
    "المملكة", "مملكة", "وزارة", "تأشيرة", "جواز", "تاريخ", "مدة", "مكان",
];

// Labels and headers on a passport bio page, both scripts
const PASSPORT_BIO_SKIP_WORDS_EN: [&str; 9] = [
    "passport", "kingdom", "ministry", "republic", "date", "place", "authority",
    "nationality", "issue",
];
const PASSPORT_BIO_SKIP_WORDS_AR: [&str; 9] = [
    "جواز", "سفر", "رقم", "تاريخ", "مكان", "الجنسية", "سلطة", "الإصدار", "المهنة",
];

const MAX_NAME_LEN: usize = 50;
const ARABIC_BIO_MIN_RATIO: f32 = 0.7;

pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(is_arabic_char)
}

fn is_arabic_char(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{FB50}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFF}')
}

pub fn extract_passport_number(text: &str) -> String {
    for pattern in PASSPORT_NUMBER_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            if let Some(matched) = captures.get(1) {
                return matched.as_str().trim().to_uppercase();
            }
        }
    }
    String::new()
}

pub fn extract_visa_number(text: &str) -> String {
    for pattern in VISA_NUMBER_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            if let Some(matched) = captures.get(1) {
                return matched.as_str().trim().to_string();
            }
        }
    }
    String::new()
}

/// Birth date as DD/MM/YYYY, or empty when no plausible date is labelled or
/// shaped like one in the text.
pub fn extract_birth_date(text: &str) -> String {
    for pattern in BIRTH_DATE_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            if let Some(matched) = captures.get(1) {
                let normalized = normalize_date(matched.as_str());
                if !normalized.is_empty() {
                    return normalized;
                }
            }
        }
    }
    String::new()
}

// Zero-pad and validate a D/M/YYYY-ish capture. Impossible calendar dates
// are discarded rather than reported.
fn normalize_date(raw: &str) -> String {
    let Some(captures) = DATE_PARTS.captures(raw) else {
        return String::new();
    };
    let day: u32 = captures[1].parse().unwrap_or(0);
    let month: u32 = captures[2].parse().unwrap_or(0);
    let year: i32 = captures[3].parse().unwrap_or(0);

    if chrono::NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return String::new();
    }
    format!("{:02}/{:02}/{:04}", day, month, year)
}

/// Holder name from recognized text. Tries the anchored label-to-label span
/// first, then falls back to scanning for a plausible Arabic name line.
pub fn extract_full_name(text: &str) -> String {
    let anchored = extract_name_anchored(text);

    // The anchored result is kept only when it already looks like an Arabic
    // holder name; otherwise a line scan gets a chance to override it
    if anchored.is_empty() || anchored.chars().count() < 3 || !contains_arabic(&anchored) {
        let scanned = scan_name_lines(text, &HEADER_SKIP_WORDS_EN, &HEADER_SKIP_WORDS_AR, None);
        if !scanned.is_empty() {
            return scanned;
        }
    }

    anchored
}

/// Arabic name from a passport bio page. Stricter than the general scan:
/// the candidate must be dominantly Arabic-script.
pub fn extract_arabic_bio_name(text: &str) -> String {
    scan_name_lines(
        text,
        &PASSPORT_BIO_SKIP_WORDS_EN,
        &PASSPORT_BIO_SKIP_WORDS_AR,
        Some(ARABIC_BIO_MIN_RATIO),
    )
}

/// Preference order for a passport holder's name: bio-page Arabic name,
/// then the general extractors, then the MRZ name fields.
pub fn resolve_passport_name(text: &str, mrz: Option<&MrzData>) -> String {
    let bio_name = extract_arabic_bio_name(text);
    if !bio_name.is_empty() {
        return bio_name;
    }

    let general = extract_full_name(text);
    if !general.is_empty() {
        return general;
    }

    if let Some(mrz) = mrz {
        let combined = format!("{} {}", mrz.first_name, mrz.last_name);
        let combined = combined.trim();
        if !combined.is_empty() {
            return combined.to_string();
        }
    }

    String::new()
}

fn extract_name_anchored(text: &str) -> String {
    if let Some(captures) = NAME_SPAN_PATTERN.captures(text) {
        let cleaned = clean_name_candidate(&captures[1]);
        if !cleaned.is_empty() {
            return cleaned;
        }
    }

    for line in text.lines() {
        for pattern in NAME_LINE_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(line) {
                let cleaned = clean_name_candidate(&captures[1]);
                if !cleaned.is_empty() {
                    return cleaned;
                }
            }
        }
    }

    String::new()
}

// Line scan for an Arabic name: skip Latin-only lines and header lines,
// clean whatever is left, accept the first candidate with at least two
// tokens that stays under the length cap.
fn scan_name_lines(
    text: &str,
    skip_en: &[&str],
    skip_ar: &[&str],
    min_arabic_ratio: Option<f32>,
) -> String {
    for line in text.lines() {
        if !contains_arabic(line) {
            continue;
        }
        let lowered = line.to_lowercase();
        if skip_en.iter().any(|w| lowered.contains(w)) || skip_ar.iter().any(|w| line.contains(w))
        {
            continue;
        }

        let cleaned = clean_name_candidate(line);
        if cleaned.is_empty() {
            continue;
        }
        if cleaned.split_whitespace().count() < 2 || cleaned.chars().count() >= MAX_NAME_LEN {
            continue;
        }
        if let Some(min_ratio) = min_arabic_ratio {
            if arabic_ratio(&cleaned) < min_ratio {
                continue;
            }
        }
        return cleaned;
    }
    String::new()
}

fn arabic_ratio(text: &str) -> f32 {
    let total = text.chars().filter(|c| !c.is_whitespace()).count();
    if total == 0 {
        return 0.0;
    }
    let arabic = text.chars().filter(|c| is_arabic_char(*c)).count();
    arabic as f32 / total as f32
}

// Shared cleanup for any raw name candidate, whatever strategy produced it.
fn clean_name_candidate(raw: &str) -> String {
    let flattened = raw.replace('\n', " ").replace('\r', " ");
    let unlabelled = NAME_LABEL_STRIP.replace_all(&flattened, " ");

    // Punctuation becomes spacing so glued fragments split into tokens
    let depunctuated: String = unlabelled
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut tokens: Vec<&str> = depunctuated.split_whitespace().collect();

    if tokens.iter().any(|t| contains_arabic(t)) {
        // Around an Arabic name, short Latin words and digit runs are OCR
        // debris, not name parts
        tokens.retain(|t| {
            if t.chars().any(|c| c.is_ascii_digit()) {
                return false;
            }
            contains_arabic(t) || t.chars().filter(|c| c.is_ascii_alphabetic()).count() >= 5
        });
    }

    tokens.retain(|t| !NAME_NOISE_WORDS.contains(&t.to_lowercase().as_str()));

    let cleaned = tokens.join(" ");
    if cleaned.chars().count() < 3 {
        return String::new();
    }
    if REJECTED_NAME_WORDS.contains(&cleaned.to_lowercase().as_str()) {
        return String::new();
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passport_number_labelled() {
        assert_eq!(
            extract_passport_number("Passport No: A1234567\nother"),
            "A1234567"
        );
        assert_eq!(
            extract_passport_number("رقم الجواز : B9876543"),
            "B9876543"
        );
    }

    #[test]
    fn test_passport_number_bare_shape() {
        assert_eq!(
            extract_passport_number("holder data AB1234567 issued Jeddah"),
            "AB1234567"
        );
        assert_eq!(extract_passport_number("no numbers here"), "");
    }

    #[test]
    fn test_visa_number() {
        assert_eq!(extract_visa_number("Visa No. 123456789012"), "123456789012");
        assert_eq!(extract_visa_number("رقم التأشيرة 9876543210"), "9876543210");
        assert_eq!(extract_visa_number("reference 4444555566 end"), "4444555566");
        // An 8 digit run is not a visa number unless labelled
        assert_eq!(extract_visa_number("stamp 44445555 end"), "");
    }

    #[test]
    fn test_birth_date_normalization() {
        assert_eq!(extract_birth_date("Date of Birth: 12/05/1990"), "12/05/1990");
        assert_eq!(extract_birth_date("Birth Date 1-2-1990"), "01/02/1990");
        assert_eq!(extract_birth_date("تاريخ الميلاد: 07/11/1985"), "07/11/1985");
        assert_eq!(extract_birth_date("issued 02/03/2015 here"), "02/03/2015");
    }

    #[test]
    fn test_birth_date_rejects_impossible_dates() {
        assert_eq!(extract_birth_date("Date of Birth: 45/13/2020"), "");
        assert_eq!(extract_birth_date("Date of Birth: 30/02/1999"), "");
        assert_eq!(extract_birth_date("no date"), "");
    }

    #[test]
    fn test_name_anchored_span() {
        let text = "Full Name: Ahmed Mohammed Alotaibi\nBirth Date: 01/01/1990";
        assert_eq!(extract_full_name(text), "Ahmed Mohammed Alotaibi");
    }

    #[test]
    fn test_name_anchored_arabic_span() {
        let text = "الاسم: محمد الغزالي تاريخ الميلاد 01/01/1990";
        assert_eq!(extract_full_name(text), "محمد الغزالي");
    }

    #[test]
    fn test_name_line_scan_fallback() {
        let text = "Kingdom of Saudi Arabia\nMinistry of Foreign Affairs\nأحمد محمد العتيبي\n1234567890";
        assert_eq!(extract_full_name(text), "أحمد محمد العتيبي");
    }

    #[test]
    fn test_name_scan_skips_header_lines() {
        let text = "تأشيرة دخول المملكة\nوزارة الخارجية\nسالم فهد القحطاني";
        assert_eq!(extract_full_name(text), "سالم فهد القحطاني");
    }

    #[test]
    fn test_rejected_candidates_yield_empty() {
        for word in ["Al", "He", "The", "Of", "In", "By", "aL", "THE"] {
            assert_eq!(clean_name_candidate(word), "", "{} must be rejected", word);
        }
    }

    #[test]
    fn test_cleanup_strips_noise_around_arabic() {
        let raw = "KSA محمد 123 الغزالي Visa ab";
        assert_eq!(clean_name_candidate(raw), "محمد الغزالي");
    }

    #[test]
    fn test_cleanup_keeps_long_latin_words() {
        assert_eq!(
            clean_name_candidate("Ahmed Mohammed Alotaibi"),
            "Ahmed Mohammed Alotaibi"
        );
    }

    #[test]
    fn test_arabic_bio_name_requires_arabic_majority() {
        let mixed = "عبدالله Abdullah Alamri\nعبدالله سعد العمري";
        // First line is half Latin, second is pure Arabic
        assert_eq!(extract_arabic_bio_name(mixed), "عبدالله سعد العمري");
    }

    #[test]
    fn test_bio_name_skips_label_lines() {
        let text = "رقم الجواز A1234567\nجواز سفر\nنورة خالد الشمري";
        assert_eq!(extract_arabic_bio_name(text), "نورة خالد الشمري");
    }

    #[test]
    fn test_passport_name_priority() {
        let mrz = MrzData {
            passport_number: "A1234567".into(),
            date_of_birth: "01/01/1990".into(),
            date_of_expiry: "01/01/2030".into(),
            nationality: "SAU".into(),
            sex: "M".into(),
            last_name: "DOE".into(),
            first_name: "JOHN".into(),
        };

        // Bio-page Arabic name wins over everything
        let text = "جواز سفر\nفيصل ناصر الحربي";
        assert_eq!(resolve_passport_name(text, Some(&mrz)), "فيصل ناصر الحربي");

        // With no usable text the MRZ name is the last resort
        assert_eq!(resolve_passport_name("", Some(&mrz)), "JOHN DOE");
        assert_eq!(resolve_passport_name("", None), "");
    }
}
