use crate::models::MrzData;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

lazy_static! {
    // TD3 line 1 opens with the document type, a filler and the issuing
    // state: P<XXX. Line 2 opens with document number + nationality + birth
    // date, which reads as a long alphanumeric run
    static ref LINE1_START: Regex = Regex::new(r"^P<[A-Z]{3}").unwrap();
    static ref LINE2_SHAPE: Regex = Regex::new(r"[A-Z0-9<]{9,}[A-Z]{3}[0-9]{7}").unwrap();
}

const MRZ_MIN_LINE_LEN: usize = 40;

/// Locate and decode the two TD3 machine-readable lines in recognized text.
///
/// Returns `None` when no usable MRZ block is present; the caller falls back
/// to pattern-based extraction in that case, so a missing MRZ is never an
/// error.
pub fn decode_mrz(text: &str) -> Option<MrzData> {
    let candidates: Vec<String> = text
        .lines()
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect())
        .collect();

    let (line1, line2) = locate_mrz_lines(&candidates)?;
    debug!("MRZ lines located: {} / {}", line1, line2);

    Some(decode_lines(&line1, &line2))
}

// Primary scan: a line that starts P<XXX and is long enough is line 1 and
// the next line is line 2. Fallback: a line with the line-2 shape is line 2
// and the preceding line is line 1.
fn locate_mrz_lines(candidates: &[String]) -> Option<(String, String)> {
    for (i, line) in candidates.iter().enumerate() {
        if line.len() >= MRZ_MIN_LINE_LEN && LINE1_START.is_match(line) {
            let next = candidates.get(i + 1)?;
            if next.is_empty() {
                return None;
            }
            return Some((line.clone(), next.clone()));
        }
    }

    for (i, line) in candidates.iter().enumerate() {
        if line.len() >= MRZ_MIN_LINE_LEN && LINE2_SHAPE.is_match(line) {
            if i == 0 {
                return None;
            }
            let prev = &candidates[i - 1];
            if prev.is_empty() {
                return None;
            }
            return Some((prev.clone(), line.clone()));
        }
    }

    None
}

fn decode_lines(line1: &str, line2: &str) -> MrzData {
    // Line 1 after the P<XXX prefix is SURNAME<<GIVEN<NAMES<<<...
    let name_field: String = line1.chars().skip(5).collect();
    let mut segments = name_field.split("<<");
    let last_name = segments
        .next()
        .map(|s| s.replace('<', " ").trim().to_string())
        .unwrap_or_default();
    let first_name = segments
        .next()
        .map(|s| s.replace('<', " ").trim().to_string())
        .unwrap_or_default();

    let passport_number = mrz_slice(line2, 0, 9)
        .trim_matches('<')
        .trim()
        .to_string();
    audit_check_digit(line2, &passport_number);

    let nationality = mrz_slice(line2, 10, 13).trim_matches('<').to_string();
    let date_of_birth = format_mrz_date(&mrz_slice(line2, 13, 19));
    let sex = mrz_slice(line2, 20, 21).trim_matches('<').to_string();
    let date_of_expiry = format_mrz_date(&mrz_slice(line2, 21, 27));

    MrzData {
        passport_number,
        date_of_birth,
        date_of_expiry,
        nationality,
        sex,
        last_name,
        first_name,
    }
}

fn mrz_slice(line: &str, start: usize, end: usize) -> String {
    line.chars().skip(start).take(end - start).collect()
}

/// Convert a YYMMDD field to DD/MM/YYYY. Years 50 and above read as 19YY,
/// the rest as 20YY. An impossible calendar date yields an empty string.
fn format_mrz_date(raw: &str) -> String {
    if raw.len() != 6 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return String::new();
    }

    let yy: i32 = raw[0..2].parse().unwrap_or(0);
    let month: u32 = raw[2..4].parse().unwrap_or(0);
    let day: u32 = raw[4..6].parse().unwrap_or(0);

    let year = if yy >= 50 { 1900 + yy } else { 2000 + yy };

    if chrono::NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return String::new();
    }

    format!("{:02}/{:02}/{:04}", day, month, year)
}

// ICAO 7-3-1 check digit over the document number field. Mismatches are only
// logged; the decoded value is reported unchanged.
fn audit_check_digit(line2: &str, passport_number: &str) {
    let field = mrz_slice(line2, 0, 9);
    let reported = mrz_slice(line2, 9, 10);
    let Some(reported) = reported.chars().next().and_then(|c| c.to_digit(10)) else {
        return;
    };

    let weights = [7u32, 3, 1];
    let mut sum = 0u32;
    for (i, c) in field.chars().enumerate() {
        let value = match c {
            '0'..='9' => c as u32 - '0' as u32,
            'A'..='Z' => c as u32 - 'A' as u32 + 10,
            '<' => 0,
            _ => return,
        };
        sum += value * weights[i % 3];
    }

    if sum % 10 != reported {
        warn!(
            "document number {} fails its MRZ check digit ({} expected {})",
            passport_number,
            reported,
            sum % 10
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE1: &str = "P<MARDOE<<JOHN<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<";
    const LINE2: &str = "AB12345674MAR8501019M3001017<<<<<<<<<<<<<<06";

    #[test]
    fn test_decode_round_trip() {
        let text = format!("MAROC ROYAUME DU MAROC\n{}\n{}", LINE1, LINE2);
        let mrz = decode_mrz(&text).unwrap();
        assert_eq!(mrz.last_name, "DOE");
        assert_eq!(mrz.first_name, "JOHN");
        assert_eq!(mrz.passport_number, "AB1234567");
        assert_eq!(mrz.nationality, "MAR");
        assert_eq!(mrz.date_of_birth, "01/01/1985");
        assert_eq!(mrz.sex, "M");
        assert_eq!(mrz.date_of_expiry, "01/01/2030");
    }

    #[test]
    fn test_filler_stripped_from_short_document_number() {
        let line2 = "AB12345<<4MAR8501019M3001017<<<<<<<<<<<<<<06";
        let text = format!("{}\n{}", LINE1, line2);
        let mrz = decode_mrz(&text).unwrap();
        assert_eq!(mrz.passport_number, "AB12345");
    }

    #[test]
    fn test_internal_whitespace_stripped() {
        // OCR tends to break MRZ lines with stray spaces
        let text = format!(
            "P<MARDOE<<JOHN <<<<<<<<<< <<<<<<<<<<<<<<<<<<\n{}",
            "AB1234567 4MAR85 01019M3001017<<<<<<<<<<<<<<06"
        );
        let mrz = decode_mrz(&text).unwrap();
        assert_eq!(mrz.passport_number, "AB1234567");
        assert_eq!(mrz.date_of_birth, "01/01/1985");
    }

    #[test]
    fn test_fallback_locates_line_two_first() {
        // Line 1 prefix garbled by OCR, so only the line-2 shape anchors
        let garbled1 = "PKMARDOE<<JOHN<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<";
        let text = format!("{}\n{}", garbled1, LINE2);
        let mrz = decode_mrz(&text).unwrap();
        assert_eq!(mrz.passport_number, "AB1234567");
        // Name decode still drops the five prefix characters of line 1
        assert_eq!(mrz.last_name, "DOE");
    }

    #[test]
    fn test_no_mrz_returns_none() {
        assert!(decode_mrz("").is_none());
        assert!(decode_mrz("Visa number 1234567890\nName: John Doe").is_none());
        // Line 1 alone, nothing following it
        assert!(decode_mrz(LINE1).is_none());
    }

    #[test]
    fn test_century_boundary() {
        assert_eq!(format_mrz_date("500101"), "01/01/1950");
        assert_eq!(format_mrz_date("490101"), "01/01/2049");
        assert_eq!(format_mrz_date("510101"), "01/01/1951");
    }

    #[test]
    fn test_invalid_dates_become_empty() {
        assert_eq!(format_mrz_date("851301"), "");
        assert_eq!(format_mrz_date("850132"), "");
        assert_eq!(format_mrz_date("85010"), "");
        assert_eq!(format_mrz_date("8501AA"), "");
        assert_eq!(format_mrz_date("990230"), "");
    }
}
