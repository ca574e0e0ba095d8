// Deterministic contact-handle synthesis from the extracted name. The visa
// and passport paths deliberately order the prefix differently (first name
// leading on visas, surname leading on passports) and both orders must stay
// as they are.
use crate::models::MrzData;
use crate::processing::extractors::contains_arabic;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

pub const EMAIL_DOMAIN: &str = "comfythings.com";

// Field labels that look like capitalized word pairs but are never a name
const EMAIL_LABEL_SKIP_WORDS: [&str; 16] = [
    "name", "passport", "visa", "birth", "date", "place", "type", "code", "sex",
    "nationality", "saudi", "digital", "ministry", "umrah", "hajj", "kingdom",
];

lazy_static! {
    static ref CAPITALIZED_PAIR: Regex =
        Regex::new(r"\b([A-Z][a-z]+)\s+([A-Z][a-z]+)\b").unwrap();

    // Fixed Arabic to Latin substitutions for handle generation. Multi-letter
    // outputs are intentional (kh, sh, gh, th)
    static ref ARABIC_TO_LATIN: HashMap<char, &'static str> = {
        let mut map = HashMap::new();
        map.insert('ا', "a");
        map.insert('أ', "a");
        map.insert('إ', "i");
        map.insert('آ', "a");
        map.insert('ء', "");
        map.insert('ؤ', "o");
        map.insert('ئ', "e");
        map.insert('ب', "b");
        map.insert('ت', "t");
        map.insert('ث', "th");
        map.insert('ج', "j");
        map.insert('ح', "h");
        map.insert('خ', "kh");
        map.insert('د', "d");
        map.insert('ذ', "th");
        map.insert('ر', "r");
        map.insert('ز', "z");
        map.insert('س', "s");
        map.insert('ش', "sh");
        map.insert('ص', "s");
        map.insert('ض', "d");
        map.insert('ط', "t");
        map.insert('ظ', "z");
        map.insert('ع', "a");
        map.insert('غ', "gh");
        map.insert('ف', "f");
        map.insert('ق', "q");
        map.insert('ك', "k");
        map.insert('ل', "l");
        map.insert('م', "m");
        map.insert('ن', "n");
        map.insert('ه', "h");
        map.insert('ة', "a");
        map.insert('و', "w");
        map.insert('ي', "y");
        map.insert('ى', "a");
        map
    };
}

/// Substitute Arabic letters with their Latin approximations. ASCII
/// letters, digits and spaces pass through; anything else is dropped.
pub fn transliterate_arabic(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if let Some(mapped) = ARABIC_TO_LATIN.get(&c) {
            out.push_str(mapped);
        } else if c.is_ascii_alphanumeric() || c == ' ' {
            out.push(c);
        }
    }
    out
}

/// Visa-path address: transliterated first token plus the first three
/// letters of the second token; falls back to the first capitalized English
/// word pair in the text that is not a field label.
pub fn synthesize_visa_email(text: &str, name: &str) -> String {
    if !name.is_empty() && contains_arabic(name) {
        let latin = transliterate_arabic(name);
        let tokens: Vec<&str> = latin.split_whitespace().collect();
        if tokens.len() >= 2 {
            let prefix = format!("{}{}", tokens[0], first_letters(tokens[1], 3));
            return format_address(&prefix);
        }
        if tokens.len() == 1 {
            return format_address(tokens[0]);
        }
    }

    for captures in CAPITALIZED_PAIR.captures_iter(text) {
        let first = &captures[1];
        if EMAIL_LABEL_SKIP_WORDS.contains(&first.to_lowercase().as_str()) {
            continue;
        }
        let prefix = format!("{}{}", first, first_letters(&captures[2], 3));
        return format_address(&prefix);
    }

    String::new()
}

/// Passport-path address: MRZ surname (spaces removed) plus the first three
/// letters of the MRZ given name; without MRZ names, the transliteration
/// rule applies with the roles reversed (last token leads).
pub fn synthesize_passport_email(mrz: Option<&MrzData>, name: &str) -> String {
    if let Some(mrz) = mrz {
        if !mrz.last_name.is_empty() && !mrz.first_name.is_empty() {
            let prefix = format!(
                "{}{}",
                mrz.last_name.replace(' ', ""),
                first_letters(&mrz.first_name, 3)
            );
            return format_address(&prefix);
        }
    }

    if !name.is_empty() && contains_arabic(name) {
        let latin = transliterate_arabic(name);
        let tokens: Vec<&str> = latin.split_whitespace().collect();
        if tokens.len() >= 2 {
            let last = tokens[tokens.len() - 1];
            let prefix = format!("{}{}", last, first_letters(tokens[0], 3));
            return format_address(&prefix);
        }
        if tokens.len() == 1 {
            return format_address(tokens[0]);
        }
    }

    String::new()
}

fn first_letters(token: &str, count: usize) -> String {
    token.chars().take(count).collect()
}

fn format_address(prefix: &str) -> String {
    format!("{}@{}", prefix.to_lowercase(), EMAIL_DOMAIN)
}
