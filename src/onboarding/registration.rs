use once_cell::sync::Lazy;
use regex::Regex;

// Current format (AB12CDE), prefix (A999AAA), suffix (AAA999A) and a
// permissive dateless fallback for cherished plates.
static UK_REG_PATTERNS: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z]{3}$").expect("current reg pattern"),
        Regex::new(r"^[A-Z][0-9]{1,3}[A-Z]{3}$").expect("prefix reg pattern"),
        Regex::new(r"^[A-Z]{3}[0-9]{1,3}[A-Z]$").expect("suffix reg pattern"),
        Regex::new(r"^(?:[A-Z]{1,4}[0-9]{1,4}|[0-9]{1,4}[A-Z]{1,4})$")
            .expect("dateless reg pattern"),
    ]
});

/// Uppercases and strips whitespace: `"ab 12 cde"` becomes `"AB12CDE"`.
/// Registrations are stored and compared in this normalized form.
pub fn format_uk_reg(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Checks a normalized registration against the known UK plate formats.
pub fn is_uk_reg(normalized: &str) -> bool {
    UK_REG_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_spacing() {
        assert_eq!(format_uk_reg("ab 12 cde"), "AB12CDE");
        assert_eq!(format_uk_reg(" ab12cde "), "AB12CDE");
    }

    #[test]
    fn accepts_current_format() {
        assert!(is_uk_reg("AB12CDE"));
    }

    #[test]
    fn accepts_prefix_and_suffix_formats() {
        assert!(is_uk_reg("A123BCD"));
        assert!(is_uk_reg("ABC123D"));
        assert!(is_uk_reg("A1BCD"));
    }

    #[test]
    fn accepts_dateless_plates() {
        assert!(is_uk_reg("ABC1"));
        assert!(is_uk_reg("1ABC"));
    }

    #[test]
    fn rejects_digits_only_and_garbage() {
        assert!(!is_uk_reg("12345"));
        assert!(!is_uk_reg(""));
        assert!(!is_uk_reg("AB12CDEFG"));
        assert!(!is_uk_reg("AB-12-CDE"));
    }
}
