//! Shared cell-level parsing utilities.
//!
//! Every detector sees cells through [`CellParser`], so missing-value
//! normalization and numeric/date recognition are decided in exactly one
//! place.

use crate::config::AnalysisConfig;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

// =============================================================================
// Numeric Parsing
// =============================================================================

// Optional sign, plain digits or comma-grouped thousands, optional decimals
// and exponent. Bare ".5" is accepted, "1,23" is not.
static NUMERIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$")
        .expect("Invalid regex: numeric")
});

/// Try to parse a string as a numeric value (f64).
///
/// Accepts an optional sign, thousands separators and a decimal point.
/// Values that overflow `f64` (such as `1e999`) are not numeric.
///
/// ```rust,ignore
/// assert_eq!(parse_numeric_string("-1,234.5"), Some(-1234.5));
/// assert_eq!(parse_numeric_string("12abc"), None);
/// ```
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !NUMERIC_PATTERN.is_match(trimmed) {
        return None;
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Check if a string can be parsed as a numeric value.
pub fn is_numeric_string(s: &str) -> bool {
    parse_numeric_string(s).is_some()
}

// =============================================================================
// Date Patterns
// =============================================================================

/// A recognized date format: the chrono pattern used for strict parsing and
/// a regex describing its shape, used for type inference.
#[derive(Debug, Clone)]
pub struct DatePattern {
    format: String,
    shape: Option<Regex>,
    has_time: bool,
}

impl DatePattern {
    pub fn new(format: impl Into<String>) -> Self {
        let format = format.into();
        let shape = shape_regex(&format);
        let has_time = ["%H", "%M", "%S", "%T", "%R", "%I", "%p"]
            .iter()
            .any(|spec| format.contains(spec));
        Self {
            format,
            shape,
            has_time,
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Whether the value has the layout of this format (digits in the right
    /// places), without checking that it is a real calendar date.
    pub fn matches_shape(&self, value: &str) -> bool {
        match &self.shape {
            Some(regex) => regex.is_match(value),
            None => self.parses(value),
        }
    }

    /// Whether the value parses as a real date in this format.
    pub fn parses(&self, value: &str) -> bool {
        if self.has_time {
            NaiveDateTime::parse_from_str(value, &self.format).is_ok()
        } else {
            NaiveDate::parse_from_str(value, &self.format).is_ok()
        }
    }
}

/// Translate a chrono format string into an anchored shape regex.
///
/// Returns `None` when the format uses a specifier without a simple shape;
/// such formats fall back to strict parsing.
fn shape_regex(format: &str) -> Option<Regex> {
    let mut pattern = String::from("^");
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            pattern.push_str(&regex::escape(&c.to_string()));
            continue;
        }
        let piece = match chars.next()? {
            'Y' => r"\d{4}",
            'y' | 'C' => r"\d{2}",
            'm' | 'd' | 'e' | 'H' | 'M' | 'S' | 'I' => r"\d{1,2}",
            'j' => r"\d{1,3}",
            'b' | 'h' => r"[A-Za-z]{3}",
            'B' | 'A' => r"[A-Za-z]+",
            'a' => r"[A-Za-z]{3}",
            'p' => r"(?:AM|PM|am|pm)",
            '%' => "%",
            _ => return None,
        };
        pattern.push_str(piece);
    }

    pattern.push('$');
    Regex::new(&pattern).ok()
}

// =============================================================================
// Cell Parser
// =============================================================================

/// Parses raw cells with the missing-token list and date formats of one
/// analysis run.
#[derive(Debug, Clone)]
pub struct CellParser {
    missing_tokens: Vec<String>,
    date_patterns: Vec<DatePattern>,
}

impl CellParser {
    pub fn new(missing_tokens: &[String], date_formats: &[String]) -> Self {
        Self {
            missing_tokens: missing_tokens
                .iter()
                .map(|t| t.trim().to_lowercase())
                .collect(),
            date_patterns: date_formats.iter().map(DatePattern::new).collect(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(&config.missing_tokens, &config.date_formats)
    }

    /// Normalize a raw cell: `None` when the cell counts as missing.
    pub fn present<'a>(&self, raw: Option<&'a str>) -> Option<&'a str> {
        let value = raw?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lower = trimmed.to_lowercase();
        if self.missing_tokens.iter().any(|token| *token == lower) {
            return None;
        }
        Some(value)
    }

    pub fn is_missing(&self, raw: Option<&str>) -> bool {
        self.present(raw).is_none()
    }

    pub fn parse_numeric(&self, value: &str) -> Option<f64> {
        parse_numeric_string(value)
    }

    /// Whether the value has the shape of any recognized date format.
    pub fn looks_like_date(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.date_patterns.iter().any(|p| p.matches_shape(trimmed))
    }

    /// Index of the first recognized format the value parses with.
    pub fn parse_date(&self, value: &str) -> Option<usize> {
        let trimmed = value.trim();
        self.date_patterns.iter().position(|p| p.parses(trimmed))
    }

    pub fn date_patterns(&self) -> &[DatePattern] {
        &self.date_patterns
    }
}

impl Default for CellParser {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

// =============================================================================
// Arithmetic Helpers
// =============================================================================

/// Round half away from zero to `decimals` places.
///
/// Values too large to scale are already integral and returned unchanged.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// `100 * part / whole` rounded to 2 decimals; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(100.0 * part as f64 / whole as f64, 2)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string("-100"), Some(-100.0));
        assert_eq!(parse_numeric_string("+3.5"), Some(3.5));
        assert_eq!(parse_numeric_string("1,234.56"), Some(1234.56));
        assert_eq!(parse_numeric_string(" 7 "), Some(7.0));
        assert_eq!(parse_numeric_string(".5"), Some(0.5));
        assert_eq!(parse_numeric_string("1e3"), Some(1000.0));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("hello"), None);
        assert_eq!(parse_numeric_string("1,23"), None);
        assert_eq!(parse_numeric_string("NaN"), None);
        assert_eq!(parse_numeric_string("inf"), None);
        assert_eq!(parse_numeric_string("1e999"), None);
        assert_eq!(parse_numeric_string("-1e999"), None);
        assert_eq!(parse_numeric_string("1e308"), Some(1e308));
        assert_eq!(parse_numeric_string("2024-01-05"), None);
    }

    #[test]
    fn test_missing_tokens() {
        let parser = CellParser::default();
        assert!(parser.is_missing(None));
        assert!(parser.is_missing(Some("")));
        assert!(parser.is_missing(Some("   ")));
        assert!(parser.is_missing(Some("NA")));
        assert!(parser.is_missing(Some("n/a")));
        assert!(parser.is_missing(Some("NULL")));
        assert!(!parser.is_missing(Some("0")));
        assert!(!parser.is_missing(Some("none")));
        assert_eq!(parser.present(Some(" x ")), Some(" x "));
    }

    #[test]
    fn test_custom_missing_tokens() {
        let parser = CellParser::new(&["?".to_string()], &["%Y-%m-%d".to_string()]);
        assert!(parser.is_missing(Some("?")));
        assert!(!parser.is_missing(Some("NA")));
    }

    #[test]
    fn test_date_shape_vs_parse() {
        let parser = CellParser::default();
        assert!(parser.looks_like_date("2024-02-30"));
        assert_eq!(parser.parse_date("2024-02-30"), None);
        assert_eq!(parser.parse_date("2024-02-28"), Some(0));
        assert_eq!(parser.parse_date("12/31/2023"), Some(1));
        assert_eq!(parser.parse_date("31-12-2023"), Some(2));
        assert!(!parser.looks_like_date("2024"));
        assert!(!parser.looks_like_date("hello"));
    }

    #[test]
    fn test_shape_regex_translation() {
        let pattern = DatePattern::new("%Y/%m/%d %H:%M");
        assert!(pattern.matches_shape("2024/01/05 10:30"));
        assert!(!pattern.matches_shape("2024-01-05 10:30"));
        assert!(pattern.parses("2024/01/05 10:30"));
    }

    #[test]
    fn test_round_and_percentage() {
        assert_eq!(round_to(9.04, 1), 9.0);
        assert_eq!(round_to(2.345, 1), 2.3);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(10, 100), 10.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(round_to(1e308, 2), 1e308);
        assert_eq!(round_to(-f64::MAX, 2), -f64::MAX);
    }
}
