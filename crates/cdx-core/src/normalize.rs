//! Percentage normalization for free-text queries and probability inputs.
//!
//! Natural-language questions quote diagnostic accuracy as "sensitivity 90%";
//! the estimators want `0.9`. Rewriting happens on the decimal text rather
//! than by dividing a float, so `14.1%` becomes `0.141` and not
//! `0.14100000000000001`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static RE_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").expect("percent pattern compiles"));

/// `digits` interpreted as a percentage, e.g. "92.5" → 0.925.
fn percent_to_fraction(digits: &str) -> Option<f64> {
    format!("{digits}e-2")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Shortest decimal text that round-trips, always with a fractional part.
fn format_fraction(value: f64) -> String {
    format!("{value:?}")
}

/// Rewrite every `N%` / `N.M%` in `text` as its decimal fraction.
///
/// ```
/// use cdx_core::normalize::normalize_percentages;
/// assert_eq!(normalize_percentages("sensitivity 90%"), "sensitivity 0.9");
/// assert_eq!(normalize_percentages("npa 92.5 %"), "npa 0.925");
/// ```
pub fn normalize_percentages(text: &str) -> String {
    RE_PERCENT
        .replace_all(text, |caps: &Captures<'_>| match percent_to_fraction(&caps[1]) {
            Some(value) => format_fraction(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Parse a probability written as a plain number ("0.9") or a percentage ("90%").
///
/// Returns `None` for anything else. Domain checks are left to the estimators.
pub fn parse_probability(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if let Some(digits) = trimmed.strip_suffix('%') {
        let digits = digits.trim_end();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return None;
        }
        return percent_to_fraction(digits);
    }
    trimmed.parse::<f64>().ok()
}

/// Serde helpers for probability-valued fields that accept `0.9` or `"90%"`.
pub(crate) mod probability {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(value),
            Raw::Text(text) => super::parse_probability(&text).ok_or_else(|| {
                D::Error::custom(format!(
                    "invalid probability {text:?}: expected a number or a percentage such as \"90%\""
                ))
            }),
        }
    }

    pub fn schema(_gen: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "oneOf": [
                { "type": "number" },
                { "type": "string", "pattern": r"^\s*\d+(\.\d+)?\s*%?\s*$" }
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_integer_percentages() {
        assert_eq!(normalize_percentages("sensitivity 90%"), "sensitivity 0.9");
        assert_eq!(
            normalize_percentages("ppa 95% and npa 90% at 30% prevalence"),
            "ppa 0.95 and npa 0.9 at 0.3 prevalence"
        );
        assert_eq!(normalize_percentages("all 100%"), "all 1.0");
        assert_eq!(normalize_percentages("5%"), "0.05");
    }

    #[test]
    fn rewrites_decimal_percentages() {
        assert_eq!(normalize_percentages("92.5%"), "0.925");
        assert_eq!(normalize_percentages("14.1%"), "0.141");
        assert_eq!(normalize_percentages("0.5 %"), "0.005");
    }

    #[test]
    fn leaves_other_text_alone() {
        let text = "n1 = 100 subjects, delta1 = 0.5";
        assert_eq!(normalize_percentages(text), text);
        assert_eq!(normalize_percentages(""), "");
    }

    #[test]
    fn parses_probabilities() {
        assert_eq!(parse_probability("90%"), Some(0.9));
        assert_eq!(parse_probability(" 92.5 % "), Some(0.925));
        assert_eq!(parse_probability("0.3"), Some(0.3));
        assert_eq!(parse_probability("1"), Some(1.0));
        assert_eq!(parse_probability("%"), None);
        assert_eq!(parse_probability("-5%"), None);
        assert_eq!(parse_probability("ninety"), None);
    }

    #[test]
    fn deserializes_number_or_percentage() {
        #[derive(serde::Deserialize)]
        struct Probe {
            #[serde(deserialize_with = "probability::deserialize")]
            p: f64,
        }

        let a: Probe = serde_json::from_str(r#"{"p": 0.9}"#).unwrap();
        let b: Probe = serde_json::from_str(r#"{"p": "90%"}"#).unwrap();
        let c: Probe = serde_json::from_str(r#"{"p": "0.9"}"#).unwrap();
        assert_eq!(a.p, 0.9);
        assert_eq!(b.p, 0.9);
        assert_eq!(c.p, 0.9);

        let err = serde_json::from_str::<Probe>(r#"{"p": "high"}"#)
            .err()
            .expect("non-numeric text must fail");
        assert!(err.to_string().contains("invalid probability"));
    }
}
