use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::error::ConfigError;
use crate::models::ParserBounds;

/// Label patterns tried in descending order of confidence
const LABEL_PATTERNS: [&str; 7] = [
    r#""?score"?\s*:\s*"?(\w+)"?"#,
    r#"Score:\s*"?(\w+)"?"#,
    r#"Answer:\s*"?(\w+)"?"#,
    r#"\{\s*"?score"?\s*:\s*"?(\w+)"?\s*\}"#,
    r#"\{\s*"?score"?\s*:\s*"(\w+)"\s*\}?"#,
    r#"score is:?\s*"?(\w+)"?"#,
    "^\\s*\"?(\\w+)\"?\n",
];

/// Does not cross into nested objects.
const BRACES_PATTERN: &str = r"\{.*?\}";

/// One candidate-extraction strategy applied to raw model output
#[derive(Debug, Clone)]
pub enum SubParser {
    /// The whole trimmed text is a number
    ExactNumber,
    /// A JSON object in the text carries the value under `key`
    JsonKey { key: String, braces: Regex },
    /// A regex search whose capture group holds the value
    Pattern { pattern: Regex, group: usize },
}

impl SubParser {
    pub fn json_key(key: &str) -> Result<Self, ConfigError> {
        let braces = Regex::new(BRACES_PATTERN)
            .map_err(|e| ConfigError::invalid_pattern(BRACES_PATTERN, e))?;
        Ok(Self::JsonKey {
            key: key.to_string(),
            braces,
        })
    }

    pub fn pattern(pattern: &str, group: usize) -> Result<Self, ConfigError> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::invalid_pattern(pattern, e))?;
        if group >= compiled.captures_len() {
            return Err(ConfigError::MissingCaptureGroup {
                pattern: pattern.to_string(),
                group,
            });
        }
        Ok(Self::Pattern {
            pattern: compiled,
            group,
        })
    }

    /// Extract a raw candidate value, or None when the strategy finds nothing
    pub fn try_parse(&self, text: &str) -> Option<String> {
        match self {
            Self::ExactNumber => {
                let trimmed = text.trim();
                trimmed.parse::<f64>().ok().map(|_| trimmed.to_string())
            }
            Self::JsonKey { key, braces } => {
                let objects = std::iter::once(text).chain(braces.find_iter(text).map(|m| m.as_str()));
                for candidate in objects {
                    if let Some(value) = json_scalar(candidate, key) {
                        return Some(value);
                    }
                }
                None
            }
            Self::Pattern { pattern, group } => pattern
                .captures(text)
                .and_then(|caps| caps.get(*group))
                .map(|m| m.as_str().to_string()),
        }
    }
}

/// Scalar value under `key` in `candidate` parsed as a JSON object
fn json_scalar(candidate: &str, key: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(candidate).ok()?;
    match parsed.get(key)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn label_parsers() -> Result<Vec<SubParser>, ConfigError> {
    LABEL_PATTERNS
        .iter()
        .map(|pattern| SubParser::pattern(pattern, 1))
        .collect()
}

/// Numeric score extraction with range and integer validation
///
/// Sub-parsers run in order. A candidate that parses as a number but fails
/// validation does not stop the scan; later sub-parsers still get a chance.
#[derive(Debug, Clone)]
pub struct ScoreCascade {
    bounds: ParserBounds,
    sub_parsers: Vec<SubParser>,
}

impl ScoreCascade {
    pub fn new(bounds: ParserBounds) -> Result<Self, ConfigError> {
        let mut sub_parsers = vec![SubParser::ExactNumber, SubParser::json_key("score")?];
        sub_parsers.extend(label_parsers()?);
        Ok(Self {
            bounds,
            sub_parsers,
        })
    }

    pub fn with_sub_parsers(bounds: ParserBounds, sub_parsers: Vec<SubParser>) -> Self {
        Self {
            bounds,
            sub_parsers,
        }
    }

    /// First sub-parser candidate that is numeric and valid, or None
    pub fn parse(&self, text: &str) -> Option<f64> {
        for sub_parser in &self.sub_parsers {
            let Some(candidate) = sub_parser.try_parse(text) else {
                continue;
            };
            let Ok(score) = candidate.trim().parse::<f64>() else {
                continue;
            };
            if self.is_valid(score) {
                return Some(score);
            }
        }
        None
    }

    fn is_valid(&self, score: f64) -> bool {
        if score < self.bounds.min_score || score > self.bounds.max_score {
            return false;
        }
        if self.bounds.force_int {
            return (score - score.round()).abs() < self.bounds.int_tol;
        }
        true
    }
}

/// Free-text label extraction; first non-null candidate wins, no validation
#[derive(Debug, Clone)]
pub struct LabelCascade {
    sub_parsers: Vec<SubParser>,
}

impl LabelCascade {
    pub fn new() -> Result<Self, ConfigError> {
        let mut sub_parsers = vec![SubParser::json_key("answer")?, SubParser::json_key("Answer")?];
        sub_parsers.extend(label_parsers()?);
        Ok(Self { sub_parsers })
    }

    pub fn with_sub_parsers(sub_parsers: Vec<SubParser>) -> Self {
        Self { sub_parsers }
    }

    pub fn parse(&self, text: &str) -> Option<String> {
        self.sub_parsers
            .iter()
            .find_map(|sub_parser| sub_parser.try_parse(text))
    }
}

/// Matches trimmed text against a closed option set, case-insensitively
///
/// Returns the canonical option spelling. No substring or fuzzy matching.
#[derive(Debug, Clone)]
pub struct EnumParser {
    options: Vec<String>,
}

impl EnumParser {
    pub fn new(options: Vec<String>) -> Self {
        Self { options }
    }

    pub fn parse(&self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        self.options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(trimmed))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min: f64, max: f64) -> ParserBounds {
        ParserBounds {
            min_score: min,
            max_score: max,
            ..Default::default()
        }
    }

    fn cascade(min: f64, max: f64) -> ScoreCascade {
        ScoreCascade::new(bounds(min, max)).unwrap()
    }

    #[test]
    fn test_exact_number_in_unit_range() {
        assert_eq!(cascade(0.0, 1.0).parse("0.8"), Some(0.8));
    }

    #[test]
    fn test_exact_number_trims_whitespace() {
        assert_eq!(cascade(0.0, 5.0).parse("  3 \n"), Some(3.0));
    }

    #[test]
    fn test_bare_json_object() {
        assert_eq!(cascade(0.0, 5.0).parse(r#"{"score": 3}"#), Some(3.0));
    }

    #[test]
    fn test_json_object_embedded_in_prose() {
        let text = r#"Here is my assessment: {"score": 2} as requested."#;
        assert_eq!(cascade(0.0, 5.0).parse(text), Some(2.0));
    }

    #[test]
    fn test_json_string_value() {
        assert_eq!(cascade(0.0, 5.0).parse(r#"{"score": "4"}"#), Some(4.0));
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert_eq!(cascade(0.0, 5.0).parse("7"), None);
    }

    #[test]
    fn test_below_range_is_rejected() {
        assert_eq!(cascade(1.0, 5.0).parse("0"), None);
    }

    #[test]
    fn test_invalid_candidate_falls_through_to_later_parser() {
        // The score label yields 9, out of range; the Answer label still wins.
        let text = "score: 9 was wrong, Answer: 3";
        assert_eq!(cascade(0.0, 5.0).parse(text), Some(3.0));
    }

    #[test]
    fn test_score_label() {
        assert_eq!(cascade(0.0, 5.0).parse("Score: 4"), Some(4.0));
    }

    #[test]
    fn test_score_is_label() {
        assert_eq!(cascade(0.0, 5.0).parse("The score is: 2"), Some(2.0));
    }

    #[test]
    fn test_leading_word_with_newline() {
        assert_eq!(cascade(0.0, 5.0).parse("4\nbecause it fits"), Some(4.0));
    }

    #[test]
    fn test_unparseable_text() {
        assert_eq!(cascade(0.0, 5.0).parse("I cannot answer that."), None);
    }

    #[test]
    fn test_force_int_accepts_whole_number() {
        let bounds = ParserBounds {
            max_score: 5.0,
            force_int: true,
            ..Default::default()
        };
        let cascade = ScoreCascade::new(bounds).unwrap();
        assert_eq!(cascade.parse("Score: 1"), Some(1.0));
    }

    #[test]
    fn test_force_int_rejects_fraction() {
        let bounds = ParserBounds {
            max_score: 5.0,
            force_int: true,
            ..Default::default()
        };
        let cascade = ScoreCascade::new(bounds).unwrap();
        assert_eq!(cascade.parse("Score: 1.5"), None);
    }

    #[test]
    fn test_force_int_tolerates_near_integers() {
        let bounds = ParserBounds {
            max_score: 5.0,
            force_int: true,
            int_tol: 0.01,
            ..Default::default()
        };
        let cascade = ScoreCascade::new(bounds).unwrap();
        assert_eq!(cascade.parse("2.999"), Some(2.999));
    }

    #[test]
    fn test_case_insensitive_labels() {
        assert_eq!(cascade(0.0, 5.0).parse("SCORE: 3"), Some(3.0));
    }

    #[test]
    fn test_custom_sub_parser_list() {
        let rating = SubParser::pattern(r"Rating:\s*([0-9.]+)", 1).unwrap();
        let cascade = ScoreCascade::with_sub_parsers(bounds(0.0, 10.0), vec![rating]);
        assert_eq!(cascade.parse("Rating: 7.5"), Some(7.5));
        assert_eq!(cascade.parse("Score: 7.5"), None);
    }

    #[test]
    fn test_bad_custom_pattern_is_config_error() {
        assert!(SubParser::pattern("([0-9", 1).is_err());
    }

    #[test]
    fn test_missing_group_is_config_error() {
        assert!(matches!(
            SubParser::pattern("Rating", 1),
            Err(ConfigError::MissingCaptureGroup { group: 1, .. })
        ));
    }

    #[test]
    fn test_label_cascade_json_answer() {
        let cascade = LabelCascade::new().unwrap();
        assert_eq!(cascade.parse(r#"{"answer": "yes"}"#), Some("yes".to_string()));
    }

    #[test]
    fn test_label_cascade_capitalized_answer_key() {
        let cascade = LabelCascade::new().unwrap();
        assert_eq!(cascade.parse(r#"{"Answer": "no"}"#), Some("no".to_string()));
    }

    #[test]
    fn test_label_cascade_answer_label() {
        let cascade = LabelCascade::new().unwrap();
        assert_eq!(cascade.parse("Answer: maybe"), Some("maybe".to_string()));
    }

    #[test]
    fn test_label_cascade_no_match() {
        let cascade = LabelCascade::new().unwrap();
        assert_eq!(cascade.parse("nothing to see"), None);
    }

    #[test]
    fn test_enum_parser_canonicalizes_case() {
        let parser = EnumParser::new(vec!["Yes".to_string(), "No".to_string()]);
        assert_eq!(parser.parse(" yes "), Some("Yes".to_string()));
    }

    #[test]
    fn test_enum_parser_rejects_non_members() {
        let parser = EnumParser::new(vec!["Yes".to_string(), "No".to_string()]);
        assert_eq!(parser.parse("yep"), None);
        assert_eq!(parser.parse("Yes and no"), None);
    }

    #[test]
    fn test_json_non_scalar_value_is_skipped() {
        assert_eq!(cascade(0.0, 5.0).parse(r#"{"score": [1, 2]}"#), None);
    }
}
