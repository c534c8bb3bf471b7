use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Tag;

/// Configuration for the inline question-marker pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsConfig {
    /// Primary pattern applied to each line (case-insensitive)
    pub primary_regex: String,
    /// Capture group of the primary pattern holding the question identifier
    pub question_group: usize,
    /// Secondary pattern extracting digit groups from the captured identifier
    pub question_id_regex: String,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            primary_regex: r"^(Answered)?\s*Question\s*(.+?)\s*(Ite(ra|ar)tion.+?)?\.\."
                .to_string(),
            question_group: 2,
            question_id_regex: r"([0-9]+)\s*\w?\s*[0-9]*".to_string(),
        }
    }
}

/// Scans transcript lines for inline question markers
pub struct Tagger {
    pattern: Regex,
    digits: Regex,
    question_group: usize,
}

impl Tagger {
    pub fn new(config: &TagsConfig) -> Result<Self, ConfigError> {
        let pattern = RegexBuilder::new(&config.primary_regex)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::invalid_pattern(&config.primary_regex, e))?;
        if config.question_group >= pattern.captures_len() {
            return Err(ConfigError::MissingCaptureGroup {
                pattern: config.primary_regex.clone(),
                group: config.question_group,
            });
        }
        let digits = RegexBuilder::new(&config.question_id_regex)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::invalid_pattern(&config.question_id_regex, e))?;
        Ok(Self {
            pattern,
            digits,
            question_group: config.question_group,
        })
    }

    /// Tag every line, one output per input line, order preserved
    pub fn tag(&self, lines: &[String]) -> Vec<Option<Tag>> {
        lines.iter().map(|line| self.tag_line(line)).collect()
    }

    fn tag_line(&self, line: &str) -> Option<Tag> {
        let caps = self.pattern.captures(line)?;
        let matched_text = caps[0].to_string();
        let question_tag = caps
            .get(self.question_group)
            .map(|m| m.as_str())
            .unwrap_or("");
        let question_ids = self.extract_ids(question_tag);
        Some(Tag {
            question_ids,
            matched_text,
        })
    }

    fn extract_ids(&self, question_tag: &str) -> Vec<u32> {
        if let Ok(id) = question_tag.trim().parse::<u32>() {
            return vec![id];
        }
        let groups: Vec<&str> = self
            .digits
            .captures_iter(question_tag)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();
        // Repeated-digit artifacts like "1/1" collapse to a single id.
        if !groups.is_empty() && groups.iter().all(|g| *g == groups[0]) {
            return groups[0].parse::<u32>().ok().into_iter().collect();
        }
        groups.iter().filter_map(|g| g.parse().ok()).collect()
    }
}
