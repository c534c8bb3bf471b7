use thiserror::Error;

/// Hard configuration failures
///
/// Core transforms degrade gracefully on noisy input; a broken pattern or an
/// unreadable config file indicates a broken deployment and must propagate.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("capture group {group} not present in pattern '{pattern}'")]
    MissingCaptureGroup { pattern: String, group: usize },
}

impl ConfigError {
    pub fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            source: Box::new(source),
        }
    }
}
