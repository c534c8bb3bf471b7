use anyhow::Result;

/// A model that turns a (system, user) prompt pair into raw text
pub trait ScoreModel {
    /// Identifier used in output paths and consolidated rows
    fn name(&self) -> &str;

    async fn invoke(&self, system: &str, user: &str) -> Result<String>;
}

/// Offline stand-in that answers every prompt with "1.0"
///
/// Useful for dry runs and for exercising the extraction pipeline in tests.
pub struct DummyModel;

impl ScoreModel for DummyModel {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn invoke(&self, _system: &str, _user: &str) -> Result<String> {
        Ok("1.0".to_string())
    }
}
