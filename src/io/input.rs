use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::consolidate::ConsolidateConfig;
use crate::models::{ClusterScore, ClustersConfig, Transcript};
use crate::segmentation::TagsConfig;

fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {:?}", what, path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} file: {:?}", what, path))
}

/// Read a plain-text transcript, one utterance per line
///
/// Blank lines are dropped; trailing carriage returns are stripped.
pub fn load_text_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript file: {:?}", path))?;
    Ok(content
        .lines()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Read a per-respondent JSON line array
pub fn load_lines(path: &Path) -> Result<Vec<String>> {
    load_json(path, "line array")
}

/// Read a segmented transcript
pub fn load_transcript(path: &Path) -> Result<Transcript> {
    load_json(path, "transcript")
}

pub fn load_clusters_config(path: &Path) -> Result<ClustersConfig> {
    load_json(path, "clusters config")
}

pub fn load_tags_config(path: &Path) -> Result<TagsConfig> {
    load_json(path, "tags config")
}

pub fn load_consolidate_config(path: &Path) -> Result<ConsolidateConfig> {
    load_json(path, "consolidate config")
}

/// Read one respondent's score records (JSONL, one record per line)
pub fn load_score_records(path: &Path) -> Result<Vec<ClusterScore>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read score file: {:?}", path))?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line)
                .with_context(|| format!("Failed to parse score record in {:?}", path))
        })
        .collect()
}
