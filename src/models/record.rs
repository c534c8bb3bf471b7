use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ClusterName, QuestionId};

/// One scored cluster for one respondent in one run (a JSONL record)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterScore {
    /// Name of the scored cluster
    pub cluster_name: ClusterName,
    /// Parsed score, or None when the model output was unusable
    pub score: Option<f64>,
    /// Error description when no score could be produced
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ClusterScore {
    /// Record for a cluster whose transcript had no lines to score
    pub fn no_data(cluster_name: &str) -> Self {
        Self {
            cluster_name: cluster_name.to_string(),
            score: None,
            error_message: Some("No cluster data.".to_string()),
        }
    }
}

/// All cluster scores for one (respondent, run) pair
#[derive(Debug, Clone)]
pub struct IntermediaryResult {
    /// Run this result came from
    pub run_id: String,
    /// Model that produced the scores
    pub model: String,
    /// Scores keyed by cluster name
    pub data: HashMap<ClusterName, ClusterScore>,
}

impl IntermediaryResult {
    pub fn new(run_id: &str, model: &str, records: Vec<ClusterScore>) -> Self {
        Self {
            run_id: run_id.to_string(),
            model: model.to_string(),
            data: records
                .into_iter()
                .map(|r| (r.cluster_name.clone(), r))
                .collect(),
        }
    }
}

/// Final consolidated output: one row per respondent
#[derive(Debug, Clone)]
pub struct ConsolidatedRow {
    pub respondent_id: String,
    /// Taken from an arbitrary contributing run; all runs for one
    /// respondent are expected to share the same model
    pub model: String,
    /// One entry per configured cluster; None means no usable score in any run
    pub scores: HashMap<ClusterName, Option<f64>>,
}

/// Tag extracted from a transcript line, naming the question(s) it answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Question ids named by the tag; empty means tagged but unroutable
    pub question_ids: Vec<QuestionId>,
    /// Exact matched substring, stripped from the line's displayed text
    pub matched_text: String,
}
