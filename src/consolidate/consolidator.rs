use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{ClusterName, ClustersConfig, ConsolidatedRow, IntermediaryResult};

fn default_respondent_column() -> String {
    "respondent_id".to_string()
}

fn default_model_column() -> String {
    "model".to_string()
}

/// Which runs and models participate in consolidation, and how the output
/// identity columns are named
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidateConfig {
    /// Run ids in chronological order; later runs supersede earlier ones
    pub ordered_run_ids: Vec<String>,
    /// Models whose results are admitted
    pub models: Vec<String>,
    /// Respondents excluded from the output entirely
    #[serde(default)]
    pub respondent_blacklist: Vec<String>,
    #[serde(default = "default_respondent_column")]
    pub respondent_column: String,
    #[serde(default = "default_model_column")]
    pub model_column: String,
}

/// Collapses per-run score records into one row per respondent
///
/// Results are admitted through `add` in discovery order; `rows` then picks,
/// per cluster, the score from the latest configured run that produced a
/// usable value.
pub struct Consolidator {
    config: ConsolidateConfig,
    cluster_names: Vec<ClusterName>,
    order: Vec<String>,
    results: HashMap<String, Vec<IntermediaryResult>>,
}

impl Consolidator {
    pub fn new(config: ConsolidateConfig, clusters: &ClustersConfig) -> Self {
        Self {
            config,
            cluster_names: clusters.cluster_names(),
            order: Vec::new(),
            results: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ConsolidateConfig {
        &self.config
    }

    pub fn cluster_names(&self) -> &[ClusterName] {
        &self.cluster_names
    }

    /// Admit one run's records for one respondent
    ///
    /// Blacklisted respondents, unknown run ids, and unknown models are
    /// dropped without error. A second result for the same (respondent, run)
    /// pair replaces the first.
    pub fn add(&mut self, respondent_id: &str, result: IntermediaryResult) {
        if self
            .config
            .respondent_blacklist
            .iter()
            .any(|b| b == respondent_id)
        {
            return;
        }
        if !self.config.ordered_run_ids.contains(&result.run_id) {
            return;
        }
        if !self.config.models.contains(&result.model) {
            return;
        }
        if !self.results.contains_key(respondent_id) {
            self.order.push(respondent_id.to_string());
        }
        let runs = self.results.entry(respondent_id.to_string()).or_default();
        match runs.iter_mut().find(|r| r.run_id == result.run_id) {
            Some(existing) => *existing = result,
            None => runs.push(result),
        }
    }

    /// One row per admitted respondent, in discovery order
    ///
    /// Every configured cluster appears in every row; a cluster no run
    /// scored maps to None. The row's model comes from the respondent's
    /// first admitted run.
    pub fn rows(&self) -> Vec<ConsolidatedRow> {
        self.order
            .iter()
            .map(|respondent_id| {
                let runs = &self.results[respondent_id.as_str()];
                let scores = self
                    .cluster_names
                    .iter()
                    .map(|name| (name.clone(), self.latest_score(runs, name)))
                    .collect();
                ConsolidatedRow {
                    respondent_id: respondent_id.clone(),
                    model: runs[0].model.clone(),
                    scores,
                }
            })
            .collect()
    }

    /// Score from the latest run holding a non-null value for `cluster`
    fn latest_score(&self, runs: &[IntermediaryResult], cluster: &str) -> Option<f64> {
        for run_id in self.config.ordered_run_ids.iter().rev() {
            let Some(result) = runs.iter().find(|r| &r.run_id == run_id) else {
                continue;
            };
            if let Some(record) = result.data.get(cluster) {
                if let Some(score) = record.score {
                    return Some(score);
                }
            }
        }
        None
    }
}
