use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Integer identifier of a survey/interview question
pub type QuestionId = u32;

/// Name of a topical grouping of questions, scored as one unit
pub type ClusterName = String;

/// Bounds and coercion rules applied when parsing a model's score output
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParserBounds {
    /// Minimum allowed score (inclusive)
    pub min_score: f64,
    /// Maximum allowed score (inclusive)
    pub max_score: f64,
    /// Whether to reject scores that cannot be coerced to an integer
    #[serde(default)]
    pub force_int: bool,
    /// Distance from the nearest whole number for a score to count as an integer
    #[serde(default = "default_int_tol")]
    pub int_tol: f64,
}

fn default_int_tol() -> f64 {
    0.0001
}

impl Default for ParserBounds {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            max_score: 1.0,
            force_int: false,
            int_tol: default_int_tol(),
        }
    }
}

/// Configuration for a single cluster of questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterDefinition {
    /// Name of the cluster (used as the output column name)
    pub name: ClusterName,
    /// Scoring instruction inserted into the cluster template
    pub prompt: String,
    /// Question ids whose transcript spans make up this cluster
    pub questions: Vec<QuestionId>,
    /// Score parsing bounds for this cluster
    #[serde(default)]
    pub parser: ParserBounds,
}

fn default_cluster_template() -> String {
    "{cluster_prompt}\nBe concise.\n\n{cluster_text}".to_string()
}

/// Full cluster configuration, loaded once per deployment
///
/// Clusters are kept as a list so that the declared order carries through to
/// transcript assembly and consolidated output columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClustersConfig {
    /// System prompt shared by every cluster's model call
    pub system_prompt: String,
    /// User prompt template with `{cluster_prompt}` and `{cluster_text}` placeholders
    #[serde(default = "default_cluster_template")]
    pub cluster_template: String,
    /// Cluster definitions in declared order
    pub clusters: Vec<ClusterDefinition>,
}

impl ClustersConfig {
    /// Reverse index from question id to owning cluster name
    ///
    /// Last write wins if a question id appears in more than one cluster,
    /// an ambiguity the configuration is expected to avoid.
    pub fn question_to_cluster(&self) -> HashMap<QuestionId, ClusterName> {
        let mut map = HashMap::new();
        for definition in &self.clusters {
            for &question_id in &definition.questions {
                map.insert(question_id, definition.name.clone());
            }
        }
        map
    }

    /// Cluster names in declared order
    pub fn cluster_names(&self) -> Vec<ClusterName> {
        self.clusters.iter().map(|c| c.name.clone()).collect()
    }
}

/// A cluster's definition together with the transcript lines assigned to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// The configuration this cluster was assembled from
    pub definition: ClusterDefinition,
    /// Transcript lines in ascending line order, tag text stripped
    #[serde(default)]
    pub lines: Vec<String>,
}

impl Cluster {
    pub fn new(definition: ClusterDefinition) -> Self {
        Self {
            definition,
            lines: Vec::new(),
        }
    }
}

/// One respondent's transcript, segmented by cluster in config order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub clusters: Vec<Cluster>,
}

impl Transcript {
    /// Look up a cluster by name
    pub fn get(&self, name: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.definition.name == name)
    }

    /// Total number of lines across all clusters
    pub fn line_count(&self) -> usize {
        self.clusters.iter().map(|c| c.lines.len()).sum()
    }
}
