use crate::models::{ClusterName, ClustersConfig, ParserBounds, Transcript};

/// Scoring prompt for one cluster of one respondent
#[derive(Debug, Clone)]
pub struct ClusterPrompt {
    /// Cluster being scored
    pub name: ClusterName,
    /// Rendered user prompt; None when the cluster has no transcript lines
    pub user: Option<String>,
    /// Score validation bounds for this cluster
    pub bounds: ParserBounds,
}

/// Renders per-cluster prompts from a segmented transcript
///
/// The cluster template carries `{cluster_prompt}` and `{cluster_text}`
/// placeholders; the cluster's lines are joined with newlines.
pub struct PromptMaker {
    config: ClustersConfig,
}

impl PromptMaker {
    pub fn new(config: ClustersConfig) -> Self {
        Self { config }
    }

    pub fn system_prompt(&self) -> &str {
        &self.config.system_prompt
    }

    /// One prompt per transcript cluster, in transcript order
    pub fn build(&self, transcript: &Transcript) -> Vec<ClusterPrompt> {
        transcript
            .clusters
            .iter()
            .map(|cluster| {
                let user = if cluster.lines.is_empty() {
                    None
                } else {
                    Some(
                        self.config
                            .cluster_template
                            .replace("{cluster_prompt}", &cluster.definition.prompt)
                            .replace("{cluster_text}", &cluster.lines.join("\n")),
                    )
                };
                ClusterPrompt {
                    name: cluster.definition.name.clone(),
                    user,
                    bounds: cluster.definition.parser,
                }
            })
            .collect()
    }
}
