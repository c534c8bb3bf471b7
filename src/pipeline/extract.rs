use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::io::{load_transcript, write_jsonl};
use crate::llm::{PromptMaker, ScoreModel};
use crate::models::{ClusterName, ClusterScore, ClustersConfig, Transcript};
use crate::parsing::ScoreCascade;

/// How existing output files are treated on a rerun
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RerunPolicy {
    /// Fail if any output file already exists
    Never,
    /// Skip respondents whose output file already exists
    Missing,
    /// Rewrite every output file
    Overwrite,
}

/// Scores one transcript's clusters through a model
///
/// Each cluster gets its own score cascade built from its configured bounds.
/// Clusters with no transcript lines are recorded without a model call.
pub struct Extractor<M> {
    prompts: PromptMaker,
    cascades: HashMap<ClusterName, ScoreCascade>,
    model: M,
}

impl<M: ScoreModel> Extractor<M> {
    pub fn new(clusters: ClustersConfig, model: M) -> Result<Self, ConfigError> {
        let cascades = clusters
            .clusters
            .iter()
            .map(|definition| {
                Ok((
                    definition.name.clone(),
                    ScoreCascade::new(definition.parser)?,
                ))
            })
            .collect::<Result<HashMap<_, _>, ConfigError>>()?;
        Ok(Self {
            prompts: PromptMaker::new(clusters),
            cascades,
            model,
        })
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// One record per configured cluster, in config order
    ///
    /// A failed model call records the error and moves on to the next
    /// cluster; it never aborts the respondent.
    pub async fn score(&self, transcript: &Transcript) -> Vec<ClusterScore> {
        let mut records = Vec::new();
        for prompt in self.prompts.build(transcript) {
            let Some(user) = &prompt.user else {
                records.push(ClusterScore::no_data(&prompt.name));
                continue;
            };
            let record = match self.model.invoke(self.prompts.system_prompt(), user).await {
                Ok(text) => {
                    let score = self
                        .cascades
                        .get(&prompt.name)
                        .and_then(|cascade| cascade.parse(&text));
                    ClusterScore {
                        cluster_name: prompt.name.clone(),
                        score,
                        error_message: None,
                    }
                }
                Err(error) => {
                    warn!("Model call failed for cluster '{}': {}", prompt.name, error);
                    ClusterScore {
                        cluster_name: prompt.name.clone(),
                        score: None,
                        error_message: Some(error.to_string()),
                    }
                }
            };
            records.push(record);
        }
        records
    }
}

/// Score every segmented transcript under `input_dir`
///
/// Records land at `<output_dir>/<run_id>/<model>/<respondent>.jsonl`.
pub async fn run_extract<M: ScoreModel>(
    input_dir: &Path,
    output_dir: &Path,
    clusters: ClustersConfig,
    run_id: &str,
    model: M,
    policy: RerunPolicy,
) -> Result<usize> {
    let extractor = Extractor::new(clusters, model)?;

    let mut extracted = 0;
    for path in super::walk_files(input_dir)? {
        if !super::has_extension(&path, "json") {
            continue;
        }
        let respondent_id = super::file_stem(&path);
        let output_file = output_dir
            .join(run_id)
            .join(extractor.model_name())
            .join(format!("{}.jsonl", respondent_id));

        if output_file.exists() {
            match policy {
                RerunPolicy::Never => anyhow::bail!(
                    "Output file exists and rerun policy forbids reruns: {:?}",
                    output_file
                ),
                RerunPolicy::Missing => {
                    info!("Skipping existing output: {:?}", output_file);
                    continue;
                }
                RerunPolicy::Overwrite => {}
            }
        }

        let transcript = load_transcript(&path)?;
        let records = extractor.score(&transcript).await;
        write_jsonl(&output_file, &records)?;
        info!("Extracted {} -> {:?}", respondent_id, output_file);
        extracted += 1;
    }
    info!("Extracted {} respondent(s)", extracted);
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load_score_records;
    use crate::llm::DummyModel;
    use crate::models::{Cluster, ClusterDefinition, ParserBounds};

    fn clusters() -> ClustersConfig {
        ClustersConfig {
            system_prompt: "score".to_string(),
            cluster_template: "{cluster_prompt}\n{cluster_text}".to_string(),
            clusters: vec![
                ClusterDefinition {
                    name: "work".to_string(),
                    prompt: "Rate work.".to_string(),
                    questions: vec![1],
                    parser: ParserBounds::default(),
                },
                ClusterDefinition {
                    name: "home".to_string(),
                    prompt: "Rate home.".to_string(),
                    questions: vec![2],
                    parser: ParserBounds::default(),
                },
            ],
        }
    }

    fn transcript_with_work_lines() -> Transcript {
        let config = clusters();
        let mut work = Cluster::new(config.clusters[0].clone());
        work.lines = vec!["I like my job.".to_string()];
        let home = Cluster::new(config.clusters[1].clone());
        Transcript {
            clusters: vec![work, home],
        }
    }

    fn write_transcript(dir: &Path, name: &str) {
        let json = serde_json::to_string(&transcript_with_work_lines()).unwrap();
        std::fs::write(dir.join(name), json).unwrap();
    }

    #[tokio::test]
    async fn test_score_records_per_cluster() {
        let extractor = Extractor::new(clusters(), DummyModel).unwrap();
        let records = extractor.score(&transcript_with_work_lines()).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cluster_name, "work");
        assert_eq!(records[0].score, Some(1.0));
        assert!(records[0].error_message.is_none());
        assert_eq!(records[1].cluster_name, "home");
        assert_eq!(records[1].score, None);
        assert_eq!(records[1].error_message.as_deref(), Some("No cluster data."));
    }

    #[tokio::test]
    async fn test_out_of_bounds_reply_scores_none() {
        let mut config = clusters();
        config.clusters[0].parser.max_score = 0.5;
        let extractor = Extractor::new(config, DummyModel).unwrap();
        let records = extractor.score(&transcript_with_work_lines()).await;
        assert_eq!(records[0].score, None);
        assert!(records[0].error_message.is_none());
    }

    #[tokio::test]
    async fn test_extract_writes_to_run_and_model_dirs() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_transcript(input.path(), "r1.json");

        let extracted = run_extract(
            input.path(),
            output.path(),
            clusters(),
            "run1",
            DummyModel,
            RerunPolicy::Never,
        )
        .await
        .unwrap();
        assert_eq!(extracted, 1);

        let output_file = output.path().join("run1").join("dummy").join("r1.jsonl");
        let records = load_score_records(&output_file).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].score, Some(1.0));
    }

    #[tokio::test]
    async fn test_rerun_never_fails_on_existing_output() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_transcript(input.path(), "r1.json");

        let existing = output.path().join("run1").join("dummy");
        std::fs::create_dir_all(&existing).unwrap();
        std::fs::write(existing.join("r1.jsonl"), "").unwrap();

        let result = run_extract(
            input.path(),
            output.path(),
            clusters(),
            "run1",
            DummyModel,
            RerunPolicy::Never,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rerun_missing_skips_existing_output() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_transcript(input.path(), "r1.json");
        write_transcript(input.path(), "r2.json");

        let existing = output.path().join("run1").join("dummy");
        std::fs::create_dir_all(&existing).unwrap();
        std::fs::write(existing.join("r1.jsonl"), "sentinel").unwrap();

        let extracted = run_extract(
            input.path(),
            output.path(),
            clusters(),
            "run1",
            DummyModel,
            RerunPolicy::Missing,
        )
        .await
        .unwrap();
        assert_eq!(extracted, 1);

        let untouched = std::fs::read_to_string(existing.join("r1.jsonl")).unwrap();
        assert_eq!(untouched, "sentinel");
        assert!(existing.join("r2.jsonl").is_file());
    }

    #[tokio::test]
    async fn test_rerun_overwrite_replaces_existing_output() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_transcript(input.path(), "r1.json");

        let existing = output.path().join("run1").join("dummy");
        std::fs::create_dir_all(&existing).unwrap();
        std::fs::write(existing.join("r1.jsonl"), "sentinel").unwrap();

        run_extract(
            input.path(),
            output.path(),
            clusters(),
            "run1",
            DummyModel,
            RerunPolicy::Overwrite,
        )
        .await
        .unwrap();

        let content = std::fs::read_to_string(existing.join("r1.jsonl")).unwrap();
        assert!(content.contains("work"));
    }
}
