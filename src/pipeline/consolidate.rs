use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::consolidate::{ConsolidateConfig, Consolidator};
use crate::io::{load_score_records, write_consolidated_csv};
use crate::models::{ClustersConfig, IntermediaryResult};

/// Consolidate a `<scores>/<run_id>/<model>/<respondent>.jsonl` tree into CSV
pub fn run_consolidate(
    scores_dir: &Path,
    output_file: &Path,
    clusters: &ClustersConfig,
    config: ConsolidateConfig,
) -> Result<usize> {
    let mut consolidator = Consolidator::new(config, clusters);

    for run_dir in super::subdirectories(scores_dir)? {
        let run_id = super::dir_name(&run_dir);
        for model_dir in super::subdirectories(&run_dir)? {
            let model = super::dir_name(&model_dir);
            for path in super::walk_files(&model_dir)? {
                if !super::has_extension(&path, "jsonl") {
                    continue;
                }
                let respondent_id = super::file_stem(&path);
                let records = load_score_records(&path)?;
                consolidator.add(
                    &respondent_id,
                    IntermediaryResult::new(&run_id, &model, records),
                );
            }
        }
    }

    let rows = consolidator.rows();
    write_consolidated_csv(
        output_file,
        &consolidator.config().respondent_column,
        &consolidator.config().model_column,
        consolidator.cluster_names(),
        &rows,
    )?;
    info!(
        "Consolidated {} respondent(s) -> {:?}",
        rows.len(),
        output_file
    );
    Ok(rows.len())
}
