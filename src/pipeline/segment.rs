use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::io::{load_lines, write_json_pretty};
use crate::models::ClustersConfig;
use crate::segmentation::{Segmenter, Tagger, TagsConfig};

/// Tag and segment every respondent's line array into a cluster transcript
pub fn run_segment(
    input_dir: &Path,
    output_dir: &Path,
    clusters: ClustersConfig,
    tags: &TagsConfig,
) -> Result<usize> {
    let tagger = Tagger::new(tags)?;
    let segmenter = Segmenter::new(clusters);

    let mut segmented = 0;
    for path in super::walk_files(input_dir)? {
        if !super::has_extension(&path, "json") {
            continue;
        }
        let lines = load_lines(&path)?;
        let line_tags = tagger.tag(&lines);
        let transcript = segmenter.build(&lines, &line_tags);

        let output_file = output_dir.join(format!("{}.json", super::file_stem(&path)));
        write_json_pretty(&output_file, &transcript)?;
        info!(
            "Segmented {:?}: {} of {} lines assigned",
            path,
            transcript.line_count(),
            lines.len()
        );
        segmented += 1;
    }
    info!("Segmented {} transcript(s)", segmented);
    Ok(segmented)
}
