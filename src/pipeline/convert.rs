use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::io::{load_text_lines, write_json_pretty};

/// Convert plain-text transcripts into per-respondent JSON line arrays
///
/// The respondent id is the file stem up to the first underscore, so
/// `r17_interview_final.txt` becomes `r17.json`.
pub fn run_convert(input_dir: &Path, output_dir: &Path) -> Result<usize> {
    let mut converted = 0;
    for path in super::walk_files(input_dir)? {
        if !super::has_extension(&path, "txt") {
            continue;
        }
        let respondent_id = respondent_id(&path);
        let lines = load_text_lines(&path)?;
        let output_file = output_dir.join(format!("{}.json", respondent_id));
        write_json_pretty(&output_file, &lines)?;
        info!(
            "Converted {:?} -> {:?} ({} lines)",
            path,
            output_file,
            lines.len()
        );
        converted += 1;
    }
    info!("Converted {} transcript(s)", converted);
    Ok(converted)
}

fn respondent_id(path: &Path) -> String {
    let stem = super::file_stem(path);
    stem.split('_').next().unwrap_or(&stem).to_string()
}
