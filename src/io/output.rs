use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{ClusterName, ConsolidatedRow};

/// Create the parent directory of `path` if it does not exist
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    Ok(())
}

/// Write a value as pretty-printed JSON
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Write records as JSONL, one per line
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    for record in records {
        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write to file: {:?}", path))?;
    }
    Ok(())
}

/// Write consolidated rows as CSV
///
/// Header is the respondent column, the model column, then the cluster names
/// in the given order. Missing scores become empty cells; no column is ever
/// omitted.
pub fn write_consolidated_csv(
    path: &Path,
    respondent_column: &str,
    model_column: &str,
    cluster_names: &[ClusterName],
    rows: &[ConsolidatedRow],
) -> Result<()> {
    ensure_parent(path)?;
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;

    let mut header: Vec<String> = vec![
        csv_escape(respondent_column),
        csv_escape(model_column),
    ];
    header.extend(cluster_names.iter().map(|name| csv_escape(name)));
    writeln!(file, "{}", header.join(","))
        .with_context(|| format!("Failed to write to file: {:?}", path))?;

    for row in rows {
        let mut fields: Vec<String> = vec![
            csv_escape(&row.respondent_id),
            csv_escape(&row.model),
        ];
        for name in cluster_names {
            let cell = row
                .scores
                .get(name)
                .copied()
                .flatten()
                .map(|score| score.to_string())
                .unwrap_or_default();
            fields.push(cell);
        }
        writeln!(file, "{}", fields.join(","))
            .with_context(|| format!("Failed to write to file: {:?}", path))?;
    }
    Ok(())
}

/// Quote a field only when it contains a comma, quote, or newline
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(id: &str, model: &str, scores: &[(&str, Option<f64>)]) -> ConsolidatedRow {
        ConsolidatedRow {
            respondent_id: id.to_string(),
            model: model.to_string(),
            scores: scores
                .iter()
                .map(|(name, score)| (name.to_string(), *score))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_ensure_parent_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.json");
        ensure_parent(&path).unwrap();
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn test_jsonl_one_record_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        let records = vec![
            serde_json::json!({"cluster_name": "work", "score": 1.0}),
            serde_json::json!({"cluster_name": "home", "score": null}),
        ];
        write_jsonl(&path, &records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("work"));
        assert!(lines[1].contains("home"));
    }

    #[test]
    fn test_csv_header_and_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let clusters = vec!["work".to_string(), "home".to_string()];
        let rows = vec![
            row("r1", "claude", &[("work", Some(2.0)), ("home", None)]),
            row("r2", "claude", &[("work", Some(0.5)), ("home", Some(1.0))]),
        ];
        write_consolidated_csv(&path, "respondent_id", "model", &clusters, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "respondent_id,model,work,home");
        assert_eq!(lines[1], "r1,claude,2,");
        assert_eq!(lines[2], "r2,claude,0.5,1");
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("with,comma"), "\"with,comma\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_csv_quoted_respondent_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let clusters = vec!["work".to_string()];
        let rows = vec![row("r,1", "claude", &[("work", Some(1.0))])];
        write_consolidated_csv(&path, "respondent_id", "model", &clusters, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.lines().nth(1).unwrap().starts_with("\"r,1\","));
    }

    #[test]
    fn test_json_pretty_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/lines.json");
        let lines = vec!["one".to_string(), "two".to_string()];
        write_json_pretty(&path, &lines).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let back: Vec<String> = serde_json::from_str(&content).unwrap();
        assert_eq!(back, lines);
    }
}
