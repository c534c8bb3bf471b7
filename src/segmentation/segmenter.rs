use std::collections::HashMap;

use crate::models::{Cluster, ClusterName, ClustersConfig, QuestionId, Tag, Transcript};

/// Inclusive line-index range in which one question's answer occurs
///
/// Ordering is by start index, then end index, which is what span merging
/// relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Tracking state for one question id during the left-to-right scan
#[derive(Debug, Clone, Copy)]
enum SpanState {
    NotStarted,
    Tracking { start: usize, end: usize },
    Closed { start: usize, end: usize },
}

impl SpanState {
    fn step(self, index: usize, tag: Option<&Tag>, question_id: QuestionId) -> Self {
        match self {
            SpanState::NotStarted => match tag {
                Some(t) if t.question_ids.contains(&question_id) => SpanState::Tracking {
                    start: index,
                    end: index,
                },
                // Lines without the id are skipped until tracking starts.
                _ => SpanState::NotStarted,
            },
            SpanState::Tracking { start, end } => match tag {
                Some(t) if t.question_ids.contains(&question_id) => SpanState::Tracking {
                    start,
                    end: index,
                },
                // A different non-blank tag closes the span for good.
                Some(_) => SpanState::Closed { start, end },
                // Untagged continuation lines extend the answer.
                None => SpanState::Tracking { start, end: index },
            },
            SpanState::Closed { .. } => self,
        }
    }
}

/// Single left-to-right scan locating the contiguous run of lines that
/// answer one question, or None if the question is never tagged
pub fn find_span(question_id: QuestionId, tags: &[Option<Tag>]) -> Option<Span> {
    let mut state = SpanState::NotStarted;
    for (index, tag) in tags.iter().enumerate() {
        state = state.step(index, tag.as_ref(), question_id);
        if let SpanState::Closed { .. } = state {
            break;
        }
    }
    match state {
        SpanState::NotStarted => None,
        SpanState::Tracking { start, end } | SpanState::Closed { start, end } => {
            Some(Span { start, end })
        }
    }
}

/// Merge overlapping and touching spans into a minimal ordered disjoint set
///
/// A gap of at least one index keeps spans separate.
pub fn merge_spans(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort();
    let mut merged: Vec<Span> = Vec::new();
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => {
                last.end = last.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Assembles cluster transcripts from tagged lines
///
/// Assumes each question's answer occupies one contiguous run of lines. A
/// line tagged with several question ids is replicated into every listed
/// question's span. Question ids referenced by no cluster are ignored, and a
/// cluster whose questions never match ends up with an empty line list.
pub struct Segmenter {
    config: ClustersConfig,
    question_to_cluster: HashMap<QuestionId, ClusterName>,
}

impl Segmenter {
    pub fn new(config: ClustersConfig) -> Self {
        let question_to_cluster = config.question_to_cluster();
        Self {
            config,
            question_to_cluster,
        }
    }

    /// Build a transcript keyed by cluster, in config order
    ///
    /// `lines` and `tags` must be the same length (one tag slot per line).
    pub fn build(&self, lines: &[String], tags: &[Option<Tag>]) -> Transcript {
        debug_assert_eq!(lines.len(), tags.len());
        let stripped = strip_tags(lines, tags);
        let all_spans = self.find_all_spans(tags);

        let clusters = self
            .config
            .clusters
            .iter()
            .map(|definition| {
                let mut cluster = Cluster::new(definition.clone());
                let spans: Vec<Span> = definition
                    .questions
                    .iter()
                    .filter_map(|q| all_spans.get(q).copied().flatten())
                    .collect();
                for span in merge_spans(spans) {
                    cluster
                        .lines
                        .extend_from_slice(&stripped[span.start..=span.end]);
                }
                cluster
            })
            .collect();

        Transcript { clusters }
    }

    fn find_all_spans(&self, tags: &[Option<Tag>]) -> HashMap<QuestionId, Option<Span>> {
        self.question_to_cluster
            .keys()
            .map(|&question_id| (question_id, find_span(question_id, tags)))
            .collect()
    }
}

/// Remove each line's matched tag text and trim; untagged lines pass through
fn strip_tags(lines: &[String], tags: &[Option<Tag>]) -> Vec<String> {
    lines
        .iter()
        .zip(tags)
        .map(|(line, tag)| match tag {
            Some(tag) => line.replace(&tag.matched_text, "").trim().to_string(),
            None => line.clone(),
        })
        .collect()
}
