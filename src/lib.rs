pub mod consolidate;
pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod parsing;
pub mod pipeline;
pub mod segmentation;

pub use consolidate::{ConsolidateConfig, Consolidator};
pub use error::ConfigError;
pub use io::{
    load_clusters_config, load_consolidate_config, load_lines, load_score_records,
    load_tags_config, load_transcript, write_consolidated_csv, write_json_pretty, write_jsonl,
};
pub use llm::{AnthropicClient, AnthropicConfig, DummyModel, PromptMaker, ScoreModel};
pub use models::{ClusterScore, ClustersConfig, IntermediaryResult, Tag, Transcript};
pub use parsing::{EnumParser, LabelCascade, ScoreCascade, SubParser};
pub use pipeline::{
    run_consolidate, run_convert, run_extract, run_segment, Extractor, RerunPolicy,
};
pub use segmentation::{Segmenter, Tagger, TagsConfig};
