use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use debrief::{
    load_clusters_config, load_consolidate_config, load_tags_config, run_consolidate, run_convert,
    run_extract, run_segment, AnthropicClient, AnthropicConfig, DummyModel, RerunPolicy,
    TagsConfig,
};

#[derive(Parser)]
#[command(name = "debrief")]
#[command(author, version, about = "Interview transcript segmentation and cluster scoring pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which model backend scores the clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Provider {
    /// Anthropic messages API (needs ANTHROPIC_API_KEY)
    Anthropic,
    /// Offline model that answers "1.0" to everything
    Dummy,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert plain-text transcripts into per-respondent JSON line arrays
    Convert {
        /// Directory of .txt transcripts, one utterance per line
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Directory for per-respondent .json line arrays
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Tag and segment line arrays into cluster transcripts
    Segment {
        /// Directory of per-respondent .json line arrays
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Directory for segmented transcript .json files
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Clusters configuration file (JSON)
        #[arg(long)]
        clusters: PathBuf,

        /// Tags configuration file (JSON); built-in defaults when omitted
        #[arg(long)]
        tags: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Score segmented transcripts with a model
    Extract {
        /// Directory of segmented transcript .json files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Root directory for score records
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Clusters configuration file (JSON)
        #[arg(long)]
        clusters: PathBuf,

        /// Identifier of this scoring run
        #[arg(long)]
        run_id: String,

        /// Model backend
        #[arg(long, value_enum, default_value_t = Provider::Anthropic)]
        provider: Provider,

        /// Model name override for the anthropic provider
        #[arg(long)]
        model: Option<String>,

        /// Treatment of already-existing output files
        #[arg(long, value_enum, default_value_t = RerunPolicy::Never)]
        rerun_policy: RerunPolicy,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Consolidate score records into one CSV row per respondent
    Consolidate {
        /// Root directory of score records (run_id/model/respondent.jsonl)
        #[arg(long)]
        scores_dir: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Clusters configuration file (JSON)
        #[arg(long)]
        clusters: PathBuf,

        /// Consolidation configuration file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input_dir,
            output_dir,
            verbose,
        } => {
            setup_logging(verbose);
            run_convert(&input_dir, &output_dir)?;
        }
        Commands::Segment {
            input_dir,
            output_dir,
            clusters,
            tags,
            verbose,
        } => {
            setup_logging(verbose);
            let clusters = load_clusters_config(&clusters)?;
            let tags = match tags {
                Some(path) => load_tags_config(&path)?,
                None => TagsConfig::default(),
            };
            run_segment(&input_dir, &output_dir, clusters, &tags)?;
        }
        Commands::Extract {
            input_dir,
            output_dir,
            clusters,
            run_id,
            provider,
            model,
            rerun_policy,
            verbose,
        } => {
            setup_logging(verbose);
            let clusters = load_clusters_config(&clusters)?;
            match provider {
                Provider::Anthropic => {
                    let mut config = AnthropicConfig::from_env()?;
                    if let Some(model) = model {
                        config.model = model;
                    }
                    let client = AnthropicClient::new(config);
                    run_extract(
                        &input_dir,
                        &output_dir,
                        clusters,
                        &run_id,
                        client,
                        rerun_policy,
                    )
                    .await?;
                }
                Provider::Dummy => {
                    run_extract(
                        &input_dir,
                        &output_dir,
                        clusters,
                        &run_id,
                        DummyModel,
                        rerun_policy,
                    )
                    .await?;
                }
            }
        }
        Commands::Consolidate {
            scores_dir,
            output,
            clusters,
            config,
            verbose,
        } => {
            setup_logging(verbose);
            let clusters = load_clusters_config(&clusters)?;
            let config = load_consolidate_config(&config)?;
            run_consolidate(&scores_dir, &output, &clusters, config)?;
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
