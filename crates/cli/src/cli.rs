use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "articleflow", version, about = "ArticleFlow quality gate CLI")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = LogFormat::Json,
        help = "Log line format (written to stderr)"
    )]
    pub log_format: LogFormat,
    #[arg(
        long,
        global = true,
        help = "Rubric JSON file (overrides RUBRIC_PATH)"
    )]
    pub rubric: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score one markdown article against the rubric.
    Score(ScoreArgs),
    /// Print the effective rubric after file and environment overrides.
    Rubric,
    /// Run drafts through the full workflow with in-memory collaborators.
    DryRun(DryRunArgs),
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    pub file: PathBuf,
    #[arg(long)]
    pub target_words: u32,
    #[arg(long, help = "Main keyword expected in the title and introduction")]
    pub keyword: Option<String>,
    #[arg(long, help = "Run only the quick pre-screen")]
    pub quick: bool,
}

#[derive(Args, Debug)]
pub struct DryRunArgs {
    /// Markdown drafts; each file stem becomes the brief's topic.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    #[arg(long)]
    pub target_words: u32,
    #[arg(long)]
    pub keyword: Option<String>,
    #[arg(long, help = "Overrides BATCH_MAX_CONCURRENT")]
    pub max_concurrent: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Pretty,
}
