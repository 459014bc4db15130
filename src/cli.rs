use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "teamweek")]
#[command(about = "Weekly per-author commit, line and cost-per-line report for a Bitbucket repository")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Path to the TOML config (default: ./teamweek.toml)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory holding cloned repositories")]
    pub repos_dir: Option<PathBuf>,
}

#[derive(Args, Clone, Default)]
pub struct ReportArgs {
    #[arg(help = "Repository slug; prompted for when omitted")]
    pub repo: Option<String>,

    #[arg(long, help = "Analyse an existing local repository instead of cloning", conflicts_with = "repo")]
    pub path: Option<PathBuf>,

    #[arg(long, help = "CSV output file (default: user_stats.csv)")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Print the report as JSON")]
    pub json: bool,

    #[arg(long, help = "Do not query the workspace repository list before syncing")]
    pub skip_listing: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyse this week's commits and write the CSV report
    Report(ReportArgs),
    /// List the repositories of the configured workspace
    Repos {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            None => crate::report::exec(self.common, ReportArgs::default()),
            Some(Commands::Report(args)) => crate::report::exec(self.common, args),
            Some(Commands::Repos { json }) => crate::repos::exec(self.common, json),
        }
    }
}
