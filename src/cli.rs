use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Walk the dependency graph of an npm package and annotate every node
#[derive(Parser, Debug)]
#[command(name = "depwalk")]
#[command(version)]
#[command(
    about = "Walk an npm dependency graph and annotate each package with security metadata",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk the project in the current directory (reads ./package.json)
    Cwd(WalkOptions),

    /// Walk a package published on the registry
    From {
        /// Package to walk, optionally with a range: express, express@^4.18.0
        #[arg(value_name = "PACKAGE")]
        package: String,

        #[command(flatten)]
        options: WalkOptions,
    },
}

/// Flags shared by every walk subcommand
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct WalkOptions {
    /// Maximum dependency depth; 0 walks only the root
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Output file name; `.json` is appended when missing
    #[arg(short, long)]
    pub output: Option<String>,

    /// Maximum number of in-flight fetches and scans
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Path to a config file (defaults to ./depwalk.config.yml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Command {
    pub fn options(&self) -> &WalkOptions {
        match self {
            Command::Cwd(options) => options,
            Command::From { options, .. } => options,
        }
    }
}
