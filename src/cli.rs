use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Digest database tool for detecting file tree drift and replicating
/// verified trees
#[derive(Parser, Debug)]
#[command(name = "replisum", version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v: info, -vv: debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or interactively update a directory's digest database
    Check {
        /// Directory to check
        #[arg(value_name = "DIRECTORY")]
        directory: PathBuf,
    },

    /// Copy a verified source tree to a destination, updating the
    /// destination's digest database
    Replicate {
        /// Source directory (must match its own digest database)
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Destination directory
        #[arg(value_name = "DESTINATION")]
        destination: PathBuf,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
