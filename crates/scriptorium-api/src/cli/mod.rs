//! CLI command definitions for the `scriptorium` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod essay;
pub mod research;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Essay writing and simulated expert research with LLM personas.
#[derive(Parser)]
#[command(name = "scriptorium", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config.toml (default: ~/.scriptorium/config.toml).
    #[arg(long, global = true, env = "SCRIPTORIUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web UI and JSON API.
    Serve {
        /// Address to bind (default from [server] host).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default from [server] port).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Plan, draft, and critique an essay.
    Essay {
        /// Essay topic.
        topic: String,

        /// Revise/critique rounds after the first critique.
        #[arg(long)]
        revisions: Option<u32>,
    },

    /// Generate analyst personas for a research topic.
    Analysts {
        /// Research topic.
        topic: String,

        /// Number of analysts to request (1-5).
        #[arg(short = 'n', long = "max-analysts")]
        max_analysts: Option<u32>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
