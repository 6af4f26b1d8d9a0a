//! CLI type definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fixpoint")]
#[command(about = "Fixpoint - automated bug repair pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a project archive and create a queued job
    Submit {
        /// Path to the ZIP archive
        archive: PathBuf,

        /// Project language ('py' or 'cpp'); required when the archive
        /// contains both
        #[arg(short, long)]
        language: Option<String>,

        /// Iteration budget for the repair loop
        #[arg(long)]
        max_iters: Option<u32>,
    },

    /// Run the repair loop for a queued workspace
    Run {
        /// Workspace id returned by submit
        workspace: String,

        /// Override the job's iteration budget
        #[arg(long)]
        max_iters: Option<u32>,
    },

    /// Show the status (and result, when finished) of a workspace
    Status {
        /// Workspace id
        workspace: String,
    },

    /// List known jobs, newest first
    List {
        /// Maximum number of jobs to display
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Start the HTTP upload/status server with a background worker
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the evaluation harness over a bug dataset
    Eval {
        /// Dataset file: JSON array of bug cases
        dataset: PathBuf,
    },
}
