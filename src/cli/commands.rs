//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - processor: run the delivery processor (or a single cycle)
//! - relay: run the notification relay and status server (or a single poll)
//! - classify: print the judgment for a piece of text

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// autodeliver - turns early-access sign-ups into delivered automations
#[derive(Parser, Debug)]
#[command(name = "autodeliver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Process pending sign-ups on an interval
    Processor {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// Relay queued notifications to the outbound file
    Relay {
        /// Poll the queue once and exit, without the status server
        #[arg(long)]
        once: bool,
    },

    /// Print the judgment for a challenge description
    Classify {
        /// Free-text challenge description
        text: String,
    },
}
