//! CLI command definitions for settings-tree
//!
//! This module defines the CLI structure using clap's derive macros.
//! Every subcommand works on the stores of one configurator, named by its
//! guid; no schema is needed.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and manage settings-tree stores and presets
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to engine configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding store files (overrides config)
    #[arg(short = 'd', long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format: json or markdown
    #[arg(short, long, default_value = "markdown", global = true)]
    pub format: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Configurator whose files a command operates on.
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Configurator guid
    pub guid: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List presets in display order
    Presets(Target),

    /// Print the entries of a store
    Show {
        #[command(flatten)]
        target: Target,
        /// Preset file id (default: the active store)
        #[arg(long)]
        preset: Option<String>,
    },

    /// Make a preset active ("default" selects the default store)
    Switch {
        #[command(flatten)]
        target: Target,
        preset: String,
    },

    /// Create a preset
    Add {
        #[command(flatten)]
        target: Target,
        name: String,
        /// Start from a copy of the active store
        #[arg(long)]
        copy: bool,
    },

    /// Rename a preset
    Rename {
        #[command(flatten)]
        target: Target,
        preset: String,
        name: String,
    },

    /// Move a preset to a position in display order
    Move {
        #[command(flatten)]
        target: Target,
        preset: String,
        position: usize,
    },

    /// Delete a preset and its file
    Delete {
        #[command(flatten)]
        target: Target,
        preset: String,
    },

    /// Export the active store to the exports folder
    Export {
        #[command(flatten)]
        target: Target,
        /// Export name (default: the active preset's name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Import a store file as a new preset
    Import {
        #[command(flatten)]
        target: Target,
        path: PathBuf,
    },

    /// Adopt preset files missing from the index
    Discover(Target),

    /// Report format problems in store and index files
    Check(Target),
}

impl Command {
    pub fn target(&self) -> &Target {
        match self {
            Command::Presets(target)
            | Command::Discover(target)
            | Command::Check(target)
            | Command::Show { target, .. }
            | Command::Switch { target, .. }
            | Command::Add { target, .. }
            | Command::Rename { target, .. }
            | Command::Move { target, .. }
            | Command::Delete { target, .. }
            | Command::Export { target, .. }
            | Command::Import { target, .. } => target,
        }
    }
}

/// Map the `switch` argument to a preset selection.
pub fn parse_selection(preset: &str) -> Option<&str> {
    match preset {
        "default" | "" => None,
        id => Some(id),
    }
}
