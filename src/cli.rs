//! Command-line argument parsing for the note tool
//!
//! Supports:
//! - Listing notes with previews
//! - Previewing and rendering a stored note
//! - Replaying a script of editor messages against a note
//! - Creating an empty note

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::EditorConfig;

/// Headless rich-text note editor
#[derive(Parser, Debug)]
#[command(name = "caderno", version, about = "Headless rich-text note editor")]
pub struct CliArgs {
    /// Directory holding the notes (overrides the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub notes_dir: Option<PathBuf>,

    /// Config file to use instead of ~/.config/caderno/config.yaml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// List stored notes with a short preview
    List {
        /// Preview length in characters
        #[arg(long, value_name = "N")]
        max_length: Option<usize>,
    },

    /// Print the list-view preview of a note
    Preview {
        note: String,

        /// Preview length in characters
        #[arg(long, value_name = "N")]
        max_length: Option<usize>,
    },

    /// Render a note as HTML
    Render {
        note: String,

        /// Print Markdown instead of HTML
        #[arg(long)]
        markdown: bool,
    },

    /// Replay a JSON array of editor messages against a note and save it
    Apply {
        note: String,

        /// JSON file holding the messages
        script: PathBuf,
    },

    /// Create an empty note
    New { note: String },
}

impl CliArgs {
    /// Config from `--config`, or the user's config file
    pub fn load_config(&self) -> EditorConfig {
        match &self.config {
            Some(path) => EditorConfig::load_from(path),
            None => EditorConfig::load(),
        }
    }

    /// Notes directory: `--notes-dir`, then the config, then the platform default
    pub fn notes_dir(&self, config: &EditorConfig) -> Option<PathBuf> {
        self.notes_dir
            .clone()
            .or_else(|| config.resolved_notes_dir())
    }
}
