//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging
//! command dispatch, selection and persistence issues.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=selection=debug,command=debug` - scoped filtering
//! - `RUST_LOG=caderno::persistence=debug` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/caderno/logs/caderno.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::model::{EditorState, Point};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG env var for filtering.
/// File logging writes to `~/.config/caderno/logs/caderno.log` with daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer - respects RUST_LOG, stderr keeps stdout clean for output
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "caderno.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of editor state for diffing
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub version: u64,
    pub block_count: usize,
    pub anchor: Option<Point>,
    pub focus: Option<Point>,
}

impl StateSnapshot {
    pub fn from_state(state: &EditorState) -> Self {
        Self {
            version: state.version,
            block_count: state.document.blocks().len(),
            anchor: state.selection.as_ref().map(|s| s.anchor.clone()),
            focus: state.selection.as_ref().map(|s| s.focus.clone()),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &StateSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.version != other.version {
            changes.push(format!("version: {} → {}", self.version, other.version));
        }
        if self.block_count != other.block_count {
            changes.push(format!(
                "blocks: {} → {}",
                self.block_count, other.block_count
            ));
        }
        if self.anchor != other.anchor || self.focus != other.focus {
            changes.push(format!(
                "selection: {} → {}",
                describe(&self.anchor, &self.focus),
                describe(&other.anchor, &other.focus)
            ));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

fn describe(anchor: &Option<Point>, focus: &Option<Point>) -> String {
    fn point(p: &Point) -> String {
        format!("{:?}:{}:{}", p.block_path, p.inline_index, p.offset)
    }
    match (anchor, focus) {
        (Some(a), Some(f)) if a == f => point(a),
        (Some(a), Some(f)) => format!("{}..{}", point(a), point(f)),
        _ => "none".to_string(),
    }
}
