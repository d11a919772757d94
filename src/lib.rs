//! Caderno - Elm-style rich-text note editor core
//!
//! A document tree edited through pure commands (`update::dispatch`), with
//! toolbar and link overlay state derived from each snapshot, a strict JSON
//! codec, list-view previews, a read-only renderer and a debounced bridge to
//! the persistence service.

pub mod cli;
pub mod codec;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod messages;
pub mod model;
pub mod overlay;
pub mod persistence;
pub mod preview;
pub mod render;
pub mod surface;
pub mod toolbar;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use codec::{deserialize, serialize, ParseError};
pub use commands::{Cmd, EditorCommand};
pub use config::EditorConfig;
pub use messages::Msg;
pub use model::{Document, EditorMode, EditorState, Selection};
pub use preview::extract_preview;
pub use surface::EditorSurface;
pub use update::{dispatch, CommandError};
