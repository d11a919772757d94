//! `caderno` - headless driver for the note editor
//!
//! Usage:
//!   caderno list
//!   caderno preview <NOTE> [--max-length N]
//!   caderno render <NOTE> [--markdown]
//!   caderno apply <NOTE> <SCRIPT>
//!   caderno new <NOTE>

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use caderno::cli::{CliArgs, CliCommand};
use caderno::codec;
use caderno::commands::Notification;
use caderno::config::EditorConfig;
use caderno::messages::Msg;
use caderno::model::{DocumentId, EditorMode};
use caderno::overlay::MonospaceLayout;
use caderno::persistence::{FileStore, Notifier, PersistenceBridge, PersistenceService};
use caderno::preview::extract_preview;
use caderno::render::{render_markdown, render_note};
use caderno::surface::EditorSurface;

/// Notifier printing to the terminal
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify_error(&mut self, message: &str) {
        tracing::error!(target: "notify", "{}", message);
        eprintln!("erro: {}", message);
    }

    fn notify_success(&mut self, message: &str) {
        tracing::info!(target: "notify", "{}", message);
        eprintln!("{}", message);
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    caderno::tracing::init();

    let config = args.load_config();
    let Some(notes_dir) = args.notes_dir(&config) else {
        bail!("No notes directory available; pass --notes-dir");
    };
    let mut store = FileStore::new(notes_dir);
    let mut notifier = ConsoleNotifier;

    match args.command {
        CliCommand::List { max_length } => {
            let max_length = max_length.unwrap_or(config.preview_length);
            for id in store.list()? {
                let content = store.load(&id)?.unwrap_or_default();
                println!("{}\t{}", id, extract_preview(&content, max_length));
            }
        }
        CliCommand::Preview { note, max_length } => {
            let content = load_existing(&store, &note)?;
            let max_length = max_length.unwrap_or(config.preview_length);
            println!("{}", extract_preview(&content, max_length));
        }
        CliCommand::Render { note, markdown } => {
            let content = load_existing(&store, &note)?;
            if markdown {
                let document = codec::deserialize(&content)
                    .with_context(|| format!("Note {} does not parse", note))?;
                print!("{}", render_markdown(&document));
            } else {
                print!("{}", render_note(&content));
            }
        }
        CliCommand::Apply { note, script } => {
            apply_script(&note, &script, &config, &mut store, &mut notifier)?;
        }
        CliCommand::New { note } => {
            let id = DocumentId::new(note);
            if store.load(&id)?.is_some() {
                bail!("Note {} already exists", id);
            }
            store.save(&id, codec::EMPTY_DOCUMENT)?;
            notifier.notify(&Notification::success(format!("Nota {} criada.", id)));
        }
    }

    Ok(())
}

fn load_existing(store: &FileStore, note: &str) -> Result<String> {
    let id = DocumentId::new(note);
    store
        .load(&id)?
        .with_context(|| format!("Note {} not found in {}", id, store.dir().display()))
}

/// Replay messages through an editing surface, then wait out the debounce
/// window and save like an idle editor would
fn apply_script(
    note: &str,
    script: &Path,
    config: &EditorConfig,
    store: &mut FileStore,
    notifier: &mut ConsoleNotifier,
) -> Result<()> {
    let id = DocumentId::new(note);
    let script_text = fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let messages: Vec<Msg> = serde_json::from_str(&script_text)
        .with_context(|| format!("Invalid script {}", script.display()))?;

    let stored = store.load(&id)?;
    let mut bridge = PersistenceBridge::new(config.debounce_window());
    let mut surface = EditorSurface::mount(
        id.clone(),
        stored.as_deref(),
        EditorMode::Editable,
        config,
        Box::new(MonospaceLayout::default()),
        notifier,
    );
    surface.register(&mut bridge);

    let mut applied = 0;
    for msg in messages {
        if surface.update(msg, &mut bridge, Instant::now()) {
            applied += 1;
        }
    }
    tracing::info!(%id, applied, "script replayed");

    while let Some(deadline) = bridge.next_deadline() {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        bridge.flush_due(Instant::now(), store, notifier);
    }

    println!("{}", surface.preview());
    Ok(())
}
