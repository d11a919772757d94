//! Debounced persistence of committed note content
//!
//! Each edit commits the serialized document to the [`PersistenceBridge`],
//! which holds one pending value per document id and forwards it only after a
//! quiet window with no further commits. The bridge never sleeps or spawns:
//! callers pass the current time in and drive it with [`PersistenceBridge::take_due`]
//! (Elm-style [`Cmd::Save`] effects) or [`PersistenceBridge::flush_due`].

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::commands::{Cmd, Notification, NotificationLevel};
use crate::model::DocumentId;

/// Default inactivity window before a commit is saved
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Shown when a save fails
pub const SAVE_FAILED: &str = "Não foi possível salvar a nota.";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("invalid note id {0:?}")]
    InvalidId(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("save rejected: {0}")]
    Rejected(String),
}

/// External store notes are saved to
pub trait PersistenceService {
    fn save(&mut self, id: &DocumentId, content: &str) -> Result<(), PersistenceError>;
}

/// External collaborator that shows messages to the user
pub trait Notifier {
    fn notify_error(&mut self, message: &str);
    fn notify_success(&mut self, message: &str);

    fn notify(&mut self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Error => self.notify_error(&notification.message),
            NotificationLevel::Success => self.notify_success(&notification.message),
        }
    }
}

/// Notifier that only writes to the log
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_error(&mut self, message: &str) {
        tracing::error!(target: "notify", "{}", message);
    }

    fn notify_success(&mut self, message: &str) {
        tracing::info!(target: "notify", "{}", message);
    }
}

// ============================================================================
// File store
// ============================================================================

/// Notes as `<id>.json` files in one directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a note's file; ids must be plain file stems
    pub fn path_for(&self, id: &DocumentId) -> Result<PathBuf, PersistenceError> {
        let stem = id.as_str();
        let valid = !stem.is_empty()
            && !stem.starts_with('.')
            && !stem.contains(['/', '\\'])
            && !stem.chars().any(char::is_control);
        if !valid {
            return Err(PersistenceError::InvalidId(stem.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", stem)))
    }

    /// Stored content of a note, `None` if it does not exist
    pub fn load(&self, id: &DocumentId) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(id)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }

    /// Ids of every stored note, sorted
    pub fn list(&self) -> Result<Vec<DocumentId>, PersistenceError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };
        let mut ids: Vec<DocumentId> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(DocumentId::new)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl PersistenceService for FileStore {
    fn save(&mut self, id: &DocumentId, content: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(id)?;
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Write then rename so a crash never leaves a half-written note
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|source| PersistenceError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| PersistenceError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(
            target: "persistence",
            "Saved {} ({} bytes)",
            path.display(),
            content.len()
        );
        Ok(())
    }
}

// ============================================================================
// Debounce bridge
// ============================================================================

#[derive(Debug, Clone)]
struct Pending {
    content: String,
    deadline: Instant,
}

/// One pending timer per document id; each commit resets it
#[derive(Debug, Clone)]
pub struct PersistenceBridge {
    window: Duration,
    pending: BTreeMap<DocumentId, Pending>,
    /// Last content known to be saved, per document
    forwarded: BTreeMap<DocumentId, String>,
}

impl Default for PersistenceBridge {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl PersistenceBridge {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: BTreeMap::new(),
            forwarded: BTreeMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record content as already persisted (e.g. what a surface loaded)
    pub fn mark_forwarded(&mut self, id: &DocumentId, content: impl Into<String>) {
        self.forwarded.insert(id.clone(), content.into());
    }

    pub fn last_forwarded(&self, id: &DocumentId) -> Option<&str> {
        self.forwarded.get(id).map(String::as_str)
    }

    /// Commit a new value, restarting the document's timer
    pub fn commit(&mut self, id: &DocumentId, content: impl Into<String>, now: Instant) {
        let deadline = now + self.window;
        tracing::trace!(target: "persistence", %id, "commit, timer reset");
        self.pending.insert(
            id.clone(),
            Pending {
                content: content.into(),
                deadline,
            },
        );
    }

    /// Drop a document's pending value without saving it
    pub fn cancel(&mut self, id: &DocumentId) -> bool {
        let cancelled = self.pending.remove(id).is_some();
        if cancelled {
            tracing::debug!(target: "persistence", %id, "pending save cancelled");
        }
        cancelled
    }

    pub fn has_pending(&self, id: &DocumentId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest moment a pending value becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// Remove every value whose timer elapsed. Values equal to the last
    /// forwarded content are dropped; the rest become [`Cmd::Save`].
    pub fn take_due(&mut self, now: Instant) -> Vec<Cmd> {
        let due: Vec<DocumentId> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();

        let mut cmds = Vec::new();
        for id in due {
            let Some(pending) = self.pending.remove(&id) else {
                continue;
            };
            if self.last_forwarded(&id) == Some(pending.content.as_str()) {
                tracing::debug!(target: "persistence", %id, "content unchanged, skipping save");
                continue;
            }
            cmds.push(Cmd::Save {
                document_id: id,
                content: pending.content,
            });
        }
        cmds
    }

    /// Outcome of a save: success updates the forwarded value, failure turns
    /// into an error notification. Nothing is retried; the next commit will
    /// try again.
    pub fn save_completed(
        &mut self,
        id: &DocumentId,
        content: String,
        result: Result<(), PersistenceError>,
    ) -> Cmd {
        match result {
            Ok(()) => {
                tracing::debug!(target: "persistence", %id, "saved");
                self.forwarded.insert(id.clone(), content);
                Cmd::None
            }
            Err(err) => {
                tracing::warn!(target: "persistence", %id, %err, "save failed");
                Cmd::Notify(Notification::error(SAVE_FAILED))
            }
        }
    }

    /// Save everything due now through `store`, reporting failures to
    /// `notifier`. Returns how many saves were attempted.
    pub fn flush_due(
        &mut self,
        now: Instant,
        store: &mut dyn PersistenceService,
        notifier: &mut dyn Notifier,
    ) -> usize {
        let cmd = Cmd::batch(self.take_due(now));
        self.perform(cmd, store, notifier)
    }

    fn perform(
        &mut self,
        cmd: Cmd,
        store: &mut dyn PersistenceService,
        notifier: &mut dyn Notifier,
    ) -> usize {
        match cmd {
            Cmd::None => 0,
            Cmd::Save {
                document_id,
                content,
            } => {
                let result = store.save(&document_id, &content);
                let follow_up = self.save_completed(&document_id, content, result);
                1 + self.perform(follow_up, store, notifier)
            }
            Cmd::Notify(notification) => {
                notifier.notify(&notification);
                0
            }
            Cmd::Batch(cmds) => cmds
                .into_iter()
                .map(|cmd| self.perform(cmd, store, notifier))
                .sum(),
        }
    }
}
