//! Command types for the Elm-style architecture
//!
//! [`EditorCommand`] is the closed set of toolbar/keyboard commands.
//! [`Cmd`] represents side effects that should be performed after an update.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::DocumentId;

// ============================================================================
// Editor command registry
// ============================================================================

/// A toolbar or keyboard-shortcut command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditorCommand {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Paragraph,
    Heading1,
    Heading2,
    ListOrdered,
    ListUnordered,
    /// Unlink when the selection is on a link, otherwise insert a
    /// placeholder link to be completed in the link overlay
    LinkToggle,
}

/// URL given to a link created by [`EditorCommand::LinkToggle`]
pub const PLACEHOLDER_URL: &str = "https://";

/// A command definition for toolbars and shortcut layers
#[derive(Debug, Clone)]
pub struct CommandDef {
    pub id: EditorCommand,
    pub name: &'static str,
    pub label: &'static str,
    pub keybinding: Option<&'static str>,
}

/// Static registry of all editor commands
pub static COMMANDS: &[CommandDef] = &[
    CommandDef {
        id: EditorCommand::Bold,
        name: "BOLD",
        label: "Negrito",
        keybinding: Some("mod+b"),
    },
    CommandDef {
        id: EditorCommand::Italic,
        name: "ITALIC",
        label: "Itálico",
        keybinding: Some("mod+i"),
    },
    CommandDef {
        id: EditorCommand::Underline,
        name: "UNDERLINE",
        label: "Sublinhado",
        keybinding: Some("mod+u"),
    },
    CommandDef {
        id: EditorCommand::Strikethrough,
        name: "STRIKETHROUGH",
        label: "Tachado",
        keybinding: Some("mod+shift+x"),
    },
    CommandDef {
        id: EditorCommand::Code,
        name: "CODE",
        label: "Código",
        keybinding: Some("mod+e"),
    },
    CommandDef {
        id: EditorCommand::Paragraph,
        name: "PARAGRAPH",
        label: "Parágrafo",
        keybinding: Some("mod+alt+0"),
    },
    CommandDef {
        id: EditorCommand::Heading1,
        name: "HEADING1",
        label: "Título 1",
        keybinding: Some("mod+alt+1"),
    },
    CommandDef {
        id: EditorCommand::Heading2,
        name: "HEADING2",
        label: "Título 2",
        keybinding: Some("mod+alt+2"),
    },
    CommandDef {
        id: EditorCommand::ListOrdered,
        name: "LIST_ORDERED",
        label: "Lista numerada",
        keybinding: Some("mod+shift+7"),
    },
    CommandDef {
        id: EditorCommand::ListUnordered,
        name: "LIST_UNORDERED",
        label: "Lista com marcadores",
        keybinding: Some("mod+shift+8"),
    },
    CommandDef {
        id: EditorCommand::LinkToggle,
        name: "LINK_TOGGLE",
        label: "Link",
        keybinding: Some("mod+k"),
    },
];

impl EditorCommand {
    pub const ALL: [EditorCommand; 11] = [
        EditorCommand::Bold,
        EditorCommand::Italic,
        EditorCommand::Underline,
        EditorCommand::Strikethrough,
        EditorCommand::Code,
        EditorCommand::Paragraph,
        EditorCommand::Heading1,
        EditorCommand::Heading2,
        EditorCommand::ListOrdered,
        EditorCommand::ListUnordered,
        EditorCommand::LinkToggle,
    ];

    /// Get the registry entry for this command
    pub fn def(self) -> &'static CommandDef {
        // The registry lists every variant
        COMMANDS
            .iter()
            .find(|def| def.id == self)
            .unwrap_or(&COMMANDS[0])
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }
}

impl fmt::Display for EditorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EditorCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        COMMANDS
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(s))
            .map(|def| def.id)
            .ok_or_else(|| format!("Unknown editor command: {}", s))
    }
}

// ============================================================================
// Side effects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A user-facing message for the notification collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Side effects requested by the persistence bridge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Forward content to the persistence service
    Save {
        document_id: DocumentId,
        content: String,
    },
    /// Show a notification
    Notify(Notification),
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Combine commands, dropping `Cmd::None`
    pub fn batch(cmds: Vec<Cmd>) -> Cmd {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| *c != Cmd::None).collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.remove(0),
            _ => Cmd::Batch(cmds),
        }
    }
}
