//! Reversible edit commands
//!
//! Every edit is a [`Command`] built from a closed [`CommandKind`]. A command
//! plans its whole effect up front (`init`): it snapshots the selections,
//! walks them in document order and records each text change in the
//! coordinates of the unedited document. Applying folds a running length
//! delta over those changes, so a later selection never sees a half-edited
//! document, and undo replays the inverse changes and restores the selection
//! snapshot exactly.
//!
//! ```text
//! Created --init--> Initialized --redo--> Applied <--undo/redo--> Undone
//!            \--veto (false): dropped, no effect
//! ```

mod clock;
mod history;
mod plan;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use history::History;

use serde::Serialize;

use crate::config::CoreConfig;
use crate::selection::{SelectionSet, SelectionSnapshot};
use crate::text::Document;

/// The closed set of edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Replace every selection with `text`, or with the matching entry of
    /// `per_selection` (one string per selection, in document order)
    InsertText {
        text: String,
        per_selection: Option<Vec<String>>,
        select_inserted: bool,
    },
    /// Delete every non-empty selection
    EraseSelection,
    /// Delete the selection, or the character before the caret
    Backspace,
    /// Delete the selection, or the character after the caret
    Delete,
    /// Delete the selection, or up to the previous/next word boundary
    RemoveWord { left: bool },
    /// Indent or unindent every touched line
    Shift { left: bool },
    /// Upper- or lower-case selected text, keeping the selections
    ChangeCase { upper: bool },
    /// Swap the touched line blocks with the line above or below
    MoveLine { up: bool },
    /// Overwrite the character under each caret, or every selected
    /// character except line breaks
    ReplaceChar { ch: char },
    /// Rewrite every line break as the configured one
    FixLineBreaks,
    /// Record caret positions only
    SavePositions,
}

impl CommandKind {
    pub fn insert(text: impl Into<String>) -> Self {
        CommandKind::InsertText {
            text: text.into(),
            per_selection: None,
            select_inserted: false,
        }
    }

    pub fn command_type(&self) -> CommandType {
        match self {
            CommandKind::InsertText { .. } => CommandType::InsertText,
            CommandKind::EraseSelection => CommandType::EraseSelection,
            CommandKind::Backspace => CommandType::Backspace,
            CommandKind::Delete => CommandType::Delete,
            CommandKind::RemoveWord { .. } => CommandType::RemoveWord,
            CommandKind::Shift { .. } => CommandType::Shift,
            CommandKind::ChangeCase { .. } => CommandType::ChangeCase,
            CommandKind::MoveLine { .. } => CommandType::MoveLine,
            CommandKind::ReplaceChar { .. } => CommandType::ReplaceChar,
            CommandKind::FixLineBreaks => CommandType::FixLineBreaks,
            CommandKind::SavePositions => CommandType::SavePositions,
        }
    }
}

/// Grouping identity of a command: consecutive commands of the same type
/// share an undo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CommandType {
    InsertText,
    EraseSelection,
    Backspace,
    Delete,
    RemoveWord,
    Shift,
    ChangeCase,
    MoveLine,
    ReplaceChar,
    FixLineBreaks,
    SavePositions,
}

impl CommandType {
    pub fn changes_text(self) -> bool {
        !matches!(self, CommandType::SavePositions)
    }

    /// Joins whatever group is open instead of starting its own
    pub fn type_agnostic(self) -> bool {
        matches!(self, CommandType::SavePositions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommandState {
    Created,
    Initialized,
    Applied,
    Undone,
}

/// One text replacement, in the coordinates of the document before the
/// command ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChange {
    pub index: usize,
    pub removed: String,
    pub inserted: String,
}

impl TextChange {
    pub fn removed_len(&self) -> usize {
        self.removed.chars().count()
    }

    pub fn inserted_len(&self) -> usize {
        self.inserted.chars().count()
    }
}

#[derive(Debug, Clone)]
pub struct Command {
    kind: CommandKind,
    state: CommandState,
    before: SelectionSnapshot,
    after: SelectionSnapshot,
    changes: Vec<TextChange>,
    marked: bool,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        let empty = SelectionSet::new().snapshot();
        Self {
            kind,
            state: CommandState::Created,
            before: empty.clone(),
            after: empty,
            changes: Vec::new(),
            marked: false,
        }
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn command_type(&self) -> CommandType {
        self.kind.command_type()
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn changes(&self) -> &[TextChange] {
        &self.changes
    }

    /// Selections to restore on undo
    pub fn before(&self) -> &SelectionSnapshot {
        &self.before
    }

    /// Selections to restore on redo
    pub fn after(&self) -> &SelectionSnapshot {
        &self.after
    }

    /// Last command of an undo step
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub(crate) fn set_marked(&mut self, marked: bool) {
        self.marked = marked;
    }

    /// Plan the edit against the current state. False vetoes the command:
    /// nothing was changed and it must not be applied.
    pub fn init(
        &mut self,
        document: &Document,
        selections: &SelectionSet,
        config: &CoreConfig,
    ) -> bool {
        debug_assert_eq!(self.state, CommandState::Created);
        let Some(plan) = plan::plan(&self.kind, document, selections, config) else {
            tracing::debug!(kind = ?self.command_type(), "command vetoed");
            return false;
        };
        self.before = selections.snapshot();
        self.after = plan.selections.snapshot();
        self.changes = plan.changes;
        self.state = CommandState::Initialized;
        true
    }

    /// Apply the planned changes and move to the `after` selections
    pub fn redo(&mut self, document: &mut Document, selections: &mut SelectionSet) {
        debug_assert!(matches!(
            self.state,
            CommandState::Initialized | CommandState::Undone
        ));
        let mut delta: isize = 0;
        for change in &self.changes {
            let index = change.index.saturating_add_signed(delta);
            document.remove_text(index, change.removed_len());
            document.insert_text(index, &change.inserted);
            delta += change.inserted_len() as isize - change.removed_len() as isize;
        }

        if self.state == CommandState::Initialized && self.command_type().changes_text() {
            // Preferred columns follow the edited text; computed once, then
            // replayed verbatim
            for selection in &mut self.after.selections {
                let (pos, wrap_pos) = document.preferred_pos(selection.caret);
                selection.set_preferred(pos, wrap_pos);
            }
        }
        selections.restore(&self.after);
        self.state = CommandState::Applied;
    }

    /// Reverse the changes and restore the `before` selections exactly
    pub fn undo(&mut self, document: &mut Document, selections: &mut SelectionSet) {
        debug_assert_eq!(self.state, CommandState::Applied);
        // Undoing in ascending order puts every change back at its own
        // pre-command index
        for change in &self.changes {
            document.remove_text(change.index, change.inserted_len());
            document.insert_text(change.index, &change.removed);
        }
        selections.restore(&self.before);
        self.state = CommandState::Undone;
    }
}

#[cfg(test)]
mod tests;
