//! Controller - one editing session over a document.
//!
//! Owns the document, the selections and the history. Edits go through
//! [`Controller::execute`], which plans a [`Command`], decides whether it
//! opens a new undo step and applies it. Movement and selection changes are
//! not recorded; they only close the current undo step.

mod moves;

use crate::command::{Clock, Command, CommandKind, CommandType, History, MonotonicClock};
use crate::config::CoreConfig;
use crate::selection::SelectionSet;
use crate::text::{Document, StyleRange};
use crate::tracing::CaretSnapshot;

pub struct Controller {
    document: Document,
    selections: SelectionSet,
    history: History,
    config: CoreConfig,
    clock: Box<dyn Clock>,
    /// Type of the command that opened the current undo step
    last_type: Option<CommandType>,
    /// Time of the last executed command; `None` forces a new step
    last_time: Option<u64>,
    readonly: bool,
    changed: bool,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("chars", &self.document.char_count())
            .field("lines", &self.document.line_count())
            .field("selections", &self.selections)
            .field("history", &self.history.len())
            .field("last_type", &self.last_type)
            .field("readonly", &self.readonly)
            .finish()
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl Controller {
    pub fn new(config: CoreConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }

    /// Session driven by an explicit time source
    pub fn with_clock(config: CoreConfig, clock: impl Clock + 'static) -> Self {
        Self {
            document: Document::new(&config),
            selections: SelectionSet::new(),
            history: History::with_limit(config.history_limit),
            config,
            clock: Box::new(clock),
            last_type: None,
            last_time: None,
            readonly: false,
            changed: false,
        }
    }

    /// Replace the content, forget history and treat the text as saved
    pub fn init_text(&mut self, text: &str) {
        self.document.set_text(text);
        self.selections = SelectionSet::new();
        self.history.reset();
        self.history.mark_saved();
        self.reset_grouping();
        self.changed = true;
        tracing::debug!(
            chars = self.document.char_count(),
            lines = self.document.line_count(),
            "text initialized"
        );
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selections(&self) -> &SelectionSet {
        &self.selections
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }

    /// Enable, change or disable word wrap
    pub fn set_wrap_width(&mut self, width: Option<usize>) {
        self.document.set_wrap_width(width);
        self.config.wrap_width = self.document.wrap_width();
        for selection in self.selections.iter_mut() {
            let (pos, wrap_pos) = self.document.preferred_pos(selection.caret);
            selection.set_preferred(pos, wrap_pos);
        }
    }

    pub fn set_style_range(&mut self, range: StyleRange) {
        self.document.set_style_range(range);
    }

    pub fn set_style_ranges(&mut self, ranges: &[StyleRange]) {
        for range in ranges {
            self.document.set_style_range(*range);
        }
    }

    // =========================================================================
    // Execution and history
    // =========================================================================

    /// Run a command at the clock's current time. False when vetoed.
    pub fn execute(&mut self, kind: CommandKind) -> bool {
        let now = self.clock.now_ms();
        self.execute_at(kind, now)
    }

    /// Run a command at time `now` (milliseconds). False when vetoed; a
    /// vetoed command leaves text, selections, history and grouping as they
    /// were.
    pub fn execute_at(&mut self, kind: CommandKind, now: u64) -> bool {
        let command_type = kind.command_type();
        if self.readonly && command_type.changes_text() {
            tracing::debug!(kind = ?command_type, "readonly, command rejected");
            return false;
        }

        let mut command = Command::new(kind);
        if !command.init(&self.document, &self.selections, &self.config) {
            return false;
        }

        if self.starts_group(command_type, now) {
            self.history.mark_last();
            self.last_type = Some(command_type);
            tracing::debug!(kind = ?command_type, now, "new undo step");
        }
        self.last_time = Some(now);

        command.redo(&mut self.document, &mut self.selections);
        tracing::debug!(
            kind = ?command_type,
            changes = command.changes().len(),
            selections = self.selections.len(),
            "command executed"
        );
        self.history.push(command);
        self.changed = true;
        true
    }

    fn starts_group(&self, command_type: CommandType, now: u64) -> bool {
        let agnostic = command_type.type_agnostic()
            || self.last_type.is_some_and(CommandType::type_agnostic);
        if self.last_type != Some(command_type) && !agnostic {
            return true;
        }
        self.last_time
            .map_or(true, |last| now.saturating_sub(last) > self.config.group_idle_ms)
    }

    /// The next command opens a new undo step
    fn reset_grouping(&mut self) {
        self.last_type = None;
        self.last_time = None;
    }

    /// Undo one step. False if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.reset_grouping();
        let before = tracing::enabled!(tracing::Level::DEBUG).then(|| self.caret_snapshot());
        let mut undone = 0;
        while let Some(command) = self.history.undo_command() {
            command.undo(&mut self.document, &mut self.selections);
            undone += 1;
            if self.history.peek_undo().map_or(true, Command::is_marked) {
                break;
            }
        }
        if undone > 0 {
            let carets = before.and_then(|before| before.diff(&self.caret_snapshot()));
            tracing::debug!(
                commands = undone,
                carets = carets.as_deref().unwrap_or("unchanged"),
                "undo"
            );
            self.changed = true;
        }
        undone > 0
    }

    /// Redo one step. False if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.reset_grouping();
        let before = tracing::enabled!(tracing::Level::DEBUG).then(|| self.caret_snapshot());
        let mut redone = 0;
        while let Some(command) = self.history.redo_command() {
            command.redo(&mut self.document, &mut self.selections);
            redone += 1;
            if command.is_marked() {
                break;
            }
        }
        if redone > 0 {
            let carets = before.and_then(|before| before.diff(&self.caret_snapshot()));
            tracing::debug!(
                commands = redone,
                carets = carets.as_deref().unwrap_or("unchanged"),
                "redo"
            );
            self.changed = true;
        }
        redone > 0
    }

    fn caret_snapshot(&self) -> CaretSnapshot {
        CaretSnapshot::capture(&self.document, &self.selections)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.history.is_changed()
    }

    /// True once after the text or history changed
    pub fn take_change_notification(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    // =========================================================================
    // Editing shortcuts
    // =========================================================================

    /// Type `text` at every selection; a lone tab becomes spaces when
    /// configured
    pub fn insert_text(&mut self, text: &str) -> bool {
        let text = if self.config.spaces_instead_tabs && text == "\t" {
            self.config.indent_unit()
        } else {
            text.to_string()
        };
        self.execute(CommandKind::insert(text))
    }

    /// Break every line at its selection, carrying over the leading
    /// indentation when the caret is past it
    pub fn insert_line_break(&mut self) -> bool {
        self.selections.join();
        let line_break = self.config.line_break.as_str();
        let texts = self
            .selections
            .iter()
            .map(|selection| {
                let place = self.document.place_of(selection.left());
                let line = self.document.line(place.line);
                let spaces = line.first_spaces();
                let indent: String = if place.column >= spaces {
                    line.chars().take(spaces).map(|ch| ch.c).collect()
                } else {
                    String::new()
                };
                format!("{line_break}{indent}")
            })
            .collect();
        self.execute(CommandKind::InsertText {
            text: String::new(),
            per_selection: Some(texts),
            select_inserted: false,
        })
    }

    pub fn backspace(&mut self) -> bool {
        self.execute(CommandKind::Backspace)
    }

    pub fn delete(&mut self) -> bool {
        self.execute(CommandKind::Delete)
    }

    pub fn erase_selection(&mut self) -> bool {
        self.execute(CommandKind::EraseSelection)
    }

    pub fn remove_word_left(&mut self) -> bool {
        self.execute(CommandKind::RemoveWord { left: true })
    }

    pub fn remove_word_right(&mut self) -> bool {
        self.execute(CommandKind::RemoveWord { left: false })
    }

    pub fn shift_left(&mut self) -> bool {
        self.execute(CommandKind::Shift { left: true })
    }

    pub fn shift_right(&mut self) -> bool {
        self.execute(CommandKind::Shift { left: false })
    }

    pub fn change_case(&mut self, upper: bool) -> bool {
        self.execute(CommandKind::ChangeCase { upper })
    }

    pub fn move_line_up(&mut self) -> bool {
        self.execute(CommandKind::MoveLine { up: true })
    }

    pub fn move_line_down(&mut self) -> bool {
        self.execute(CommandKind::MoveLine { up: false })
    }

    pub fn replace_char(&mut self, ch: char) -> bool {
        self.execute(CommandKind::ReplaceChar { ch })
    }

    pub fn fix_line_breaks(&mut self) -> bool {
        self.execute(CommandKind::FixLineBreaks)
    }

    pub fn save_positions(&mut self) -> bool {
        self.execute(CommandKind::SavePositions)
    }
}
