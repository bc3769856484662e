//! Linear command history with grouped undo steps

use super::Command;

const DEFAULT_LIMIT: usize = 1000;

/// Applied commands live below `head`, undone ones from `head` on.
///
/// A marked command closes its undo step. The newest command stays unmarked
/// while its step is still open.
#[derive(Debug, Clone)]
pub struct History {
    commands: Vec<Command>,
    head: usize,
    saved: Option<usize>,
    revision: u64,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    /// Keep at most `limit` commands; older steps are dropped whole
    pub fn with_limit(limit: usize) -> Self {
        Self {
            commands: Vec::new(),
            head: 0,
            saved: Some(0),
            revision: 0,
            limit: limit.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of applied commands
    pub fn head(&self) -> usize {
        self.head
    }

    /// Bumped on every push, undo and redo
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> + '_ {
        self.commands.iter()
    }

    /// Append an applied command, discarding everything that was undone
    pub fn push(&mut self, command: Command) {
        if self.head < self.commands.len() {
            self.commands.truncate(self.head);
            if self.saved.is_some_and(|saved| saved > self.head) {
                self.saved = None;
            }
        }
        self.commands.push(command);
        self.head += 1;
        self.revision += 1;
        self.trim();
    }

    /// Close the step ending with the newest applied command
    pub fn mark_last(&mut self) {
        if let Some(command) = self.head.checked_sub(1).and_then(|i| self.commands.get_mut(i)) {
            command.set_marked(true);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.head > 0
    }

    pub fn can_redo(&self) -> bool {
        self.head < self.commands.len()
    }

    pub fn peek_undo(&self) -> Option<&Command> {
        self.head.checked_sub(1).map(|i| &self.commands[i])
    }

    pub fn peek_redo(&self) -> Option<&Command> {
        self.commands.get(self.head)
    }

    /// Step `head` back and hand out the command to undo
    pub fn undo_command(&mut self) -> Option<&mut Command> {
        let index = self.head.checked_sub(1)?;
        self.head = index;
        self.revision += 1;
        self.commands.get_mut(index)
    }

    /// Step `head` forward and hand out the command to redo
    pub fn redo_command(&mut self) -> Option<&mut Command> {
        if self.head >= self.commands.len() {
            return None;
        }
        let index = self.head;
        self.head += 1;
        self.revision += 1;
        self.commands.get_mut(index)
    }

    pub fn mark_saved(&mut self) {
        self.saved = Some(self.head);
    }

    /// Whether the applied commands differ from the last save point
    pub fn is_changed(&self) -> bool {
        self.saved != Some(self.head)
    }

    /// Forget every command; the current state becomes the save point
    pub fn reset(&mut self) {
        self.commands.clear();
        self.head = 0;
        self.saved = Some(0);
        self.revision += 1;
    }

    fn trim(&mut self) {
        while self.commands.len() > self.limit {
            let Some(end) = self.commands[..self.head].iter().position(Command::is_marked) else {
                break;
            };
            let dropped = end + 1;
            self.commands.drain(..dropped);
            self.head -= dropped;
            self.saved = self.saved.and_then(|saved| saved.checked_sub(dropped));
            tracing::trace!(dropped, "trimmed history");
        }
    }
}
