//! Planning: turning a command kind plus the current selections into a list
//! of text changes and the selections that result from them.
//!
//! Selections are visited in document order. Every plan records changes in
//! pre-command coordinates and positions the resulting selections by
//! folding the length delta of the changes before them.

use std::collections::BTreeSet;

use super::{CommandKind, TextChange};
use crate::config::CoreConfig;
use crate::selection::{Selection, SelectionSet};
use crate::text::{words, Document};
use crate::util::is_line_break;

pub(super) struct Plan {
    pub changes: Vec<TextChange>,
    pub selections: SelectionSet,
}

pub(super) fn plan(
    kind: &CommandKind,
    document: &Document,
    selections: &SelectionSet,
    config: &CoreConfig,
) -> Option<Plan> {
    let mut set = selections.clone();
    set.join();
    match kind {
        CommandKind::InsertText {
            text,
            per_selection,
            select_inserted,
        } => {
            if per_selection.as_ref().is_some_and(|texts| texts.len() != set.len()) {
                return None;
            }
            replace_each(document, &set, |i, selection| {
                let text = match per_selection {
                    Some(texts) => texts[i].clone(),
                    None => text.clone(),
                };
                let placement = if *select_inserted {
                    Placement::Select { reversed: false }
                } else {
                    Placement::AfterText
                };
                Some(Replacement::new(
                    selection.left(),
                    selection.right(),
                    text,
                    placement,
                ))
            })
        }
        CommandKind::EraseSelection => replace_each(document, &set, |_, selection| {
            (!selection.is_empty()).then(|| Replacement::erase(selection.left(), selection.right()))
        }),
        CommandKind::Backspace => replace_each(document, &set, |_, selection| {
            if !selection.is_empty() {
                return Some(Replacement::erase(selection.left(), selection.right()));
            }
            let caret = selection.caret;
            if caret == 0 {
                return None;
            }
            let crlf = caret >= 2
                && document.char_at(caret - 1) == Some('\n')
                && document.char_at(caret - 2) == Some('\r');
            let step = if crlf { 2 } else { 1 };
            Some(Replacement::erase(caret - step, caret))
        }),
        CommandKind::Delete => replace_each(document, &set, |_, selection| {
            if !selection.is_empty() {
                return Some(Replacement::erase(selection.left(), selection.right()));
            }
            let caret = selection.caret;
            if caret >= document.char_count() {
                return None;
            }
            let crlf = document.char_at(caret) == Some('\r')
                && document.char_at(caret + 1) == Some('\n');
            let step = if crlf { 2 } else { 1 };
            Some(Replacement::erase(caret, caret + step))
        }),
        CommandKind::RemoveWord { left } => replace_each(document, &set, |_, selection| {
            if !selection.is_empty() {
                return Some(Replacement::erase(selection.left(), selection.right()));
            }
            let caret = selection.caret;
            let target = if *left {
                words::word_left(document, caret)
            } else {
                words::word_right(document, caret)
            };
            (target != caret).then(|| Replacement::erase(caret.min(target), caret.max(target)))
        }),
        CommandKind::ChangeCase { upper } => replace_each(document, &set, |_, selection| {
            if selection.is_empty() {
                return None;
            }
            let text = document.text_range(selection.left(), selection.count());
            let text = if *upper {
                text.to_uppercase()
            } else {
                text.to_lowercase()
            };
            Some(Replacement::new(
                selection.left(),
                selection.right(),
                text,
                Placement::Select {
                    reversed: selection.is_reversed(),
                },
            ))
        }),
        CommandKind::ReplaceChar { ch } => replace_each(document, &set, |_, selection| {
            if selection.is_empty() {
                let caret = selection.caret;
                let current = document.char_at(caret)?;
                if is_line_break(current) {
                    return None;
                }
                return Some(Replacement::new(
                    caret,
                    caret + 1,
                    ch.to_string(),
                    Placement::Start,
                ));
            }
            let text: String = document
                .text_range(selection.left(), selection.count())
                .chars()
                .map(|c| if is_line_break(c) { c } else { *ch })
                .collect();
            Some(Replacement::new(
                selection.left(),
                selection.right(),
                text,
                Placement::Start,
            ))
        }),
        CommandKind::Shift { left } => shift(document, &set, *left, config),
        CommandKind::MoveLine { up } => move_lines(document, &set, *up),
        CommandKind::FixLineBreaks => fix_line_breaks(document, &set, config),
        CommandKind::SavePositions => Some(Plan {
            changes: Vec::new(),
            selections: set,
        }),
    }
}

// =========================================================================
// Per-selection replacement
// =========================================================================

/// Where a selection ends up after its own replacement
#[derive(Debug, Clone, Copy)]
enum Placement {
    /// Collapsed after the inserted text
    AfterText,
    /// Collapsed at the replacement start
    Start,
    /// Selecting the inserted text
    Select { reversed: bool },
}

struct Replacement {
    left: usize,
    right: usize,
    text: String,
    placement: Placement,
}

impl Replacement {
    fn new(left: usize, right: usize, text: String, placement: Placement) -> Self {
        Self {
            left,
            right,
            text,
            placement,
        }
    }

    fn erase(left: usize, right: usize) -> Self {
        Self::new(left, right, String::new(), Placement::Start)
    }
}

/// Replace a range per selection, threading the cumulative delta.
///
/// Ranges are clipped so they never reach back into an earlier replacement.
/// Vetoes (returns `None`) when no text would change.
fn replace_each<F>(document: &Document, set: &SelectionSet, mut f: F) -> Option<Plan>
where
    F: FnMut(usize, &Selection) -> Option<Replacement>,
{
    let mut changes = Vec::new();
    let mut result = Vec::with_capacity(set.len());
    let mut delta: isize = 0;
    let mut prev_end = 0;

    for (i, selection) in set.iter().enumerate() {
        let mut next = *selection;
        match f(i, selection) {
            Some(replacement) => {
                let left = replacement.left.max(prev_end);
                let right = replacement.right.max(left);
                let removed = document.text_range(left, right - left);
                let inserted_len = replacement.text.chars().count();
                let new_left = left.saturating_add_signed(delta);
                match replacement.placement {
                    Placement::AfterText => next.move_caret(new_left + inserted_len, false),
                    Placement::Start => next.move_caret(new_left, false),
                    Placement::Select { reversed } => {
                        next.set_range(new_left, new_left + inserted_len, reversed)
                    }
                }
                delta += inserted_len as isize - (right - left) as isize;
                prev_end = right;
                if removed != replacement.text {
                    changes.push(TextChange {
                        index: left,
                        removed,
                        inserted: replacement.text,
                    });
                }
            }
            None => {
                next.caret = next.caret.saturating_add_signed(delta);
                next.anchor = next.anchor.saturating_add_signed(delta);
            }
        }
        result.push(next);
    }

    if changes.is_empty() {
        return None;
    }
    Some(Plan {
        changes,
        selections: SelectionSet::with_primary(result, set.primary_index()),
    })
}

// =========================================================================
// Line-based commands
// =========================================================================

/// Lines `[first, last]` touched by a selection. A multi-line selection
/// ending at column 0 does not touch its last line.
fn line_span(document: &Document, selection: &Selection) -> (usize, usize) {
    let first = document.place_of(selection.left()).line;
    let end = document.place_of(selection.right());
    let last = if !selection.is_empty() && end.line > first && end.column == 0 {
        end.line - 1
    } else {
        end.line
    };
    (first, last)
}

/// Where `pos` lands after `changes` (sorted, pre-command coordinates).
///
/// A position at a pure insertion point stays before the inserted text when
/// `stick_left`, otherwise moves after it. A position inside a replaced range
/// is clamped into the replacement.
fn map_index(changes: &[TextChange], pos: usize, stick_left: bool) -> usize {
    let mut delta: isize = 0;
    for change in changes {
        let removed = change.removed_len();
        let inserted = change.inserted_len();
        if pos < change.index {
            break;
        }
        if removed == 0 && pos == change.index {
            if stick_left {
                break;
            }
            delta += inserted as isize;
            continue;
        }
        if pos >= change.index + removed {
            delta += inserted as isize - removed as isize;
            continue;
        }
        let offset = (pos - change.index).min(inserted);
        return change.index.saturating_add_signed(delta) + offset;
    }
    pos.saturating_add_signed(delta)
}

fn map_selections(set: &SelectionSet, changes: &[TextChange]) -> SelectionSet {
    let mapped = set
        .iter()
        .map(|selection| {
            let mut next = *selection;
            let stick = |pos: usize| !selection.is_empty() && pos == selection.left();
            next.caret = map_index(changes, selection.caret, stick(selection.caret));
            next.anchor = map_index(changes, selection.anchor, stick(selection.anchor));
            next
        })
        .collect();
    SelectionSet::with_primary(mapped, set.primary_index())
}

fn shift(
    document: &Document,
    set: &SelectionSet,
    left: bool,
    config: &CoreConfig,
) -> Option<Plan> {
    let lines: BTreeSet<usize> = set
        .iter()
        .flat_map(|selection| {
            let (first, last) = line_span(document, selection);
            first..=last
        })
        .collect();
    let multi_line = lines.len() > 1;
    let indent = config.indent_unit();

    let mut changes = Vec::new();
    for &index in &lines {
        let line = document.line(index);
        let start = document.line_start(index);
        if left {
            let remove = if line.normal_count() > 0 && line.char_at(0) == '\t' {
                1
            } else {
                line.chars()
                    .take(config.tab_size)
                    .take_while(|ch| ch.c == ' ')
                    .count()
            };
            if remove > 0 {
                changes.push(TextChange {
                    index: start,
                    removed: document.text_range(start, remove),
                    inserted: String::new(),
                });
            }
        } else {
            if multi_line && line.normal_count() == 0 {
                continue;
            }
            changes.push(TextChange {
                index: start,
                removed: String::new(),
                inserted: indent.clone(),
            });
        }
    }

    if changes.is_empty() {
        return None;
    }
    let selections = map_selections(set, &changes);
    Some(Plan {
        changes,
        selections,
    })
}

fn move_lines(document: &Document, set: &SelectionSet, up: bool) -> Option<Plan> {
    // Line blocks, merged when they overlap or are adjacent
    let mut blocks: Vec<(usize, usize)> = Vec::new();
    for selection in set.iter() {
        let (first, last) = line_span(document, selection);
        match blocks.last_mut() {
            Some(block) if first <= block.1 + 1 => block.1 = block.1.max(last),
            _ => blocks.push((first, last)),
        }
    }

    let last_line = document.line_count() - 1;
    let at_edge = if up {
        blocks.first().is_some_and(|&(first, _)| first == 0)
    } else {
        blocks.last().is_some_and(|&(_, last)| last == last_line)
    };
    if at_edge {
        return None;
    }

    let mut changes = Vec::with_capacity(blocks.len());
    let mut offsets: Vec<(usize, usize, isize)> = Vec::with_capacity(blocks.len());
    for &(first, last) in &blocks {
        let block_start = document.line_start(first);
        let block_end = document.line_start(last + 1);
        let block_text = document.text_range(block_start, block_end - block_start);
        let block_break = document.line(last).line_break();
        let body = &block_text[..block_text.len() - block_break.len()];

        if up {
            let prev = document.line(first - 1);
            let prev_start = document.line_start(first - 1);
            let inserted = format!(
                "{body}{}{}{block_break}",
                prev.line_break(),
                prev.normal_text()
            );
            changes.push(TextChange {
                index: prev_start,
                removed: format!("{}{block_text}", prev.text()),
                inserted,
            });
            offsets.push((first, last, -((block_start - prev_start) as isize)));
        } else {
            let next = document.line(last + 1);
            let next_content = next.normal_text();
            let shift = next_content.chars().count() + block_break.chars().count();
            changes.push(TextChange {
                index: block_start,
                removed: format!("{block_text}{}", next.text()),
                inserted: format!("{next_content}{block_break}{body}{}", next.line_break()),
            });
            offsets.push((first, last, shift as isize));
        }
    }

    let max = document.char_count();
    let moved = set
        .iter()
        .map(|selection| {
            let (first, _) = line_span(document, selection);
            let offset = offsets
                .iter()
                .find(|&&(block_first, block_last, _)| block_first <= first && first <= block_last)
                .map_or(0, |&(_, _, offset)| offset);
            let mut next = *selection;
            next.caret = next.caret.saturating_add_signed(offset).min(max);
            next.anchor = next.anchor.saturating_add_signed(offset).min(max);
            next
        })
        .collect();

    Some(Plan {
        changes,
        selections: SelectionSet::with_primary(moved, set.primary_index()),
    })
}

fn fix_line_breaks(document: &Document, set: &SelectionSet, config: &CoreConfig) -> Option<Plan> {
    let target = config.line_break.as_str();
    let mut changes = Vec::new();
    let mut start = 0;
    for line in document.lines() {
        let line_break = line.line_break();
        if !line_break.is_empty() && line_break != target {
            changes.push(TextChange {
                index: start + line.normal_count(),
                removed: line_break.to_string(),
                inserted: target.to_string(),
            });
        }
        start += line.len();
    }
    if changes.is_empty() {
        return None;
    }
    let selections = map_selections(set, &changes);
    Some(Plan {
        changes,
        selections,
    })
}
