//! Debug state dump for development diagnostics
//!
//! Serializes a snapshot of an editing session to JSON: document shape,
//! selections, history and configuration.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::command::{CommandState, CommandType};
use crate::config::CoreConfig;
use crate::controller::Controller;

#[derive(Debug, Serialize)]
pub struct StateDump {
    pub timestamp: String,
    pub document: DocumentDump,
    pub selections: Vec<SelectionDump>,
    pub primary_selection: usize,
    pub history: HistoryDump,
    pub readonly: bool,
    pub config: CoreConfig,
}

#[derive(Debug, Serialize)]
pub struct DocumentDump {
    pub line_count: usize,
    pub char_count: usize,
    pub line_blocks: usize,
    pub rows_count: usize,
    pub wrap_width: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SelectionDump {
    pub anchor_line: usize,
    pub anchor_column: usize,
    pub caret_line: usize,
    pub caret_column: usize,
    pub preferred_pos: usize,
    pub wrap_preferred_pos: usize,
    pub is_empty: bool,
}

#[derive(Debug, Serialize)]
pub struct HistoryDump {
    pub commands: usize,
    pub head: usize,
    pub revision: u64,
    pub has_unsaved_changes: bool,
    pub entries: Vec<CommandDump>,
}

#[derive(Debug, Serialize)]
pub struct CommandDump {
    pub kind: CommandType,
    pub state: CommandState,
    pub marked: bool,
    pub changes: usize,
}

impl StateDump {
    pub fn from_controller(controller: &Controller) -> Self {
        let document = controller.document();
        let selections = controller.selections();
        let history = controller.history();

        Self {
            timestamp: timestamp(),
            document: DocumentDump {
                line_count: document.line_count(),
                char_count: document.char_count(),
                line_blocks: document.line_blocks_count(),
                rows_count: document.rows_count(),
                wrap_width: document.wrap_width(),
            },
            selections: selections
                .iter()
                .map(|s| {
                    let anchor = document.place_of(s.anchor);
                    let caret = document.place_of(s.caret);
                    SelectionDump {
                        anchor_line: anchor.line,
                        anchor_column: anchor.column,
                        caret_line: caret.line,
                        caret_column: caret.column,
                        preferred_pos: s.preferred_pos,
                        wrap_preferred_pos: s.wrap_preferred_pos,
                        is_empty: s.is_empty(),
                    }
                })
                .collect(),
            primary_selection: selections.primary_index(),
            history: HistoryDump {
                commands: history.len(),
                head: history.head(),
                revision: history.revision(),
                has_unsaved_changes: history.is_changed(),
                entries: history
                    .iter()
                    .map(|c| CommandDump {
                        kind: c.command_type(),
                        state: c.state(),
                        marked: c.is_marked(),
                        changes: c.changes().len(),
                    })
                    .collect(),
            },
            readonly: controller.is_readonly(),
            config: controller.config().clone(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    /// Write `<dir>/<timestamp>-state-dump.json`, creating `dir` if needed
    pub fn save_to_dir(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}-state-dump.json", self.timestamp));
        std::fs::write(&path, self.to_json())?;
        Ok(path)
    }
}

/// UTC `YYYY-MM-DD-HHMMSS`
fn timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let secs_today = secs % 86400;
    let (year, month, day) = civil_from_days((secs / 86400) as i64);

    format!(
        "{:04}-{:02}-{:02}-{:02}{:02}{:02}",
        year,
        month,
        day,
        secs_today / 3600,
        (secs_today % 3600) / 60,
        secs_today % 60
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian date
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let days = days + 719468;
    let era = days.div_euclid(146097);
    let day_of_era = days.rem_euclid(146097) as u32;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = year_of_era as i64 + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_civil_from_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(11016), (2000, 2, 29));
        assert_eq!(civil_from_days(19723), (2024, 1, 1));
    }

    #[test]
    fn test_dump_describes_session() {
        let mut controller = Controller::default();
        controller.init_text("ab\ncd");
        controller.insert_text("x");
        controller.put_new_cursor(crate::text::Place::new(1, 1));

        let dump = StateDump::from_controller(&controller);
        assert_eq!(dump.document.line_count, 2);
        assert_eq!(dump.document.char_count, 6);
        assert_eq!(dump.selections.len(), 2);
        assert_eq!(dump.primary_selection, 1);
        assert_eq!(dump.history.entries.len(), 1);
        assert!(dump.history.has_unsaved_changes);

        let json: serde_json::Value = serde_json::from_str(&dump.to_json()).unwrap();
        assert_eq!(json["selections"][1]["caret_line"], 1);
        assert_eq!(json["history"]["entries"][0]["kind"], "InsertText");
        assert_eq!(json["config"]["line_break"], "lf");
    }

    #[test]
    fn test_save_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let dump = StateDump::from_controller(&Controller::default());
        let path = dump.save_to_dir(&dir.path().join("dumps")).unwrap();
        assert!(path.exists());
        assert!(std::fs::read_to_string(path).unwrap().contains("\"char_count\": 0"));
    }
}
