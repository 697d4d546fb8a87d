use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Completion state of a chore.
///
/// The states form a cycle, `Blank -> Done -> Paused -> NotDone -> Blank`,
/// which is what [`ChoreState::next`] walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChoreState {
    /// Not done yet; an unticked box.
    #[default]
    Blank,
    /// Completed.
    Done,
    /// Not done, but counted as complete (the worker could not do it and
    /// covered it beforehand).
    Paused,
    /// Neglected; too late to do it now.
    NotDone,
}

impl ChoreState {
    pub const ALL: [ChoreState; 4] = [
        ChoreState::Blank,
        ChoreState::Done,
        ChoreState::Paused,
        ChoreState::NotDone,
    ];

    pub fn next(self) -> Self {
        match self {
            ChoreState::Blank => ChoreState::Done,
            ChoreState::Done => ChoreState::Paused,
            ChoreState::Paused => ChoreState::NotDone,
            ChoreState::NotDone => ChoreState::Blank,
        }
    }

    /// Entering one of these states stamps the chore's completion time.
    pub fn counts_as_complete(self) -> bool {
        matches!(self, ChoreState::Done | ChoreState::Paused)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChoreState::Blank => "BLANK",
            ChoreState::Done => "DONE",
            ChoreState::Paused => "PAUSED",
            ChoreState::NotDone => "NOTDONE",
        }
    }

    /// Numeric codes used by older chore files.
    pub fn from_legacy_code(code: i64) -> Option<Self> {
        match code {
            2 => Some(ChoreState::Blank),
            4 => Some(ChoreState::Done),
            8 => Some(ChoreState::Paused),
            16 => Some(ChoreState::NotDone),
            _ => None,
        }
    }
}

impl fmt::Display for ChoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChoreState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(['_', ' '], "").as_str() {
            "BLANK" => Ok(ChoreState::Blank),
            "DONE" => Ok(ChoreState::Done),
            "PAUSED" => Ok(ChoreState::Paused),
            "NOTDONE" => Ok(ChoreState::NotDone),
            other => Err(format!("unknown chore state '{other}'")),
        }
    }
}
