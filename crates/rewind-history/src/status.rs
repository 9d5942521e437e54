/// Serializable snapshot of the history state for UI rendering.
use serde::{Deserialize, Serialize};

/// Everything an undo/redo affordance needs to render itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    /// 0-based cursor, `-1` when nothing is applied.
    pub position: isize,
    pub size: usize,
    /// Label of the action the next undo would revert.
    pub undo_label: Option<String>,
    /// Label of the action the next redo would apply.
    pub redo_label: Option<String>,
}

impl HistoryStatus {
    /// Returns the 1-based `(current, total)` pair shown in status bars.
    ///
    /// `(0, n)` means every action has been undone. Positions below `-1`
    /// are clamped to `0`.
    pub fn display_position(&self) -> (usize, usize) {
        let current = usize::try_from(self.position.saturating_add(1)).unwrap_or(0);
        (current, self.size)
    }
}

impl std::fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (current, total) = self.display_position();
        write!(f, "{current}/{total}")?;
        if let Some(label) = &self.undo_label {
            write!(f, " | undo: {label}")?;
        }
        if let Some(label) = &self.redo_label {
            write!(f, " | redo: {label}")?;
        }
        Ok(())
    }
}
