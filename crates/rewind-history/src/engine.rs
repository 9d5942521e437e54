/// Bounded linear undo/redo history.
///
/// The engine keeps an ordered log of actions and a cursor marking the
/// most recently applied one. Everything up to the cursor is applied,
/// everything after it can be redone.
use std::collections::VecDeque;

use anyhow::Result;

use crate::action::Action;
use crate::config::HistoryConfig;
use crate::status::HistoryStatus;

/// Records actions and navigates backward and forward through them.
///
/// `record` is bookkeeping only: the caller has already performed the
/// change. `undo` and `redo` are the only operations that run stored
/// effects.
pub struct HistoryEngine<P = ()> {
    /// Recorded actions, oldest first.
    log: VecDeque<Action<P>>,
    /// Number of applied actions. The cursor is `applied - 1`.
    applied: usize,
    /// Upper bound on `log.len()`.
    max_size: usize,
}

impl<P> std::fmt::Debug for HistoryEngine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryEngine")
            .field("size", &self.log.len())
            .field("position", &self.position())
            .field("max_size", &self.max_size)
            .finish()
    }
}

impl<P> Default for HistoryEngine<P> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<P> HistoryEngine<P> {
    /// Creates an empty engine bounded by `config.max_history_size`.
    pub fn new(mut config: HistoryConfig) -> Self {
        config.sanitize();
        Self {
            log: VecDeque::new(),
            applied: 0,
            max_size: config.max_history_size,
        }
    }

    /// Creates an empty engine holding at most `max_history_size` actions.
    pub fn with_max_size(max_history_size: usize) -> Self {
        Self::new(HistoryConfig::new(max_history_size))
    }

    /// Records an action that has already been applied by the caller.
    ///
    /// Any undone actions past the cursor are discarded first. If the log
    /// then exceeds the bound, the oldest actions are evicted. Neither
    /// discarded nor evicted actions have their effects invoked.
    pub fn record(&mut self, action: Action<P>) {
        let discarded = self.log.len() - self.applied;
        if discarded > 0 {
            self.log.truncate(self.applied);
            tracing::debug!("Discarded {discarded} undone action(s) from the redo tail");
        }

        tracing::debug!("Recording '{}' ({})", action.label(), action.kind());
        self.log.push_back(action);

        if self.log.len() > self.max_size {
            let excess = self.log.len() - self.max_size;
            self.log.drain(..excess);
            tracing::debug!("Evicted {excess} oldest action(s), history is full");
        }

        self.applied = self.log.len();
    }

    /// Reverts the action at the cursor and moves the cursor back one step.
    ///
    /// Returns `Ok(false)` without side effects if there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns the error of a failing `revert` effect unchanged. The cursor
    /// does not move in that case.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(index) = self.applied.checked_sub(1) else {
            return Ok(false);
        };

        let action = &mut self.log[index];
        tracing::debug!("Undoing '{}'", action.label());
        (action.revert)()?;
        self.applied = index;
        Ok(true)
    }

    /// Applies the action after the cursor and moves the cursor forward.
    ///
    /// Returns `Ok(false)` without side effects if there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns the error of a failing `apply` effect unchanged. The cursor
    /// does not move in that case.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(action) = self.log.get_mut(self.applied) else {
            return Ok(false);
        };

        tracing::debug!("Redoing '{}'", action.label());
        (action.apply)()?;
        self.applied += 1;
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.log.len()
    }

    /// Number of recorded actions.
    pub fn size(&self) -> usize {
        self.log.len()
    }

    /// Index of the most recently applied action, `-1` if none.
    pub fn position(&self) -> isize {
        self.applied as isize - 1
    }

    /// Configured bound on `size()`.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Drops all history without invoking any effect.
    ///
    /// The caller is responsible for host state that was applied by
    /// actions that are now unreachable.
    pub fn clear(&mut self) {
        tracing::debug!("Clearing {} action(s) from history", self.log.len());
        self.log.clear();
        self.applied = 0;
    }

    /// Label of the action the next `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        let index = self.applied.checked_sub(1)?;
        self.log.get(index).map(Action::label)
    }

    /// Label of the action the next `redo` would apply.
    pub fn redo_label(&self) -> Option<&str> {
        self.log.get(self.applied).map(Action::label)
    }

    /// Recorded actions in log order, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &Action<P>> + '_ {
        self.log.iter()
    }

    /// Action at log `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Action<P>> {
        self.log.get(index)
    }

    /// Snapshot of the state for UI rendering.
    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            position: self.position(),
            size: self.size(),
            undo_label: self.undo_label().map(str::to_owned),
            redo_label: self.redo_label().map(str::to_owned),
        }
    }
}
