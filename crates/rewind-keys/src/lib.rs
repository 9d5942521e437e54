//! Keyboard shortcut adapter for undo/redo.
//!
//! Translates egui key events into [`HistoryCommand`]s and runs them on a
//! history engine. Shortcuts are ignored while a text field has keyboard
//! focus, and handled key events are removed from the input queue so no
//! other widget reacts to them.

use anyhow::Result;
use rewind_history::{HistoryEngine, SharedHistory};

/// A navigation command produced by a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCommand {
    Undo,
    Redo,
}

impl HistoryCommand {
    /// Runs the command. Returns whether the cursor moved.
    ///
    /// # Errors
    ///
    /// Propagates a failing `apply`/`revert` effect.
    pub fn run<P>(self, engine: &mut HistoryEngine<P>) -> Result<bool> {
        match self {
            Self::Undo => engine.undo(),
            Self::Redo => engine.redo(),
        }
    }

    /// Runs the command on a shared handle.
    ///
    /// # Errors
    ///
    /// Propagates a failing effect or a poisoned lock.
    pub fn run_shared<P>(self, history: &SharedHistory<P>) -> Result<bool> {
        match self {
            Self::Undo => history.undo(),
            Self::Redo => history.redo(),
        }
    }
}

/// A key pressed together with the platform's primary modifier
/// (Ctrl, or Cmd on macOS).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub key: egui::Key,
    pub shift: bool,
}

impl Shortcut {
    pub const fn primary(key: egui::Key) -> Self {
        Self { key, shift: false }
    }

    pub const fn primary_shift(key: egui::Key) -> Self {
        Self { key, shift: true }
    }

    fn matches(&self, key: egui::Key, modifiers: egui::Modifiers) -> bool {
        let primary = modifiers.ctrl || modifiers.command || modifiers.mac_cmd;
        primary && !modifiers.alt && modifiers.shift == self.shift && key == self.key
    }
}

/// The undo and redo key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcuts {
    pub undo: Shortcut,
    pub redo: Shortcut,
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            undo: Shortcut::primary(egui::Key::Z),
            redo: Shortcut::primary(egui::Key::Y),
        }
    }
}

impl Shortcuts {
    fn command_for(&self, key: egui::Key, modifiers: egui::Modifiers) -> Option<HistoryCommand> {
        if self.undo.matches(key, modifiers) {
            Some(HistoryCommand::Undo)
        } else if self.redo.matches(key, modifiers) {
            Some(HistoryCommand::Redo)
        } else {
            None
        }
    }

    /// Removes every event bound to undo/redo from `events` and returns the
    /// command of the first fresh key press.
    ///
    /// Auto-repeat presses and releases are swallowed without producing a
    /// command, so holding the keys down does not rewind the whole history.
    pub fn take_command(&self, events: &mut Vec<egui::Event>) -> Option<HistoryCommand> {
        let mut command = None;
        events.retain(|event| {
            let egui::Event::Key {
                key,
                pressed,
                repeat,
                modifiers,
                ..
            } = event
            else {
                return true;
            };
            let Some(bound) = self.command_for(*key, *modifiers) else {
                return true;
            };
            if *pressed && !*repeat && command.is_none() {
                command = Some(bound);
            }
            false
        });
        command
    }
}

/// Handles undo/redo shortcuts for one frame.
///
/// Does nothing while a text field has keyboard focus, since the field
/// handles its own editing history.
///
/// # Errors
///
/// Propagates a failing `apply`/`revert` effect.
pub fn dispatch<P>(
    ctx: &egui::Context,
    shortcuts: &Shortcuts,
    engine: &mut HistoryEngine<P>,
) -> Result<Option<HistoryCommand>> {
    if ctx.wants_keyboard_input() {
        return Ok(None);
    }
    let Some(command) = ctx.input_mut(|i| shortcuts.take_command(&mut i.events)) else {
        return Ok(None);
    };

    if !command.run(engine)? {
        tracing::debug!("{command:?} shortcut had nothing to act on");
    }
    Ok(Some(command))
}
