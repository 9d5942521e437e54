//! Line-oriented command interpreter over a single integer host value.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use rewind_history::{Action, HistoryConfig, HistoryEngine};

/// Outcome of one command line.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// Text to show the user.
    Output(String),
    /// The user asked to leave.
    Quit,
}

/// A host value plus the history of changes made to it.
pub struct Session {
    value: Arc<Mutex<i64>>,
    history: HistoryEngine<(i64, i64)>,
}

impl Session {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            value: Arc::new(Mutex::new(0)),
            history: HistoryEngine::new(config),
        }
    }

    pub fn value(&self) -> Result<i64> {
        self.value
            .lock()
            .map(|v| *v)
            .map_err(|_| anyhow!("host value mutex is poisoned"))
    }

    /// Parses and runs one command line.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands, malformed arguments, or a
    /// failing history effect.
    pub fn execute(&mut self, line: &str) -> Result<Reply> {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Ok(Reply::Output(String::new()));
        };
        let arg = parts.next();

        let output = match command {
            "set" => {
                let next = parse_arg(command, arg)?;
                self.change("set", format!("Set to {next}"), next)?
            }
            "add" => {
                let delta = parse_arg(command, arg)?;
                let next = self
                    .value()?
                    .checked_add(delta)
                    .ok_or_else(|| anyhow!("value would overflow"))?;
                self.change("add", format!("Add {delta}"), next)?
            }
            "undo" => {
                let moved = self.history.undo()?;
                self.navigate(moved, "Nothing to undo")?
            }
            "redo" => {
                let moved = self.history.redo()?;
                self.navigate(moved, "Nothing to redo")?
            }
            "clear" => {
                self.history.clear();
                "History cleared".to_string()
            }
            "status" => self.history.status().to_string(),
            "history" => self.render_history(),
            "value" => self.value()?.to_string(),
            "quit" | "exit" => return Ok(Reply::Quit),
            other => bail!("Unknown command '{other}'"),
        };
        Ok(Reply::Output(output))
    }

    /// Applies a new value, then records the change.
    fn change(&mut self, kind: &str, label: String, next: i64) -> Result<String> {
        let previous = {
            let mut value = self
                .value
                .lock()
                .map_err(|_| anyhow!("host value mutex is poisoned"))?;
            std::mem::replace(&mut *value, next)
        };
        self.history.record(Action::set_value(
            kind,
            label,
            Arc::clone(&self.value),
            previous,
            next,
        ));
        Ok(format!("{previous} -> {next}"))
    }

    fn navigate(&self, moved: bool, idle: &str) -> Result<String> {
        if moved {
            Ok(format!("value = {}", self.value()?))
        } else {
            Ok(idle.to_string())
        }
    }

    fn render_history(&self) -> String {
        if self.history.size() == 0 {
            return "(empty)".to_string();
        }
        let position = self.history.position();
        self.history
            .entries()
            .enumerate()
            .map(|(i, action)| {
                let marker = if i as isize == position { '>' } else { ' ' };
                let state = if i as isize <= position { "applied" } else { "undone" };
                format!("{marker} {:>3}  {:<16} [{state}]", i + 1, action.label())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_arg(command: &str, arg: Option<&str>) -> Result<i64> {
    let arg = arg.with_context(|| format!("'{command}' needs an integer argument"))?;
    arg.parse()
        .with_context(|| format!("'{arg}' is not a valid integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(session: &mut Session, line: &str) -> String {
        match session.execute(line).expect("command") {
            Reply::Output(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_set_undo_redo() {
        let mut session = Session::new(HistoryConfig::default());
        assert_eq!(output(&mut session, "set 5"), "0 -> 5");
        assert_eq!(output(&mut session, "add 3"), "5 -> 8");

        assert_eq!(output(&mut session, "undo"), "value = 5");
        assert_eq!(output(&mut session, "undo"), "value = 0");
        assert_eq!(output(&mut session, "undo"), "Nothing to undo");
        assert_eq!(output(&mut session, "redo"), "value = 5");
    }

    #[test]
    fn test_new_change_discards_redo() {
        let mut session = Session::new(HistoryConfig::default());
        output(&mut session, "set 1");
        output(&mut session, "set 2");
        output(&mut session, "undo");
        output(&mut session, "set 9");

        assert_eq!(output(&mut session, "redo"), "Nothing to redo");
        assert_eq!(output(&mut session, "status"), "2/2 | undo: Set to 9");
    }

    #[test]
    fn test_bound_from_config() {
        let mut session = Session::new(HistoryConfig::new(2));
        for n in 1..=4 {
            output(&mut session, &format!("set {n}"));
        }
        output(&mut session, "undo");
        output(&mut session, "undo");
        assert_eq!(output(&mut session, "undo"), "Nothing to undo");
        assert_eq!(session.value().unwrap(), 2);
    }

    #[test]
    fn test_history_listing_marks_cursor() {
        let mut session = Session::new(HistoryConfig::default());
        output(&mut session, "set 1");
        output(&mut session, "add 2");
        output(&mut session, "undo");

        let listing = output(&mut session, "history");
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('>'));
        assert!(lines[0].contains("Set to 1"));
        assert!(lines[1].contains("[undone]"));
    }

    #[test]
    fn test_clear_keeps_value() {
        let mut session = Session::new(HistoryConfig::default());
        output(&mut session, "set 7");
        assert_eq!(output(&mut session, "clear"), "History cleared");
        assert_eq!(output(&mut session, "value"), "7");
        assert_eq!(output(&mut session, "history"), "(empty)");
    }

    #[test]
    fn test_bad_input_is_an_error() {
        let mut session = Session::new(HistoryConfig::default());
        assert!(session.execute("set").is_err());
        assert!(session.execute("set abc").is_err());
        assert!(session.execute("jump").is_err());
    }

    #[test]
    fn test_quit_and_blank_lines() {
        let mut session = Session::new(HistoryConfig::default());
        assert_eq!(session.execute("quit").unwrap(), Reply::Quit);
        assert_eq!(session.execute("   ").unwrap(), Reply::Output(String::new()));
    }
}
