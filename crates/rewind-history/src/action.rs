/// Reversible actions and their construction helpers.
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{anyhow, Result};

/// A zero-argument effect stored on an action.
///
/// Effects are opaque to the engine. An `Err` is handed back to whoever
/// called `undo`/`redo`.
pub type Effect = Box<dyn FnMut() -> Result<()> + Send>;

/// A single reversible change that can be undone/redone.
///
/// `apply` performs the forward transition and `revert` the backward one.
/// The two must be true inverses of each other; the engine has no way to
/// check that.
pub struct Action<P = ()> {
    kind: String,
    label: String,
    pub(crate) apply: Effect,
    pub(crate) revert: Effect,
    payload: P,
    recorded_at: Instant,
}

impl<P> std::fmt::Debug for Action<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("recorded_at", &self.recorded_at)
            .finish_non_exhaustive()
    }
}

impl Action<()> {
    /// Creates an action without a payload.
    pub fn new<A, R>(kind: impl Into<String>, label: impl Into<String>, apply: A, revert: R) -> Self
    where
        A: FnMut() -> Result<()> + Send + 'static,
        R: FnMut() -> Result<()> + Send + 'static,
    {
        Self::with_payload(kind, label, (), apply, revert)
    }
}

impl<P> Action<P> {
    /// Creates an action carrying opaque caller data.
    pub fn with_payload<A, R>(
        kind: impl Into<String>,
        label: impl Into<String>,
        payload: P,
        apply: A,
        revert: R,
    ) -> Self
    where
        A: FnMut() -> Result<()> + Send + 'static,
        R: FnMut() -> Result<()> + Send + 'static,
    {
        Self {
            kind: kind.into(),
            label: label.into(),
            apply: Box::new(apply),
            revert: Box::new(revert),
            payload,
            recorded_at: Instant::now(),
        }
    }

    /// Category tag supplied by the caller.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Human-readable description for menus and tooltips.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// When the action was created. Display only; log order wins.
    pub fn recorded_at(&self) -> Instant {
        self.recorded_at
    }
}

impl<T> Action<(T, T)>
where
    T: Clone + Send + 'static,
{
    /// Builds the common "restore previous value / apply next value" pair.
    ///
    /// `revert` writes `previous` back into `target`, `apply` writes `next`.
    /// The payload records the `(previous, next)` values for display.
    /// Call this after `target` already holds `next`.
    pub fn set_value(
        kind: impl Into<String>,
        label: impl Into<String>,
        target: Arc<Mutex<T>>,
        previous: T,
        next: T,
    ) -> Self {
        let apply_target = Arc::clone(&target);
        let apply_value = next.clone();
        let revert_value = previous.clone();

        Self::with_payload(
            kind,
            label,
            (previous, next),
            move || write_value(&apply_target, apply_value.clone()),
            move || write_value(&target, revert_value.clone()),
        )
    }
}

fn write_value<T>(target: &Mutex<T>, value: T) -> Result<()> {
    let mut guard = target
        .lock()
        .map_err(|_| anyhow!("value target mutex is poisoned"))?;
    *guard = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_action_keeps_kind_and_label() {
        let action = Action::new("rename", "Rename layer", || Ok(()), || Ok(()));
        assert_eq!(action.kind(), "rename");
        assert_eq!(action.label(), "Rename layer");
    }

    #[test]
    fn test_with_payload_keeps_payload_untouched() {
        let action = Action::with_payload("move", "Move", vec![1, 2, 3], || Ok(()), || Ok(()));
        assert_eq!(action.payload(), &vec![1, 2, 3]);
    }

    #[test]
    fn test_recorded_at_is_monotonic() {
        let first = Action::new("a", "a", || Ok(()), || Ok(()));
        let second = Action::new("b", "b", || Ok(()), || Ok(()));
        assert!(second.recorded_at() >= first.recorded_at());
    }

    #[test]
    fn test_effects_are_invoked_on_demand_only() {
        let hits = Arc::new(Mutex::new(0));
        let h = Arc::clone(&hits);
        let mut action = Action::new(
            "count",
            "Count",
            move || {
                *h.lock().unwrap() += 1;
                Ok(())
            },
            || Ok(()),
        );
        assert_eq!(*hits.lock().unwrap(), 0);
        (action.apply)().expect("apply");
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_set_value_swaps_between_previous_and_next() {
        let target = Arc::new(Mutex::new(String::from("after")));
        let mut action = Action::set_value(
            "title",
            "Change title",
            Arc::clone(&target),
            String::from("before"),
            String::from("after"),
        );

        (action.revert)().expect("revert");
        assert_eq!(*target.lock().unwrap(), "before");
        (action.apply)().expect("apply");
        assert_eq!(*target.lock().unwrap(), "after");
        assert_eq!(action.payload().0, "before");
        assert_eq!(action.payload().1, "after");
    }

    #[test]
    fn test_set_value_reports_poisoned_target() {
        let target = Arc::new(Mutex::new(1));
        let poison = Arc::clone(&target);
        let _ = std::thread::spawn(move || {
            let _guard = poison.lock().unwrap();
            panic!("poison the mutex");
        })
        .join();

        let mut action = Action::set_value("n", "Set n", target, 0, 1);
        assert!((action.revert)().is_err());
    }

    #[test]
    fn test_debug_omits_effects() {
        let action = Action::new("k", "Label", || Ok(()), || Ok(()));
        let out = format!("{action:?}");
        assert!(out.contains("Label"));
        assert!(!out.contains("apply"));
    }
}
