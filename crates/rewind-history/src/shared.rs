/// Thread-safe handle around a single `HistoryEngine`.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use anyhow::{anyhow, Result};

use crate::action::Action;
use crate::config::HistoryConfig;
use crate::engine::HistoryEngine;
use crate::status::HistoryStatus;

/// Cloneable handle to one engine shared across threads.
///
/// Every operation holds the lock for its whole duration, so `record`,
/// `undo`, `redo` and `clear` never interleave. Effects run while the lock
/// is held and must not call back into the same handle.
pub struct SharedHistory<P = ()> {
    inner: Arc<Mutex<HistoryEngine<P>>>,
}

impl<P> Clone for SharedHistory<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> std::fmt::Debug for SharedHistory<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tuple = f.debug_tuple("SharedHistory");
        match self.inner.try_lock() {
            Ok(engine) => tuple.field(&*engine),
            Err(TryLockError::Poisoned(poisoned)) => tuple.field(&*poisoned.into_inner()),
            // Held by this thread or another; never block while formatting.
            Err(TryLockError::WouldBlock) => tuple.field(&format_args!("<locked>")),
        };
        tuple.finish()
    }
}

impl<P> Default for SharedHistory<P> {
    fn default() -> Self {
        Self::from_engine(HistoryEngine::default())
    }
}

impl<P> SharedHistory<P> {
    pub fn new(config: HistoryConfig) -> Self {
        Self::from_engine(HistoryEngine::new(config))
    }

    /// Wraps an existing engine.
    pub fn from_engine(engine: HistoryEngine<P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Locks for mutation. A poisoned lock means an effect panicked halfway
    /// through an operation, so the history can no longer be trusted.
    fn lock(&self) -> Result<MutexGuard<'_, HistoryEngine<P>>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("history lock is poisoned by a panicking effect"))
    }

    /// Locks for queries, which stay meaningful even after poisoning.
    fn read(&self) -> MutexGuard<'_, HistoryEngine<P>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`HistoryEngine::record`].
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn record(&self, action: Action<P>) -> Result<()> {
        self.lock()?.record(action);
        Ok(())
    }

    /// See [`HistoryEngine::undo`].
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned or the `revert` effect fails.
    pub fn undo(&self) -> Result<bool> {
        self.lock()?.undo()
    }

    /// See [`HistoryEngine::redo`].
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned or the `apply` effect fails.
    pub fn redo(&self) -> Result<bool> {
        self.lock()?.redo()
    }

    /// See [`HistoryEngine::clear`]. Clearing also recovers a poisoned lock,
    /// since it discards whatever state the panic left behind.
    pub fn clear(&self) {
        self.read().clear();
        self.inner.clear_poison();
    }

    pub fn can_undo(&self) -> bool {
        self.read().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.read().can_redo()
    }

    pub fn size(&self) -> usize {
        self.read().size()
    }

    pub fn position(&self) -> isize {
        self.read().position()
    }

    pub fn status(&self) -> HistoryStatus {
        self.read().status()
    }

    /// Runs `f` against the engine under a single lock.
    pub fn with<R>(&self, f: impl FnOnce(&HistoryEngine<P>) -> R) -> R {
        f(&self.read())
    }
}
