/// Bounded linear undo/redo history of reversible actions.
///
/// Provides a `HistoryEngine` that records caller-supplied actions, each
/// carrying an `apply` and a `revert` effect, and navigates back and forth
/// through them. The log is capped; the oldest actions are evicted once the
/// cap is reached. `SharedHistory` wraps one engine for multi-threaded hosts.
pub mod action;
pub mod config;
pub mod engine;
pub mod shared;
pub mod status;

pub use action::{Action, Effect};
pub use config::{HistoryConfig, DEFAULT_MAX_HISTORY_SIZE};
pub use engine::HistoryEngine;
pub use shared::SharedHistory;
pub use status::HistoryStatus;
