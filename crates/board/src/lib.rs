//! In-process state manager for the kanban task board: an in-memory mirror of
//! remote project/board/column/task state, optimistic local mutations with
//! reload-based reconciliation, and fractional-index ordering for
//! drag-and-drop.

pub mod error;
mod loader;
pub mod manager;
pub mod ordering;
pub mod state;

pub use error::ValidationError;
pub use manager::{BoardManager, NewTaskInput};
pub use state::WorkspaceState;
