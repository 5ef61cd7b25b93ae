use thiserror::Error;

/// Client-side validation failures, detected before any write is issued. These
/// are the only errors an operation surfaces to its caller; persistence
/// failures are handled internally (log + recovery reload).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no authenticated user")]
    NoUser,
    #[error("no active board selected")]
    NoActiveBoard,
    #[error("board has no columns")]
    NoColumns,
    #[error("task title is required")]
    MissingTitle,
    #[error("a task titled \"{0}\" already exists in this workspace")]
    DuplicateTitle(String),
    #[error("task key \"{0}\" is already in use in this workspace")]
    DuplicateKey(String),
    #[error("a name is required")]
    MissingName,
    #[error("a project must keep at least one board")]
    LastBoard,
    #[error("\"{0}\" is not a palette color")]
    UnknownColor(String),
    #[error("project not found")]
    UnknownProject,
    #[error("board not found")]
    UnknownBoard,
    #[error("column not found")]
    UnknownColumn,
    #[error("task not found")]
    UnknownTask,
    #[error("checklist item not found")]
    UnknownChecklistItem,
}
