//! Interface to the remote persistence collaborator. The board core only ever
//! talks to the hosted backend through this trait; implementations are free to
//! be HTTP clients, database pools, or in-memory test doubles.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        board::{BoardPatch, CreateBoard},
        column::{ColumnPatch, CreateColumn},
        project::CreateProject,
        task::{CreateTask, TaskOrder, TaskPatch},
    },
    rows::{BoardRow, ColumnRow, ProjectRow, TaskRow},
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violation on {field}")]
    UniqueViolation { field: String },
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("persistence request failed: {0}")]
    Request(String),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}

/// Per-entity CRUD the core needs, plus the batch order rewrite used by
/// renormalization. All calls are single request/response round-trips; the
/// store enforces referential integrity and cascade deletes.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Fetches the full nested graph for one owner, each level ordered by its
    /// sort/position field.
    async fn fetch_workspace(&self, owner_id: Uuid) -> Result<Vec<ProjectRow>, StoreError>;

    async fn insert_project(&self, data: &CreateProject) -> Result<ProjectRow, StoreError>;

    async fn insert_board(&self, data: &CreateBoard) -> Result<BoardRow, StoreError>;
    async fn update_board(&self, id: Uuid, patch: &BoardPatch) -> Result<BoardRow, StoreError>;
    /// Cascades to the board's columns and tasks.
    async fn delete_board(&self, id: Uuid) -> Result<(), StoreError>;

    async fn insert_column(&self, data: &CreateColumn) -> Result<ColumnRow, StoreError>;
    async fn update_column(&self, id: Uuid, patch: &ColumnPatch) -> Result<ColumnRow, StoreError>;
    /// Cascades to the column's tasks.
    async fn delete_column(&self, id: Uuid) -> Result<(), StoreError>;

    async fn insert_task(&self, data: &CreateTask) -> Result<TaskRow, StoreError>;
    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<TaskRow, StoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError>;

    /// Batch-writes sort-order (and column) changes for many tasks at once.
    async fn upsert_task_orders(&self, orders: &[TaskOrder]) -> Result<(), StoreError>;
}
