use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::board::Board;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Short code used as the task-key prefix, unique per owner.
    pub code: String,
    /// Auto-incrementing counter the store uses to mint task keys.
    pub task_counter: i64,
    pub sort_order: i64,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub boards: Vec<Board>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub owner_id: Uuid,
    pub name: String,
    pub code: String,
    pub sort_order: i64,
}
