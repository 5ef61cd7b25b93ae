use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{column::Column, sprint::Sprint};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Whether the board renders as a kanban grid rather than a flat list.
    pub kanban_view: bool,
    pub sort_order: i64,
    pub is_default: bool,
    pub columns: Vec<Column>,
    pub sprints: Vec<Sprint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub kanban_view: Option<bool>,
    pub sort_order: Option<i64>,
}
