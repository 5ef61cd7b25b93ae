//! Raw persisted-row shapes, as returned by the workspace store's nested
//! select. Enumerated fields arrive as free text and JSON blobs arrive as
//! loosely-typed values; [`crate::mapper`] turns these into the internal model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub code: String,
    pub task_counter: i64,
    pub sort_order: i64,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub boards: Vec<BoardRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kanban_view: bool,
    pub sort_order: i64,
    pub is_default: bool,
    #[serde(default)]
    pub columns: Vec<ColumnRow>,
    #[serde(default)]
    pub sprints: Vec<SprintRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintRow {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRow {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub slug: String,
    /// Free text, normalized by the mapper.
    pub category: String,
    pub color: String,
    pub wip_limit: Option<u32>,
    pub position: i32,
    #[serde(default)]
    pub tasks: Vec<TaskRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: Uuid,
    pub column_id: Uuid,
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    /// Free text, normalized by the mapper.
    pub task_type: String,
    /// Free text, normalized by the mapper.
    pub priority: String,
    pub reporter_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Opaque JSON blob; malformed entries are dropped by the mapper.
    #[serde(default)]
    pub attachments: serde_json::Value,
    /// Opaque JSON blob; malformed entries are dropped by the mapper.
    #[serde(default)]
    pub checklist: serde_json::Value,
    pub blocked: bool,
    pub blocked_reason: Option<String>,
    pub story_points: Option<u32>,
    pub estimate_hours: Option<f32>,
    pub sort_order: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<CommentRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
