use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::comment::Comment;
use crate::types::{TaskPriority, TaskType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub column_id: Uuid,
    /// Human key: project code + sequence ("ACME-7") or a user override.
    /// Unique across the whole workspace.
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub reporter_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub labels: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub checklist: Vec<ChecklistItem>,
    pub blocked: bool,
    pub blocked_reason: Option<String>,
    pub story_points: Option<u32>,
    pub estimate_hours: Option<f32>,
    /// Float key expressing relative order among siblings in the same column.
    pub sort_order: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub title: String,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub column_id: Uuid,
    /// `None` lets the store mint the next project-code key.
    pub key: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub reporter_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub labels: Vec<String>,
    pub story_points: Option<u32>,
    pub estimate_hours: Option<f32>,
    pub sort_order: f64,
}

/// Partial field patch; `Some` fields are written, `None` fields untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    pub column_id: Option<Uuid>,
    pub key: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub task_type: Option<TaskType>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub labels: Option<Vec<String>>,
    pub checklist: Option<Vec<ChecklistItem>>,
    pub blocked: Option<bool>,
    pub blocked_reason: Option<String>,
    pub story_points: Option<u32>,
    pub estimate_hours: Option<f32>,
    pub sort_order: Option<f64>,
}

/// One row of a batch sort-order rewrite, used by renormalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaskOrder {
    pub task_id: Uuid,
    pub column_id: Uuid,
    pub sort_order: f64,
}
