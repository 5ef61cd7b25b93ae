//! Row builders for seeding the in-memory store.

use chrono::Utc;
use db::rows::{BoardRow, ColumnRow, ProjectRow, TaskRow};
use uuid::Uuid;

pub fn project(owner_id: Uuid, code: &str) -> ProjectRow {
    let now = Utc::now();
    ProjectRow {
        id: Uuid::new_v4(),
        owner_id,
        name: format!("{code} project"),
        code: code.to_string(),
        task_counter: 0,
        sort_order: 0,
        is_favorite: false,
        created_at: now,
        updated_at: now,
        boards: Vec::new(),
    }
}

pub fn board(project_id: Uuid, name: &str, sort_order: i64) -> BoardRow {
    BoardRow {
        id: Uuid::new_v4(),
        project_id,
        name: name.to_string(),
        description: None,
        kanban_view: true,
        sort_order,
        is_default: sort_order == 0,
        columns: Vec::new(),
        sprints: Vec::new(),
    }
}

pub fn column(board_id: Uuid, name: &str, category: &str, position: i32) -> ColumnRow {
    ColumnRow {
        id: Uuid::new_v4(),
        board_id,
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        category: category.to_string(),
        color: "#6366f1".to_string(),
        wip_limit: None,
        position,
        tasks: Vec::new(),
    }
}

pub fn task(column_id: Uuid, key: &str, title: &str, sort_order: f64) -> TaskRow {
    let now = Utc::now();
    TaskRow {
        id: Uuid::new_v4(),
        column_id,
        key: key.to_string(),
        title: title.to_string(),
        description: None,
        task_type: "task".to_string(),
        priority: "medium".to_string(),
        reporter_id: Uuid::new_v4(),
        assignee_id: None,
        start_date: None,
        end_date: None,
        labels: Vec::new(),
        attachments: serde_json::json!([]),
        checklist: serde_json::json!([]),
        blocked: false,
        blocked_reason: None,
        story_points: None,
        estimate_hours: None,
        sort_order,
        created_at: now,
        updated_at: now,
        comments: Vec::new(),
    }
}
