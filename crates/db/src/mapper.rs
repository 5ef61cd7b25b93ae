//! Pure row-to-model mapping. Normalizes enumerated free text against the
//! closed vocabularies, parses JSON blobs defensively (malformed entries are
//! dropped, never propagated as errors), and sorts every nested collection so
//! callers never re-sort.

use uuid::Uuid;

use crate::{
    models::{
        board::Board,
        column::Column,
        comment::Comment,
        project::Project,
        sprint::Sprint,
        task::{Attachment, ChecklistItem, Task},
    },
    rows::{BoardRow, ColumnRow, CommentRow, ProjectRow, SprintRow, TaskRow},
    types::{ColumnCategory, TaskPriority, TaskType},
};

pub fn map_workspace(rows: Vec<ProjectRow>) -> Vec<Project> {
    let mut projects: Vec<Project> = rows.into_iter().map(map_project).collect();
    projects.sort_by_key(|p| p.sort_order);
    projects
}

pub fn map_project(row: ProjectRow) -> Project {
    let mut boards: Vec<Board> = row.boards.into_iter().map(map_board).collect();
    boards.sort_by_key(|b| b.sort_order);
    Project {
        id: row.id,
        owner_id: row.owner_id,
        name: row.name,
        code: row.code,
        task_counter: row.task_counter,
        sort_order: row.sort_order,
        is_favorite: row.is_favorite,
        created_at: row.created_at,
        updated_at: row.updated_at,
        boards,
    }
}

pub fn map_board(row: BoardRow) -> Board {
    let mut columns: Vec<Column> = row.columns.into_iter().map(map_column).collect();
    columns.sort_by_key(|c| c.position);
    let sprints = row.sprints.into_iter().map(map_sprint).collect();
    Board {
        id: row.id,
        project_id: row.project_id,
        name: row.name,
        description: row.description,
        kanban_view: row.kanban_view,
        sort_order: row.sort_order,
        is_default: row.is_default,
        columns,
        sprints,
    }
}

pub fn map_sprint(row: SprintRow) -> Sprint {
    Sprint {
        id: row.id,
        board_id: row.board_id,
        name: row.name,
        start_date: row.start_date,
        end_date: row.end_date,
        is_active: row.is_active,
    }
}

pub fn map_column(row: ColumnRow) -> Column {
    let mut tasks: Vec<Task> = row.tasks.into_iter().map(map_task).collect();
    tasks.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order));
    Column {
        id: row.id,
        board_id: row.board_id,
        name: row.name,
        slug: row.slug,
        category: ColumnCategory::normalize(&row.category),
        color: row.color,
        wip_limit: row.wip_limit,
        position: row.position,
        tasks,
    }
}

pub fn map_task(row: TaskRow) -> Task {
    let mut comments: Vec<Comment> = row.comments.into_iter().map(map_comment).collect();
    comments.sort_by_key(|c| c.created_at);
    Task {
        id: row.id,
        column_id: row.column_id,
        key: row.key,
        title: row.title,
        description: row.description,
        task_type: TaskType::normalize(&row.task_type),
        priority: TaskPriority::normalize(&row.priority),
        reporter_id: row.reporter_id,
        assignee_id: row.assignee_id,
        start_date: row.start_date,
        end_date: row.end_date,
        labels: row.labels,
        attachments: parse_attachments(&row.attachments),
        checklist: parse_checklist(&row.checklist),
        blocked: row.blocked,
        blocked_reason: row.blocked_reason,
        story_points: row.story_points,
        estimate_hours: row.estimate_hours,
        sort_order: row.sort_order,
        created_at: row.created_at,
        updated_at: row.updated_at,
        comments,
    }
}

pub fn map_comment(row: CommentRow) -> Comment {
    Comment {
        id: row.id,
        task_id: row.task_id,
        author_id: row.author_id,
        body: row.body,
        created_at: row.created_at,
    }
}

/// Parses a checklist blob. Anything that is not an array yields an empty
/// list; entries missing a title or with a wrongly-typed field are skipped.
/// Entries without an id get a generated one.
pub fn parse_checklist(blob: &serde_json::Value) -> Vec<ChecklistItem> {
    let Some(entries) = blob.as_array() else {
        return Vec::new();
    };
    let items: Vec<ChecklistItem> = entries
        .iter()
        .filter_map(|entry| {
            let title = entry.get("title")?.as_str()?.to_string();
            let done = entry.get("done").and_then(|v| v.as_bool()).unwrap_or(false);
            Some(ChecklistItem {
                id: entry_id(entry),
                title,
                done,
            })
        })
        .collect();
    if items.len() < entries.len() {
        tracing::debug!(
            "dropped {} malformed checklist entries",
            entries.len() - items.len()
        );
    }
    items
}

/// Parses an attachment blob with the same drop-and-continue policy.
pub fn parse_attachments(blob: &serde_json::Value) -> Vec<Attachment> {
    let Some(entries) = blob.as_array() else {
        return Vec::new();
    };
    let attachments: Vec<Attachment> = entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?.to_string();
            let url = entry.get("url")?.as_str()?.to_string();
            Some(Attachment {
                id: entry_id(entry),
                name,
                url,
            })
        })
        .collect();
    if attachments.len() < entries.len() {
        tracing::debug!(
            "dropped {} malformed attachment entries",
            entries.len() - attachments.len()
        );
    }
    attachments
}

fn entry_id(entry: &serde_json::Value) -> Uuid {
    entry
        .get("id")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(Uuid::new_v4)
}
