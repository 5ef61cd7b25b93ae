//! In-memory [`WorkspaceStore`] used by the board crate's integration tests.
//! Behaves like the hosted backend for the operations the core issues: nested
//! fetch, per-entity CRUD with cascade deletes, key minting from the project
//! code, and per-owner code uniqueness. Failures can be injected per write to
//! exercise the engine's recovery paths.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::Utc;
use db::{
    StoreError, WorkspaceStore,
    models::{
        board::{BoardPatch, CreateBoard},
        column::{ColumnPatch, CreateColumn},
        project::CreateProject,
        task::{CreateTask, TaskOrder, TaskPatch},
    },
    rows::{BoardRow, ColumnRow, ProjectRow, TaskRow},
};
use tokio::sync::Mutex;
use uuid::Uuid;

pub mod rows;

#[derive(Default)]
struct Inner {
    projects: Vec<ProjectRow>,
    /// Errors consumed by subsequent writes, in order.
    queued_failures: VecDeque<StoreError>,
    write_attempts: usize,
    fetch_count: usize,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, project: ProjectRow) {
        self.inner.lock().await.projects.push(project);
    }

    /// Queues errors; each subsequent write consumes one before touching data.
    pub async fn fail_next_writes(&self, errors: Vec<StoreError>) {
        self.inner.lock().await.queued_failures.extend(errors);
    }

    /// Number of write calls issued, including failed ones.
    pub async fn write_attempts(&self) -> usize {
        self.inner.lock().await.write_attempts
    }

    pub async fn fetch_count(&self) -> usize {
        self.inner.lock().await.fetch_count
    }

    pub async fn task_row(&self, task_id: Uuid) -> Option<TaskRow> {
        let inner = self.inner.lock().await;
        all_tasks(&inner.projects)
            .find(|t| t.id == task_id)
            .cloned()
    }
}

fn all_tasks(projects: &[ProjectRow]) -> impl Iterator<Item = &TaskRow> {
    projects
        .iter()
        .flat_map(|p| p.boards.iter())
        .flat_map(|b| b.columns.iter())
        .flat_map(|c| c.tasks.iter())
}

fn begin_write(inner: &mut Inner) -> Result<(), StoreError> {
    inner.write_attempts += 1;
    match inner.queued_failures.pop_front() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn column_mut<'a>(projects: &'a mut [ProjectRow], id: Uuid) -> Option<&'a mut ColumnRow> {
    projects
        .iter_mut()
        .flat_map(|p| p.boards.iter_mut())
        .flat_map(|b| b.columns.iter_mut())
        .find(|c| c.id == id)
}

fn take_task(projects: &mut [ProjectRow], id: Uuid) -> Option<TaskRow> {
    for project in projects.iter_mut() {
        for board in &mut project.boards {
            for column in &mut board.columns {
                if let Some(index) = column.tasks.iter().position(|t| t.id == id) {
                    return Some(column.tasks.remove(index));
                }
            }
        }
    }
    None
}

fn apply_task_patch(row: &mut TaskRow, patch: &TaskPatch) {
    if let Some(key) = &patch.key {
        row.key = key.clone();
    }
    if let Some(title) = &patch.title {
        row.title = title.clone();
    }
    if let Some(description) = &patch.description {
        row.description = Some(description.clone());
    }
    if let Some(task_type) = patch.task_type {
        row.task_type = task_type.to_string();
    }
    if let Some(priority) = patch.priority {
        row.priority = priority.to_string();
    }
    if let Some(assignee_id) = patch.assignee_id {
        row.assignee_id = Some(assignee_id);
    }
    if let Some(start_date) = patch.start_date {
        row.start_date = Some(start_date);
    }
    if let Some(end_date) = patch.end_date {
        row.end_date = Some(end_date);
    }
    if let Some(labels) = &patch.labels {
        row.labels = labels.clone();
    }
    if let Some(checklist) = &patch.checklist {
        row.checklist = serde_json::to_value(checklist).unwrap_or_default();
    }
    if let Some(blocked) = patch.blocked {
        row.blocked = blocked;
    }
    if let Some(reason) = &patch.blocked_reason {
        row.blocked_reason = Some(reason.clone());
    }
    if let Some(points) = patch.story_points {
        row.story_points = Some(points);
    }
    if let Some(hours) = patch.estimate_hours {
        row.estimate_hours = Some(hours);
    }
    if let Some(order) = patch.sort_order {
        row.sort_order = order;
    }
    row.updated_at = Utc::now();
}

#[async_trait]
impl WorkspaceStore for InMemoryStore {
    async fn fetch_workspace(&self, owner_id: Uuid) -> Result<Vec<ProjectRow>, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.fetch_count += 1;
        let mut projects: Vec<ProjectRow> = inner
            .projects
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.sort_order);
        for project in &mut projects {
            project.boards.sort_by_key(|b| b.sort_order);
            for board in &mut project.boards {
                board.columns.sort_by_key(|c| c.position);
                for column in &mut board.columns {
                    column.tasks.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order));
                }
            }
        }
        Ok(projects)
    }

    async fn insert_project(&self, data: &CreateProject) -> Result<ProjectRow, StoreError> {
        let mut inner = self.inner.lock().await;
        begin_write(&mut inner)?;
        let code_taken = inner
            .projects
            .iter()
            .any(|p| p.owner_id == data.owner_id && p.code == data.code);
        if code_taken {
            return Err(StoreError::UniqueViolation {
                field: "code".to_string(),
            });
        }
        let now = Utc::now();
        let row = ProjectRow {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            name: data.name.clone(),
            code: data.code.clone(),
            task_counter: 0,
            sort_order: data.sort_order,
            is_favorite: false,
            created_at: now,
            updated_at: now,
            boards: Vec::new(),
        };
        inner.projects.push(row.clone());
        Ok(row)
    }

    async fn insert_board(&self, data: &CreateBoard) -> Result<BoardRow, StoreError> {
        let mut inner = self.inner.lock().await;
        begin_write(&mut inner)?;
        let row = BoardRow {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            name: data.name.clone(),
            description: data.description.clone(),
            kanban_view: true,
            sort_order: data.sort_order,
            is_default: data.is_default,
            columns: Vec::new(),
            sprints: Vec::new(),
        };
        let project = inner
            .projects
            .iter_mut()
            .find(|p| p.id == data.project_id)
            .ok_or(StoreError::NotFound { entity: "project" })?;
        project.boards.push(row.clone());
        Ok(row)
    }

    async fn update_board(&self, id: Uuid, patch: &BoardPatch) -> Result<BoardRow, StoreError> {
        let mut inner = self.inner.lock().await;
        begin_write(&mut inner)?;
        let board = inner
            .projects
            .iter_mut()
            .flat_map(|p| p.boards.iter_mut())
            .find(|b| b.id == id)
            .ok_or(StoreError::NotFound { entity: "board" })?;
        if let Some(name) = &patch.name {
            board.name = name.clone();
        }
        if let Some(description) = &patch.description {
            board.description = Some(description.clone());
        }
        if let Some(kanban_view) = patch.kanban_view {
            board.kanban_view = kanban_view;
        }
        if let Some(sort_order) = patch.sort_order {
            board.sort_order = sort_order;
        }
        Ok(board.clone())
    }

    async fn delete_board(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        begin_write(&mut inner)?;
        for project in &mut inner.projects {
            if let Some(index) = project.boards.iter().position(|b| b.id == id) {
                project.boards.remove(index);
                return Ok(());
            }
        }
        Err(StoreError::NotFound { entity: "board" })
    }

    async fn insert_column(&self, data: &CreateColumn) -> Result<ColumnRow, StoreError> {
        let mut inner = self.inner.lock().await;
        begin_write(&mut inner)?;
        let row = ColumnRow {
            id: Uuid::new_v4(),
            board_id: data.board_id,
            name: data.name.clone(),
            slug: data.slug.clone(),
            category: data.category.to_string(),
            color: data.color.clone(),
            wip_limit: data.wip_limit,
            position: data.position,
            tasks: Vec::new(),
        };
        let board = inner
            .projects
            .iter_mut()
            .flat_map(|p| p.boards.iter_mut())
            .find(|b| b.id == data.board_id)
            .ok_or(StoreError::NotFound { entity: "board" })?;
        board.columns.push(row.clone());
        Ok(row)
    }

    async fn update_column(&self, id: Uuid, patch: &ColumnPatch) -> Result<ColumnRow, StoreError> {
        let mut inner = self.inner.lock().await;
        begin_write(&mut inner)?;
        let column = column_mut(&mut inner.projects, id)
            .ok_or(StoreError::NotFound { entity: "column" })?;
        if let Some(name) = &patch.name {
            column.name = name.clone();
        }
        if let Some(slug) = &patch.slug {
            column.slug = slug.clone();
        }
        if let Some(color) = &patch.color {
            column.color = color.clone();
        }
        if let Some(wip_limit) = patch.wip_limit {
            column.wip_limit = Some(wip_limit);
        }
        if let Some(position) = patch.position {
            column.position = position;
        }
        Ok(column.clone())
    }

    async fn delete_column(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        begin_write(&mut inner)?;
        for board in inner.projects.iter_mut().flat_map(|p| p.boards.iter_mut()) {
            if let Some(index) = board.columns.iter().position(|c| c.id == id) {
                board.columns.remove(index);
                return Ok(());
            }
        }
        Err(StoreError::NotFound { entity: "column" })
    }

    async fn insert_task(&self, data: &CreateTask) -> Result<TaskRow, StoreError> {
        let mut inner = self.inner.lock().await;
        begin_write(&mut inner)?;
        let project_id = inner
            .projects
            .iter()
            .find(|p| {
                p.boards
                    .iter()
                    .flat_map(|b| b.columns.iter())
                    .any(|c| c.id == data.column_id)
            })
            .map(|p| p.id)
            .ok_or(StoreError::NotFound { entity: "column" })?;
        let key = match &data.key {
            Some(key) => key.clone(),
            None => {
                let project = inner
                    .projects
                    .iter_mut()
                    .find(|p| p.id == project_id)
                    .expect("project located above");
                project.task_counter += 1;
                format!("{}-{}", project.code, project.task_counter)
            }
        };
        let now = Utc::now();
        let row = TaskRow {
            id: Uuid::new_v4(),
            column_id: data.column_id,
            key,
            title: data.title.clone(),
            description: data.description.clone(),
            task_type: data.task_type.to_string(),
            priority: data.priority.to_string(),
            reporter_id: data.reporter_id,
            assignee_id: data.assignee_id,
            start_date: data.start_date,
            end_date: data.end_date,
            labels: data.labels.clone(),
            attachments: serde_json::json!([]),
            checklist: serde_json::json!([]),
            blocked: false,
            blocked_reason: None,
            story_points: data.story_points,
            estimate_hours: data.estimate_hours,
            sort_order: data.sort_order,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
        };
        let column = column_mut(&mut inner.projects, data.column_id)
            .expect("column located above");
        column.tasks.push(row.clone());
        Ok(row)
    }

    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<TaskRow, StoreError> {
        let mut inner = self.inner.lock().await;
        begin_write(&mut inner)?;
        let moved_to = patch.column_id;
        if let Some(dest_id) = moved_to {
            let mut row = take_task(&mut inner.projects, id)
                .ok_or(StoreError::NotFound { entity: "task" })?;
            apply_task_patch(&mut row, patch);
            row.column_id = dest_id;
            let column = column_mut(&mut inner.projects, dest_id)
                .ok_or(StoreError::NotFound { entity: "column" })?;
            column.tasks.push(row.clone());
            Ok(row)
        } else {
            let row = inner
                .projects
                .iter_mut()
                .flat_map(|p| p.boards.iter_mut())
                .flat_map(|b| b.columns.iter_mut())
                .flat_map(|c| c.tasks.iter_mut())
                .find(|t| t.id == id)
                .ok_or(StoreError::NotFound { entity: "task" })?;
            apply_task_patch(row, patch);
            Ok(row.clone())
        }
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        begin_write(&mut inner)?;
        take_task(&mut inner.projects, id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { entity: "task" })
    }

    async fn upsert_task_orders(&self, orders: &[TaskOrder]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        begin_write(&mut inner)?;
        for entry in orders {
            let mut row = take_task(&mut inner.projects, entry.task_id)
                .ok_or(StoreError::NotFound { entity: "task" })?;
            row.sort_order = entry.sort_order;
            row.column_id = entry.column_id;
            let column = column_mut(&mut inner.projects, entry.column_id)
                .ok_or(StoreError::NotFound { entity: "column" })?;
            column.tasks.push(row);
        }
        Ok(())
    }
}
