//! The board state manager: owns the workspace tree and exposes the mutation
//! operations the rendering layer calls. Optimistic operations mutate local
//! state strictly before the remote write goes out; a failed write is logged
//! and recovered by reloading authoritative state, never surfaced to callers.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use db::{
    WorkspaceStore,
    models::{
        board::{Board, BoardPatch, CreateBoard},
        column::{ColumnPatch, CreateColumn, slugify},
        task::{CreateTask, Task, TaskOrder, TaskPatch},
    },
    types::{COLUMN_PALETTE, ColumnCategory, TaskPriority, TaskType},
};
use uuid::Uuid;

use crate::{error::ValidationError, ordering, state::WorkspaceState};

/// Input for [`BoardManager::create_task`]. Only the title is required.
#[derive(Debug, Clone)]
pub struct NewTaskInput {
    pub title: String,
    pub description: Option<String>,
    /// Target column; `None` falls back to the active board's first column.
    pub column_id: Option<Uuid>,
    /// User-supplied key override; `None` lets the store mint one.
    pub key: Option<String>,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub assignee_id: Option<Uuid>,
    pub labels: Vec<String>,
    pub story_points: Option<u32>,
    pub estimate_hours: Option<f32>,
}

impl NewTaskInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            column_id: None,
            key: None,
            task_type: TaskType::default(),
            priority: TaskPriority::default(),
            assignee_id: None,
            labels: Vec::new(),
            story_points: None,
            estimate_hours: None,
        }
    }
}

pub struct BoardManager {
    pub(crate) store: Arc<dyn WorkspaceStore>,
    pub(crate) state: WorkspaceState,
    pub(crate) user_id: Option<Uuid>,
}

impl BoardManager {
    pub fn new(store: Arc<dyn WorkspaceStore>) -> Self {
        Self {
            store,
            state: WorkspaceState::default(),
            user_id: None,
        }
    }

    /// Read-only view of the workspace tree.
    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Identity handoff. `None` (signed out) clears all local state; a new
    /// user triggers a full load.
    pub async fn set_user(&mut self, user_id: Option<Uuid>) {
        self.user_id = user_id;
        match user_id {
            Some(_) => self.reload(false).await,
            None => self.state.clear(),
        }
    }

    pub fn select_project(&mut self, project_id: Uuid) -> Result<(), ValidationError> {
        if self.state.select_project(project_id) {
            Ok(())
        } else {
            Err(ValidationError::UnknownProject)
        }
    }

    pub fn select_board(&mut self, board_id: Uuid) -> Result<(), ValidationError> {
        if self.state.select_board(board_id) {
            Ok(())
        } else {
            Err(ValidationError::UnknownBoard)
        }
    }

    /// Full reload from the source of truth.
    pub async fn refresh(&mut self) {
        self.reload(false).await;
    }

    // --- task operations -------------------------------------------------

    /// Creates a task in the resolved column, last in order. Not optimistic:
    /// nothing is mutated locally before the insert, so a failed write only
    /// logs. Success reloads fully to reconcile the generated key and
    /// timestamps.
    pub async fn create_task(&mut self, input: NewTaskInput) -> Result<(), ValidationError> {
        let reporter_id = self.user_id.ok_or(ValidationError::NoUser)?;
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.state.title_in_use(&title, None) {
            return Err(ValidationError::DuplicateTitle(title));
        }
        if let Some(key) = input.key.as_deref()
            && self.state.key_in_use(key, None)
        {
            return Err(ValidationError::DuplicateKey(key.to_string()));
        }

        let (column_id, sort_order, start_date, end_date) = {
            let board = self.state.active_board().ok_or(ValidationError::NoActiveBoard)?;
            let column = match input.column_id {
                Some(id) => board
                    .columns
                    .iter()
                    .find(|c| c.id == id)
                    .ok_or(ValidationError::UnknownColumn)?,
                None => board.columns.first().ok_or(ValidationError::NoColumns)?,
            };
            let max = column.tasks.last().map(|t| t.sort_order).unwrap_or(0.0);
            let (start, end) = auto_dates(board, column.id, None, None);
            (column.id, max + ordering::ORDER_STEP, start, end)
        };

        let data = CreateTask {
            column_id,
            key: input.key,
            title,
            description: input.description,
            task_type: input.task_type,
            priority: input.priority,
            reporter_id,
            assignee_id: input.assignee_id,
            start_date,
            end_date,
            labels: input.labels,
            story_points: input.story_points,
            estimate_hours: input.estimate_hours,
            sort_order,
        };
        match self.store.insert_task(&data).await {
            Ok(_) => self.reload(false).await,
            Err(err) => tracing::error!("task insert failed: {err}"),
        }
        Ok(())
    }

    /// Partial field patch. A column change relocates the task optimistically
    /// (last in the destination) and applies the auto-date rule before the
    /// write goes out. Success reconciles silently; failure discards the
    /// optimistic change via full reload.
    pub async fn update_task(
        &mut self,
        task_id: Uuid,
        mut patch: TaskPatch,
    ) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        if let Some(title) = patch.title.take() {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ValidationError::MissingTitle);
            }
            if self.state.title_in_use(&title, Some(task_id)) {
                return Err(ValidationError::DuplicateTitle(title));
            }
            patch.title = Some(title);
        }
        if let Some(key) = patch.key.as_deref()
            && self.state.key_in_use(key, Some(task_id))
        {
            return Err(ValidationError::DuplicateKey(key.to_string()));
        }

        let current_column_id = self
            .state
            .column_of_task(task_id)
            .ok_or(ValidationError::UnknownTask)?
            .id;
        let destination = patch.column_id.filter(|id| *id != current_column_id);

        if let Some(dest_id) = destination {
            let dest_max = {
                let board = self
                    .state
                    .board_of_column(dest_id)
                    .ok_or(ValidationError::UnknownColumn)?;
                let task = self.state.task(task_id).ok_or(ValidationError::UnknownTask)?;
                let (auto_start, auto_end) =
                    auto_dates(board, dest_id, task.start_date, task.end_date);
                if patch.start_date.is_none() {
                    patch.start_date = auto_start;
                }
                if patch.end_date.is_none() {
                    patch.end_date = auto_end;
                }
                board
                    .columns
                    .iter()
                    .find(|c| c.id == dest_id)
                    .and_then(|c| c.tasks.last())
                    .map(|t| t.sort_order)
                    .unwrap_or(0.0)
            };
            patch.sort_order = Some(dest_max + ordering::ORDER_GAP);

            // Relocate before the write: the UI jumps straight to "after".
            let mut task = self
                .state
                .take_task(task_id)
                .ok_or(ValidationError::UnknownTask)?;
            apply_patch(&mut task, &patch);
            task.column_id = dest_id;
            if let Some(column) = self.state.column_mut(dest_id) {
                column.tasks.push(task);
            }
        } else {
            let task = self
                .state
                .task_mut(task_id)
                .ok_or(ValidationError::UnknownTask)?;
            apply_patch(task, &patch);
        }

        match self.store.update_task(task_id, &patch).await {
            Ok(_) => self.reload(true).await,
            Err(err) => {
                tracing::error!("task update failed, discarding optimistic change: {err}");
                self.reload(false).await;
            }
        }
        Ok(())
    }

    /// Optimistic delete; a failed write restores the task on reload.
    pub async fn delete_task(&mut self, task_id: Uuid) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        self.state
            .take_task(task_id)
            .ok_or(ValidationError::UnknownTask)?;
        match self.store.delete_task(task_id).await {
            Ok(()) => self.reload(true).await,
            Err(err) => {
                tracing::error!("task delete failed: {err}");
                self.reload(false).await;
            }
        }
        Ok(())
    }

    /// Drag-and-drop reposition. Applies the relocation to local state first
    /// and always issues the write; a failed write is logged and left for the
    /// next reload to correct (no explicit rollback).
    pub async fn move_task(
        &mut self,
        task_id: Uuid,
        dest_column_id: Uuid,
        target_index: usize,
    ) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        let source_column_id = self
            .state
            .column_of_task(task_id)
            .ok_or(ValidationError::UnknownTask)?
            .id;
        let cross_column = source_column_id != dest_column_id;

        let mut patch = TaskPatch::default();
        let plan = {
            let board = self
                .state
                .board_of_column(dest_column_id)
                .ok_or(ValidationError::UnknownColumn)?;
            if cross_column {
                let task = self.state.task(task_id).ok_or(ValidationError::UnknownTask)?;
                let (auto_start, auto_end) =
                    auto_dates(board, dest_column_id, task.start_date, task.end_date);
                patch.start_date = auto_start;
                patch.end_date = auto_end;
                patch.column_id = Some(dest_column_id);
            }
            let dest = board
                .columns
                .iter()
                .find(|c| c.id == dest_column_id)
                .ok_or(ValidationError::UnknownColumn)?;
            let sibling_orders: Vec<f64> = dest
                .tasks
                .iter()
                .filter(|t| t.id != task_id)
                .map(|t| t.sort_order)
                .collect();
            ordering::compute_insertion_order(&sibling_orders, target_index)
        };
        patch.sort_order = Some(plan.key);

        let mut batch: Vec<TaskOrder> = Vec::new();
        if let Some(fresh) = &plan.renormalized {
            // Collision: every destination sibling gets a fresh evenly-spaced key.
            if let Some(dest) = self.state.column_mut(dest_column_id) {
                for (task, key) in dest
                    .tasks
                    .iter_mut()
                    .filter(|t| t.id != task_id)
                    .zip(fresh)
                {
                    task.sort_order = *key;
                    batch.push(TaskOrder {
                        task_id: task.id,
                        column_id: dest_column_id,
                        sort_order: *key,
                    });
                }
            }
        }

        let mut task = self
            .state
            .take_task(task_id)
            .ok_or(ValidationError::UnknownTask)?;
        apply_patch(&mut task, &patch);
        task.column_id = dest_column_id;
        task.sort_order = plan.key;
        if let Some(dest) = self.state.column_mut(dest_column_id) {
            let index = target_index.min(dest.tasks.len());
            dest.tasks.insert(index, task);
        }

        if cross_column {
            // Renormalize what remains of the source column so its keys do not
            // fragment across many moves.
            if let Some(source) = self.state.column_mut(source_column_id) {
                let fresh = ordering::renormalized_keys(source.tasks.len());
                for (task, key) in source.tasks.iter_mut().zip(fresh) {
                    task.sort_order = key;
                    batch.push(TaskOrder {
                        task_id: task.id,
                        column_id: source_column_id,
                        sort_order: key,
                    });
                }
            }
        }

        let mut write_failed = false;
        if let Err(err) = self.store.update_task(task_id, &patch).await {
            tracing::error!("task move write failed: {err}");
            write_failed = true;
        }
        if !write_failed
            && !batch.is_empty()
            && let Err(err) = self.store.upsert_task_orders(&batch).await
        {
            tracing::error!("order renormalization write failed: {err}");
            write_failed = true;
        }
        if !write_failed {
            self.reload(true).await;
        }
        Ok(())
    }

    /// Flips one checklist item and persists the whole checklist array.
    pub async fn toggle_task_checklist_item(
        &mut self,
        task_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        let checklist = {
            let task = self
                .state
                .task_mut(task_id)
                .ok_or(ValidationError::UnknownTask)?;
            let item = task
                .checklist
                .iter_mut()
                .find(|i| i.id == item_id)
                .ok_or(ValidationError::UnknownChecklistItem)?;
            item.done = !item.done;
            task.checklist.clone()
        };
        let patch = TaskPatch {
            checklist: Some(checklist),
            ..TaskPatch::default()
        };
        match self.store.update_task(task_id, &patch).await {
            Ok(_) => self.reload(true).await,
            Err(err) => {
                tracing::error!("checklist toggle failed, discarding optimistic change: {err}");
                self.reload(false).await;
            }
        }
        Ok(())
    }

    // --- column operations ------------------------------------------------

    /// Appends a column to the active board with a derived slug, the next
    /// position, and a palette color chosen round-robin, unused colors first.
    pub async fn create_column(
        &mut self,
        name: &str,
        category: ColumnCategory,
        wip_limit: Option<u32>,
    ) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let data = {
            let board = self.state.active_board().ok_or(ValidationError::NoActiveBoard)?;
            let position = board.columns.iter().map(|c| c.position).max().unwrap_or(-1) + 1;
            CreateColumn {
                board_id: board.id,
                name: name.to_string(),
                slug: slugify(name),
                category,
                color: pick_column_color(board),
                wip_limit,
                position,
            }
        };
        match self.store.insert_column(&data).await {
            Ok(_) => self.reload(false).await,
            Err(err) => tracing::error!("column insert failed: {err}"),
        }
        Ok(())
    }

    pub async fn rename_column(
        &mut self,
        column_id: Uuid,
        name: &str,
    ) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let column = self
            .state
            .column_mut(column_id)
            .ok_or(ValidationError::UnknownColumn)?;
        column.name = name.to_string();
        column.slug = slugify(name);
        let patch = ColumnPatch {
            name: Some(name.to_string()),
            slug: Some(slugify(name)),
            ..ColumnPatch::default()
        };
        self.write_column_patch(column_id, patch).await;
        Ok(())
    }

    pub async fn update_column_color(
        &mut self,
        column_id: Uuid,
        color: &str,
    ) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        if !COLUMN_PALETTE.contains(&color) {
            return Err(ValidationError::UnknownColor(color.to_string()));
        }
        let column = self
            .state
            .column_mut(column_id)
            .ok_or(ValidationError::UnknownColumn)?;
        column.color = color.to_string();
        let patch = ColumnPatch {
            color: Some(color.to_string()),
            ..ColumnPatch::default()
        };
        self.write_column_patch(column_id, patch).await;
        Ok(())
    }

    /// Deletion cascades to the column's tasks at the persistence layer; the
    /// reload reflects the post-delete state.
    pub async fn delete_column(&mut self, column_id: Uuid) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        if self.state.column(column_id).is_none() {
            return Err(ValidationError::UnknownColumn);
        }
        match self.store.delete_column(column_id).await {
            Ok(()) => self.reload(false).await,
            Err(err) => tracing::error!("column delete failed: {err}"),
        }
        Ok(())
    }

    /// Reassigns column positions to match `ordered_ids`, which must be a
    /// permutation of the board's current column ids.
    pub async fn reorder_columns(
        &mut self,
        board_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        {
            let board = self.state.board(board_id).ok_or(ValidationError::UnknownBoard)?;
            if ordered_ids.len() != board.columns.len()
                || !board
                    .columns
                    .iter()
                    .all(|c| ordered_ids.contains(&c.id))
            {
                return Err(ValidationError::UnknownColumn);
            }
        }
        let board = self
            .state
            .board_mut(board_id)
            .ok_or(ValidationError::UnknownBoard)?;
        board
            .columns
            .sort_by_key(|c| ordered_ids.iter().position(|id| *id == c.id));
        for (position, column) in board.columns.iter_mut().enumerate() {
            column.position = position as i32;
        }
        let patches: Vec<(Uuid, ColumnPatch)> = board
            .columns
            .iter()
            .map(|c| {
                (
                    c.id,
                    ColumnPatch {
                        position: Some(c.position),
                        ..ColumnPatch::default()
                    },
                )
            })
            .collect();
        for (id, patch) in patches {
            if let Err(err) = self.store.update_column(id, &patch).await {
                tracing::error!("column reorder write failed, discarding optimistic change: {err}");
                self.reload(false).await;
                return Ok(());
            }
        }
        self.reload(true).await;
        Ok(())
    }

    // --- board operations -------------------------------------------------

    pub async fn create_board(
        &mut self,
        name: &str,
        description: Option<String>,
    ) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let data = {
            let project = self
                .state
                .active_project()
                .ok_or(ValidationError::UnknownProject)?;
            CreateBoard {
                project_id: project.id,
                name: name.to_string(),
                description,
                sort_order: project.boards.iter().map(|b| b.sort_order).max().unwrap_or(-1) + 1,
                is_default: project.boards.is_empty(),
            }
        };
        match self.store.insert_board(&data).await {
            Ok(_) => self.reload(false).await,
            Err(err) => tracing::error!("board insert failed: {err}"),
        }
        Ok(())
    }

    pub async fn rename_board(
        &mut self,
        board_id: Uuid,
        name: &str,
    ) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let board = self
            .state
            .board_mut(board_id)
            .ok_or(ValidationError::UnknownBoard)?;
        board.name = name.to_string();
        let patch = BoardPatch {
            name: Some(name.to_string()),
            ..BoardPatch::default()
        };
        match self.store.update_board(board_id, &patch).await {
            Ok(_) => self.reload(true).await,
            Err(err) => {
                tracing::error!("board rename failed, discarding optimistic change: {err}");
                self.reload(false).await;
            }
        }
        Ok(())
    }

    /// Refuses to delete a project's only remaining board.
    pub async fn delete_board(&mut self, board_id: Uuid) -> Result<(), ValidationError> {
        self.user_id.ok_or(ValidationError::NoUser)?;
        let project = self
            .state
            .project_of_board(board_id)
            .ok_or(ValidationError::UnknownBoard)?;
        if project.boards.len() <= 1 {
            return Err(ValidationError::LastBoard);
        }
        match self.store.delete_board(board_id).await {
            Ok(()) => self.reload(false).await,
            Err(err) => tracing::error!("board delete failed: {err}"),
        }
        Ok(())
    }

    async fn write_column_patch(&mut self, column_id: Uuid, patch: ColumnPatch) {
        match self.store.update_column(column_id, &patch).await {
            Ok(_) => self.reload(true).await,
            Err(err) => {
                tracing::error!("column update failed, discarding optimistic change: {err}");
                self.reload(false).await;
            }
        }
    }
}

/// Auto-date rule shared by every mutation family. Fires only on entry into a
/// column (the caller compares before/after); a date that is already set is
/// never overwritten.
fn auto_dates(
    board: &Board,
    dest_column_id: Uuid,
    current_start: Option<NaiveDate>,
    current_end: Option<NaiveDate>,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let Some(dest) = board.columns.iter().find(|c| c.id == dest_column_id) else {
        return (None, None);
    };
    let today = Utc::now().date_naive();
    let start = (current_start.is_none() && dest.category == ColumnCategory::InProgress)
        .then_some(today);
    let is_last = board.columns.last().is_some_and(|c| c.id == dest_column_id);
    let end = (current_end.is_none() && is_last).then_some(today);
    (start, end)
}

/// Round-robin palette assignment, preferring colors no column on the board
/// uses yet.
fn pick_column_color(board: &Board) -> String {
    let unused = COLUMN_PALETTE
        .iter()
        .find(|color| !board.columns.iter().any(|c| c.color == **color));
    match unused {
        Some(color) => (*color).to_string(),
        None => COLUMN_PALETTE[board.columns.len() % COLUMN_PALETTE.len()].to_string(),
    }
}

fn apply_patch(task: &mut Task, patch: &TaskPatch) {
    if let Some(key) = &patch.key {
        task.key = key.clone();
    }
    if let Some(title) = &patch.title {
        task.title = title.trim().to_string();
    }
    if let Some(description) = &patch.description {
        task.description = Some(description.clone());
    }
    if let Some(task_type) = patch.task_type {
        task.task_type = task_type;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(assignee_id) = patch.assignee_id {
        task.assignee_id = Some(assignee_id);
    }
    if let Some(start_date) = patch.start_date {
        task.start_date = Some(start_date);
    }
    if let Some(end_date) = patch.end_date {
        task.end_date = Some(end_date);
    }
    if let Some(labels) = &patch.labels {
        task.labels = labels.clone();
    }
    if let Some(checklist) = &patch.checklist {
        task.checklist = checklist.clone();
    }
    if let Some(blocked) = patch.blocked {
        task.blocked = blocked;
    }
    if let Some(reason) = &patch.blocked_reason {
        task.blocked_reason = Some(reason.clone());
    }
    if let Some(points) = patch.story_points {
        task.story_points = Some(points);
    }
    if let Some(hours) = patch.estimate_hours {
        task.estimate_hours = Some(hours);
    }
    if let Some(order) = patch.sort_order {
        task.sort_order = order;
    }
    task.updated_at = Utc::now();
}
