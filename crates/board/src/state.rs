//! The in-memory workspace tree. Owned exclusively by the board manager;
//! consumers read it through [`crate::BoardManager::state`] and funnel every
//! intent back through the manager's operations.

use db::models::{board::Board, column::Column, project::Project, task::Task};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct WorkspaceState {
    pub projects: Vec<Project>,
    pub active_project_id: Option<Uuid>,
    pub active_board_id: Option<Uuid>,
    /// Toggled by full loads only; silent refreshes leave it untouched.
    pub loading: bool,
}

impl WorkspaceState {
    pub fn clear(&mut self) {
        self.projects.clear();
        self.active_project_id = None;
        self.active_board_id = None;
        self.loading = false;
    }

    /// Replaces the tree, keeping the previous project/board selection when
    /// those ids survived the refetch and falling back to the first available
    /// otherwise.
    pub fn replace(&mut self, projects: Vec<Project>) {
        self.projects = projects;
        self.restore_selection();
    }

    fn restore_selection(&mut self) {
        let project_alive = self
            .active_project_id
            .is_some_and(|id| self.projects.iter().any(|p| p.id == id));
        if !project_alive {
            self.active_project_id = self.projects.first().map(|p| p.id);
        }
        let (board_alive, first_board) = match self.active_project() {
            Some(project) => (
                self.active_board_id
                    .is_some_and(|id| project.boards.iter().any(|b| b.id == id)),
                project.boards.first().map(|b| b.id),
            ),
            None => {
                self.active_board_id = None;
                return;
            }
        };
        if !board_alive {
            self.active_board_id = first_board;
        }
    }

    pub fn select_project(&mut self, project_id: Uuid) -> bool {
        let Some(project) = self.projects.iter().find(|p| p.id == project_id) else {
            return false;
        };
        self.active_board_id = project.boards.first().map(|b| b.id);
        self.active_project_id = Some(project_id);
        true
    }

    pub fn select_board(&mut self, board_id: Uuid) -> bool {
        let Some(project) = self
            .projects
            .iter()
            .find(|p| p.boards.iter().any(|b| b.id == board_id))
        else {
            return false;
        };
        self.active_project_id = Some(project.id);
        self.active_board_id = Some(board_id);
        true
    }

    pub fn active_project(&self) -> Option<&Project> {
        let id = self.active_project_id?;
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn active_board(&self) -> Option<&Board> {
        let id = self.active_board_id?;
        self.boards().find(|b| b.id == id)
    }

    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.projects.iter().flat_map(|p| p.boards.iter())
    }

    pub fn project_of_board(&self, board_id: Uuid) -> Option<&Project> {
        self.projects
            .iter()
            .find(|p| p.boards.iter().any(|b| b.id == board_id))
    }

    pub fn board(&self, board_id: Uuid) -> Option<&Board> {
        self.boards().find(|b| b.id == board_id)
    }

    pub fn board_mut(&mut self, board_id: Uuid) -> Option<&mut Board> {
        self.projects
            .iter_mut()
            .flat_map(|p| p.boards.iter_mut())
            .find(|b| b.id == board_id)
    }

    /// Board owning the given column.
    pub fn board_of_column(&self, column_id: Uuid) -> Option<&Board> {
        self.boards()
            .find(|b| b.columns.iter().any(|c| c.id == column_id))
    }

    pub fn column(&self, column_id: Uuid) -> Option<&Column> {
        self.boards()
            .flat_map(|b| b.columns.iter())
            .find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: Uuid) -> Option<&mut Column> {
        self.projects
            .iter_mut()
            .flat_map(|p| p.boards.iter_mut())
            .flat_map(|b| b.columns.iter_mut())
            .find(|c| c.id == column_id)
    }

    pub fn task(&self, task_id: Uuid) -> Option<&Task> {
        self.boards()
            .flat_map(|b| b.columns.iter())
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: Uuid) -> Option<&mut Task> {
        self.projects
            .iter_mut()
            .flat_map(|p| p.boards.iter_mut())
            .flat_map(|b| b.columns.iter_mut())
            .flat_map(|c| c.tasks.iter_mut())
            .find(|t| t.id == task_id)
    }

    /// Column currently holding the task.
    pub fn column_of_task(&self, task_id: Uuid) -> Option<&Column> {
        self.boards()
            .flat_map(|b| b.columns.iter())
            .find(|c| c.tasks.iter().any(|t| t.id == task_id))
    }

    /// Detaches a task from whichever column holds it.
    pub fn take_task(&mut self, task_id: Uuid) -> Option<Task> {
        for project in &mut self.projects {
            for board in &mut project.boards {
                for column in &mut board.columns {
                    if let Some(index) = column.tasks.iter().position(|t| t.id == task_id) {
                        return Some(column.tasks.remove(index));
                    }
                }
            }
        }
        None
    }

    /// Workspace-wide title check, case-insensitive on trimmed input.
    pub fn title_in_use(&self, title: &str, exclude: Option<Uuid>) -> bool {
        let needle = title.trim().to_lowercase();
        self.all_tasks().any(|t| {
            Some(t.id) != exclude && t.title.trim().to_lowercase() == needle
        })
    }

    /// Workspace-wide key check, case-insensitive.
    pub fn key_in_use(&self, key: &str, exclude: Option<Uuid>) -> bool {
        let needle = key.trim().to_lowercase();
        self.all_tasks()
            .any(|t| Some(t.id) != exclude && t.key.to_lowercase() == needle)
    }

    fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.boards()
            .flat_map(|b| b.columns.iter())
            .flat_map(|c| c.tasks.iter())
    }
}
