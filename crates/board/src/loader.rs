//! Workspace loading and default-workspace bootstrap.

use db::{
    mapper,
    models::{board::CreateBoard, project::CreateProject},
};
use rand::Rng;
use uuid::Uuid;

use crate::manager::BoardManager;

const DEFAULT_PROJECT_NAME: &str = "My Project";
const DEFAULT_PROJECT_CODE: &str = "MYP";
const DEFAULT_BOARD_NAME: &str = "Main Board";

/// Bootstrap attempts before the default workspace is abandoned (log only).
const BOOTSTRAP_ATTEMPTS: usize = 5;

impl BoardManager {
    /// Refetches the workspace and replaces local state. Silent mode skips the
    /// loading flag and is used for background reconciliation after optimistic
    /// writes; the caller's project/board selection survives the refetch when
    /// those ids still exist.
    pub(crate) async fn reload(&mut self, silent: bool) {
        let Some(owner_id) = self.user_id else {
            self.state.clear();
            return;
        };
        if !silent {
            self.state.loading = true;
        }
        match self.store.fetch_workspace(owner_id).await {
            Ok(mut rows) => {
                if rows.is_empty() && self.bootstrap_workspace(owner_id).await {
                    match self.store.fetch_workspace(owner_id).await {
                        Ok(fresh) => rows = fresh,
                        Err(err) => {
                            tracing::warn!("refetch after workspace bootstrap failed: {err}")
                        }
                    }
                }
                self.state.replace(mapper::map_workspace(rows));
            }
            Err(err) => tracing::error!("workspace load failed: {err}"),
        }
        if !silent {
            self.state.loading = false;
        }
    }

    /// Synthesizes the default project and board for a user with an empty
    /// workspace. A code-uniqueness conflict retries with a randomized suffix;
    /// after [`BOOTSTRAP_ATTEMPTS`] the bootstrap is abandoned silently and the
    /// user is left with an empty workspace.
    async fn bootstrap_workspace(&self, owner_id: Uuid) -> bool {
        let mut code = DEFAULT_PROJECT_CODE.to_string();
        for attempt in 1..=BOOTSTRAP_ATTEMPTS {
            let data = CreateProject {
                owner_id,
                name: DEFAULT_PROJECT_NAME.to_string(),
                code: code.clone(),
                sort_order: 0,
            };
            match self.store.insert_project(&data).await {
                Ok(project) => {
                    let board = CreateBoard {
                        project_id: project.id,
                        name: DEFAULT_BOARD_NAME.to_string(),
                        description: None,
                        sort_order: 0,
                        is_default: true,
                    };
                    if let Err(err) = self.store.insert_board(&board).await {
                        tracing::warn!("default board creation failed: {err}");
                    }
                    return true;
                }
                Err(err) if err.is_unique_violation() => {
                    code = format!(
                        "{}{}",
                        DEFAULT_PROJECT_CODE,
                        rand::thread_rng().gen_range(10..100)
                    );
                    tracing::debug!(
                        "default project code taken (attempt {attempt}), retrying as {code}"
                    );
                }
                Err(err) => {
                    tracing::warn!("workspace bootstrap failed: {err}");
                    return false;
                }
            }
        }
        tracing::warn!("abandoning workspace bootstrap after {BOOTSTRAP_ATTEMPTS} attempts");
        false
    }
}
