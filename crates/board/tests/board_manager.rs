//! End-to-end tests of the board manager against the in-memory store.

use std::sync::{Arc, Once};

use board::{BoardManager, NewTaskInput, ValidationError};
use chrono::{NaiveDate, Utc};
use db::{
    StoreError,
    models::task::{ChecklistItem, Task, TaskPatch},
    types::ColumnCategory,
};
use test_support::{InMemoryStore, rows};
use uuid::Uuid;

struct Fixture {
    board_id: Uuid,
    todo: Uuid,
    doing: Uuid,
    done: Uuid,
    /// "Write docs", todo @ 1000.
    t1: Uuid,
    /// "Fix login", todo @ 2000.
    t2: Uuid,
    /// "In flight", doing @ 500.
    t3: Uuid,
    /// "Old release", done @ 1000.
    t4: Uuid,
}

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// One project (code ACME, counter 4), one board, columns To Do / In Progress
/// / Done with four seeded tasks.
async fn seeded() -> (BoardManager, Arc<InMemoryStore>, Fixture) {
    init_tracing();
    let owner = Uuid::new_v4();
    let mut project = rows::project(owner, "ACME");
    project.task_counter = 4;
    let mut board = rows::board(project.id, "Main", 0);
    let mut todo = rows::column(board.id, "To Do", "todo", 0);
    let mut doing = rows::column(board.id, "In Progress", "in-progress", 1);
    let mut done = rows::column(board.id, "Done", "done", 2);

    let t1 = rows::task(todo.id, "ACME-1", "Write docs", 1000.0);
    let t2 = rows::task(todo.id, "ACME-2", "Fix login", 2000.0);
    let t3 = rows::task(doing.id, "ACME-3", "In flight", 500.0);
    let t4 = rows::task(done.id, "ACME-4", "Old release", 1000.0);
    let fx = Fixture {
        board_id: board.id,
        todo: todo.id,
        doing: doing.id,
        done: done.id,
        t1: t1.id,
        t2: t2.id,
        t3: t3.id,
        t4: t4.id,
    };
    todo.tasks = vec![t1, t2];
    doing.tasks = vec![t3];
    done.tasks = vec![t4];
    board.columns = vec![todo, doing, done];
    project.boards = vec![board];

    let store = Arc::new(InMemoryStore::new());
    store.seed(project).await;
    let mut manager = BoardManager::new(store.clone());
    manager.set_user(Some(owner)).await;
    (manager, store, fx)
}

fn task<'a>(manager: &'a BoardManager, id: Uuid) -> &'a Task {
    manager.state().task(id).expect("task present")
}

fn column_task_ids(manager: &BoardManager, column_id: Uuid) -> Vec<Uuid> {
    manager
        .state()
        .column(column_id)
        .expect("column present")
        .tasks
        .iter()
        .map(|t| t.id)
        .collect()
}

#[tokio::test]
async fn create_task_appends_with_step_and_minted_key() {
    let (mut manager, _store, fx) = seeded().await;
    manager
        .create_task(NewTaskInput::titled("Ship the release"))
        .await
        .expect("valid input");

    let board = manager.state().board(fx.board_id).unwrap();
    let created = board.columns[0]
        .tasks
        .iter()
        .find(|t| t.title == "Ship the release")
        .expect("lands in the first column");
    assert_eq!(created.sort_order, 3000.0);
    assert_eq!(created.key, "ACME-5");
    assert!(created.start_date.is_none());
    assert!(created.end_date.is_none());
}

#[tokio::test]
async fn create_task_rejects_duplicate_title_before_any_write() {
    let (mut manager, store, _fx) = seeded().await;
    let err = manager
        .create_task(NewTaskInput::titled("  write DOCS "))
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateTitle(_)));
    assert_eq!(store.write_attempts().await, 0);
}

#[tokio::test]
async fn create_task_rejects_duplicate_key_override() {
    let (mut manager, store, _fx) = seeded().await;
    let mut input = NewTaskInput::titled("Fresh title");
    input.key = Some("acme-2".to_string());
    let err = manager.create_task(input).await.unwrap_err();
    assert_eq!(err, ValidationError::DuplicateKey("acme-2".to_string()));
    assert_eq!(store.write_attempts().await, 0);
}

#[tokio::test]
async fn create_task_requires_a_title() {
    let (mut manager, store, _fx) = seeded().await;
    let err = manager.create_task(NewTaskInput::titled("   ")).await.unwrap_err();
    assert_eq!(err, ValidationError::MissingTitle);
    assert_eq!(store.write_attempts().await, 0);
}

#[tokio::test]
async fn moving_into_last_column_sets_order_and_end_date() {
    // "Done" holds one task at 1000; moving a task with no end date to index
    // 0 yields order 900 and today's end date.
    let (mut manager, store, fx) = seeded().await;
    manager.move_task(fx.t1, fx.done, 0).await.expect("move");

    let moved = task(&manager, fx.t1);
    assert_eq!(moved.column_id, fx.done);
    assert_eq!(moved.sort_order, 900.0);
    assert_eq!(moved.end_date, Some(today()));
    assert!(moved.start_date.is_none());
    assert_eq!(column_task_ids(&manager, fx.done), vec![fx.t1, fx.t4]);

    let row = store.task_row(fx.t1).await.unwrap();
    assert_eq!(row.column_id, fx.done);
    assert_eq!(row.sort_order, 900.0);
    assert_eq!(row.end_date, Some(today()));
}

#[tokio::test]
async fn auto_dates_fire_once_and_never_overwrite() {
    let (mut manager, _store, fx) = seeded().await;

    manager.move_task(fx.t1, fx.doing, 0).await.unwrap();
    assert_eq!(task(&manager, fx.t1).start_date, Some(today()));
    assert!(task(&manager, fx.t1).end_date.is_none());

    manager.move_task(fx.t1, fx.done, 0).await.unwrap();
    let moved = task(&manager, fx.t1);
    assert_eq!(moved.start_date, Some(today()));
    assert_eq!(moved.end_date, Some(today()));

    // Back to in-progress: both dates already set, neither is touched.
    manager.move_task(fx.t1, fx.doing, 0).await.unwrap();
    let moved = task(&manager, fx.t1);
    assert_eq!(moved.start_date, Some(today()));
    assert_eq!(moved.end_date, Some(today()));
}

#[tokio::test]
async fn reordering_within_a_column_never_auto_dates() {
    let (mut manager, _store, fx) = seeded().await;
    // t4 already sits in the last column with no end date; a same-column
    // reorder is not a column change, so no date is populated.
    manager.move_task(fx.t4, fx.done, 0).await.unwrap();
    assert!(task(&manager, fx.t4).end_date.is_none());
}

#[tokio::test]
async fn same_column_reorder_takes_edge_key() {
    let (mut manager, _store, fx) = seeded().await;
    manager.move_task(fx.t2, fx.todo, 0).await.unwrap();
    assert_eq!(task(&manager, fx.t2).sort_order, 900.0);
    assert_eq!(column_task_ids(&manager, fx.todo), vec![fx.t2, fx.t1]);
}

#[tokio::test]
async fn close_sibling_keys_renormalize_the_destination() {
    // Destination orders [1000, 1004] sit under the collision threshold and
    // renormalize to [1000, 2000]; the arriving task gets the midpoint 1500.
    init_tracing();
    let owner = Uuid::new_v4();
    let mut project = rows::project(owner, "ACME");
    let mut board = rows::board(project.id, "Main", 0);
    let mut todo = rows::column(board.id, "To Do", "todo", 0);
    let mut done = rows::column(board.id, "Done", "done", 1);
    let a = rows::task(todo.id, "ACME-1", "First", 1000.0);
    let b = rows::task(todo.id, "ACME-2", "Second", 1004.0);
    let mover = rows::task(done.id, "ACME-3", "Mover", 1000.0);
    let (a_id, b_id, mover_id, todo_id) = (a.id, b.id, mover.id, todo.id);
    todo.tasks = vec![a, b];
    done.tasks = vec![mover];
    board.columns = vec![todo, done];
    project.boards = vec![board];

    let store = Arc::new(InMemoryStore::new());
    store.seed(project).await;
    let mut manager = BoardManager::new(store.clone());
    manager.set_user(Some(owner)).await;

    manager.move_task(mover_id, todo_id, 1).await.unwrap();

    assert_eq!(task(&manager, a_id).sort_order, 1000.0);
    assert_eq!(task(&manager, mover_id).sort_order, 1500.0);
    assert_eq!(task(&manager, b_id).sort_order, 2000.0);
    assert_eq!(
        column_task_ids(&manager, todo_id),
        vec![a_id, mover_id, b_id]
    );
    assert_eq!(store.task_row(b_id).await.unwrap().sort_order, 2000.0);
}

#[tokio::test]
async fn cross_column_move_renormalizes_the_source() {
    let (mut manager, store, fx) = seeded().await;
    manager.move_task(fx.t1, fx.doing, 1).await.unwrap();
    // t2 is all that remains in To Do; its key snaps back to the base step.
    assert_eq!(task(&manager, fx.t2).sort_order, 1000.0);
    assert_eq!(store.task_row(fx.t2).await.unwrap().sort_order, 1000.0);
}

#[tokio::test]
async fn failed_move_keeps_optimistic_state_until_refresh() {
    let (mut manager, store, fx) = seeded().await;
    store
        .fail_next_writes(vec![StoreError::Request("boom".to_string())])
        .await;

    let fetches_before = store.fetch_count().await;
    manager.move_task(fx.t1, fx.doing, 0).await.unwrap();
    // No rollback and no refetch: the optimistic relocation stays visible...
    assert_eq!(store.fetch_count().await, fetches_before);
    assert_eq!(task(&manager, fx.t1).column_id, fx.doing);
    // ...but the store never saw it.
    assert_eq!(store.task_row(fx.t1).await.unwrap().column_id, fx.todo);

    manager.refresh().await;
    assert_eq!(task(&manager, fx.t1).column_id, fx.todo);
}

#[tokio::test]
async fn successful_move_reconciles_with_a_silent_refetch() {
    let (mut manager, store, fx) = seeded().await;
    let fetches_before = store.fetch_count().await;
    manager.move_task(fx.t1, fx.doing, 0).await.unwrap();
    // Reconciliation refetches without flipping the loading flag.
    assert_eq!(store.fetch_count().await, fetches_before + 1);
    assert!(!manager.state().loading);
}

#[tokio::test]
async fn update_task_column_change_lands_last_in_destination() {
    let (mut manager, _store, fx) = seeded().await;
    let patch = TaskPatch {
        column_id: Some(fx.doing),
        ..TaskPatch::default()
    };
    manager.update_task(fx.t1, patch).await.unwrap();

    let moved = task(&manager, fx.t1);
    assert_eq!(moved.column_id, fx.doing);
    // Destination max was 500; a column-change update appends at max + 100.
    assert_eq!(moved.sort_order, 600.0);
    assert_eq!(moved.start_date, Some(today()));
    assert_eq!(column_task_ids(&manager, fx.doing), vec![fx.t3, fx.t1]);
}

#[tokio::test]
async fn renaming_to_an_existing_title_is_rejected() {
    let (mut manager, store, fx) = seeded().await;
    let writes_before = store.write_attempts().await;
    let patch = TaskPatch {
        title: Some("Fix login".to_string()),
        ..TaskPatch::default()
    };
    let err = manager.update_task(fx.t1, patch).await.unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateTitle(_)));
    assert_eq!(store.write_attempts().await, writes_before);
}

#[tokio::test]
async fn rekeying_to_an_existing_key_is_rejected() {
    let (mut manager, store, fx) = seeded().await;
    let writes_before = store.write_attempts().await;
    let patch = TaskPatch {
        key: Some("acme-2".to_string()),
        ..TaskPatch::default()
    };
    let err = manager.update_task(fx.t1, patch).await.unwrap_err();
    assert_eq!(err, ValidationError::DuplicateKey("acme-2".to_string()));
    assert_eq!(store.write_attempts().await, writes_before);
    // A task may keep its own key through an unrelated patch.
    let patch = TaskPatch {
        key: Some("ACME-1".to_string()),
        ..TaskPatch::default()
    };
    manager.update_task(fx.t1, patch).await.unwrap();
}

#[tokio::test]
async fn failed_update_discards_the_optimistic_change() {
    let (mut manager, store, fx) = seeded().await;
    store
        .fail_next_writes(vec![StoreError::Request("boom".to_string())])
        .await;
    let patch = TaskPatch {
        title: Some("Rewritten".to_string()),
        ..TaskPatch::default()
    };
    manager.update_task(fx.t1, patch).await.unwrap();
    // Full reload restored the authoritative title.
    assert_eq!(task(&manager, fx.t1).title, "Write docs");
}

#[tokio::test]
async fn checklist_toggle_persists_the_whole_list() {
    let (mut manager, store, fx) = seeded().await;
    let item_a = Uuid::new_v4();
    let item_b = Uuid::new_v4();
    let checklist = vec![
        ChecklistItem {
            id: item_a,
            title: "step one".to_string(),
            done: false,
        },
        ChecklistItem {
            id: item_b,
            title: "step two".to_string(),
            done: true,
        },
    ];
    let patch = TaskPatch {
        checklist: Some(checklist),
        ..TaskPatch::default()
    };
    manager.update_task(fx.t1, patch).await.unwrap();

    manager
        .toggle_task_checklist_item(fx.t1, item_a)
        .await
        .unwrap();
    let items = &task(&manager, fx.t1).checklist;
    assert!(items.iter().find(|i| i.id == item_a).unwrap().done);
    assert!(items.iter().find(|i| i.id == item_b).unwrap().done);

    let row = store.task_row(fx.t1).await.unwrap();
    let persisted = db::mapper::parse_checklist(&row.checklist);
    assert!(persisted.iter().find(|i| i.id == item_a).unwrap().done);
}

#[tokio::test]
async fn failed_checklist_toggle_reloads_ground_truth() {
    let (mut manager, store, fx) = seeded().await;
    let item = Uuid::new_v4();
    let patch = TaskPatch {
        checklist: Some(vec![ChecklistItem {
            id: item,
            title: "only step".to_string(),
            done: false,
        }]),
        ..TaskPatch::default()
    };
    manager.update_task(fx.t1, patch).await.unwrap();

    store
        .fail_next_writes(vec![StoreError::Request("boom".to_string())])
        .await;
    manager.toggle_task_checklist_item(fx.t1, item).await.unwrap();
    assert!(!task(&manager, fx.t1).checklist[0].done);
}

#[tokio::test]
async fn deleting_the_only_board_is_refused() {
    let (mut manager, store, fx) = seeded().await;
    let writes_before = store.write_attempts().await;
    let err = manager.delete_board(fx.board_id).await.unwrap_err();
    assert_eq!(err, ValidationError::LastBoard);
    assert_eq!(store.write_attempts().await, writes_before);
    let project = &manager.state().projects[0];
    assert_eq!(project.boards.len(), 1);
}

#[tokio::test]
async fn delete_task_removes_it_everywhere() {
    let (mut manager, store, fx) = seeded().await;
    manager.delete_task(fx.t3).await.unwrap();
    assert!(manager.state().task(fx.t3).is_none());
    assert!(store.task_row(fx.t3).await.is_none());
}

#[tokio::test]
async fn delete_column_cascades_to_its_tasks() {
    let (mut manager, _store, fx) = seeded().await;
    manager.delete_column(fx.todo).await.unwrap();
    assert!(manager.state().column(fx.todo).is_none());
    assert!(manager.state().task(fx.t1).is_none());
    assert!(manager.state().task(fx.t2).is_none());
}

#[tokio::test]
async fn new_columns_prefer_unused_palette_colors() {
    let (mut manager, _store, fx) = seeded().await;
    manager
        .create_column("Review", ColumnCategory::Other, Some(3))
        .await
        .unwrap();
    let board = manager.state().board(fx.board_id).unwrap();
    let review = board.columns.iter().find(|c| c.name == "Review").unwrap();
    // Seeded columns all use the first palette color.
    assert_eq!(review.color, "#0ea5e9");
    assert_eq!(review.position, 3);
    assert_eq!(review.slug, "review");
    assert_eq!(review.wip_limit, Some(3));
}

#[tokio::test]
async fn reorder_columns_reassigns_positions() {
    let (mut manager, _store, fx) = seeded().await;
    manager
        .reorder_columns(fx.board_id, &[fx.done, fx.todo, fx.doing])
        .await
        .unwrap();
    let board = manager.state().board(fx.board_id).unwrap();
    let ids: Vec<Uuid> = board.columns.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![fx.done, fx.todo, fx.doing]);
    let positions: Vec<i32> = board.columns.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[tokio::test]
async fn reorder_rejects_a_non_permutation() {
    let (mut manager, _store, fx) = seeded().await;
    let err = manager
        .reorder_columns(fx.board_id, &[fx.todo])
        .await
        .unwrap_err();
    assert_eq!(err, ValidationError::UnknownColumn);
}

#[tokio::test]
async fn column_color_must_come_from_the_palette() {
    let (mut manager, _store, fx) = seeded().await;
    let err = manager
        .update_column_color(fx.todo, "#bada55")
        .await
        .unwrap_err();
    assert_eq!(err, ValidationError::UnknownColor("#bada55".to_string()));

    manager.update_column_color(fx.todo, "#10b981").await.unwrap();
    assert_eq!(
        manager.state().column(fx.todo).unwrap().color,
        "#10b981"
    );
}

#[tokio::test]
async fn rename_column_rederives_the_slug() {
    let (mut manager, _store, fx) = seeded().await;
    manager
        .rename_column(fx.doing, "Code Review")
        .await
        .unwrap();
    let column = manager.state().column(fx.doing).unwrap();
    assert_eq!(column.name, "Code Review");
    assert_eq!(column.slug, "code-review");
}

#[tokio::test]
async fn board_selection_survives_a_refresh() {
    let (mut manager, _store, fx) = seeded().await;
    manager.create_board("Second", None).await.unwrap();
    let second_id = manager
        .state()
        .projects[0]
        .boards
        .iter()
        .find(|b| b.name == "Second")
        .unwrap()
        .id;

    manager.select_board(second_id).unwrap();
    manager.refresh().await;
    assert_eq!(manager.state().active_board_id, Some(second_id));

    manager.delete_board(second_id).await.unwrap();
    // The deleted board's id is gone; selection falls back to the first.
    assert_eq!(manager.state().active_board_id, Some(fx.board_id));
}

#[tokio::test]
async fn signing_out_clears_all_state() {
    let (mut manager, _store, _fx) = seeded().await;
    assert!(manager.user_id().is_some());
    assert!(!manager.state().projects.is_empty());
    manager.set_user(None).await;
    assert!(manager.user_id().is_none());
    assert!(manager.state().projects.is_empty());
    assert!(manager.state().active_project_id.is_none());
    assert!(manager.state().active_board_id.is_none());
}

#[tokio::test]
async fn empty_workspace_bootstraps_a_default_project_and_board() {
    init_tracing();
    let store = Arc::new(InMemoryStore::new());
    let mut manager = BoardManager::new(store.clone());
    manager.set_user(Some(Uuid::new_v4())).await;

    let state = manager.state();
    assert_eq!(state.projects.len(), 1);
    let project = &state.projects[0];
    assert_eq!(project.name, "My Project");
    assert_eq!(project.code, "MYP");
    assert_eq!(project.boards.len(), 1);
    assert!(project.boards[0].is_default);
    assert_eq!(state.active_project_id, Some(project.id));
    assert_eq!(state.active_board_id, Some(project.boards[0].id));
}

#[tokio::test]
async fn bootstrap_retries_code_conflicts_with_a_suffix() {
    init_tracing();
    let store = Arc::new(InMemoryStore::new());
    store
        .fail_next_writes(vec![
            StoreError::UniqueViolation {
                field: "code".to_string(),
            },
            StoreError::UniqueViolation {
                field: "code".to_string(),
            },
        ])
        .await;
    let mut manager = BoardManager::new(store.clone());
    manager.set_user(Some(Uuid::new_v4())).await;

    let project = &manager.state().projects[0];
    assert!(project.code.starts_with("MYP"));
    assert_ne!(project.code, "MYP");
}

#[tokio::test]
async fn bootstrap_gives_up_silently_after_five_attempts() {
    init_tracing();
    let store = Arc::new(InMemoryStore::new());
    let conflicts = (0..5)
        .map(|_| StoreError::UniqueViolation {
            field: "code".to_string(),
        })
        .collect();
    store.fail_next_writes(conflicts).await;
    let mut manager = BoardManager::new(store.clone());
    manager.set_user(Some(Uuid::new_v4())).await;

    assert!(manager.state().projects.is_empty());
    assert!(!manager.state().loading);
    // Five project inserts, no board insert.
    assert_eq!(store.write_attempts().await, 5);
}

#[tokio::test]
async fn create_board_appends_to_the_active_project() {
    let (mut manager, _store, _fx) = seeded().await;
    manager
        .create_board("Roadmap", Some("quarter planning".to_string()))
        .await
        .unwrap();
    let project = &manager.state().projects[0];
    assert_eq!(project.boards.len(), 2);
    let board = project.boards.iter().find(|b| b.name == "Roadmap").unwrap();
    assert_eq!(board.description.as_deref(), Some("quarter planning"));
    assert!(!board.is_default);
}

#[tokio::test]
async fn rename_board_round_trips() {
    let (mut manager, _store, fx) = seeded().await;
    manager.rename_board(fx.board_id, "Delivery").await.unwrap();
    assert_eq!(
        manager.state().board(fx.board_id).unwrap().name,
        "Delivery"
    );
    let err = manager.rename_board(fx.board_id, "  ").await.unwrap_err();
    assert_eq!(err, ValidationError::MissingName);
}

#[tokio::test]
async fn operations_require_an_authenticated_user() {
    let store = Arc::new(InMemoryStore::new());
    let mut manager = BoardManager::new(store);
    let err = manager
        .create_task(NewTaskInput::titled("Orphan"))
        .await
        .unwrap_err();
    assert_eq!(err, ValidationError::NoUser);
}
