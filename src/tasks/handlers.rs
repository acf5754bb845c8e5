use axum::{
    extract::{Query, State},
    routing::get,
    Form, Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::SessionUser,
    error::AppError,
    state::AppState,
    tasks::{
        dto::{TaskAction, TaskForm, TasksPageView, TasksQuery},
        repo,
    },
};

pub fn task_routes() -> Router<AppState> {
    Router::new().route("/tasks", get(tasks_page).post(submit_task))
}

/// GET /tasks. Runs at most one mutation named in the query string
/// (delete or toggle), then reads the list the page renders. A mutation
/// id that does not resolve within the caller's own tasks is a plain
/// not-found, whether or not the row exists for someone else.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn tasks_page(
    State(state): State<AppState>,
    user: SessionUser,
    Query(q): Query<TasksQuery>,
) -> Result<Json<TasksPageView>, AppError> {
    let mut message = None;

    if let Some(task_id) = q.delete {
        if !repo::delete(&state.db, user.id, task_id).await? {
            return Err(AppError::NotFound);
        }
        info!(%task_id, "task deleted");
        message = Some("Task deleted successfully!");
    } else if let Some(task_id) = q.toggle {
        if !repo::toggle(&state.db, user.id, task_id).await? {
            return Err(AppError::NotFound);
        }
        info!(%task_id, "task completion toggled");
        message = Some("Task status updated!");
    }

    // An unknown edit id just leaves the form in create mode.
    let edit_task = match q.edit {
        Some(task_id) => repo::get(&state.db, user.id, task_id).await?,
        None => None,
    };

    let tasks = repo::list(&state.db, user.id, q.filter).await?;
    Ok(Json(TasksPageView::new(tasks, edit_task, message)))
}

/// POST /tasks. `action=create` inserts, `action=update` rewrites the
/// named task in place.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn submit_task(
    State(state): State<AppState>,
    user: SessionUser,
    Form(form): Form<TaskForm>,
) -> Result<Json<TasksPageView>, AppError> {
    let action = form.action;
    let task_id = form.task_id;
    let input = form.into_input()?;

    let message = match action {
        TaskAction::Create => {
            let task = repo::create(&state.db, user.id, &input).await?;
            info!(task_id = %task.id, "task created");
            "Task created successfully!"
        }
        TaskAction::Update => {
            let task_id = task_id
                .ok_or_else(|| AppError::validation("task_id", "Task id is required."))?;
            if !repo::update(&state.db, user.id, task_id, &input).await? {
                return Err(AppError::NotFound);
            }
            info!(%task_id, "task updated");
            "Task updated successfully!"
        }
    };

    let tasks = repo::list(&state.db, user.id, None).await?;
    Ok(Json(TasksPageView::new(tasks, None, Some(message))))
}
