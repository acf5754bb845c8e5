use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Completion state of a task. Stored as a boolean column; modeled as a
/// two-state enum everywhere above the row mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl From<bool> for TaskStatus {
    fn from(is_completed: bool) -> Self {
        if is_completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }
}

/// Narrows a task listing by completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    Pending,
    Completed,
}

impl TaskFilter {
    fn as_completed(self) -> bool {
        matches!(self, TaskFilter::Completed)
    }
}

/// Validated input for a create or update, produced from the raw form.
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
}

#[derive(Debug, Clone, FromRow)]
struct TaskRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    due_date: Option<Date>,
    is_completed: bool,
    created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub status: TaskStatus,
    pub created_at: OffsetDateTime,
}

impl From<TaskRow> for Task {
    fn from(r: TaskRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            description: r.description,
            due_date: r.due_date,
            status: TaskStatus::from(r.is_completed),
            created_at: r.created_at,
        }
    }
}

/// Live counts for the dashboard, recomputed on every call.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TaskStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub overdue: i64,
}

const SELECT_COLS: &str = "id, user_id, title, description, due_date, is_completed, created_at";

pub async fn create(db: &PgPool, user_id: Uuid, input: &TaskInput) -> Result<Task, sqlx::Error> {
    let row = sqlx::query_as::<_, TaskRow>(
        r#"
        INSERT INTO tasks (user_id, title, description, due_date)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, title, description, due_date, is_completed, created_at
        "#,
    )
    .bind(user_id)
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.due_date)
    .fetch_one(db)
    .await?;
    Ok(row.into())
}

/// Update title, description and due date. Returns false when the id does
/// not belong to the caller, whether or not it exists at all.
pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    task_id: Uuid,
    input: &TaskInput,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET title = $1, description = $2, due_date = $3
        WHERE id = $4 AND user_id = $5
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.due_date)
    .bind(task_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(db: &PgPool, user_id: Uuid, task_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM tasks WHERE id = $1 AND user_id = $2"#)
        .bind(task_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Flip the completion flag in place. Negating inside the statement keeps
/// two concurrent toggles from racing through a stale read.
pub async fn toggle(db: &PgPool, user_id: Uuid, task_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET is_completed = NOT is_completed
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(task_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get(db: &PgPool, user_id: Uuid, task_id: Uuid) -> Result<Option<Task>, sqlx::Error> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        r#"SELECT {SELECT_COLS} FROM tasks WHERE id = $1 AND user_id = $2"#
    ))
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(Task::from))
}

/// All of the caller's tasks, newest first, optionally narrowed by state.
pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    filter: Option<TaskFilter>,
) -> Result<Vec<Task>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        r#"
        SELECT {SELECT_COLS}
        FROM tasks
        WHERE user_id = $1 AND ($2::boolean IS NULL OR is_completed = $2)
        ORDER BY created_at DESC
        "#
    ))
    .bind(user_id)
    .bind(filter.map(TaskFilter::as_completed))
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Task::from).collect())
}

pub async fn recent(db: &PgPool, user_id: Uuid, limit: i64) -> Result<Vec<Task>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        r#"
        SELECT {SELECT_COLS}
        FROM tasks
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Task::from).collect())
}

pub async fn statistics(db: &PgPool, user_id: Uuid) -> Result<TaskStats, sqlx::Error> {
    sqlx::query_as::<_, TaskStats>(
        r#"
        SELECT COUNT(*) AS total,
               COALESCE(SUM(CASE WHEN is_completed THEN 1 ELSE 0 END), 0) AS completed,
               COALESCE(SUM(CASE WHEN NOT is_completed THEN 1 ELSE 0 END), 0) AS pending,
               COALESCE(SUM(CASE WHEN due_date < CURRENT_DATE AND NOT is_completed
                                 THEN 1 ELSE 0 END), 0) AS overdue
        FROM tasks
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await
}

/// Open tasks due within the next `horizon_days` days, inclusive of both
/// today and the horizon, soonest first.
pub async fn upcoming(
    db: &PgPool,
    user_id: Uuid,
    horizon_days: i32,
) -> Result<Vec<Task>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        r#"
        SELECT {SELECT_COLS}
        FROM tasks
        WHERE user_id = $1
          AND due_date BETWEEN CURRENT_DATE AND CURRENT_DATE + $2::int
          AND NOT is_completed
        ORDER BY due_date ASC
        "#
    ))
    .bind(user_id)
    .bind(horizon_days)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Task::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn toggled_is_its_own_inverse() {
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Pending);
        for status in [TaskStatus::Pending, TaskStatus::Completed] {
            assert_eq!(status.toggled().toggled(), status);
        }
    }

    #[test]
    fn status_from_flag() {
        assert_eq!(TaskStatus::from(false), TaskStatus::Pending);
        assert_eq!(TaskStatus::from(true), TaskStatus::Completed);
    }

    #[test]
    fn filter_maps_to_flag() {
        assert!(!TaskFilter::Pending.as_completed());
        assert!(TaskFilter::Completed.as_completed());
    }

    #[test]
    fn row_conversion_carries_status() {
        let row = TaskRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Buy milk".into(),
            description: None,
            due_date: Some(date!(2099 - 01 - 01)),
            is_completed: true,
            created_at: datetime!(2026-08-01 12:00 UTC),
        };
        let task = Task::from(row);
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.due_date, Some(date!(2099 - 01 - 01)));
    }
}
