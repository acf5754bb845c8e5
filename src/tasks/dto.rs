use serde::{Deserialize, Serialize};
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::AppError;
use crate::tasks::repo::{Task, TaskFilter, TaskInput, TaskStatus};

/// What a POST to the tasks page is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    Create,
    Update,
}

/// Raw form body for creating or updating a task. Dates arrive as the
/// page's `YYYY-MM-DD` strings; an empty string means no due date.
#[derive(Debug, Deserialize)]
pub struct TaskForm {
    pub action: TaskAction,
    pub task_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
}

const DUE_DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

impl TaskForm {
    /// Trim and validate into repo input. Non-empty title is the only
    /// server-side rule; the stricter minimum length lives in the page
    /// script.
    pub fn into_input(self) -> Result<TaskInput, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::validation("title", "Task title is required."));
        }
        let description = match self.description.trim() {
            "" => None,
            d => Some(d.to_string()),
        };
        let due_date = parse_due_date(&self.due_date)?;
        Ok(TaskInput {
            title,
            description,
            due_date,
        })
    }
}

pub(crate) fn parse_due_date(raw: &str) -> Result<Option<Date>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Date::parse(raw, DUE_DATE_FORMAT).map(Some).map_err(|_| {
        AppError::validation("due_date", "Due date must be a valid date (YYYY-MM-DD).")
    })
}

/// Query string of the tasks page. `delete` and `toggle` request a
/// mutation before the list read; `edit` loads one task into the form.
#[derive(Debug, Default, Deserialize)]
pub struct TasksQuery {
    pub filter: Option<TaskFilter>,
    pub delete: Option<Uuid>,
    pub toggle: Option<Uuid>,
    pub edit: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub status: TaskStatus,
    pub created_at: OffsetDateTime,
}

impl From<Task> for TaskView {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            due_date: t.due_date,
            status: t.status,
            created_at: t.created_at,
        }
    }
}

/// Everything the tasks page renders: the list, its count, the task
/// loaded into the edit form (if any) and a flash message from the
/// mutation that just ran.
#[derive(Debug, Serialize)]
pub struct TasksPageView {
    pub message: Option<String>,
    pub total: usize,
    pub tasks: Vec<TaskView>,
    pub edit_task: Option<TaskView>,
}

impl TasksPageView {
    pub fn new(tasks: Vec<Task>, edit_task: Option<Task>, message: Option<&str>) -> Self {
        let tasks: Vec<TaskView> = tasks.into_iter().map(TaskView::from).collect();
        Self {
            message: message.map(str::to_string),
            total: tasks.len(),
            tasks,
            edit_task: edit_task.map(TaskView::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn form(title: &str, description: &str, due_date: &str) -> TaskForm {
        TaskForm {
            action: TaskAction::Create,
            task_id: None,
            title: title.into(),
            description: description.into(),
            due_date: due_date.into(),
        }
    }

    #[test]
    fn empty_due_date_is_absent() {
        assert_eq!(parse_due_date("").unwrap(), None);
        assert_eq!(parse_due_date("   ").unwrap(), None);
    }

    #[test]
    fn due_date_parses_page_format() {
        assert_eq!(
            parse_due_date("2099-01-01").unwrap(),
            Some(date!(2099 - 01 - 01))
        );
    }

    #[test]
    fn malformed_due_date_is_rejected() {
        assert!(parse_due_date("01/02/2026").is_err());
        assert!(parse_due_date("2026-13-40").is_err());
        assert!(parse_due_date("soon").is_err());
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = form("   ", "", "").into_input().unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "title", .. }));
    }

    #[test]
    fn one_char_title_passes_server_side() {
        // The >= 3 chars rule is client-side only; the server keeps the
        // weaker non-empty check.
        let input = form("a", "", "").into_input().unwrap();
        assert_eq!(input.title, "a");
    }

    #[test]
    fn fields_are_trimmed_and_blank_description_dropped() {
        let input = form("  Buy milk  ", "   ", "2099-01-01").into_input().unwrap();
        assert_eq!(input.title, "Buy milk");
        assert_eq!(input.description, None);
        assert_eq!(input.due_date, Some(date!(2099 - 01 - 01)));
    }

    #[test]
    fn page_view_carries_flash_and_count() {
        use time::macros::datetime;

        let tasks = vec![
            Task {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                title: "Buy milk".into(),
                description: None,
                due_date: None,
                status: TaskStatus::Pending,
                created_at: datetime!(2026-08-01 12:00 UTC),
            },
            Task {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                title: "Pay rent".into(),
                description: Some("transfer".into()),
                due_date: Some(date!(2026 - 08 - 06)),
                status: TaskStatus::Completed,
                created_at: datetime!(2026-08-02 12:00 UTC),
            },
        ];

        let view = TasksPageView::new(tasks, None, Some("Task created successfully!"));
        assert_eq!(view.total, 2);

        let v = serde_json::to_value(&view).unwrap();
        assert_eq!(v["message"], "Task created successfully!");
        assert_eq!(v["tasks"][0]["status"], "pending");
        assert_eq!(v["tasks"][1]["status"], "completed");
        assert!(v["edit_task"].is_null());
    }

    #[test]
    fn action_parses_form_values() {
        assert_eq!(
            serde_json::from_str::<TaskAction>("\"create\"").unwrap(),
            TaskAction::Create
        );
        assert_eq!(
            serde_json::from_str::<TaskAction>("\"update\"").unwrap(),
            TaskAction::Update
        );
        assert!(serde_json::from_str::<TaskAction>("\"archive\"").is_err());
    }
}
