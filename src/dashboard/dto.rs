use serde::Serialize;
use time::Date;
use uuid::Uuid;

use crate::auth::SessionUser;
use crate::tasks::dto::TaskView;
use crate::tasks::repo::{Task, TaskStats};

#[derive(Debug, Serialize)]
pub struct DisplayUser {
    pub name: String,
    pub email: String,
}

/// An open task inside the dashboard's due-soon window, annotated with
/// how many whole days remain. Zero means due today.
#[derive(Debug, Serialize)]
pub struct UpcomingTaskView {
    pub id: Uuid,
    pub title: String,
    pub due_date: Date,
    pub days_left: i64,
}

pub(crate) fn days_left(due: Date, today: Date) -> i64 {
    (due - today).whole_days()
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub user: DisplayUser,
    pub stats: TaskStats,
    pub recent: Vec<TaskView>,
    pub upcoming: Vec<UpcomingTaskView>,
}

impl DashboardView {
    pub fn assemble(
        user: &SessionUser,
        stats: TaskStats,
        recent: Vec<Task>,
        upcoming: Vec<Task>,
        today: Date,
    ) -> Self {
        Self {
            user: DisplayUser {
                name: user.name.clone(),
                email: user.email.clone(),
            },
            stats,
            recent: recent.into_iter().map(TaskView::from).collect(),
            // The upcoming query only returns rows with a due date.
            upcoming: upcoming
                .into_iter()
                .filter_map(|t| {
                    let due = t.due_date?;
                    Some(UpcomingTaskView {
                        id: t.id,
                        title: t.title,
                        due_date: due,
                        days_left: days_left(due, today),
                    })
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    use crate::tasks::repo::TaskStatus;

    fn task(title: &str, due: Option<Date>) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            due_date: due,
            status: TaskStatus::Pending,
            created_at: datetime!(2026-08-01 09:00 UTC),
        }
    }

    #[test]
    fn days_left_counts_whole_days() {
        let today = date!(2026 - 08 - 04);
        assert_eq!(days_left(today, today), 0);
        assert_eq!(days_left(date!(2026 - 08 - 06), today), 2);
        assert_eq!(days_left(date!(2026 - 08 - 11), today), 7);
    }

    #[test]
    fn assemble_annotates_upcoming_with_days_left() {
        let user = SessionUser {
            id: Uuid::new_v4(),
            name: "Jo".into(),
            email: "jo@example.com".into(),
        };
        let stats = TaskStats {
            total: 2,
            completed: 0,
            pending: 2,
            overdue: 0,
        };
        let today = date!(2026 - 08 - 04);
        let upcoming = vec![task("Pay rent", Some(date!(2026 - 08 - 06)))];

        let view = DashboardView::assemble(&user, stats, vec![], upcoming, today);
        assert_eq!(view.upcoming.len(), 1);
        assert_eq!(view.upcoming[0].title, "Pay rent");
        assert_eq!(view.upcoming[0].days_left, 2);
        assert_eq!(view.user.name, "Jo");
    }

    #[test]
    fn stats_always_balance() {
        let stats = TaskStats {
            total: 5,
            completed: 3,
            pending: 2,
            overdue: 1,
        };
        assert_eq!(stats.total, stats.completed + stats.pending);
    }
}
