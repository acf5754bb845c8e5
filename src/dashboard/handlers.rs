use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::SessionUser,
    dashboard::dto::DashboardView,
    error::AppError,
    state::AppState,
    tasks::repo,
};

const RECENT_LIMIT: i64 = 5;
const UPCOMING_HORIZON_DAYS: i32 = 7;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard_page))
}

/// GET /dashboard. Pure read side: live counts plus the five newest
/// tasks and the open ones due within a week, recomputed per request.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn dashboard_page(
    State(state): State<AppState>,
    user: SessionUser,
) -> Result<Json<DashboardView>, AppError> {
    let stats = repo::statistics(&state.db, user.id).await?;
    let recent = repo::recent(&state.db, user.id, RECENT_LIMIT).await?;
    let upcoming = repo::upcoming(&state.db, user.id, UPCOMING_HORIZON_DAYS).await?;

    let today = OffsetDateTime::now_utc().date();
    Ok(Json(DashboardView::assemble(
        &user, stats, recent, upcoming, today,
    )))
}
