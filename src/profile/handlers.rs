use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Form, Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        repo::{Session, User},
        services::is_valid_email,
        SessionUser,
    },
    error::AppError,
    profile::{
        dto::{ProfileForm, ProfilePageView},
        repo, services,
    },
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile_page).post(update_profile))
        .route("/profile/photo", post(upload_photo))
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024)) // 5MB
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn profile_page(
    State(state): State<AppState>,
    user: SessionUser,
) -> Result<Json<ProfilePageView>, AppError> {
    let record = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(ProfilePageView::new(record, None)))
}

/// POST /profile. Rewrites name and email, then refreshes the display
/// fields cached on the user's sessions so the navigation bar agrees
/// with the record it just changed.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: SessionUser,
    Form(mut form): Form<ProfileForm>,
) -> Result<Json<ProfilePageView>, AppError> {
    form.name = form.name.trim().to_string();
    form.email = form.email.trim().to_lowercase();

    if form.name.is_empty() {
        return Err(AppError::validation("name", "Name and email are required."));
    }
    if form.email.is_empty() {
        return Err(AppError::validation("email", "Name and email are required."));
    }
    if !is_valid_email(&form.email) {
        warn!(email = %form.email, "invalid email");
        return Err(AppError::validation(
            "email",
            "Please enter a valid email address.",
        ));
    }

    if repo::email_taken_by_other(&state.db, &form.email, user.id).await? {
        warn!(email = %form.email, "email taken by another user");
        return Err(AppError::DuplicateEmail);
    }

    if !repo::update_identity(&state.db, user.id, &form.name, &form.email).await? {
        return Err(AppError::NotFound);
    }
    Session::refresh_display(&state.db, user.id, &form.name, &form.email).await?;
    info!("profile updated");

    let record = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(ProfilePageView::new(
        record,
        Some("Profile updated successfully!"),
    )))
}

/// POST /profile/photo (multipart, field `profile_photo`).
#[instrument(skip(state, user, mp), fields(user_id = %user.id))]
pub async fn upload_photo(
    State(state): State<AppState>,
    user: SessionUser,
    mut mp: Multipart,
) -> Result<Json<ProfilePageView>, AppError> {
    let mut upload: Option<(Bytes, String)> = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("profile_photo") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field
                .bytes()
                .await
                .map_err(|e| anyhow::anyhow!("read profile_photo field: {e}"))?;
            upload = Some((data, content_type));
        }
    }

    let (body, content_type) = upload.ok_or_else(|| {
        AppError::validation("profile_photo", "A photo file is required.")
    })?;

    let record = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or(AppError::NotFound)?;
    services::replace_photo(&state, &record, body, &content_type).await?;

    let refreshed = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(ProfilePageView::new(
        refreshed,
        Some("Profile photo updated successfully!"),
    )))
}
