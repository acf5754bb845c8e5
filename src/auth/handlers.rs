use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::Redirect,
    routing::{get, post},
    Form, Router,
};
use anyhow::Context;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        repo::{Session, User},
        services::{
            clear_session_cookie, cookie_token, hash_password, is_valid_email, open_session,
            verify_password,
        },
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(mut form): Form<RegisterForm>,
) -> Result<(HeaderMap, Redirect), AppError> {
    form.name = form.name.trim().to_string();
    form.email = form.email.trim().to_lowercase();

    if form.name.is_empty() {
        return Err(AppError::validation("name", "Name is required."));
    }
    if !is_valid_email(&form.email) {
        warn!(email = %form.email, "invalid email");
        return Err(AppError::validation(
            "email",
            "Please enter a valid email address.",
        ));
    }
    if form.password.len() < 6 {
        warn!("password too short");
        return Err(AppError::validation(
            "password",
            "Password must be at least 6 characters long.",
        ));
    }

    if User::find_by_email(&state.db, &form.email).await?.is_some() {
        warn!(email = %form.email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let hash = hash_password(&form.password)?;
    let user = User::create(&state.db, &form.name, &form.email, &hash).await?;
    let headers = open_session(&state, &user).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((headers, Redirect::to("/dashboard")))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(mut form): Form<LoginForm>,
) -> Result<(HeaderMap, Redirect), AppError> {
    form.email = form.email.trim().to_lowercase();

    if !is_valid_email(&form.email) {
        warn!(email = %form.email, "invalid email");
        return Err(AppError::validation(
            "email",
            "Please enter a valid email address.",
        ));
    }

    // Unknown email and wrong password are deliberately the same failure.
    let user = match User::find_by_email(&state.db, &form.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %form.email, "login unknown email");
            return Err(AppError::Unauthorized);
        }
    };

    if !verify_password(&form.password, &user.password_hash)? {
        warn!(email = %form.email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized);
    }

    let headers = open_session(&state, &user).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((headers, Redirect::to("/dashboard")))
}

#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Redirect), AppError> {
    if let Some(token) = cookie_token(&headers, &state.config.session.cookie_name) {
        Session::delete(&state.db, &token).await?;
        info!("session destroyed");
    }

    let mut out = HeaderMap::new();
    out.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&clear_session_cookie(&state.config.session.cookie_name))
            .context("build logout cookie header")?,
    );
    Ok((out, Redirect::to("/login")))
}
