use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use tracing::{debug, error};
use uuid::Uuid;

use crate::auth::repo::Session;
use crate::auth::services::cookie_token;
use crate::state::AppState;

/// The authenticated caller, resolved from the session cookie.
///
/// Every page handler takes this as an argument; a request without a live
/// session is bounced to the login page before any data access happens.
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_token(&parts.headers, &state.config.session.cookie_name)
            .ok_or_else(|| Redirect::to("/login"))?;

        let session = match Session::find_live(&state.db, &token).await {
            Ok(Some(s)) => s,
            Ok(None) => {
                debug!("no live session for presented cookie");
                return Err(Redirect::to("/login"));
            }
            Err(e) => {
                error!(error = %e, "session lookup failed");
                return Err(Redirect::to("/login"));
            }
        };

        Ok(SessionUser {
            id: session.user_id,
            name: session.user_name,
            email: session.user_email,
        })
    }
}
