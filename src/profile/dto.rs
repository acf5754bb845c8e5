use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::User;

/// Form body for the profile update.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_photo: Option<String>,
    pub member_since: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct ProfilePageView {
    pub message: Option<String>,
    pub profile: ProfileView,
}

impl ProfilePageView {
    pub fn new(user: User, message: Option<&str>) -> Self {
        Self {
            message: message.map(str::to_string),
            profile: ProfileView {
                id: user.id,
                name: user.name,
                email: user.email,
                profile_photo: user.profile_photo,
                member_since: user.created_at,
            },
        }
    }
}
