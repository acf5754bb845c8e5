use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::repo;
use crate::auth::repo::User;
use crate::error::AppError;
use crate::state::AppState;

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Key derived from the owner and the current time, so consecutive
/// uploads never collide on a name.
fn photo_key(user_id: Uuid, uploaded_at: i64, ext: &str) -> String {
    format!("profile_{}_{}.{}", user_id, uploaded_at, ext)
}

/// Store a new profile photo and repoint the user record at it.
///
/// Ordering matters: the file is written before the row moves, and the
/// old file is only removed after the row update succeeds, so a failure
/// partway never leaves the record pointing at a missing file.
pub async fn replace_photo(
    st: &AppState,
    user: &User,
    body: Bytes,
    content_type: &str,
) -> Result<String, AppError> {
    let ext = ext_from_mime(content_type).ok_or_else(|| {
        AppError::validation(
            "profile_photo",
            "Invalid file type. Please upload JPEG, PNG, or GIF images only.",
        )
    })?;

    let key = photo_key(user.id, OffsetDateTime::now_utc().unix_timestamp(), ext);
    st.storage
        .put_object(&key, body)
        .await
        .with_context(|| format!("put_object {}", key))?;

    repo::set_photo(&st.db, user.id, &key).await?;
    info!(user_id = %user.id, %key, "profile photo replaced");

    if let Some(old) = &user.profile_photo {
        if let Err(e) = st.storage.delete_object(old).await {
            warn!(error = %e, key = %old, "old profile photo left behind");
        }
    }

    Ok(key)
}

#[cfg(test)]
mod photo_tests {
    use super::*;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/gif"), Some("gif"));
        assert_eq!(ext_from_mime("image/webp"), None);
        assert_eq!(ext_from_mime("application/octet-stream"), None);
        assert_eq!(ext_from_mime("text/html"), None);
    }

    #[test]
    fn key_carries_owner_and_time() {
        let user_id = Uuid::new_v4();
        let key = photo_key(user_id, 1_767_225_600, "png");
        assert_eq!(key, format!("profile_{}_1767225600.png", user_id));
    }

    #[test]
    fn keys_differ_across_uploads() {
        let user_id = Uuid::new_v4();
        let a = photo_key(user_id, 100, "jpg");
        let b = photo_key(user_id, 101, "jpg");
        assert_ne!(a, b);
    }
}
