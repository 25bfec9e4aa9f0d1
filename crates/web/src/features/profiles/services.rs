use sqlx::PgPool;
use storage::{
    error::{Result, StorageError},
    models::{PlayerProfile, ProfileVisibility},
    repository::profile::ProfileRepository,
};
use uuid::Uuid;

/// Public profile read. Private profiles are indistinguishable from absent
/// ones.
pub async fn get_profile(pool: &PgPool, profile_id: Uuid) -> Result<PlayerProfile> {
    let profile = ProfileRepository::new(pool).find_player(profile_id).await?;

    if profile.visibility == ProfileVisibility::Private {
        return Err(StorageError::NotFound);
    }

    Ok(profile)
}
