use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{PlayerProfile, SkillTier, Sport, SportProfile};

pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_player(&self, profile_id: Uuid) -> Result<PlayerProfile> {
        let profile = sqlx::query_as::<_, PlayerProfile>(
            r#"
            SELECT profile_id, display_name, country, visibility, composite_score,
                   effective_score, skill_tier, global_rank, country_rank, created_at
            FROM player_profiles
            WHERE profile_id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(profile)
    }

    pub async fn find_sport_profile(
        &self,
        profile_id: Uuid,
        sport_id: Uuid,
    ) -> Result<Option<SportProfile>> {
        let profile = sqlx::query_as::<_, SportProfile>(
            r#"
            SELECT sport_profile_id, profile_id, sport_id, composite_score,
                   effective_score, skill_tier, total_analyses, total_techniques,
                   global_rank, country_rank, last_score_update
            FROM sport_profiles
            WHERE profile_id = $1 AND sport_id = $2
            "#,
        )
        .bind(profile_id)
        .bind(sport_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn list_active_sports(&self) -> Result<Vec<Sport>> {
        let sports = sqlx::query_as::<_, Sport>(
            r#"
            SELECT sport_id, slug, name, active
            FROM sports
            WHERE active
            ORDER BY slug
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(sports)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_sport_scores(
        &self,
        sport_profile_id: Uuid,
        composite_score: Option<f64>,
        effective_score: Option<f64>,
        skill_tier: SkillTier,
        total_analyses: i32,
        total_techniques: i32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sport_profiles
            SET composite_score = $2, effective_score = $3, skill_tier = $4,
                total_analyses = $5, total_techniques = $6, last_score_update = $7
            WHERE sport_profile_id = $1
            "#,
        )
        .bind(sport_profile_id)
        .bind(composite_score)
        .bind(effective_score)
        .bind(skill_tier)
        .bind(total_analyses)
        .bind(total_techniques)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
