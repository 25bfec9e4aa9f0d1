use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::services::skill_score::TechniqueAggregate;

pub struct TechniqueScoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TechniqueScoreRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Full upsert of one technique rollup. The calculator recomputes the
    /// whole window each time, so existing values are simply replaced.
    pub async fn upsert(
        &self,
        sport_profile_id: Uuid,
        aggregate: &TechniqueAggregate,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO technique_scores
                (sport_profile_id, technique_id, best_score, average_score,
                 analysis_count, last_analysis_id, last_analysis_at, score_history, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (sport_profile_id, technique_id) DO UPDATE SET
                best_score = EXCLUDED.best_score,
                average_score = EXCLUDED.average_score,
                analysis_count = EXCLUDED.analysis_count,
                last_analysis_id = EXCLUDED.last_analysis_id,
                last_analysis_at = EXCLUDED.last_analysis_at,
                score_history = EXCLUDED.score_history,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(sport_profile_id)
        .bind(aggregate.technique_id)
        .bind(aggregate.best_score)
        .bind(aggregate.average_score)
        .bind(aggregate.analysis_count)
        .bind(aggregate.last_analysis_id)
        .bind(aggregate.last_analysis_at)
        .bind(sqlx::types::Json(&aggregate.history))
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
