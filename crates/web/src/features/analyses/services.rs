use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storage::{
    error::Result,
    models::Analysis,
    repository::analysis::{AnalysisRepository, NewIssue},
    services::skill_score,
};
use uuid::Uuid;

pub async fn find_analysis(pool: &PgPool, analysis_id: Uuid) -> Result<Analysis> {
    let repo = AnalysisRepository::new(pool);
    repo.find_by_id(analysis_id).await
}

/// Record the analyzer's verdict and refresh the player's skill score for
/// the affected sport.
pub async fn complete_analysis(
    pool: &PgPool,
    analysis_id: Uuid,
    overall_score: f64,
    issues: Vec<NewIssue>,
    now: DateTime<Utc>,
) -> Result<Analysis> {
    let repo = AnalysisRepository::new(pool);

    let analysis = repo
        .mark_completed(analysis_id, overall_score, &issues, now)
        .await?;

    let sport_id = repo.sport_for_analysis(analysis_id).await?;
    skill_score::recalculate(pool, analysis.profile_id, sport_id, now).await?;

    Ok(analysis)
}
