use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storage::{
    dto::ranking::{LeaderboardEntry, LeaderboardFilter, RecomputeSummary},
    error::Result,
    repository::ranking::RankingRepository,
    services::rankings,
};

/// Get the leaderboard for one sport, globally or scoped to a country.
pub async fn get_leaderboard(
    pool: &PgPool,
    filter: &LeaderboardFilter,
) -> Result<(Vec<LeaderboardEntry>, i64)> {
    let repo = RankingRepository::new(pool);
    repo.leaderboard(filter).await
}

/// Admin-triggered run of the full decay + ranking + sync batch.
pub async fn recompute(pool: &PgPool, now: DateTime<Utc>) -> Result<RecomputeSummary> {
    rankings::compute_all_rankings(pool, now).await
}
