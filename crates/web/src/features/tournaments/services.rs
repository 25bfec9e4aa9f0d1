use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storage::{
    dto::tournament::BracketResponse,
    error::Result,
    models::{BracketSlot, Tournament, TournamentParticipant},
    repository::tournament::TournamentRepository,
    services::bracket,
};
use uuid::Uuid;

pub async fn find_tournament(pool: &PgPool, tournament_id: Uuid) -> Result<Tournament> {
    let repo = TournamentRepository::new(pool);
    repo.find(tournament_id).await
}

/// Full bracket snapshot: tournament, cells ordered by (round, position)
/// with embedded match results, participants ordered by seed.
pub async fn get_bracket(pool: &PgPool, tournament_id: Uuid) -> Result<BracketResponse> {
    let repo = TournamentRepository::new(pool);

    let tournament = repo.find(tournament_id).await?;
    let slots = repo.list_slots(tournament_id).await?;
    let matches = repo.matches_for_tournament(tournament_id).await?;
    let participants = repo.list_participants(tournament_id).await?;

    Ok(BracketResponse::assemble(
        tournament,
        slots,
        matches,
        participants,
    ))
}

pub async fn report_result(
    pool: &PgPool,
    tournament: &Tournament,
    bracket_id: Uuid,
    winner_id: Uuid,
    score: Option<String>,
    now: DateTime<Utc>,
) -> Result<BracketSlot> {
    bracket::report_result(pool, tournament, bracket_id, winner_id, score, now).await
}

pub async fn register(
    pool: &PgPool,
    tournament_id: Uuid,
    profile_id: Uuid,
    now: DateTime<Utc>,
) -> Result<TournamentParticipant> {
    bracket::register(pool, tournament_id, profile_id, now).await
}

pub async fn start(pool: &PgPool, tournament_id: Uuid) -> Result<Vec<BracketSlot>> {
    bracket::start(pool, tournament_id).await
}
