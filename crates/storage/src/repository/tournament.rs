use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{BracketSlot, MatchRecord, Tournament, TournamentParticipant};

pub struct TournamentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TournamentRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, tournament_id: Uuid) -> Result<Tournament> {
        let tournament = sqlx::query_as::<_, Tournament>(
            r#"
            SELECT tournament_id, sport_id, organizer_id, name, status,
                   max_players, registration_end, winner_id, created_at
            FROM tournaments
            WHERE tournament_id = $1
            "#,
        )
        .bind(tournament_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(tournament)
    }

    pub async fn list_slots(&self, tournament_id: Uuid) -> Result<Vec<BracketSlot>> {
        let slots = sqlx::query_as::<_, BracketSlot>(
            r#"
            SELECT bracket_id, tournament_id, round, position,
                   player1_id, player2_id, winner_id
            FROM tournament_brackets
            WHERE tournament_id = $1
            ORDER BY round, position
            "#,
        )
        .bind(tournament_id)
        .fetch_all(self.pool)
        .await?;

        Ok(slots)
    }

    pub async fn list_participants(&self, tournament_id: Uuid) -> Result<Vec<TournamentParticipant>> {
        let participants = sqlx::query_as::<_, TournamentParticipant>(
            r#"
            SELECT participant_id, tournament_id, profile_id, seed,
                   eliminated, final_position, registered_at
            FROM tournament_participants
            WHERE tournament_id = $1
            ORDER BY seed
            "#,
        )
        .bind(tournament_id)
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    pub async fn matches_for_tournament(&self, tournament_id: Uuid) -> Result<Vec<MatchRecord>> {
        let matches = sqlx::query_as::<_, MatchRecord>(
            r#"
            SELECT m.match_id, m.bracket_id, m.player1_id, m.player2_id, m.score,
                   m.player1_result, m.player2_result,
                   m.player1_confirmed, m.player2_confirmed, m.played_at
            FROM matches m
            INNER JOIN tournament_brackets b ON b.bracket_id = m.bracket_id
            WHERE b.tournament_id = $1
            "#,
        )
        .bind(tournament_id)
        .fetch_all(self.pool)
        .await?;

        Ok(matches)
    }
}
