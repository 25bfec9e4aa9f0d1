use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    BracketSlot, MatchOutcome, SlotState, Tournament, TournamentParticipant, TournamentStatus,
};

/// Which side of the next round's slot a promoted winner lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player1,
    Player2,
}

/// Where a decided slot's winner goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advancement {
    Promote {
        round: i32,
        position: i32,
        side: Side,
    },
    /// The decided slot was the final; the tournament completes.
    Final,
}

/// Standard single-elimination fold: round r positions 2p and 2p+1 feed
/// round r+1 position p, even position onto the first side.
pub fn advancement(round: i32, position: i32, max_round: i32) -> Advancement {
    if round >= max_round {
        return Advancement::Final;
    }

    let side = if position % 2 == 0 {
        Side::Player1
    } else {
        Side::Player2
    };

    Advancement::Promote {
        round: round + 1,
        position: position / 2,
        side,
    }
}

/// Number of rounds for a bracket of `player_count` players, or `None` if the
/// field is not a power of two of at least 2.
pub fn rounds_for(player_count: usize) -> Option<u32> {
    if player_count < 2 || !player_count.is_power_of_two() {
        return None;
    }
    Some(player_count.trailing_zeros())
}

/// A decided slot has both players populated and the winner is one of them.
/// Returns the losing player, without touching anything; callers check this
/// before writing any of the result's effects.
fn losing_player(slot: &BracketSlot, winner_id: Uuid) -> Result<Uuid> {
    if matches!(slot.state(), SlotState::Empty | SlotState::AwaitingOpponent) {
        return Err(StorageError::InvalidState(
            "el enfrentamiento aun no tiene ambos jugadores".to_string(),
        ));
    }

    let (Some(player1), Some(player2)) = (slot.player1_id, slot.player2_id) else {
        return Err(StorageError::InvalidState(
            "el enfrentamiento aun no tiene ambos jugadores".to_string(),
        ));
    };

    if winner_id != player1 && winner_id != player2 {
        return Err(StorageError::InvalidState(
            "el ganador debe ser uno de los jugadores del enfrentamiento".to_string(),
        ));
    }

    Ok(if winner_id == player1 { player2 } else { player1 })
}

fn ensure_in_progress(tournament: &Tournament) -> Result<()> {
    if tournament.status != TournamentStatus::InProgress {
        return Err(StorageError::InvalidState(
            "el torneo no esta en progreso".to_string(),
        ));
    }
    Ok(())
}

/// Records a match result and advances the bracket. All five effects (winner,
/// match upsert, elimination, advancement, completion) commit together; a
/// partial application would corrupt the bracket permanently.
///
/// Authorization (organizer or admin) is the caller's responsibility. The
/// caller's tournament only identifies the row; its status is re-checked on a
/// locked re-read inside the transaction.
pub async fn report_result(
    pool: &PgPool,
    tournament: &Tournament,
    bracket_id: Uuid,
    winner_id: Uuid,
    score: Option<String>,
    now: DateTime<Utc>,
) -> Result<BracketSlot> {
    let mut tx = pool.begin().await?;

    // The caller's snapshot may predate a concurrent report that completed
    // the tournament, so the status check runs on a locked re-read.
    let current = sqlx::query_as::<_, Tournament>(
        r#"
        SELECT tournament_id, sport_id, organizer_id, name, status,
               max_players, registration_end, winner_id, created_at
        FROM tournaments
        WHERE tournament_id = $1
        FOR UPDATE
        "#,
    )
    .bind(tournament.tournament_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(StorageError::NotFound)?;

    ensure_in_progress(&current)?;

    // Row lock serializes concurrent reports for the same cell.
    let slot = sqlx::query_as::<_, BracketSlot>(
        r#"
        SELECT bracket_id, tournament_id, round, position,
               player1_id, player2_id, winner_id
        FROM tournament_brackets
        WHERE bracket_id = $1 AND tournament_id = $2
        FOR UPDATE
        "#,
    )
    .bind(bracket_id)
    .bind(tournament.tournament_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(StorageError::NotFound)?;

    let loser_id = losing_player(&slot, winner_id)?;

    sqlx::query("UPDATE tournament_brackets SET winner_id = $2 WHERE bracket_id = $1")
        .bind(bracket_id)
        .bind(winner_id)
        .execute(&mut *tx)
        .await?;

    let (p1_result, p2_result) = if slot.player1_id == Some(winner_id) {
        (MatchOutcome::Win, MatchOutcome::Loss)
    } else {
        (MatchOutcome::Loss, MatchOutcome::Win)
    };

    // Server-authoritative result: both sides confirmed immediately.
    sqlx::query(
        r#"
        INSERT INTO matches
            (bracket_id, player1_id, player2_id, score, player1_result,
             player2_result, player1_confirmed, player2_confirmed, played_at)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE, TRUE, $7)
        ON CONFLICT (bracket_id) DO UPDATE SET
            score = EXCLUDED.score,
            player1_result = EXCLUDED.player1_result,
            player2_result = EXCLUDED.player2_result,
            player1_confirmed = TRUE,
            player2_confirmed = TRUE,
            played_at = EXCLUDED.played_at
        "#,
    )
    .bind(bracket_id)
    .bind(slot.player1_id)
    .bind(slot.player2_id)
    .bind(&score)
    .bind(p1_result)
    .bind(p2_result)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE tournament_participants
        SET eliminated = TRUE
        WHERE tournament_id = $1 AND profile_id = $2
        "#,
    )
    .bind(tournament.tournament_id)
    .bind(loser_id)
    .execute(&mut *tx)
    .await?;

    let max_round = sqlx::query_scalar::<_, i32>(
        "SELECT MAX(round) FROM tournament_brackets WHERE tournament_id = $1",
    )
    .bind(tournament.tournament_id)
    .fetch_one(&mut *tx)
    .await?;

    match advancement(slot.round, slot.position, max_round) {
        Advancement::Promote {
            round,
            position,
            side,
        } => {
            let column = match side {
                Side::Player1 => "player1_id",
                Side::Player2 => "player2_id",
            };

            let updated = sqlx::query(&format!(
                "UPDATE tournament_brackets SET {column} = $1 \
                 WHERE tournament_id = $2 AND round = $3 AND position = $4"
            ))
            .bind(winner_id)
            .bind(tournament.tournament_id)
            .bind(round)
            .bind(position)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(StorageError::InvalidState(
                    "el cuadro del torneo esta incompleto".to_string(),
                ));
            }
        }
        Advancement::Final => {
            sqlx::query(
                r#"
                UPDATE tournaments
                SET status = $2, winner_id = $3
                WHERE tournament_id = $1
                "#,
            )
            .bind(tournament.tournament_id)
            .bind(TournamentStatus::Completed)
            .bind(winner_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE tournament_participants SET final_position = 1
                WHERE tournament_id = $1 AND profile_id = $2
                "#,
            )
            .bind(tournament.tournament_id)
            .bind(winner_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE tournament_participants SET final_position = 2
                WHERE tournament_id = $1 AND profile_id = $2
                "#,
            )
            .bind(tournament.tournament_id)
            .bind(loser_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    let updated_slot = sqlx::query_as::<_, BracketSlot>(
        r#"
        SELECT bracket_id, tournament_id, round, position,
               player1_id, player2_id, winner_id
        FROM tournament_brackets
        WHERE bracket_id = $1
        "#,
    )
    .bind(bracket_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    debug_assert_eq!(updated_slot.state(), SlotState::Decided);

    Ok(updated_slot)
}

/// Registers a profile for a tournament still in registration. Capacity is
/// checked under a row lock on the tournament; duplicates are caught by the
/// (tournament, profile) uniqueness constraint so concurrent registrations
/// cannot both succeed.
pub async fn register(
    pool: &PgPool,
    tournament_id: Uuid,
    profile_id: Uuid,
    now: DateTime<Utc>,
) -> Result<TournamentParticipant> {
    let mut tx = pool.begin().await?;

    let tournament = sqlx::query_as::<_, Tournament>(
        r#"
        SELECT tournament_id, sport_id, organizer_id, name, status,
               max_players, registration_end, winner_id, created_at
        FROM tournaments
        WHERE tournament_id = $1
        FOR UPDATE
        "#,
    )
    .bind(tournament_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(StorageError::NotFound)?;

    if tournament.status != TournamentStatus::Registration {
        return Err(StorageError::InvalidState(
            "las inscripciones no estan abiertas".to_string(),
        ));
    }

    if now >= tournament.registration_end {
        return Err(StorageError::InvalidState(
            "el plazo de inscripcion ha terminado".to_string(),
        ));
    }

    let registered = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM tournament_participants WHERE tournament_id = $1",
    )
    .bind(tournament_id)
    .fetch_one(&mut *tx)
    .await?;

    if registered >= tournament.max_players as i64 {
        return Err(StorageError::InvalidState(
            "el torneo esta completo".to_string(),
        ));
    }

    let participant = sqlx::query_as::<_, TournamentParticipant>(
        r#"
        INSERT INTO tournament_participants (tournament_id, profile_id, seed, registered_at)
        VALUES ($1, $2, $3, $4)
        RETURNING participant_id, tournament_id, profile_id, seed,
                  eliminated, final_position, registered_at
        "#,
    )
    .bind(tournament_id)
    .bind(profile_id)
    .bind((registered + 1) as i32)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| StorageError::from(e).or_conflict("ya estas inscrito"))?;

    tx.commit().await?;

    Ok(participant)
}

/// Moves a tournament from registration into play, building the full
/// single-elimination tree. Round 0 pairs participants in seed order; upper
/// rounds start empty and are filled by advancement.
pub async fn start(pool: &PgPool, tournament_id: Uuid) -> Result<Vec<BracketSlot>> {
    let mut tx = pool.begin().await?;

    let tournament = sqlx::query_as::<_, Tournament>(
        r#"
        SELECT tournament_id, sport_id, organizer_id, name, status,
               max_players, registration_end, winner_id, created_at
        FROM tournaments
        WHERE tournament_id = $1
        FOR UPDATE
        "#,
    )
    .bind(tournament_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(StorageError::NotFound)?;

    if tournament.status != TournamentStatus::Registration {
        return Err(StorageError::InvalidState(
            "el torneo ya ha comenzado".to_string(),
        ));
    }

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
    .fetch_all(&mut *tx)
    .await?;

    let Some(rounds) = rounds_for(participants.len()) else {
        return Err(StorageError::InvalidState(
            "el numero de participantes debe ser una potencia de dos".to_string(),
        ));
    };

    let mut slots = Vec::new();
    for round in 0..rounds as i32 {
        let slots_in_round = participants.len() / 2usize.pow(round as u32 + 1);
        for position in 0..slots_in_round as i32 {
            let (player1, player2) = if round == 0 {
                let base = position as usize * 2;
                (
                    Some(participants[base].profile_id),
                    Some(participants[base + 1].profile_id),
                )
            } else {
                (None, None)
            };

            let slot = sqlx::query_as::<_, BracketSlot>(
                r#"
                INSERT INTO tournament_brackets
                    (tournament_id, round, position, player1_id, player2_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING bracket_id, tournament_id, round, position,
                          player1_id, player2_id, winner_id
                "#,
            )
            .bind(tournament_id)
            .bind(round)
            .bind(position)
            .bind(player1)
            .bind(player2)
            .fetch_one(&mut *tx)
            .await?;

            slots.push(slot);
        }
    }

    sqlx::query("UPDATE tournaments SET status = $2 WHERE tournament_id = $1")
        .bind(tournament_id)
        .bind(TournamentStatus::InProgress)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_positions_feed_player_one() {
        let adv = advancement(0, 0, 2);
        assert_eq!(
            adv,
            Advancement::Promote {
                round: 1,
                position: 0,
                side: Side::Player1
            }
        );
    }

    #[test]
    fn odd_positions_feed_player_two() {
        let adv = advancement(0, 3, 2);
        assert_eq!(
            adv,
            Advancement::Promote {
                round: 1,
                position: 1,
                side: Side::Player2
            }
        );
    }

    #[test]
    fn sibling_positions_fold_into_one_slot() {
        // Positions 2p and 2p+1 must land on the two sides of (r+1, p).
        for p in 0..8 {
            let even = advancement(0, 2 * p, 4);
            let odd = advancement(0, 2 * p + 1, 4);
            assert_eq!(
                even,
                Advancement::Promote {
                    round: 1,
                    position: p,
                    side: Side::Player1
                }
            );
            assert_eq!(
                odd,
                Advancement::Promote {
                    round: 1,
                    position: p,
                    side: Side::Player2
                }
            );
        }
    }

    #[test]
    fn final_round_completes_the_tournament() {
        assert_eq!(advancement(2, 0, 2), Advancement::Final);
    }

    #[test]
    fn rounds_require_a_power_of_two_field() {
        assert_eq!(rounds_for(0), None);
        assert_eq!(rounds_for(1), None);
        assert_eq!(rounds_for(2), Some(1));
        assert_eq!(rounds_for(3), None);
        assert_eq!(rounds_for(8), Some(3));
        assert_eq!(rounds_for(12), None);
        assert_eq!(rounds_for(16), Some(4));
    }

    fn slot_with(player1_id: Option<Uuid>, player2_id: Option<Uuid>) -> BracketSlot {
        BracketSlot {
            bracket_id: Uuid::new_v4(),
            tournament_id: Uuid::new_v4(),
            round: 0,
            position: 0,
            player1_id,
            player2_id,
            winner_id: None,
        }
    }

    #[test]
    fn unfilled_slot_rejects_a_result() {
        let p1 = Uuid::new_v4();

        for slot in [slot_with(None, None), slot_with(Some(p1), None)] {
            let err = losing_player(&slot, p1).unwrap_err();
            assert!(matches!(
                err,
                StorageError::InvalidState(msg)
                    if msg == "el enfrentamiento aun no tiene ambos jugadores"
            ));
        }
    }

    #[test]
    fn winner_must_be_one_of_the_slot_players() {
        let slot = slot_with(Some(Uuid::new_v4()), Some(Uuid::new_v4()));

        let err = losing_player(&slot, Uuid::new_v4()).unwrap_err();
        assert!(matches!(
            err,
            StorageError::InvalidState(msg)
                if msg == "el ganador debe ser uno de los jugadores del enfrentamiento"
        ));
    }

    #[test]
    fn losing_player_is_the_other_side() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let slot = slot_with(Some(p1), Some(p2));

        assert_eq!(losing_player(&slot, p1).unwrap(), p2);
        assert_eq!(losing_player(&slot, p2).unwrap(), p1);
    }

    #[test]
    fn results_need_a_tournament_in_progress() {
        let mut tournament = Tournament {
            tournament_id: Uuid::new_v4(),
            sport_id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            name: "Open de Primavera".to_string(),
            status: TournamentStatus::Registration,
            max_players: 8,
            registration_end: Utc::now(),
            winner_id: None,
            created_at: Utc::now(),
        };

        assert!(ensure_in_progress(&tournament).is_err());

        tournament.status = TournamentStatus::Completed;
        let err = ensure_in_progress(&tournament).unwrap_err();
        assert!(matches!(
            err,
            StorageError::InvalidState(msg) if msg == "el torneo no esta en progreso"
        ));

        tournament.status = TournamentStatus::InProgress;
        assert!(ensure_in_progress(&tournament).is_ok());
    }

    #[test]
    fn slot_state_reflects_assignment() {
        let mut slot = BracketSlot {
            bracket_id: Uuid::new_v4(),
            tournament_id: Uuid::new_v4(),
            round: 0,
            position: 0,
            player1_id: None,
            player2_id: None,
            winner_id: None,
        };
        assert_eq!(slot.state(), SlotState::Empty);

        slot.player1_id = Some(Uuid::new_v4());
        assert_eq!(slot.state(), SlotState::AwaitingOpponent);

        slot.player2_id = Some(Uuid::new_v4());
        assert_eq!(slot.state(), SlotState::Ready);

        slot.winner_id = slot.player1_id;
        assert_eq!(slot.state(), SlotState::Decided);
    }
}
