use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    BracketSlot, MatchRecord, SlotState, Tournament, TournamentParticipant,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportResultRequest {
    pub bracket_id: Uuid,
    pub winner_id: Uuid,
    pub score: Option<String>,
}

/// One bracket cell with its match result, as served by the public read.
#[derive(Debug, Serialize, ToSchema)]
pub struct BracketSlotView {
    #[serde(flatten)]
    pub slot: BracketSlot,
    pub state: SlotState,
    pub score: Option<String>,
    pub confirmed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BracketResponse {
    pub tournament: Tournament,
    pub brackets: Vec<BracketSlotView>,
    pub participants: Vec<TournamentParticipant>,
}

impl BracketResponse {
    pub fn assemble(
        tournament: Tournament,
        slots: Vec<BracketSlot>,
        matches: Vec<MatchRecord>,
        participants: Vec<TournamentParticipant>,
    ) -> Self {
        let brackets = slots
            .into_iter()
            .map(|slot| {
                let result = matches.iter().find(|m| m.bracket_id == slot.bracket_id);
                BracketSlotView {
                    state: slot.state(),
                    score: result.and_then(|m| m.score.clone()),
                    confirmed: result
                        .map(|m| m.player1_confirmed && m.player2_confirmed)
                        .unwrap_or(false),
                    slot,
                }
            })
            .collect();

        Self {
            tournament,
            brackets,
            participants,
        }
    }
}
