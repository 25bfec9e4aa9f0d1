use chrono::{DateTime, Utc};
use intelligence::{
    error::Result,
    generator::{self, GeneratePlanRequest, TrainingPlanDetail},
};

use crate::state::AppState;

pub async fn generate_plan(
    state: &AppState,
    request: GeneratePlanRequest,
    now: DateTime<Utc>,
) -> Result<TrainingPlanDetail> {
    generator::generate_plan(
        state.db.pool(),
        state.retriever.as_ref(),
        state.enricher.as_ref(),
        request,
        now,
    )
    .await
}
