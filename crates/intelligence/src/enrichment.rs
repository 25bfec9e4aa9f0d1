use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub instructions: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichedInstructions {
    pub id: Uuid,
    pub instructions: String,
}

/// Turns raw exercise text into structured step-by-step instructions.
/// Strictly best-effort: a failed enrichment leaves the raw text in place.
#[async_trait::async_trait]
pub trait ExerciseEnricher: Send + Sync {
    async fn enrich(
        &self,
        items: &[EnrichmentItem],
        sport_name: &str,
        technique_name: &str,
    ) -> Result<Vec<EnrichedInstructions>>;
}

#[derive(Debug, Serialize)]
struct EnrichmentRequest<'a> {
    exercises: &'a [EnrichmentItem],
    sport: &'a str,
    technique: &'a str,
}

#[derive(Debug, Deserialize)]
struct EnrichmentResponse {
    exercises: Vec<EnrichedInstructions>,
}

pub struct HttpExerciseEnricher {
    client: Client,
    base_url: String,
}

impl HttpExerciseEnricher {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self { client, base_url }
    }
}

#[async_trait::async_trait]
impl ExerciseEnricher for HttpExerciseEnricher {
    async fn enrich(
        &self,
        items: &[EnrichmentItem],
        sport_name: &str,
        technique_name: &str,
    ) -> Result<Vec<EnrichedInstructions>> {
        let request = EnrichmentRequest {
            exercises: items,
            sport: sport_name,
            technique: technique_name,
        };

        let response = self
            .client
            .post(format!("{}/api/enrich", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: EnrichmentResponse = response.json().await?;

        Ok(body.exercises)
    }
}
