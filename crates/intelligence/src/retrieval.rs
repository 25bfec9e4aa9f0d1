use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One passage returned by the knowledge base, with its relevance score.
#[derive(Debug, Clone, Deserialize)]
pub struct Passage {
    pub content: String,
    pub relevance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalQuery {
    pub query: String,
    pub sport_slug: String,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
    pub limit: usize,
    pub threshold: f64,
}

/// Best-effort external knowledge base. Failures are expected to be caught
/// and logged by callers; the training pipeline degrades without it.
#[async_trait::async_trait]
pub trait KnowledgeRetriever: Send + Sync {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<Passage>>;
}

#[derive(Debug, Deserialize)]
struct RetrievalResponse {
    results: Vec<Passage>,
}

/// HTTP client for the knowledge retrieval service.
pub struct HttpKnowledgeRetriever {
    client: Client,
    base_url: String,
}

impl HttpKnowledgeRetriever {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();

        Self { client, base_url }
    }
}

#[async_trait::async_trait]
impl KnowledgeRetriever for HttpKnowledgeRetriever {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<Passage>> {
        let response = self
            .client
            .post(format!("{}/api/retrieve", self.base_url))
            .json(query)
            .send()
            .await?
            .error_for_status()?;

        let body: RetrievalResponse = response.json().await?;

        // The service is expected to honor the threshold, but filter again so
        // a lax deployment cannot leak low-relevance passages into plans.
        let passages = body
            .results
            .into_iter()
            .filter(|p| p.relevance >= query.threshold)
            .take(query.limit)
            .collect();

        Ok(passages)
    }
}
