use std::sync::Arc;

use intelligence::{ExerciseEnricher, KnowledgeRetriever};
use storage::Database;

/// Shared application state: the database plus the best-effort external
/// services the training pipeline talks to.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub retriever: Arc<dyn KnowledgeRetriever>,
    pub enricher: Arc<dyn ExerciseEnricher>,
}
