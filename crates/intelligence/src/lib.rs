pub mod enrichment;
pub mod error;
pub mod generator;
pub mod retrieval;
pub mod text_mining;

pub use enrichment::{EnrichedInstructions, EnrichmentItem, ExerciseEnricher, HttpExerciseEnricher};
pub use error::{IntelligenceError, Result};
pub use generator::{GeneratePlanRequest, TrainingPlanDetail, generate_plan};
pub use retrieval::{HttpKnowledgeRetriever, KnowledgeRetriever, Passage, RetrievalQuery};
