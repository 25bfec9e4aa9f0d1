use anyhow::Context;
use axum::Router;
use storage::Database;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use intelligence::{HttpExerciseEnricher, HttpKnowledgeRetriever};

mod config;
mod error;
mod features;
mod middleware;
mod state;

use config::Config;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::profiles::handlers::get_profile,
        features::rankings::handlers::get_leaderboard,
        features::rankings::handlers::recompute,
        features::tournaments::handlers::get_bracket,
        features::tournaments::handlers::report_result,
        features::tournaments::handlers::register,
        features::tournaments::handlers::start,
        features::analyses::handlers::complete_analysis,
        features::training::handlers::generate_plan,
    ),
    components(
        schemas(
            storage::dto::common::PageMeta,
            storage::dto::common::Paginated<storage::dto::ranking::LeaderboardEntry>,
            storage::dto::ranking::LeaderboardEntry,
            storage::dto::ranking::PlayerInfo,
            storage::dto::ranking::RecomputeSummary,
            storage::dto::tournament::ReportResultRequest,
            storage::dto::tournament::BracketSlotView,
            storage::dto::tournament::BracketResponse,
            storage::dto::analysis::CompleteAnalysisRequest,
            storage::dto::analysis::IssueInput,
            storage::models::Analysis,
            storage::models::AnalysisIssue,
            storage::models::AnalysisStatus,
            storage::models::IssueSeverity,
            storage::models::PlayerProfile,
            storage::models::ProfileVisibility,
            storage::models::SkillTier,
            storage::models::Sport,
            storage::models::SportProfile,
            storage::models::Technique,
            storage::models::TechniqueScore,
            storage::models::ScoreHistoryEntry,
            storage::models::Ranking,
            storage::models::RankingCategory,
            storage::models::Tournament,
            storage::models::TournamentStatus,
            storage::models::TournamentParticipant,
            storage::models::BracketSlot,
            storage::models::SlotState,
            storage::models::MatchRecord,
            storage::models::MatchOutcome,
            storage::models::TrainingPlan,
            storage::models::Exercise,
            storage::models::ExerciseTemplate,
            intelligence::generator::ExerciseDetail,
            intelligence::generator::TrainingPlanDetail,
            features::training::handlers::GeneratePlanBody,
        )
    ),
    tags(
        (name = "profiles", description = "Public player profiles"),
        (name = "rankings", description = "Leaderboards and admin recomputation"),
        (name = "tournaments", description = "Tournament registration and bracket management"),
        (name = "analyses", description = "Technique analysis lifecycle"),
        (name = "training", description = "Personalized training plan generation"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting SportTek API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let state = AppState {
        db,
        retriever: Arc::new(HttpKnowledgeRetriever::new(config.knowledge_base_url.clone())),
        enricher: Arc::new(HttpExerciseEnricher::new(config.enrichment_url.clone())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api/profiles", features::profiles::routes::routes())
        .nest("/api/rankings", features::rankings::routes::routes())
        .nest(
            "/api/admin/rankings",
            features::rankings::routes::admin_routes(state.clone()),
        )
        .nest(
            "/api/tournaments",
            features::tournaments::routes::routes(state.clone()),
        )
        .nest(
            "/api/analyses",
            features::analyses::routes::routes(state.clone()),
        )
        .nest(
            "/api/training",
            features::training::routes::routes(state.clone()),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .with_state(state);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .context("Failed to bind listener")?;
    axum::serve(listener, app).await?;

    Ok(())
}
