use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Analysis, AnalysisIssue, IssueSeverity};

/// Completed analysis joined with its technique, as consumed by the skill
/// score calculator. `overall_score` is still on the analyzer's 0-10 scale.
#[derive(Debug, Clone, FromRow)]
pub struct CompletedAnalysisRow {
    pub analysis_id: Uuid,
    pub technique_id: Uuid,
    pub technique_slug: String,
    pub overall_score: f64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AnalysisContext {
    pub sport_id: Uuid,
    pub sport_slug: String,
    pub sport_name: String,
    pub technique_id: Uuid,
    pub technique_slug: String,
    pub technique_name: String,
}

#[derive(Debug, Clone)]
pub struct NewIssue {
    pub severity: IssueSeverity,
    pub category: String,
    pub description: String,
    pub correction: String,
    pub drill_suggestions: Vec<String>,
}

pub struct AnalysisRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalysisRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, analysis_id: Uuid) -> Result<Analysis> {
        let analysis = sqlx::query_as::<_, Analysis>(
            r#"
            SELECT analysis_id, profile_id, technique_id, status, overall_score,
                   created_at, completed_at
            FROM analyses
            WHERE analysis_id = $1
            "#,
        )
        .bind(analysis_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(analysis)
    }

    pub async fn issues_for(&self, analysis_id: Uuid) -> Result<Vec<AnalysisIssue>> {
        let issues = sqlx::query_as::<_, AnalysisIssue>(
            r#"
            SELECT issue_id, analysis_id, severity, category, description,
                   correction, drill_suggestions
            FROM analysis_issues
            WHERE analysis_id = $1
            ORDER BY issue_id
            "#,
        )
        .bind(analysis_id)
        .fetch_all(self.pool)
        .await?;

        Ok(issues)
    }

    /// All completed, scored analyses of one player for one sport, newest
    /// first. Ordering matters: the calculator keeps the first N per
    /// technique it encounters.
    pub async fn completed_for_sport(
        &self,
        profile_id: Uuid,
        sport_id: Uuid,
    ) -> Result<Vec<CompletedAnalysisRow>> {
        let rows = sqlx::query_as::<_, CompletedAnalysisRow>(
            r#"
            SELECT a.analysis_id, a.technique_id, t.slug AS technique_slug,
                   a.overall_score, a.completed_at
            FROM analyses a
            INNER JOIN techniques t ON t.technique_id = a.technique_id
            WHERE a.profile_id = $1
              AND t.sport_id = $2
              AND a.status = 'COMPLETED'
              AND a.overall_score IS NOT NULL
            ORDER BY a.completed_at DESC
            "#,
        )
        .bind(profile_id)
        .bind(sport_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Sport the analyzed technique belongs to, for routing the
    /// recalculation to the right sport profile.
    pub async fn sport_for_analysis(&self, analysis_id: Uuid) -> Result<Uuid> {
        let sport_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT t.sport_id
            FROM analyses a
            INNER JOIN techniques t ON t.technique_id = a.technique_id
            WHERE a.analysis_id = $1
            "#,
        )
        .bind(analysis_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(sport_id)
    }

    /// Sport and technique context of an analysis, as needed by the training
    /// plan generator for retrieval filtering and enrichment.
    pub async fn context(&self, analysis_id: Uuid) -> Result<AnalysisContext> {
        let context = sqlx::query_as::<_, AnalysisContext>(
            r#"
            SELECT s.sport_id, s.slug AS sport_slug, s.name AS sport_name,
                   t.technique_id, t.slug AS technique_slug, t.name AS technique_name
            FROM analyses a
            INNER JOIN techniques t ON t.technique_id = a.technique_id
            INNER JOIN sports s ON s.sport_id = t.sport_id
            WHERE a.analysis_id = $1
            "#,
        )
        .bind(analysis_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(context)
    }

    pub async fn mark_completed(
        &self,
        analysis_id: Uuid,
        overall_score: f64,
        issues: &[NewIssue],
        now: DateTime<Utc>,
    ) -> Result<Analysis> {
        let mut tx = self.pool.begin().await?;

        let analysis = sqlx::query_as::<_, Analysis>(
            r#"
            UPDATE analyses
            SET status = 'COMPLETED', overall_score = $2, completed_at = $3
            WHERE analysis_id = $1
            RETURNING analysis_id, profile_id, technique_id, status,
                      overall_score, created_at, completed_at
            "#,
        )
        .bind(analysis_id)
        .bind(overall_score)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        for issue in issues {
            sqlx::query(
                r#"
                INSERT INTO analysis_issues
                    (analysis_id, severity, category, description, correction, drill_suggestions)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(analysis_id)
            .bind(issue.severity)
            .bind(&issue.category)
            .bind(&issue.description)
            .bind(&issue.correction)
            .bind(sqlx::types::Json(&issue.drill_suggestions))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(analysis)
    }
}
