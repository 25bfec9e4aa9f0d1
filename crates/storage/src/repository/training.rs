use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Exercise, ExerciseTemplate, TrainingPlan};

/// Exercise instance about to be persisted for a scheduled day.
#[derive(Debug, Clone)]
pub struct NewExercise {
    pub name: String,
    pub instructions: String,
    pub day_number: i32,
    pub day_order: i32,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub frequency: String,
    pub issue_ids: Vec<Uuid>,
}

#[derive(Debug, FromRow)]
pub struct ExerciseIssueLink {
    pub exercise_id: Uuid,
    pub issue_id: Uuid,
}

pub struct TrainingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TrainingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn plan_exists_for_analysis(&self, analysis_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM training_plans WHERE analysis_id = $1)",
        )
        .bind(analysis_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Templates usable for one sport, including sport-agnostic entries.
    pub async fn templates_for_sport(&self, sport_id: Uuid) -> Result<Vec<ExerciseTemplate>> {
        let templates = sqlx::query_as::<_, ExerciseTemplate>(
            r#"
            SELECT template_id, sport_id, name, instructions, default_sets,
                   default_reps, default_duration_minutes, target_areas, category
            FROM exercise_templates
            WHERE sport_id = $1 OR sport_id IS NULL
            ORDER BY name
            "#,
        )
        .bind(sport_id)
        .fetch_all(self.pool)
        .await?;

        Ok(templates)
    }

    /// Persists the plan and all its scheduled exercises with their issue
    /// links as one transaction.
    pub async fn create_plan(
        &self,
        analysis_id: Uuid,
        profile_id: Uuid,
        duration_weeks: i32,
        training_days_per_week: i32,
        difficulty: i32,
        exercises: &[NewExercise],
        now: DateTime<Utc>,
    ) -> Result<(TrainingPlan, Vec<Exercise>)> {
        let mut tx = self.pool.begin().await?;

        let plan = sqlx::query_as::<_, TrainingPlan>(
            r#"
            INSERT INTO training_plans
                (analysis_id, profile_id, duration_weeks, training_days_per_week,
                 difficulty, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING plan_id, analysis_id, profile_id, duration_weeks,
                      training_days_per_week, difficulty, created_at
            "#,
        )
        .bind(analysis_id)
        .bind(profile_id)
        .bind(duration_weeks)
        .bind(training_days_per_week)
        .bind(difficulty)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StorageError::from(e).or_conflict("ya existe un plan para este analisis"))?;

        let mut persisted = Vec::with_capacity(exercises.len());
        for exercise in exercises {
            let row = sqlx::query_as::<_, Exercise>(
                r#"
                INSERT INTO exercises
                    (plan_id, name, instructions, day_number, day_order,
                     sets, reps, duration_minutes, frequency)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING exercise_id, plan_id, name, instructions, day_number,
                          day_order, sets, reps, duration_minutes, frequency
                "#,
            )
            .bind(plan.plan_id)
            .bind(&exercise.name)
            .bind(&exercise.instructions)
            .bind(exercise.day_number)
            .bind(exercise.day_order)
            .bind(exercise.sets)
            .bind(exercise.reps)
            .bind(exercise.duration_minutes)
            .bind(&exercise.frequency)
            .fetch_one(&mut *tx)
            .await?;

            for issue_id in &exercise.issue_ids {
                sqlx::query(
                    r#"
                    INSERT INTO exercise_issues (exercise_id, issue_id)
                    VALUES ($1, $2)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(row.exercise_id)
                .bind(issue_id)
                .execute(&mut *tx)
                .await?;
            }

            persisted.push(row);
        }

        tx.commit().await?;

        Ok((plan, persisted))
    }

    /// Best-effort instruction replacement after enrichment.
    pub async fn update_instructions(&self, exercise_id: Uuid, instructions: &str) -> Result<()> {
        sqlx::query("UPDATE exercises SET instructions = $2 WHERE exercise_id = $1")
            .bind(exercise_id)
            .bind(instructions)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    pub async fn exercises_for_plan(&self, plan_id: Uuid) -> Result<Vec<Exercise>> {
        let exercises = sqlx::query_as::<_, Exercise>(
            r#"
            SELECT exercise_id, plan_id, name, instructions, day_number,
                   day_order, sets, reps, duration_minutes, frequency
            FROM exercises
            WHERE plan_id = $1
            ORDER BY day_number, day_order
            "#,
        )
        .bind(plan_id)
        .fetch_all(self.pool)
        .await?;

        Ok(exercises)
    }

    pub async fn issue_links_for_plan(&self, plan_id: Uuid) -> Result<Vec<ExerciseIssueLink>> {
        let links = sqlx::query_as::<_, ExerciseIssueLink>(
            r#"
            SELECT ei.exercise_id, ei.issue_id
            FROM exercise_issues ei
            INNER JOIN exercises e ON e.exercise_id = ei.exercise_id
            WHERE e.plan_id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_all(self.pool)
        .await?;

        Ok(links)
    }
}
