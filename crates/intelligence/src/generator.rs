use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use storage::error::StorageError;
use storage::models::{AnalysisIssue, AnalysisStatus, Exercise, ExerciseTemplate, IssueSeverity, TrainingPlan};
use storage::repository::analysis::AnalysisRepository;
use storage::repository::training::{NewExercise, TrainingRepository};

use crate::enrichment::{EnrichmentItem, ExerciseEnricher};
use crate::error::{IntelligenceError, Result};
use crate::retrieval::{KnowledgeRetriever, RetrievalQuery};
use crate::text_mining;

pub const DEFAULT_DURATION_WEEKS: u32 = 4;

/// Passages considered per issue during retrieval.
const RETRIEVAL_LIMIT: usize = 2;
/// Minimum relevance for a passage to become an exercise.
const RETRIEVAL_THRESHOLD: f64 = 0.35;
/// AI drill suggestions used per issue when retrieval comes up empty.
const DRILLS_PER_ISSUE: usize = 2;
/// Weekly load increase applied by the linear progression.
const PROGRESSION_STEP: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct GeneratePlanRequest {
    pub analysis_id: Uuid,
    pub profile_id: Uuid,
    pub duration_weeks: u32,
}

#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct ExerciseDetail {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub issue_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct TrainingPlanDetail {
    pub plan: TrainingPlan,
    pub exercises: Vec<ExerciseDetail>,
}

/// How often a pool exercise should appear within a training week, derived
/// from the severity of the issue it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    ThreeTimesWeek,
    TwiceWeek,
}

impl Frequency {
    pub fn from_severity(severity: IssueSeverity) -> Self {
        match severity {
            IssueSeverity::Critical | IssueSeverity::High => Self::Daily,
            IssueSeverity::Medium => Self::ThreeTimesWeek,
            IssueSeverity::Low => Self::TwiceWeek,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::ThreeTimesWeek => "3x_week",
            Self::TwiceWeek => "2x_week",
        }
    }

    /// Whether this frequency is eligible on the `day_index`-th training day
    /// of a week with `days_per_week` training days.
    pub fn is_scheduled(&self, day_index: usize, days_per_week: usize) -> bool {
        match self {
            Self::Daily => true,
            Self::ThreeTimesWeek => day_index % 2 == 0 || day_index + 1 == days_per_week,
            Self::TwiceWeek => day_index == 0 || day_index == days_per_week / 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolExercise {
    pub name: String,
    pub instructions: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub frequency: Frequency,
    pub issue_id: Uuid,
}

/// Issues ordered by descending severity weight; stable so equally severe
/// issues keep their analyzer order.
pub fn sort_issues(issues: &mut [AnalysisIssue]) {
    issues.sort_by_key(|i| std::cmp::Reverse(i.severity.weight()));
}

/// Plan difficulty 1-5 from the rounded mean severity weight.
pub fn plan_difficulty(issues: &[AnalysisIssue]) -> i32 {
    let total: i32 = issues.iter().map(|i| i.severity.weight()).sum();
    let mean = total as f64 / issues.len() as f64;
    (mean.round() as i32).clamp(1, 5)
}

pub fn training_days_per_week(difficulty: i32) -> u32 {
    (difficulty + 1).clamp(3, 6) as u32
}

/// Training day offsets within a 7-day week, spread evenly.
pub fn day_offsets(days_per_week: u32) -> Vec<u32> {
    (0..days_per_week)
        .map(|i| ((i * 7) as f64 / days_per_week as f64).round() as u32)
        .collect()
}

/// Exercises selected per scheduled day.
pub fn exercises_per_day(pool_size: usize, days_per_week: u32) -> usize {
    (pool_size as f64 / days_per_week as f64).ceil().clamp(2.0, 4.0) as usize
}

/// Linear weekly progression; week is 1-indexed and null bases stay null.
pub fn progressed(value: Option<i32>, week: u32) -> Option<i32> {
    let multiplier = 1.0 + (week - 1) as f64 * PROGRESSION_STEP;
    value.map(|v| (v as f64 * multiplier).round() as i32)
}

fn names_overlap(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

/// Builds the exercise pool, per issue, from three sources in priority
/// order: knowledge retrieval, AI drill suggestions attached to the issue,
/// and at most one exercise template supplement. An issue that ends up with
/// nothing gets one exercise synthesized from its correction text.
pub async fn build_pool(
    retriever: &dyn KnowledgeRetriever,
    sport_slug: &str,
    technique_slug: &str,
    issues: &[AnalysisIssue],
    templates: &[ExerciseTemplate],
) -> Vec<PoolExercise> {
    let mut pool: Vec<PoolExercise> = Vec::new();

    for issue in issues {
        let issue_start = pool.len();
        let frequency = Frequency::from_severity(issue.severity);

        let query = RetrievalQuery {
            query: format!("{} {}", issue.category, issue.correction),
            sport_slug: sport_slug.to_string(),
            categories: vec![issue.category.clone()],
            technique: Some(technique_slug.to_string()),
            limit: RETRIEVAL_LIMIT,
            threshold: RETRIEVAL_THRESHOLD,
        };

        let passages = match retriever.retrieve(&query).await {
            Ok(passages) => passages,
            Err(e) => {
                tracing::warn!(
                    issue_id = %issue.issue_id,
                    error = %e,
                    "knowledge retrieval failed, falling back to drill suggestions"
                );
                Vec::new()
            }
        };

        if passages.is_empty() {
            for suggestion in issue.drill_suggestions.iter().take(DRILLS_PER_ISSUE) {
                let (name, instructions) = text_mining::split_drill_suggestion(suggestion);
                pool.push(PoolExercise {
                    name,
                    instructions,
                    sets: Some(text_mining::DEFAULT_SETS),
                    reps: Some(text_mining::DEFAULT_REPS),
                    duration_minutes: None,
                    frequency,
                    issue_id: issue.issue_id,
                });
            }
        } else {
            for passage in &passages {
                pool.push(PoolExercise {
                    name: text_mining::extract_exercise_name(&passage.content),
                    instructions: passage.content.clone(),
                    sets: Some(text_mining::extract_sets(&passage.content)),
                    reps: Some(text_mining::extract_reps(&passage.content)),
                    duration_minutes: text_mining::extract_duration_minutes(&passage.content),
                    frequency,
                    issue_id: issue.issue_id,
                });
            }
        }

        // Template supplement: at most one, preferring an exact target-area
        // match over a name overlap with the issue's drill strings.
        let template = templates
            .iter()
            .find(|t| t.target_areas.to_lowercase() == issue.category.to_lowercase())
            .or_else(|| {
                templates.iter().find(|t| {
                    issue
                        .drill_suggestions
                        .iter()
                        .any(|d| names_overlap(&t.name, d))
                })
            });

        if let Some(template) = template {
            let duplicate = pool[issue_start..]
                .iter()
                .any(|e| names_overlap(&e.name, &template.name));

            if !duplicate {
                pool.push(PoolExercise {
                    name: template.name.clone(),
                    instructions: template.instructions.clone(),
                    sets: template.default_sets,
                    reps: template.default_reps,
                    duration_minutes: template.default_duration_minutes,
                    frequency,
                    issue_id: issue.issue_id,
                });
            }
        }

        if pool.len() == issue_start {
            pool.push(PoolExercise {
                name: format!("Correccion: {}", issue.category),
                instructions: issue.correction.clone(),
                sets: Some(text_mining::DEFAULT_SETS),
                reps: Some(text_mining::DEFAULT_REPS),
                duration_minutes: None,
                frequency,
                issue_id: issue.issue_id,
            });
        }
    }

    pool
}

/// Distributes the pool over the plan's calendar. Days are spread evenly
/// across each week; each day draws from the frequency-eligible subset with
/// a rotating start so consecutive days surface different exercises, and
/// set/rep/duration loads grow linearly week over week.
pub fn schedule(pool: &[PoolExercise], duration_weeks: u32, days_per_week: u32) -> Vec<NewExercise> {
    let offsets = day_offsets(days_per_week);
    let per_day = exercises_per_day(pool.len(), days_per_week);

    let mut scheduled = Vec::new();

    for week in 1..=duration_weeks {
        for (day_index, offset) in offsets.iter().enumerate() {
            let day_number = (week - 1) * 7 + offset + 1;
            if day_number > duration_weeks * 7 {
                continue;
            }

            let eligible: Vec<&PoolExercise> = pool
                .iter()
                .filter(|e| e.frequency.is_scheduled(day_index, days_per_week as usize))
                .collect();

            if eligible.is_empty() {
                continue;
            }

            let take = per_day.min(eligible.len());
            let start = day_index % eligible.len();

            for order in 0..take {
                let exercise = eligible[(start + order) % eligible.len()];
                scheduled.push(NewExercise {
                    name: exercise.name.clone(),
                    instructions: exercise.instructions.clone(),
                    day_number: day_number as i32,
                    day_order: order as i32,
                    sets: progressed(exercise.sets, week),
                    reps: progressed(exercise.reps, week),
                    duration_minutes: progressed(exercise.duration_minutes, week),
                    frequency: exercise.frequency.as_str().to_string(),
                    issue_ids: vec![exercise.issue_id],
                });
            }
        }
    }

    scheduled
}

/// Generates and persists a personalized training plan from a completed
/// analysis. Precondition violations are distinct, user-facing rejections;
/// retrieval and enrichment failures degrade the plan instead of failing it.
pub async fn generate_plan(
    pool: &PgPool,
    retriever: &dyn KnowledgeRetriever,
    enricher: &dyn ExerciseEnricher,
    request: GeneratePlanRequest,
    now: DateTime<Utc>,
) -> Result<TrainingPlanDetail> {
    let analyses = AnalysisRepository::new(pool);

    let analysis = analyses.find_by_id(request.analysis_id).await.map_err(|e| match e {
        StorageError::NotFound => IntelligenceError::AnalysisNotFound,
        other => IntelligenceError::from(other),
    })?;

    if analysis.profile_id != request.profile_id {
        return Err(IntelligenceError::NotAuthorized);
    }
    if analysis.status != AnalysisStatus::Completed {
        return Err(IntelligenceError::AnalysisNotFound);
    }

    let training = TrainingRepository::new(pool);
    if training.plan_exists_for_analysis(request.analysis_id).await? {
        return Err(IntelligenceError::PlanAlreadyExists);
    }

    let mut issues = analyses.issues_for(request.analysis_id).await?;
    if issues.is_empty() {
        return Err(IntelligenceError::NoIssuesDetected);
    }
    sort_issues(&mut issues);

    let context = analyses.context(request.analysis_id).await?;
    let templates = training.templates_for_sport(context.sport_id).await?;

    let difficulty = plan_difficulty(&issues);
    let days_per_week = training_days_per_week(difficulty);

    let exercise_pool = build_pool(
        retriever,
        &context.sport_slug,
        &context.technique_slug,
        &issues,
        &templates,
    )
    .await;

    let scheduled = schedule(&exercise_pool, request.duration_weeks, days_per_week);

    let (plan, persisted) = training
        .create_plan(
            request.analysis_id,
            request.profile_id,
            request.duration_weeks as i32,
            days_per_week as i32,
            difficulty,
            &scheduled,
            now,
        )
        .await
        .map_err(|e| match e {
            StorageError::ConstraintViolation(_) => IntelligenceError::PlanAlreadyExists,
            other => IntelligenceError::from(other),
        })?;

    tracing::info!(
        plan_id = %plan.plan_id,
        analysis_id = %request.analysis_id,
        exercises = persisted.len(),
        difficulty,
        days_per_week,
        "training plan generated"
    );

    // Best-effort enrichment: failures keep the unenriched text.
    let items: Vec<EnrichmentItem> = persisted
        .iter()
        .map(|e| EnrichmentItem {
            id: e.exercise_id,
            name: e.name.clone(),
            description: e.name.clone(),
            instructions: e.instructions.clone(),
        })
        .collect();

    match enricher
        .enrich(&items, &context.sport_name, &context.technique_name)
        .await
    {
        Ok(updates) => {
            for update in updates {
                if let Err(e) = training
                    .update_instructions(update.id, &update.instructions)
                    .await
                {
                    tracing::warn!(exercise_id = %update.id, error = %e, "failed to store enriched instructions");
                }
            }
        }
        Err(e) => {
            tracing::warn!(plan_id = %plan.plan_id, error = %e, "enrichment failed, keeping raw instructions");
        }
    }

    let exercises = training.exercises_for_plan(plan.plan_id).await?;
    let links = training.issue_links_for_plan(plan.plan_id).await?;

    let details = exercises
        .into_iter()
        .map(|exercise| {
            let issue_ids = links
                .iter()
                .filter(|l| l.exercise_id == exercise.exercise_id)
                .map(|l| l.issue_id)
                .collect();
            ExerciseDetail {
                exercise,
                issue_ids,
            }
        })
        .collect();

    Ok(TrainingPlanDetail {
        plan,
        exercises: details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::Passage;
    use std::collections::HashSet;

    struct StaticRetriever {
        passages: Vec<Passage>,
    }

    #[async_trait::async_trait]
    impl KnowledgeRetriever for StaticRetriever {
        async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<Passage>> {
            Ok(self
                .passages
                .iter()
                .filter(|p| p.relevance >= query.threshold)
                .take(query.limit)
                .cloned()
                .collect())
        }
    }

    struct FailingRetriever;

    #[async_trait::async_trait]
    impl KnowledgeRetriever for FailingRetriever {
        async fn retrieve(&self, _query: &RetrievalQuery) -> Result<Vec<Passage>> {
            Err(serde_json::from_str::<serde_json::Value>("not json")
                .unwrap_err()
                .into())
        }
    }

    fn issue(severity: IssueSeverity, category: &str, drills: Vec<&str>) -> AnalysisIssue {
        AnalysisIssue {
            issue_id: Uuid::new_v4(),
            analysis_id: Uuid::new_v4(),
            severity,
            category: category.to_string(),
            description: format!("problema de {category}"),
            correction: format!("corrige el {category}"),
            drill_suggestions: sqlx::types::Json(
                drills.into_iter().map(String::from).collect(),
            ),
        }
    }

    fn template(name: &str, target_areas: &str) -> ExerciseTemplate {
        ExerciseTemplate {
            template_id: Uuid::new_v4(),
            sport_id: None,
            name: name.to_string(),
            instructions: format!("instrucciones de {name}"),
            default_sets: Some(3),
            default_reps: Some(10),
            default_duration_minutes: None,
            target_areas: target_areas.to_string(),
            category: "technique".to_string(),
        }
    }

    #[test]
    fn issues_sort_by_severity_and_stay_stable_within_ties() {
        let low = issue(IssueSeverity::Low, "grip", vec![]);
        let first_high = issue(IssueSeverity::High, "toss", vec![]);
        let second_high = issue(IssueSeverity::High, "stance", vec![]);
        let critical = issue(IssueSeverity::Critical, "timing", vec![]);

        let mut issues = vec![
            low.clone(),
            first_high.clone(),
            second_high.clone(),
            critical.clone(),
        ];
        sort_issues(&mut issues);

        assert_eq!(issues[0].issue_id, critical.issue_id);
        assert_eq!(issues[1].issue_id, first_high.issue_id);
        assert_eq!(issues[2].issue_id, second_high.issue_id);
        assert_eq!(issues[3].issue_id, low.issue_id);
    }

    #[test]
    fn difficulty_sizes_the_training_week() {
        let issues = vec![
            issue(IssueSeverity::Critical, "timing", vec![]),
            issue(IssueSeverity::High, "toss", vec![]),
        ];
        // mean weight 3.5 rounds to 4
        assert_eq!(plan_difficulty(&issues), 4);
        assert_eq!(training_days_per_week(4), 5);

        assert_eq!(training_days_per_week(1), 3);
        assert_eq!(training_days_per_week(5), 6);
    }

    #[test]
    fn frequency_follows_severity() {
        assert_eq!(
            Frequency::from_severity(IssueSeverity::Critical),
            Frequency::Daily
        );
        assert_eq!(
            Frequency::from_severity(IssueSeverity::High),
            Frequency::Daily
        );
        assert_eq!(
            Frequency::from_severity(IssueSeverity::Medium),
            Frequency::ThreeTimesWeek
        );
        assert_eq!(
            Frequency::from_severity(IssueSeverity::Low),
            Frequency::TwiceWeek
        );
    }

    #[test]
    fn offsets_spread_days_across_the_week() {
        assert_eq!(day_offsets(3), vec![0, 2, 5]);
        assert_eq!(day_offsets(4), vec![0, 2, 4, 5]);
        assert_eq!(day_offsets(6), vec![0, 1, 2, 4, 5, 6]);
    }

    #[test]
    fn per_day_selection_is_clamped() {
        assert_eq!(exercises_per_day(1, 5), 2);
        assert_eq!(exercises_per_day(10, 5), 2);
        assert_eq!(exercises_per_day(14, 5), 3);
        assert_eq!(exercises_per_day(40, 5), 4);
    }

    #[test]
    fn progression_scales_week_over_week() {
        assert_eq!(progressed(Some(3), 1), Some(3));
        // week 3: 3 * 1.30 = 3.9 rounds to 4
        assert_eq!(progressed(Some(3), 3), Some(4));
        assert_eq!(progressed(Some(10), 2), Some(12));
        assert_eq!(progressed(None, 3), None);
    }

    #[tokio::test]
    async fn retrieval_passages_become_exercises() {
        let retriever = StaticRetriever {
            passages: vec![
                Passage {
                    content: "Wall drill. Do 4 sets of 12 reps against the wall.".to_string(),
                    relevance: 0.9,
                },
                Passage {
                    content: "Irrelevant passage".to_string(),
                    relevance: 0.1,
                },
            ],
        };
        let issues = vec![issue(IssueSeverity::High, "timing", vec!["Old drill: ignored"])];

        let pool = build_pool(&retriever, "tenis", "serve", &issues, &[]).await;

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].name, "Wall drill");
        assert_eq!(pool[0].sets, Some(4));
        assert_eq!(pool[0].reps, Some(12));
        assert_eq!(pool[0].issue_id, issues[0].issue_id);
    }

    #[tokio::test]
    async fn drills_fill_in_when_retrieval_is_empty() {
        let retriever = StaticRetriever { passages: vec![] };
        let issues = vec![issue(
            IssueSeverity::Medium,
            "toss",
            vec!["Toss drill: repeat 20 tosses", "Catch drill: toss and catch", "Extra: dropped"],
        )];

        let pool = build_pool(&retriever, "tenis", "serve", &issues, &[]).await;

        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].name, "Toss drill");
        assert_eq!(pool[0].instructions, "repeat 20 tosses");
        assert_eq!(pool[0].sets, Some(3));
        assert_eq!(pool[0].reps, Some(15));
    }

    #[tokio::test]
    async fn retrieval_failure_degrades_to_drills() {
        let issues = vec![issue(
            IssueSeverity::High,
            "stance",
            vec!["Stance drill: shadow the stance"],
        )];

        let pool = build_pool(&FailingRetriever, "tenis", "serve", &issues, &[]).await;

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].name, "Stance drill");
    }

    #[tokio::test]
    async fn template_supplements_by_target_area() {
        let retriever = StaticRetriever { passages: vec![] };
        let issues = vec![issue(IssueSeverity::Low, "Footwork", vec!["Ladder drill: run the ladder"])];
        let templates = vec![template("Cone shuffle", "footwork"), template("Other", "grip")];

        let pool = build_pool(&retriever, "tenis", "serve", &issues, &templates).await;

        assert_eq!(pool.len(), 2);
        assert_eq!(pool[1].name, "Cone shuffle");
    }

    #[tokio::test]
    async fn template_with_duplicate_name_is_skipped() {
        let retriever = StaticRetriever { passages: vec![] };
        let issues = vec![issue(
            IssueSeverity::Low,
            "footwork",
            vec!["Cone shuffle: shuffle between cones"],
        )];
        let templates = vec![template("Cone shuffle", "footwork")];

        let pool = build_pool(&retriever, "tenis", "serve", &issues, &templates).await;

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].name, "Cone shuffle");
    }

    #[tokio::test]
    async fn every_issue_is_covered_by_the_pool() {
        let retriever = StaticRetriever { passages: vec![] };
        // No drills, no templates: each issue must still get a synthesized
        // exercise from its correction text.
        let issues = vec![
            issue(IssueSeverity::Critical, "timing", vec![]),
            issue(IssueSeverity::Medium, "toss", vec![]),
            issue(IssueSeverity::Low, "grip", vec![]),
        ];

        let pool = build_pool(&retriever, "tenis", "serve", &issues, &[]).await;

        let covered: HashSet<Uuid> = pool.iter().map(|e| e.issue_id).collect();
        for issue in &issues {
            assert!(covered.contains(&issue.issue_id));
        }
        assert!(pool.iter().all(|e| !e.instructions.is_empty()));
    }

    #[test]
    fn schedule_respects_the_calendar_and_progression() {
        let issue_id = Uuid::new_v4();
        let pool: Vec<PoolExercise> = (0..6)
            .map(|i| PoolExercise {
                name: format!("Drill {i}"),
                instructions: "do it".to_string(),
                sets: Some(3),
                reps: Some(15),
                duration_minutes: None,
                frequency: Frequency::Daily,
                issue_id,
            })
            .collect();

        let scheduled = schedule(&pool, 4, 4);

        assert!(!scheduled.is_empty());
        for exercise in &scheduled {
            assert!(exercise.day_number >= 1 && exercise.day_number <= 28);
        }

        // Week 3 entries carry the 1.30 multiplier: sets 3 -> 4.
        let week3: Vec<&NewExercise> = scheduled
            .iter()
            .filter(|e| e.day_number > 14 && e.day_number <= 21)
            .collect();
        assert!(!week3.is_empty());
        assert!(week3.iter().all(|e| e.sets == Some(4)));

        // Rotation: the first exercise differs across days of week 1.
        let day1_first = scheduled
            .iter()
            .find(|e| e.day_number == 1 && e.day_order == 0)
            .unwrap();
        let day3_first = scheduled
            .iter()
            .find(|e| e.day_number == 3 && e.day_order == 0)
            .unwrap();
        assert_ne!(day1_first.name, day3_first.name);
    }

    #[test]
    fn twice_week_lands_on_start_and_midpoint() {
        let f = Frequency::TwiceWeek;
        assert!(f.is_scheduled(0, 4));
        assert!(!f.is_scheduled(1, 4));
        assert!(f.is_scheduled(2, 4));
        assert!(!f.is_scheduled(3, 4));
    }

    #[test]
    fn three_times_week_hits_even_days_and_week_end() {
        let f = Frequency::ThreeTimesWeek;
        assert!(f.is_scheduled(0, 5));
        assert!(!f.is_scheduled(1, 5));
        assert!(f.is_scheduled(2, 5));
        assert!(f.is_scheduled(4, 5));
        // last day of the week is always included
        assert!(f.is_scheduled(3, 4));
    }
}
