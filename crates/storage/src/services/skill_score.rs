use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ScoreHistoryEntry, SkillTier};
use crate::repository::analysis::{AnalysisRepository, CompletedAnalysisRow};
use crate::repository::profile::ProfileRepository;
use crate::repository::technique_score::TechniqueScoreRepository;

/// Days after the last score update during which no decay applies.
pub const DECAY_GRACE_DAYS: i64 = 30;
/// Linear decay applied per day beyond the grace period.
pub const DECAY_RATE_PER_DAY: f64 = 0.005;
/// Effective score never drops below this fraction of the composite.
pub const DECAY_FLOOR: f64 = 0.7;

/// A composite score exists only once this many distinct techniques have
/// completed analyses.
pub const MIN_RANKED_TECHNIQUES: usize = 3;
/// Window of most recent analyses considered per technique.
pub const RECENT_WINDOW: usize = 3;

pub const DEFAULT_TECHNIQUE_WEIGHT: f64 = 0.8;

/// Scoring weight per technique slug. Unlisted techniques fall back to
/// [`DEFAULT_TECHNIQUE_WEIGHT`].
pub fn technique_weight(slug: &str) -> f64 {
    match slug {
        "serve" => 1.0,
        "forehand" => 1.0,
        "backhand" => 0.9,
        "return" => 0.9,
        "bandeja" => 0.9,
        "smash" => 0.85,
        "vibora" => 0.85,
        "volley" => 0.8,
        "slice" => 0.75,
        "lob" => 0.7,
        "drop-shot" => 0.7,
        _ => DEFAULT_TECHNIQUE_WEIGHT,
    }
}

/// Time-decayed effective score. A profile that was never scored keeps its
/// composite untouched; otherwise the score loses 0.5% per day beyond the
/// 30-day grace window, floored at 70% of the composite.
pub fn decay_score(
    composite_score: f64,
    last_update: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> f64 {
    let Some(last_update) = last_update else {
        return composite_score;
    };

    let days_since_update = (now - last_update).num_days();
    let days_over_grace = (days_since_update - DECAY_GRACE_DAYS).max(0);
    let multiplier = (1.0 - days_over_grace as f64 * DECAY_RATE_PER_DAY).max(DECAY_FLOOR);

    composite_score * multiplier
}

/// Tier thresholds, highest first.
pub fn tier_from_score(score: Option<f64>) -> SkillTier {
    match score {
        None => SkillTier::Unranked,
        Some(s) if s >= 85.0 => SkillTier::Diamante,
        Some(s) if s >= 70.0 => SkillTier::Platino,
        Some(s) if s >= 55.0 => SkillTier::Oro,
        Some(s) if s >= 40.0 => SkillTier::Plata,
        Some(_) => SkillTier::Bronce,
    }
}

/// Rollup of a single technique over its recent analysis window, on the
/// 0-100 scale.
#[derive(Debug, Clone)]
pub struct TechniqueAggregate {
    pub technique_id: Uuid,
    pub technique_slug: String,
    pub best_score: f64,
    pub average_score: f64,
    pub analysis_count: i32,
    pub last_analysis_id: Uuid,
    pub last_analysis_at: Option<DateTime<Utc>>,
    pub history: Vec<ScoreHistoryEntry>,
}

/// Groups completed analyses (newest first) by technique, keeping the most
/// recent [`RECENT_WINDOW`] per technique and rescaling 0-10 scores to 0-100.
pub fn aggregate_recent(rows: &[CompletedAnalysisRow]) -> Vec<TechniqueAggregate> {
    let mut aggregates: Vec<TechniqueAggregate> = Vec::new();

    for row in rows {
        let rescaled = row.overall_score * 10.0;

        match aggregates
            .iter_mut()
            .find(|a| a.technique_id == row.technique_id)
        {
            Some(agg) => {
                if agg.history.len() >= RECENT_WINDOW {
                    continue;
                }
                agg.history.push(ScoreHistoryEntry {
                    attempt: agg.history.len() as i32,
                    score: rescaled,
                    analysis_id: row.analysis_id,
                    recorded_at: row.completed_at,
                });
            }
            None => {
                aggregates.push(TechniqueAggregate {
                    technique_id: row.technique_id,
                    technique_slug: row.technique_slug.clone(),
                    best_score: 0.0,
                    average_score: 0.0,
                    analysis_count: 0,
                    last_analysis_id: row.analysis_id,
                    last_analysis_at: Some(row.completed_at),
                    history: vec![ScoreHistoryEntry {
                        attempt: 0,
                        score: rescaled,
                        analysis_id: row.analysis_id,
                        recorded_at: row.completed_at,
                    }],
                });
            }
        }
    }

    for agg in &mut aggregates {
        let scores: Vec<f64> = agg.history.iter().map(|h| h.score).collect();
        agg.best_score = scores.iter().cloned().fold(f64::MIN, f64::max);
        agg.average_score = scores.iter().sum::<f64>() / scores.len() as f64;
        agg.analysis_count = scores.len() as i32;
    }

    aggregates
}

/// Weighted composite over each technique's best score, or `None` while the
/// profile has fewer than [`MIN_RANKED_TECHNIQUES`] distinct techniques.
pub fn composite_score(aggregates: &[TechniqueAggregate]) -> Option<f64> {
    if aggregates.len() < MIN_RANKED_TECHNIQUES {
        return None;
    }

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for agg in aggregates {
        let weight = technique_weight(&agg.technique_slug);
        weighted_sum += weight * agg.best_score;
        weight_total += weight;
    }

    Some(weighted_sum / weight_total)
}

/// Recomputes all technique scores and the sport profile rollup for one
/// player, invoked after every completed analysis. A missing sport profile is
/// a no-op, not an error. Decay is intentionally not applied here; the batch
/// ranking pass owns the effective score.
pub async fn recalculate(
    pool: &PgPool,
    profile_id: Uuid,
    sport_id: Uuid,
    now: DateTime<Utc>,
) -> Result<()> {
    let profiles = ProfileRepository::new(pool);
    let Some(sport_profile) = profiles.find_sport_profile(profile_id, sport_id).await? else {
        tracing::debug!(%profile_id, %sport_id, "no sport profile yet, skipping recalculation");
        return Ok(());
    };

    let analyses = AnalysisRepository::new(pool);
    let rows = analyses.completed_for_sport(profile_id, sport_id).await?;

    let aggregates = aggregate_recent(&rows);

    let technique_scores = TechniqueScoreRepository::new(pool);
    for agg in &aggregates {
        technique_scores
            .upsert(sport_profile.sport_profile_id, agg, now)
            .await?;
    }

    let composite = composite_score(&aggregates);
    let tier = tier_from_score(composite);
    let previous_tier = sport_profile.skill_tier;

    profiles
        .update_sport_scores(
            sport_profile.sport_profile_id,
            composite,
            composite,
            tier,
            rows.len() as i32,
            aggregates.len() as i32,
            now,
        )
        .await?;

    // Fire-and-forget promotion event; delivery failures must never fail the
    // recalculation, so this is just a structured log the notifier tails.
    if tier != previous_tier && tier != SkillTier::Unranked {
        tracing::info!(
            %profile_id,
            %sport_id,
            ?previous_tier,
            new_tier = ?tier,
            "tier promotion"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(technique: Uuid, slug: &str, score: f64, days_ago: i64) -> CompletedAnalysisRow {
        CompletedAnalysisRow {
            analysis_id: Uuid::new_v4(),
            technique_id: technique,
            technique_slug: slug.to_string(),
            overall_score: score,
            completed_at: Utc::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn decay_untouched_without_last_update() {
        assert_eq!(decay_score(80.0, None, Utc::now()), 80.0);
    }

    #[test]
    fn decay_no_penalty_within_grace() {
        let now = Utc::now();
        for days in [0, 1, 15, 30] {
            let last = now - Duration::days(days);
            assert_eq!(decay_score(80.0, Some(last), now), 80.0, "day {days}");
        }
    }

    #[test]
    fn decay_is_monotonic_past_grace() {
        let now = Utc::now();
        let mut previous = f64::MAX;
        for days in 30..200 {
            let effective = decay_score(80.0, Some(now - Duration::days(days)), now);
            assert!(effective <= previous, "day {days}");
            previous = effective;
        }
    }

    #[test]
    fn decay_linear_past_grace() {
        let now = Utc::now();
        // 40 days old: 10 days over grace, 5% off.
        let effective = decay_score(80.0, Some(now - Duration::days(40)), now);
        assert!((effective - 76.0).abs() < 1e-9);
    }

    #[test]
    fn decay_floors_at_seventy_percent() {
        let now = Utc::now();
        let ancient = now - Duration::days(10_000);
        assert_eq!(decay_score(80.0, Some(ancient), now), 80.0 * 0.7);
    }

    #[test]
    fn tier_thresholds() {
        assert_eq!(tier_from_score(None), SkillTier::Unranked);
        assert_eq!(tier_from_score(Some(0.0)), SkillTier::Bronce);
        assert_eq!(tier_from_score(Some(39.9)), SkillTier::Bronce);
        assert_eq!(tier_from_score(Some(40.0)), SkillTier::Plata);
        assert_eq!(tier_from_score(Some(55.0)), SkillTier::Oro);
        assert_eq!(tier_from_score(Some(70.0)), SkillTier::Platino);
        assert_eq!(tier_from_score(Some(84.99)), SkillTier::Platino);
        assert_eq!(tier_from_score(Some(85.0)), SkillTier::Diamante);
        assert_eq!(tier_from_score(Some(100.0)), SkillTier::Diamante);
    }

    #[test]
    fn aggregation_keeps_three_most_recent_per_technique() {
        let technique = Uuid::new_v4();
        let rows = vec![
            row(technique, "serve", 9.0, 1),
            row(technique, "serve", 8.0, 2),
            row(technique, "serve", 7.0, 3),
            row(technique, "serve", 2.0, 4), // outside the window
        ];

        let aggregates = aggregate_recent(&rows);
        assert_eq!(aggregates.len(), 1);
        let agg = &aggregates[0];
        assert_eq!(agg.analysis_count, 3);
        assert_eq!(agg.best_score, 90.0);
        assert!((agg.average_score - 80.0).abs() < 1e-9);
        assert_eq!(agg.history.len(), 3);
        assert_eq!(agg.history[0].attempt, 0);
        assert_eq!(agg.history[2].attempt, 2);
    }

    #[test]
    fn two_techniques_never_produce_a_composite() {
        let rows = vec![
            row(Uuid::new_v4(), "serve", 10.0, 1),
            row(Uuid::new_v4(), "forehand", 10.0, 1),
        ];
        let aggregates = aggregate_recent(&rows);
        assert_eq!(composite_score(&aggregates), None);
        assert_eq!(tier_from_score(composite_score(&aggregates)), SkillTier::Unranked);
    }

    #[test]
    fn third_technique_unlocks_composite() {
        let rows = vec![
            row(Uuid::new_v4(), "serve", 10.0, 1),
            row(Uuid::new_v4(), "forehand", 10.0, 1),
            row(Uuid::new_v4(), "backhand", 1.0, 1),
        ];
        let aggregates = aggregate_recent(&rows);
        assert!(composite_score(&aggregates).is_some());
    }

    #[test]
    fn weighted_composite_scenario() {
        let rows = vec![
            row(Uuid::new_v4(), "serve", 9.0, 1),
            row(Uuid::new_v4(), "forehand", 7.0, 1),
            row(Uuid::new_v4(), "backhand", 8.0, 1),
        ];
        let aggregates = aggregate_recent(&rows);
        let composite = composite_score(&aggregates).unwrap();

        // (1.0*90 + 1.0*70 + 0.9*80) / 2.9
        let expected = (90.0 + 70.0 + 0.9 * 80.0) / 2.9;
        assert!((composite - expected).abs() < 1e-9);
        assert_eq!(tier_from_score(Some(composite)), SkillTier::Platino);
    }

    #[test]
    fn unknown_technique_uses_default_weight() {
        assert_eq!(technique_weight("no-such-stroke"), DEFAULT_TECHNIQUE_WEIGHT);
    }
}
