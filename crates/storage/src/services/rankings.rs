use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::dto::ranking::RecomputeSummary;
use crate::error::Result;
use crate::models::{ProfileVisibility, RankingCategory, SkillTier};
use crate::repository::profile::ProfileRepository;
use crate::services::skill_score::decay_score;

pub const RANKING_PERIOD: &str = "ALL_TIME";

/// Sport profile eligible for the decay pass, joined with the owning player.
#[derive(Debug, Clone, FromRow)]
struct EligibleProfile {
    sport_profile_id: Uuid,
    composite_score: f64,
    last_score_update: Option<DateTime<Utc>>,
    country: String,
    visibility: ProfileVisibility,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankAssignment {
    pub sport_profile_id: Uuid,
    pub rank: i32,
    pub effective_score: f64,
}

/// Dense ranks 1..N over one grouping, highest effective score first.
/// Ties are broken by ascending sport profile id so recomputation is
/// deterministic regardless of query iteration order.
pub fn assign_dense_ranks(entries: &[(Uuid, f64)]) -> Vec<RankAssignment> {
    let mut sorted: Vec<(Uuid, f64)> = entries.to_vec();
    sorted.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, (sport_profile_id, effective_score))| RankAssignment {
            sport_profile_id,
            rank: (i + 1) as i32,
            effective_score,
        })
        .collect()
}

/// First day of the month `now` falls in, the period key of ranking snapshots.
pub fn period_start_for(now: DateTime<Utc>) -> NaiveDate {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1).unwrap_or_else(|| now.date_naive())
}

/// Batch ranking job: per active sport, decay every scored profile, then
/// assign country and global dense ranks and upsert the ranking snapshots.
/// Finishes by syncing each player's best sport onto their summary profile.
///
/// `now` is injected so scheduled runs and tests agree on what "today" is.
pub async fn compute_all_rankings(pool: &PgPool, now: DateTime<Utc>) -> Result<RecomputeSummary> {
    let sports = ProfileRepository::new(pool).list_active_sports().await?;

    let mut summary = RecomputeSummary::default();

    for sport in &sports {
        let (recomputed, countries) = compute_sport_rankings(pool, sport.sport_id, now).await?;
        summary.recomputed += recomputed;
        summary.countries += countries;
        summary.sports += 1;

        tracing::info!(
            sport = %sport.slug,
            recomputed,
            countries,
            "ranking pass finished"
        );
    }

    sync_best_scores(pool).await?;

    Ok(summary)
}

/// One sport's decay + country + global passes, committed as a single
/// transaction so no half-updated ordering is ever observable.
async fn compute_sport_rankings(
    pool: &PgPool,
    sport_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(u64, u64)> {
    let mut tx = pool.begin().await?;

    let profiles = sqlx::query_as::<_, EligibleProfile>(
        r#"
        SELECT sp.sport_profile_id, sp.composite_score, sp.last_score_update,
               pp.country, pp.visibility
        FROM sport_profiles sp
        INNER JOIN player_profiles pp ON pp.profile_id = sp.profile_id
        WHERE sp.sport_id = $1
          AND sp.composite_score IS NOT NULL
          AND sp.skill_tier <> $2
        "#,
    )
    .bind(sport_id)
    .bind(SkillTier::Unranked)
    .fetch_all(&mut *tx)
    .await?;

    // Decay pass runs first so both rank passes order by decayed scores.
    let mut decayed: Vec<(EligibleProfile, f64)> = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let effective = decay_score(profile.composite_score, profile.last_score_update, now);

        sqlx::query("UPDATE sport_profiles SET effective_score = $2 WHERE sport_profile_id = $1")
            .bind(profile.sport_profile_id)
            .bind(effective)
            .execute(&mut *tx)
            .await?;

        decayed.push((profile, effective));
    }

    let visible: Vec<&(EligibleProfile, f64)> = decayed
        .iter()
        .filter(|(p, _)| p.visibility != ProfileVisibility::Private)
        .collect();

    let period_start = period_start_for(now);

    // Country pass.
    let mut by_country: BTreeMap<&str, Vec<(Uuid, f64)>> = BTreeMap::new();
    for (profile, effective) in &visible {
        by_country
            .entry(profile.country.as_str())
            .or_default()
            .push((profile.sport_profile_id, *effective));
    }

    let countries = by_country.len() as u64;

    for (country, entries) in &by_country {
        for assignment in assign_dense_ranks(entries) {
            sqlx::query("UPDATE sport_profiles SET country_rank = $2 WHERE sport_profile_id = $1")
                .bind(assignment.sport_profile_id)
                .bind(assignment.rank)
                .execute(&mut *tx)
                .await?;

            upsert_snapshot(
                &mut tx,
                &assignment,
                RankingCategory::Country,
                Some(country),
                period_start,
                now,
            )
            .await?;
        }
    }

    // Global pass.
    let global_entries: Vec<(Uuid, f64)> = visible
        .iter()
        .map(|(p, e)| (p.sport_profile_id, *e))
        .collect();

    for assignment in assign_dense_ranks(&global_entries) {
        sqlx::query("UPDATE sport_profiles SET global_rank = $2 WHERE sport_profile_id = $1")
            .bind(assignment.sport_profile_id)
            .bind(assignment.rank)
            .execute(&mut *tx)
            .await?;

        upsert_snapshot(
            &mut tx,
            &assignment,
            RankingCategory::Global,
            None,
            period_start,
            now,
        )
        .await?;
    }

    let recomputed = decayed.len() as u64;

    tx.commit().await?;

    Ok((recomputed, countries))
}

/// Idempotent snapshot upsert keyed by the natural key. On conflict the
/// previously stored rank moves into `previous_rank` before being replaced.
async fn upsert_snapshot(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    assignment: &RankAssignment,
    category: RankingCategory,
    country: Option<&str>,
    period_start: NaiveDate,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO rankings
            (sport_profile_id, category, period, country, period_start,
             rank, previous_rank, effective_score, computed_at)
        VALUES ($1, $2, $3, $4, $5, $6, NULL, $7, $8)
        ON CONFLICT (sport_profile_id, category, period, COALESCE(country, ''), period_start)
        DO UPDATE SET
            previous_rank = rankings.rank,
            rank = EXCLUDED.rank,
            effective_score = EXCLUDED.effective_score,
            computed_at = EXCLUDED.computed_at
        "#,
    )
    .bind(assignment.sport_profile_id)
    .bind(category)
    .bind(RANKING_PERIOD)
    .bind(country)
    .bind(period_start)
    .bind(assignment.rank)
    .bind(assignment.effective_score)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[derive(Debug, Clone, FromRow)]
struct BestSportRow {
    profile_id: Uuid,
    composite_score: f64,
    effective_score: Option<f64>,
    skill_tier: SkillTier,
    global_rank: Option<i32>,
    country_rank: Option<i32>,
}

/// Copies each player's best-performing sport scores onto the denormalized
/// player profile. Best is the highest effective score; ties fall back to
/// the smaller sport profile id via the query ordering.
pub async fn sync_best_scores(pool: &PgPool) -> Result<()> {
    let rows = sqlx::query_as::<_, BestSportRow>(
        r#"
        SELECT DISTINCT ON (profile_id)
               profile_id, composite_score, effective_score, skill_tier,
               global_rank, country_rank
        FROM sport_profiles
        WHERE composite_score IS NOT NULL
        ORDER BY profile_id, effective_score DESC NULLS LAST, sport_profile_id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let synced = rows.len();

    for row in rows {
        sqlx::query(
            r#"
            UPDATE player_profiles
            SET composite_score = $2, effective_score = $3, skill_tier = $4,
                global_rank = $5, country_rank = $6
            WHERE profile_id = $1
            "#,
        )
        .bind(row.profile_id)
        .bind(row.composite_score)
        .bind(row.effective_score)
        .bind(row.skill_tier)
        .bind(row.global_rank)
        .bind(row.country_rank)
        .execute(pool)
        .await?;
    }

    tracing::info!(synced, "best-sport scores synchronized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ranks_are_dense_over_the_grouping() {
        let entries: Vec<(Uuid, f64)> = (0..10).map(|i| (Uuid::new_v4(), i as f64)).collect();
        let assignments = assign_dense_ranks(&entries);

        let mut ranks: Vec<i32> = assignments.iter().map(|a| a.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=10).collect::<Vec<i32>>());
    }

    #[test]
    fn highest_score_gets_rank_one() {
        let best = Uuid::new_v4();
        let entries = vec![(Uuid::new_v4(), 40.0), (best, 92.5), (Uuid::new_v4(), 71.0)];
        let assignments = assign_dense_ranks(&entries);

        assert_eq!(assignments[0].sport_profile_id, best);
        assert_eq!(assignments[0].rank, 1);
    }

    #[test]
    fn ties_break_by_ascending_profile_id() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);

        // Same score, both input orders produce the same ranking.
        let forward = assign_dense_ranks(&[(a, 75.0), (b, 75.0)]);
        let backward = assign_dense_ranks(&[(b, 75.0), (a, 75.0)]);

        assert_eq!(forward, backward);
        assert_eq!(forward[0].sport_profile_id, a);
        assert_eq!(forward[0].rank, 1);
        assert_eq!(forward[1].rank, 2);
    }

    #[test]
    fn period_start_is_first_of_month() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        assert_eq!(
            period_start_for(now),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
        );
    }
}
