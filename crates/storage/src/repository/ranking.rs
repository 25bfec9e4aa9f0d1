use sqlx::{FromRow, PgPool, QueryBuilder};
use uuid::Uuid;

use crate::dto::ranking::{LeaderboardEntry, LeaderboardFilter, PlayerInfo};
use crate::error::Result;
use crate::models::SkillTier;

#[derive(FromRow)]
struct LeaderboardRow {
    rank: i64,
    profile_id: Uuid,
    display_name: String,
    country: String,
    composite_score: f64,
    effective_score: f64,
    skill_tier: SkillTier,
    total_analyses: i32,
}

pub struct RankingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RankingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Public leaderboard read over the persisted sport profile ranks.
    pub async fn leaderboard(
        &self,
        filter: &LeaderboardFilter,
    ) -> Result<(Vec<LeaderboardEntry>, i64)> {
        let offset = filter.offset() as i64;
        let limit = filter.limit() as i64;

        let total_items = self.count_ranked(filter).await?;
        let entries = self.fetch_entries(filter, offset, limit).await?;

        Ok((entries, total_items))
    }

    async fn count_ranked(&self, filter: &LeaderboardFilter) -> Result<i64> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT COUNT(*)
            FROM sport_profiles sp
            INNER JOIN sports s ON s.sport_id = sp.sport_id
            INNER JOIN player_profiles pp ON pp.profile_id = sp.profile_id
            WHERE sp.effective_score IS NOT NULL
              AND sp.skill_tier <> 'UNRANKED'
              AND pp.visibility <> 'PRIVATE'
              AND s.slug =
            "#,
        );
        query.push_bind(&filter.sport);

        if let Some(ref country) = filter.country {
            query.push(" AND pp.country = ");
            query.push_bind(country);
        }

        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    async fn fetch_entries(
        &self,
        filter: &LeaderboardFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let rank_column = if filter.country.is_some() {
            "sp.country_rank"
        } else {
            "sp.global_rank"
        };

        let mut query = QueryBuilder::new("SELECT COALESCE(");
        query.push(rank_column);
        query.push(
            r#"
            , 0)::bigint AS rank,
                   pp.profile_id, pp.display_name, pp.country,
                   sp.composite_score, sp.effective_score, sp.skill_tier, sp.total_analyses
            FROM sport_profiles sp
            INNER JOIN sports s ON s.sport_id = sp.sport_id
            INNER JOIN player_profiles pp ON pp.profile_id = sp.profile_id
            WHERE sp.effective_score IS NOT NULL
              AND sp.skill_tier <> 'UNRANKED'
              AND pp.visibility <> 'PRIVATE'
              AND s.slug =
            "#,
        );
        query.push_bind(&filter.sport);

        if let Some(ref country) = filter.country {
            query.push(" AND pp.country = ");
            query.push_bind(country);
        }

        query.push(" ORDER BY sp.effective_score DESC, sp.sport_profile_id ASC LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let rows: Vec<LeaderboardRow> = query.build_query_as().fetch_all(self.pool).await?;

        let entries = rows
            .into_iter()
            .map(|row| LeaderboardEntry {
                rank: row.rank,
                player: PlayerInfo {
                    profile_id: row.profile_id,
                    display_name: row.display_name,
                    country: row.country,
                },
                composite_score: row.composite_score,
                effective_score: row.effective_score,
                skill_tier: row.skill_tier,
                total_analyses: row.total_analyses,
            })
            .collect();

        Ok(entries)
    }
}
