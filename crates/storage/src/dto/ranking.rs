use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::dto::common::{MAX_PAGE_SIZE, default_page, default_page_size};
use crate::models::SkillTier;

#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaderboardFilter {
    /// Sport slug the leaderboard is scoped to.
    pub sport: String,
    /// When present, ranks are the country ranks for this country.
    pub country: Option<String>,
    /// 1-indexed page.
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl LeaderboardFilter {
    pub fn validate(&self) -> Result<(), String> {
        if self.sport.trim().is_empty() {
            return Err("sport must not be empty".to_string());
        }

        if self.page < 1 {
            return Err("page must be at least 1".to_string());
        }

        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(format!("page_size must be between 1 and {MAX_PAGE_SIZE}"));
        }

        Ok(())
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.page_size
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub player: PlayerInfo,
    pub composite_score: f64,
    pub effective_score: f64,
    pub skill_tier: SkillTier,
    pub total_analyses: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerInfo {
    pub profile_id: Uuid,
    pub display_name: String,
    pub country: String,
}

/// Counts returned by the admin recompute trigger.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct RecomputeSummary {
    pub recomputed: u64,
    pub sports: u64,
    pub countries: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::common::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

    // Axum's Query extractor goes through serde_urlencoded, which cannot
    // handle numeric fields behind #[serde(flatten)]; page and page_size
    // are kept as direct fields so real query strings parse.
    #[test]
    fn query_string_with_paging_deserializes() {
        let filter: LeaderboardFilter =
            serde_urlencoded::from_str("sport=padel&country=ES&page=2&page_size=10").unwrap();

        assert_eq!(filter.sport, "padel");
        assert_eq!(filter.country.as_deref(), Some("ES"));
        assert_eq!(filter.page, 2);
        assert_eq!(filter.page_size, 10);
        assert!(filter.validate().is_ok());
        assert_eq!(filter.offset(), 10);
    }

    #[test]
    fn paging_defaults_apply_when_omitted() {
        let filter: LeaderboardFilter = serde_urlencoded::from_str("sport=tenis").unwrap();

        assert_eq!(filter.page, DEFAULT_PAGE);
        assert_eq!(filter.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn out_of_range_paging_is_rejected() {
        let filter: LeaderboardFilter =
            serde_urlencoded::from_str("sport=tenis&page=0").unwrap();
        assert!(filter.validate().is_err());

        let filter: LeaderboardFilter =
            serde_urlencoded::from_str("sport=tenis&page_size=500").unwrap();
        assert!(filter.validate().is_err());
    }

    #[test]
    fn blank_sport_is_rejected() {
        let filter: LeaderboardFilter = serde_urlencoded::from_str("sport=%20").unwrap();
        assert!(filter.validate().is_err());
    }
}
