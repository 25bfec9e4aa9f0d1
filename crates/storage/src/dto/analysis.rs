use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::IssueSeverity;
use crate::repository::analysis::NewIssue;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompleteAnalysisRequest {
    /// Overall technique score on the analyzer's 0-10 scale.
    #[validate(range(min = 0.0, max = 10.0))]
    pub overall_score: f64,
    #[validate(nested)]
    pub issues: Vec<IssueInput>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IssueInput {
    pub severity: IssueSeverity,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub correction: String,
    #[serde(default)]
    pub drill_suggestions: Vec<String>,
}

impl From<IssueInput> for NewIssue {
    fn from(input: IssueInput) -> Self {
        Self {
            severity: input.severity,
            category: input.category,
            description: input.description,
            correction: input.correction,
            drill_suggestions: input.drill_suggestions,
        }
    }
}
