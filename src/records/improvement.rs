use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validation::{Checker, ValidationError};
use super::RecordFields;

/// Validated improvement suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    pub problem: String,
    pub solution: String,
    pub submitted_by: String,
}

/// Object-only request shape, like [`FeedbackDraft`](super::FeedbackDraft)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ImprovementDraft {
    pub problem: Option<Value>,
    pub solution: Option<Value>,
    pub submitted_by: Option<Value>,
}

impl From<Map<String, Value>> for ImprovementDraft {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            problem: body.remove("problem"),
            solution: body.remove("solution"),
            submitted_by: body.remove("submittedBy"),
        }
    }
}

impl RecordFields for Improvement {
    type Draft = ImprovementDraft;

    const COLLECTION: &'static str = "improvements";
    const LABEL: &'static str = "Improvement";
    const LIST_FAILURE: &'static str = "Failed to retrieve improvements from the database.";

    fn from_draft(draft: ImprovementDraft) -> Result<Self, ValidationError> {
        let mut check = Checker::new(Self::LABEL);
        let problem = check.required_text("problem", draft.problem, None);
        let solution = check.required_text("solution", draft.solution, None);
        let submitted_by = check.required_text("submittedBy", draft.submitted_by, None);
        let record = match (problem, solution, submitted_by) {
            (Some(problem), Some(solution), Some(submitted_by)) => Some(Improvement {
                problem,
                solution,
                submitted_by,
            }),
            _ => None,
        };
        check.finish(record)
    }
}
