use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::house::House;
use super::validation::{Checker, ValidationError};
use super::RecordFields;

pub const DEFAULT_STUDENT_NAME: &str = "Anonymous";
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Validated feedback fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub student_name: String,
    pub house: House,
    pub rating: u8,
    pub comment: String,
}

/// Feedback as submitted; any JSON per field, extras dropped.
/// Only a JSON object is accepted; arrays never bind to fields by position.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct FeedbackDraft {
    pub student_name: Option<Value>,
    pub house: Option<Value>,
    pub rating: Option<Value>,
    pub comment: Option<Value>,
}

impl From<Map<String, Value>> for FeedbackDraft {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            student_name: body.remove("studentName"),
            house: body.remove("house"),
            rating: body.remove("rating"),
            comment: body.remove("comment"),
        }
    }
}

impl RecordFields for Feedback {
    type Draft = FeedbackDraft;

    const COLLECTION: &'static str = "feedbacks";
    const LABEL: &'static str = "Feedback";
    const LIST_FAILURE: &'static str = "Failed to retrieve feedback from the database.";

    fn from_draft(draft: FeedbackDraft) -> Result<Self, ValidationError> {
        let mut check = Checker::new(Self::LABEL);

        let student_name =
            check.required_text("studentName", draft.student_name, Some(DEFAULT_STUDENT_NAME));

        let house = match draft.house {
            None | Some(Value::Null) => {
                check.fail("house", "Path `house` is required.");
                None
            }
            Some(Value::String(s)) => match s.parse::<House>() {
                Ok(h) => Some(h),
                Err(msg) => {
                    check.fail("house", msg);
                    None
                }
            },
            Some(other) => {
                check.fail("house", format!("`{}` is not a valid enum value", other));
                None
            }
        };

        let rating = check.integer_in_range("rating", draft.rating, MIN_RATING, MAX_RATING);
        let comment = check.optional_text("comment", draft.comment);

        let record = match (student_name, house, rating, comment) {
            (Some(student_name), Some(house), Some(rating), Some(comment)) => Some(Feedback {
                student_name,
                house,
                rating: rating as u8,
                comment,
            }),
            _ => None,
        };
        check.finish(record)
    }
}
