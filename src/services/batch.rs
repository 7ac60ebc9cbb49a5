use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::database::{NameMatch, RecordStore, StoreError, StudentRoster};
use crate::records::{FeedbackDraft, House, RecordFields, Stored, ValidationError};

#[derive(Debug, Error)]
pub enum BatchError {
    /// Drafts that failed validation, keyed by position; nothing was written
    #[error("{} of {total} records failed validation", .failures.len())]
    Invalid {
        total: usize,
        failures: BTreeMap<usize, ValidationError>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validate every draft, then insert them in order.
///
/// Nothing is written unless every draft validates.
pub async fn import<F, S>(store: &S, drafts: Vec<F::Draft>) -> Result<Vec<Stored<F>>, BatchError>
where
    F: RecordFields,
    S: RecordStore<F> + ?Sized,
{
    let total = drafts.len();
    let mut valid = Vec::with_capacity(total);
    let mut failures = BTreeMap::new();

    for (index, draft) in drafts.into_iter().enumerate() {
        match F::from_draft(draft) {
            Ok(fields) => valid.push(fields),
            Err(e) => {
                failures.insert(index, e);
            }
        }
    }

    if !failures.is_empty() {
        return Err(BatchError::Invalid { total, failures });
    }

    Ok(store.insert_many(valid).await?)
}

/// A house roster: one feedback entry per listed student
#[derive(Debug, Clone, Deserialize)]
pub struct Roster {
    pub house: House,
    #[serde(default = "Roster::default_rating")]
    pub rating: u8,
    pub comment: Option<String>,
    pub students: Vec<String>,
}

impl Roster {
    fn default_rating() -> u8 {
        5
    }

    /// Feedback drafts for every student on the roster
    pub fn drafts(&self) -> Vec<FeedbackDraft> {
        let comment = self
            .comment
            .clone()
            .unwrap_or_else(|| format!("Student entry - {} House", self.house));

        self.students
            .iter()
            .map(|name| FeedbackDraft {
                student_name: Some(Value::String(name.clone())),
                house: Some(Value::String(self.house.to_string())),
                rating: Some(Value::from(self.rating)),
                comment: Some(Value::String(comment.clone())),
            })
            .collect()
    }
}

/// Remove each named student's feedback from one house.
///
/// Returns `(name, removed)` per requested name, in request order.
pub async fn remove_students<S>(
    store: &S,
    house: House,
    names: &[String],
    mode: NameMatch,
) -> Result<Vec<(String, u64)>, StoreError>
where
    S: StudentRoster + ?Sized,
{
    let mut report = Vec::with_capacity(names.len());
    for name in names {
        let removed = store.remove_students(house, name, mode).await?;
        tracing::info!("Removed {} feedback(s) for {} in {}", removed, name, house);
        report.push((name.clone(), removed));
    }
    Ok(report)
}
