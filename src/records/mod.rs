//! Record definitions shared by the HTTP server and the maintenance CLI.
//!
//! Every persisted record is a [`Stored<F>`]: store-assigned `_id` and
//! `timestamp` wrapped around the validated fields `F`. Request bodies arrive
//! as loosely-typed drafts and only become `F` through [`RecordFields::from_draft`].

use chrono::{DateTime, SubsecRound, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

pub mod feedback;
pub mod house;
pub mod improvement;
pub mod validation;

pub use feedback::{Feedback, FeedbackDraft};
pub use house::House;
pub use improvement::{Improvement, ImprovementDraft};
pub use validation::ValidationError;

/// A record type the stores and handlers can work with generically
pub trait RecordFields:
    Clone + std::fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Untrusted request shape; unknown fields are ignored by serde
    type Draft: DeserializeOwned + Send + 'static;

    /// Collection (table) name
    const COLLECTION: &'static str;

    /// Human label used in messages, e.g. "Feedback"
    const LABEL: &'static str;

    /// Message returned when listing the collection fails
    const LIST_FAILURE: &'static str;

    /// Validate and normalize a draft; all-or-nothing
    fn from_draft(draft: Self::Draft) -> Result<Self, ValidationError>;
}

/// A persisted record: identity and creation time around the record fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<F> {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: F,
    pub timestamp: DateTime<Utc>,
}

impl<F: RecordFields> Stored<F> {
    /// Assign a fresh id and the current instant
    pub fn new(fields: F) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
            timestamp: now(),
        }
    }
}

/// Creation instant at the precision the stores keep (milliseconds)
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
