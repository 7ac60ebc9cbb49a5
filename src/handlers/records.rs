//! CRUD handlers shared by every record type.
//!
//! Routes instantiate these per type, e.g. `create::<Feedback>` for
//! `POST /api/feedback`. Mutating routes may be wrapped by the session gate;
//! handlers only read the caller's identity for logging.

use axum::extract::{Path, State};
use axum::Extension;
use serde::Serialize;
use uuid::Uuid;

use crate::app::{AppState, HasStore};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::records::{RecordFields, Stored};

/// Body returned by a successful delete
#[derive(Debug, Serialize)]
pub struct Deleted<F> {
    pub message: String,
    pub deleted: Stored<F>,
}

/// GET /api/{collection} - every record, newest first
pub async fn list<F>(State(state): State<AppState>) -> ApiResult<Vec<Stored<F>>>
where
    F: RecordFields,
    AppState: HasStore<F>,
{
    let records = HasStore::<F>::store(&state).list_all().await.map_err(|e| {
        tracing::error!("Error fetching {}: {}", F::COLLECTION, e);
        ApiError::internal_server_error(F::LIST_FAILURE)
    })?;

    Ok(ApiResponse::success(records))
}

/// POST /api/{collection} - validate and persist
pub async fn create<F>(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    ApiJson(draft): ApiJson<F::Draft>,
) -> ApiResult<Stored<F>>
where
    F: RecordFields,
    AppState: HasStore<F>,
{
    let fields = F::from_draft(draft)?;
    let stored = HasStore::<F>::store(&state).create(fields).await?;

    tracing::info!("Created {} {} by {}", F::LABEL, stored.id, actor(&user));
    Ok(ApiResponse::created(stored))
}

/// PUT /api/{collection}/:id - full replace, re-validated
pub async fn update<F>(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
    ApiJson(draft): ApiJson<F::Draft>,
) -> ApiResult<Stored<F>>
where
    F: RecordFields,
    AppState: HasStore<F>,
{
    let id = parse_id(&id)?;
    let fields = F::from_draft(draft)?;
    let updated = HasStore::<F>::store(&state).update_by_id(id, fields).await?;

    tracing::info!("Updated {} {} by {}", F::LABEL, id, actor(&user));
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/{collection}/:id
pub async fn delete<F>(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
) -> ApiResult<Deleted<F>>
where
    F: RecordFields,
    AppState: HasStore<F>,
{
    let id = parse_id(&id)?;
    let deleted = HasStore::<F>::store(&state).delete_by_id(id).await?;

    tracing::info!("Deleted {} {} by {}", F::LABEL, id, actor(&user));
    Ok(ApiResponse::success(Deleted {
        message: format!("{} deleted successfully", F::LABEL),
        deleted,
    }))
}

fn actor(user: &Option<Extension<AuthUser>>) -> &str {
    match user {
        Some(Extension(AuthUser(identity))) => &identity.email,
        None => "anonymous",
    }
}

/// Wrong-shape identifiers are a client error; well-formed unknown ones are 404
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))
}
