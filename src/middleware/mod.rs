pub mod auth;
pub mod response;

pub use auth::{require_session, AuthState, AuthUser};
pub use response::{ApiJson, ApiResponse, ApiResult};
