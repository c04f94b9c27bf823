//! Role extraction and capability checks.
//!
//! The caller's role comes from the `x-topichub-role` header. Requests
//! without one act as the configured default role.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use topichub_core::roles::{Capability, Role};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying the caller's role name.
pub const ROLE_HEADER: &str = "x-topichub-role";

/// The role a request acts as.
///
/// ```ignore
/// async fn delete_topic(caller: Caller, ...) -> AppResult<impl IntoResponse> {
///     caller.require(Capability::Delete)?;
///     ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub role: Role,
}

impl Caller {
    /// Reject with 403 Forbidden unless the role grants `capability`.
    pub fn require(&self, capability: Capability) -> AppResult<()> {
        self.role.require(capability).map_err(AppError::Core)
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let role = match parts.headers.get(ROLE_HEADER) {
            None => state.config.default_role,
            Some(value) => value
                .to_str()
                .map_err(|_| AppError::BadRequest(format!("{ROLE_HEADER} must be ASCII")))?
                .parse()?,
        };
        Ok(Caller { role })
    }
}
