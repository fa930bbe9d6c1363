//! School context extractor for multi-tenancy.
//!
//! The authenticating frontend resolves the session and forwards the tenant
//! and actor as headers; every handler receives them through this extractor
//! and scopes its queries by `school_id`.

use crate::policy::Role;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use uuid::Uuid;

pub const SCHOOL_ID_HEADER: &str = "X-School-ID";
pub const USER_ID_HEADER: &str = "X-User-ID";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Tenant and actor context for a request.
#[derive(Debug, Clone)]
pub struct SchoolContext {
    pub school_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
}

fn header_uuid(parts: &Parts, name: &'static str) -> Result<Uuid, AppError> {
    let raw = parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Missing {} header", name)))?;

    Uuid::parse_str(raw)
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid {} header", name)))
}

#[async_trait]
impl<S> FromRequestParts<S> for SchoolContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let school_id = header_uuid(parts, SCHOOL_ID_HEADER)?;
        let user_id = header_uuid(parts, USER_ID_HEADER)?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Role::parse)
            .ok_or_else(|| {
                AppError::Unauthorized(anyhow::anyhow!(
                    "Missing or unrecognized {} header",
                    USER_ROLE_HEADER
                ))
            })?;

        let span = tracing::Span::current();
        span.record("school_id", school_id.to_string().as_str());
        span.record("user_id", user_id.to_string().as_str());

        Ok(SchoolContext {
            school_id,
            user_id,
            role,
        })
    }
}
