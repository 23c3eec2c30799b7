//! Caller identity resolution.
//!
//! Requests that act on behalf of a member carry the member id in the
//! `x-member-id` header.  Members are provisioned outside this service, so
//! the header is trusted as-is; a deployment would put a real authentication
//! proxy in front and have it set the header.

use axum::http::HeaderMap;

use crate::error::ApiError;

pub const CALLER_HEADER: &str = "x-member-id";

/// Resolve the calling member's id from the request headers.
pub fn caller_id(headers: &HeaderMap) -> Result<i64, ApiError> {
    let Some(value) = headers.get(CALLER_HEADER) else {
        return Err(ApiError::BadRequest(format!(
            "missing {CALLER_HEADER} header"
        )));
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| ApiError::BadRequest(format!("{CALLER_HEADER} header must be a number")))
}
