use std::str::FromStr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use vitrina_core::DomainError;
use vitrina_infra::{ActionError, ActionResult};

pub fn action_error_to_response(err: ActionError) -> Response {
    match err {
        ActionError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ActionError::Blocked(blocker) => json_error(StatusCode::CONFLICT, "blocked", blocker.to_string()),
        ActionError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        ActionError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        ActionError::Unauthenticated(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthenticated", msg),
        ActionError::Failed(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "action_failed", msg),
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Render an action result: `status` with the JSON body, or the mapped error.
pub fn respond<T: Serialize>(status: StatusCode, result: ActionResult<T>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(e) => action_error_to_response(e),
    }
}

/// 204 on success, the mapped error otherwise.
pub fn respond_no_content(result: ActionResult<()>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => action_error_to_response(e),
    }
}

/// Parse a path segment into a typed id, answering 400 on failure.
pub fn parse_id<T>(raw: &str, what: &'static str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}

#[cfg(test)]
mod tests {
    use vitrina_catalog::DeleteBlocker;
    use vitrina_core::FamilyId;

    use super::*;

    #[test]
    fn statuses_follow_the_tag() {
        let cases = [
            (ActionError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ActionError::Blocked(DeleteBlocker::FamilyHasCategories), StatusCode::CONFLICT),
            (ActionError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ActionError::InvalidId("x".into()), StatusCode::BAD_REQUEST),
            (ActionError::Unauthenticated("x".into()), StatusCode::UNAUTHORIZED),
            (ActionError::Failed("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(action_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn bad_ids_are_rejected() {
        assert_eq!(parse_id::<FamilyId>("12", "family").ok(), Some(FamilyId::new(12)));
        let res = parse_id::<FamilyId>("doce", "family").unwrap_err();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
