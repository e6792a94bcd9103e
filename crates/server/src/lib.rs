use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, SplitValidation};

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod contacts;
mod groups;
mod members;
mod server;
mod splits;
mod user;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

/// Body of a 422 for an invalid split set: the generic error plus the
/// validator's report so clients can render specifics.
#[derive(Serialize)]
struct ValidationError {
    error: String,
    details: api_types::validation::ValidationReport,
}

fn validation_report(report: &SplitValidation) -> api_types::validation::ValidationReport {
    api_types::validation::ValidationReport {
        is_valid: report.is_valid,
        total_shares_minor: report.total_shares.cents(),
        expected_total_minor: report.expected_total.cents(),
        difference_minor: report.difference.cents(),
        errors: report.errors.clone(),
        warnings: report.warnings.clone(),
    }
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidRole(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServerError::Engine(EngineError::Validation(report)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationError {
                    error: "invalid splits".to_string(),
                    details: validation_report(&report),
                }),
            )
                .into_response(),
            ServerError::Engine(err) => {
                let status = status_for_engine_error(&err);
                let error = message_for_engine_error(err);
                (status, Json(Error { error })).into_response()
            }
            ServerError::Generic(error) => {
                (StatusCode::BAD_REQUEST, Json(Error { error })).into_response()
            }
        }
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{MoneyCents, validate_splits};

    #[test]
    fn engine_unauthenticated_maps_to_401() {
        let res =
            ServerError::from(EngineError::Unauthenticated("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let report = validate_splits(MoneyCents::new(100), &[]);
        let res = ServerError::from(EngineError::Validation(report)).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
