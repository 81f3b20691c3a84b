use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use codegraph_core::CodeGraphError;
use serde_json::json;
use thiserror::Error;

/// Thin wrapper around the analytics core's error type. Every variant's
/// `Display` already identifies the repo and operation in flight; this
/// layer only decides the HTTP status code and adds the request-local
/// shape (missing/invalid query params) the core has no business raising.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    CodeGraph(#[from] CodeGraphError),

    #[error("invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::CodeGraph(CodeGraphError::SnapshotNotFound { .. })
            | ApiError::CodeGraph(CodeGraphError::NodeNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::CodeGraph(CodeGraphError::InvalidArgument { .. })
            | ApiError::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::CodeGraph(CodeGraphError::SchemaMissing { .. })
            | ApiError::CodeGraph(CodeGraphError::SnapshotCorrupt { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::CodeGraph(CodeGraphError::KernelFailure { .. })
            | ApiError::CodeGraph(CodeGraphError::Io(_))
            | ApiError::CodeGraph(CodeGraphError::Serialization(_))
            | ApiError::CodeGraph(CodeGraphError::Sqlite(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = json!({ "error": self.to_string() });
        if let ApiError::CodeGraph(CodeGraphError::SnapshotCorrupt { .. }) = &self {
            body["hint"] = json!("snapshot failed an integrity check; re-export it from the indexer");
        }

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: ApiError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn not_found_kinds_map_to_404() {
        assert_eq!(
            status_of(CodeGraphError::SnapshotNotFound { repo_id: "r".into() }.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CodeGraphError::NodeNotFound { repo_id: "r".into(), hash: "h".into() }.into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn invalid_input_maps_to_422() {
        assert_eq!(
            status_of(CodeGraphError::InvalidArgument { operation: "op".into(), detail: "d".into() }.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(ApiError::BadRequest("bad".into())), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn corrupt_snapshot_maps_to_400_with_a_hint() {
        let error: ApiError =
            CodeGraphError::SnapshotCorrupt { repo_id: "r".into(), operation: "op".into(), detail: "d".into() }.into();
        assert_eq!(status_of(error), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn kernel_failure_maps_to_500() {
        let error: ApiError =
            CodeGraphError::KernelFailure { repo_id: "r".into(), operation: "op".into(), detail: "d".into() }.into();
        assert_eq!(status_of(error), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
