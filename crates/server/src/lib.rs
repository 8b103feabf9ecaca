use api_types::error::ErrorBody;
use axum::{
    Json,
    extract::{
        Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use engine::EngineError;

pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod groups;
mod money;
mod server;
mod transfer;
mod user;

pub mod types {
    pub mod transfer {
        pub use api_types::transfer::{TransferRequest, TransferResponse, TransferResult};
    }

    pub mod account {
        pub use api_types::account::{
            Account, AccountList, AccountNew, AccountUpdate, Correction, EntryList,
        };
    }

    pub mod group {
        pub use api_types::group::{
            Group, GroupAddUser, GroupDetail, GroupList, GroupNew, GroupOwner, GroupRole,
        };
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    Timeout,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Unauthorized(_) => StatusCode::FORBIDDEN,
        EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Internal(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error, code) = match self {
            ServerError::Engine(err) => {
                let code = err.code();
                (
                    status_for_engine_error(&err),
                    message_for_engine_error(err),
                    code,
                )
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err, "invalid_input"),
            ServerError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "request deadline exceeded".to_string(),
                "timeout",
            ),
        };

        let body = ErrorBody {
            error,
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

/// Extractors whose rejections render as [`ErrorBody`] like every other
/// failure.
pub(crate) type JsonBody<T> = WithRejection<Json<T>, ServerError>;
pub(crate) type PathParam<T> = WithRejection<Path<T>, ServerError>;
pub(crate) type QueryParams<T> = WithRejection<Query<T>, ServerError>;
