//! Transfer endpoint.

use api_types::transfer::{TransferRequest, TransferResponse, TransferResult, TransferSide};
use axum::{Extension, Json, extract::State};
use axum_extra::extract::WithRejection;
use engine::TransferCmd;

use crate::{
    JsonBody, ServerError,
    money::{to_api_kind, to_cents, to_decimal, to_engine_kind},
    server::ServerState,
    user::AuthUser,
};

fn side(side: engine::TransferSide) -> TransferSide {
    TransferSide {
        id: side.id,
        name: side.name,
        balance: to_decimal(side.balance),
        change: to_decimal(side.change),
        kind: to_api_kind(side.kind),
    }
}

pub async fn transfer(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<TransferRequest>,
) -> Result<Json<TransferResponse>, ServerError> {
    let mut cmd = TransferCmd::new(user.id, payload.from, payload.dest, to_cents(payload.amount)?);
    if let Some(kind) = payload.kind {
        cmd = cmd.dest_kind(to_engine_kind(kind));
    }

    let result = state.deadline(state.engine.transfer(cmd)).await?;

    Ok(Json(TransferResponse {
        result: TransferResult {
            from: side(result.from),
            dest: side(result.dest),
            date: result.date,
        },
    }))
}
