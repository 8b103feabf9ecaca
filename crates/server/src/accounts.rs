//! Account endpoints.

use api_types::account::{
    Account, AccountList, AccountNew, AccountUpdate, Correction, Entry, EntryList,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{AccountPatch, CorrectionCmd, OpenAccountCmd};
use serde::Deserialize;

use crate::{
    JsonBody, PathParam, QueryParams, ServerError,
    money::{to_api_kind, to_cents, to_decimal, to_engine_kind},
    server::ServerState,
    user::AuthUser,
};

const DEFAULT_PAGE_SIZE: u64 = 20;
const DEFAULT_ENTRY_LIMIT: u64 = 50;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<u64>,
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    limit: Option<u64>,
}

fn account_view(account: engine::Account) -> Account {
    Account {
        id: account.id,
        name: account.name,
        category_id: account.category_id,
        kind: to_api_kind(account.kind),
        balance: to_decimal(account.balance),
        created_at: account.created_at,
        updated_at: account.updated_at,
    }
}

pub async fn account_new(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<AccountNew>,
) -> Result<(StatusCode, Json<Account>), ServerError> {
    let mut cmd = OpenAccountCmd::new(user.id, payload.name).kind(to_engine_kind(payload.kind));
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(balance) = payload.balance {
        cmd = cmd.balance(to_cents(balance)?);
    }

    let account = state.deadline(state.engine.open_account(cmd)).await?;
    Ok((StatusCode::CREATED, Json(account_view(account))))
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): QueryParams<PageQuery>,
) -> Result<Json<AccountList>, ServerError> {
    let page = state
        .deadline(state.engine.list_accounts(
            user.id,
            query.page.unwrap_or(0),
            query.size.unwrap_or(DEFAULT_PAGE_SIZE),
        ))
        .await?;

    Ok(Json(AccountList {
        accounts: page.items.into_iter().map(account_view).collect(),
        page: page.page,
        size: page.size,
        total: page.total,
        remaining_pages: page.remaining_pages,
    }))
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): PathParam<i32>,
) -> Result<Json<Account>, ServerError> {
    let account = state.deadline(state.engine.account(user.id, id)).await?;
    Ok(Json(account_view(account)))
}

pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): PathParam<i32>,
    WithRejection(Json(payload), _): JsonBody<AccountUpdate>,
) -> Result<Json<Account>, ServerError> {
    let patch = AccountPatch {
        name: payload.name,
        category_id: payload.category_id,
        kind: payload.kind.map(to_engine_kind),
    };
    let account = state
        .deadline(state.engine.update_account(user.id, id, patch))
        .await?;
    Ok(Json(account_view(account)))
}

pub async fn correction(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): PathParam<i32>,
    WithRejection(Json(payload), _): JsonBody<Correction>,
) -> Result<Json<Account>, ServerError> {
    let cmd = CorrectionCmd::new(user.id, id, to_cents(payload.delta)?);
    let account = state.deadline(state.engine.correct(cmd)).await?;
    Ok(Json(account_view(account)))
}

pub async fn entries(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): PathParam<i32>,
    WithRejection(Query(query), _): QueryParams<EntriesQuery>,
) -> Result<Json<EntryList>, ServerError> {
    let entries = state
        .deadline(state.engine.account_entries(
            user.id,
            id,
            query.limit.unwrap_or(DEFAULT_ENTRY_LIMIT),
        ))
        .await?;

    Ok(Json(EntryList {
        transactions: entries
            .into_iter()
            .map(|entry| Entry {
                id: entry.id,
                account_id: entry.account_id,
                amount: to_decimal(entry.amount),
                kind: entry.kind.as_str().to_string(),
                linked_transaction_id: entry.linked_entry_id,
                created_at: entry.created_at,
            })
            .collect(),
    }))
}
