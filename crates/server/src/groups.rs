//! Financial group endpoints.

use api_types::group::{
    Group, GroupAddUser, GroupDetail, GroupList, GroupListItem, GroupNew, GroupOwner, GroupRole,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    JsonBody, PathParam, QueryParams, ServerError, server::ServerState, user::AuthUser,
};

const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    role: Option<GroupRole>,
    page: Option<u64>,
    size: Option<u64>,
}

fn map_role(role: engine::GroupRole) -> GroupRole {
    match role {
        engine::GroupRole::Owner => GroupRole::Owner,
        engine::GroupRole::Member => GroupRole::Member,
    }
}

fn group_view(group: engine::FinancialGroup) -> Group {
    Group {
        id: group.id,
        name: group.name,
        owner_id: group.owner_id,
        image_id: group.image_id,
        created_at: group.created_at,
        updated_at: group.updated_at,
    }
}

pub async fn group_new(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<GroupNew>,
) -> Result<(StatusCode, Json<Group>), ServerError> {
    let group = state
        .deadline(
            state
                .engine
                .create_group(user.id, &payload.name, payload.image_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(group_view(group))))
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): QueryParams<ListQuery>,
) -> Result<Json<GroupList>, ServerError> {
    let role = match query.role.unwrap_or(GroupRole::Owner) {
        GroupRole::Owner => engine::GroupRole::Owner,
        GroupRole::Member => engine::GroupRole::Member,
    };
    let page = state
        .deadline(state.engine.list_groups(
            user.id,
            role,
            query.page.unwrap_or(0),
            query.size.unwrap_or(DEFAULT_PAGE_SIZE),
        ))
        .await?;

    Ok(Json(GroupList {
        groups: page
            .items
            .into_iter()
            .map(|group| GroupListItem {
                id: group.id,
                name: group.name,
            })
            .collect(),
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
) -> Result<Json<GroupDetail>, ServerError> {
    let view = state.deadline(state.engine.group(user.id, id)).await?;
    Ok(Json(GroupDetail {
        group: group_view(view.group),
        role: map_role(view.role),
        members: view.members,
    }))
}

pub async fn delete_group(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): PathParam<i32>,
) -> Result<StatusCode, ServerError> {
    state
        .deadline(state.engine.delete_group(user.id, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_user(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): PathParam<i32>,
    WithRejection(Json(payload), _): JsonBody<GroupAddUser>,
) -> Result<StatusCode, ServerError> {
    state
        .deadline(state.engine.add_group_member(user.id, id, payload.user_id))
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_member(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Path((id, member_id)), _): PathParam<(i32, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .deadline(state.engine.remove_group_member(user.id, id, member_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_owner(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): PathParam<i32>,
    WithRejection(Json(payload), _): JsonBody<GroupOwner>,
) -> Result<Json<Group>, ServerError> {
    let group = state
        .deadline(
            state
                .engine
                .transfer_group_ownership(user.id, id, payload.user_id),
        )
        .await?;
    Ok(Json(group_view(group)))
}
