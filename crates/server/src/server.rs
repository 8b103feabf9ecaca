use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::Instrument;

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use crate::{ServerError, accounts, groups, transfer, user};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    pub request_timeout: Duration,
}

impl ServerState {
    /// Run an engine call under the request deadline.
    ///
    /// On expiry the call is dropped before it can commit, so its unit of
    /// work rolls back.
    pub(crate) async fn deadline<T, F>(&self, fut: F) -> Result<T, ServerError>
    where
        F: Future<Output = Result<T, EngineError>>,
    {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result.map_err(ServerError::from),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.request_timeout.as_millis() as u64,
                    "request deadline exceeded"
                );
                Err(ServerError::Timeout)
            }
        }
    }
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    let user = user::AuthUser::try_from(user).map_err(|err| {
        tracing::error!("stored user id is not a uuid: {err}");
        StatusCode::UNAUTHORIZED
    })?;

    let span = tracing::info_span!("request", user = %user.username, user_id = %user.id);
    request.extensions_mut().insert(user);
    Ok(next.run(request).instrument(span).await)
}

/// Build the API router with authentication applied to every route.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/transfer", post(transfer::transfer))
        .route(
            "/accounts",
            post(accounts::account_new).get(accounts::list),
        )
        .route(
            "/accounts/{id}",
            get(accounts::get).patch(accounts::update),
        )
        .route("/accounts/{id}/correction", post(accounts::correction))
        .route("/accounts/{id}/transactions", get(accounts::entries))
        .route(
            "/financial_group",
            post(groups::group_new).get(groups::list),
        )
        .route(
            "/financial_group/{id}",
            get(groups::get).delete(groups::delete_group),
        )
        .route("/financial_group/{id}/add_user", post(groups::add_user))
        .route(
            "/financial_group/{id}/members/{user_id}",
            delete(groups::remove_member),
        )
        .route("/financial_group/{id}/owner", post(groups::change_owner))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(
    engine: Engine,
    db: DatabaseConnection,
    addr: SocketAddr,
    request_timeout: Duration,
) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener, request_timeout).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
    request_timeout: Duration,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
        request_timeout,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
    request_timeout: Duration,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener, request_timeout).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use engine::{MoneyCents, OpenAccountCmd, TransferCmd};
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database, TransactionTrait};

    #[tokio::test]
    async fn expired_deadline_reports_timeout_and_leaves_no_trace() {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db.clone()).build().await.unwrap();
        let alice = engine.create_user("alice", "password").await.unwrap();
        let x = engine
            .open_account(OpenAccountCmd::new(alice, "Bank").balance(MoneyCents::new(100_00)))
            .await
            .unwrap()
            .id;
        let y = engine
            .open_account(OpenAccountCmd::new(alice, "Wallet").balance(MoneyCents::new(50_00)))
            .await
            .unwrap()
            .id;
        let state = ServerState {
            engine: Arc::new(engine),
            db: db.clone(),
            request_timeout: Duration::from_millis(50),
        };

        // Hold the only pooled connection so the transfer cannot make progress.
        let held = db.begin().await.unwrap();
        let err = state
            .deadline(
                state
                    .engine
                    .transfer(TransferCmd::new(alice, x, y, MoneyCents::new(30_00))),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Timeout));
        held.rollback().await.unwrap();

        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "timeout");

        let engine = &state.engine;
        assert_eq!(engine.account(alice, x).await.unwrap().balance, MoneyCents::new(100_00));
        assert_eq!(engine.account(alice, y).await.unwrap().balance, MoneyCents::new(50_00));
        assert_eq!(engine.account_entries(alice, y, 10).await.unwrap().len(), 1);

        let settled = state
            .deadline(
                state
                    .engine
                    .transfer(TransferCmd::new(alice, x, y, MoneyCents::new(30_00))),
            )
            .await
            .unwrap();
        assert_eq!(settled.dest.balance, MoneyCents::new(80_00));
    }
}
