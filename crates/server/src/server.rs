use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use sea_orm::DatabaseConnection;

use std::{collections::HashSet, net::SocketAddr, sync::Arc};

use crate::{ServerError, consumables, pours, summary};

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    tokens: Arc<HashSet<String>>,
}

impl ServerState {
    /// `tokens` are the bearer credentials accepted by every route.
    pub fn new(db: DatabaseConnection, tokens: impl IntoIterator<Item = String>) -> Self {
        let tokens: HashSet<String> = tokens
            .into_iter()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.is_empty() {
            tracing::warn!("no bearer tokens configured, every request will be rejected");
        }
        Self {
            db,
            tokens: Arc::new(tokens),
        }
    }

    fn accepts(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}

async fn auth(
    State(state): State<ServerState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let bearer = match bearer {
        Ok(TypedHeader(Authorization(bearer))) => bearer,
        Err(rejection) => {
            tracing::warn!(path = %request.uri().path(), "rejected request: {rejection}");
            return Err(ServerError::Unauthorized);
        }
    };
    if !state.accepts(bearer.token()) {
        tracing::warn!(path = %request.uri().path(), "unknown bearer token");
        return Err(ServerError::Unauthorized);
    }
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/consumables",
            get(consumables::list).post(consumables::create),
        )
        .route("/consumables/{id}", delete(consumables::remove))
        .route("/pours", get(pours::list).post(pours::create))
        .route("/pours/{id}", axum::routing::put(pours::update).delete(pours::remove))
        .route("/summary", get(summary::get_summary))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(state: ServerState, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
