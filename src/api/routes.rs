use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::api::auth::{self, AuthSession};
use crate::catalog::{InstrumentCatalog, MarketQuery, MarketStats};
use crate::portfolio::{HoldingValuation, PortfolioSummary};
use crate::session::{SessionError, SessionId, SessionStore, User};
use crate::trading::{self, TradeError, TradeReceipt, TradeRequest};
use crate::types::instrument::{Instrument, InstrumentId};

const DEFAULT_MOVERS_LIMIT: usize = 10;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<InstrumentCatalog>,
    pub sessions: SessionStore,
    pub jwt_secret: Vec<u8>,
    pub session_ttl_hours: i64,
}

/// Handler error, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    LoginRequired,
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::LoginRequired => (
                StatusCode::UNAUTHORIZED,
                "login required: please login to start trading".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        match err {
            TradeError::UnknownInstrument(_) => ApiError::NotFound(err.to_string()),
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::EmailRequired => ApiError::BadRequest(err.to_string()),
            // The session vanished between extraction and use (concurrent logout).
            SessionError::NotFound => ApiError::LoginRequired,
        }
    }
}

async fn health() -> &'static str {
    "healthy"
}

// --- Markets ---

#[derive(Serialize)]
struct MarketListing<'a> {
    stats: MarketStats,
    instruments: Vec<&'a Instrument>,
}

async fn list_markets(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Response {
    let instruments = state.catalog.search(&query);
    let listing = MarketListing {
        stats: MarketStats::from_instruments(&instruments),
        instruments,
    };
    Json(listing).into_response()
}

async fn list_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .catalog
            .categories()
            .into_iter()
            .map(str::to_string)
            .collect(),
    )
}

#[derive(Deserialize)]
struct MoversQuery {
    limit: Option<usize>,
}

async fn top_movers(
    State(state): State<AppState>,
    Query(query): Query<MoversQuery>,
) -> Json<Vec<Instrument>> {
    let limit = query.limit.unwrap_or(DEFAULT_MOVERS_LIMIT);
    Json(state.catalog.top_movers(limit).into_iter().cloned().collect())
}

async fn get_instrument(
    State(state): State<AppState>,
    Path(id): Path<InstrumentId>,
) -> Result<Json<Instrument>, ApiError> {
    state
        .catalog
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("instrument {} not found", id)))
}

// --- Auth ---

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    name: Option<String>,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    session_id: SessionId,
    email: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (session_id, user) = state.sessions.login(&body.email, body.name).await?;
    let token = match auth::create_token(&state.jwt_secret, session_id, state.session_ttl_hours) {
        Ok(token) => token,
        Err(e) => {
            state.sessions.logout(session_id).await;
            return Err(ApiError::Internal(e.to_string()));
        }
    };
    Ok(Json(LoginResponse {
        token,
        session_id,
        email: user.email,
    }))
}

async fn logout(State(state): State<AppState>, session: AuthSession) -> StatusCode {
    state.sessions.logout(session.session_id).await;
    StatusCode::NO_CONTENT
}

async fn me(State(state): State<AppState>, session: AuthSession) -> Result<Json<User>, ApiError> {
    Ok(Json(state.sessions.user(session.session_id).await?))
}

// --- Trading & portfolio ---

async fn trade(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<TradeRequest>,
) -> Result<Json<TradeReceipt>, ApiError> {
    let catalog = Arc::clone(&state.catalog);
    let receipt = state
        .sessions
        .with_session_mut(session.session_id, |s| {
            trading::execute(&mut s.ledger, &catalog, request)
        })
        .await??;
    Ok(Json(receipt))
}

async fn portfolio(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<PortfolioSummary>, ApiError> {
    let summary = state
        .sessions
        .with_session(session.session_id, |s| {
            PortfolioSummary::value(&s.ledger, &state.catalog)
        })
        .await?;
    Ok(Json(summary))
}

async fn holding(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<InstrumentId>,
) -> Result<Json<HoldingValuation>, ApiError> {
    let instrument = state
        .catalog
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("instrument {} not found", id)))?;
    state
        .sessions
        .with_session(session.session_id, |s| {
            s.ledger
                .get(id)
                .map(|pos| HoldingValuation::new(pos, instrument))
        })
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no open position in instrument {}", id)))
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/markets", get(list_markets))
        .route("/markets/categories", get(list_categories))
        .route("/markets/movers", get(top_movers))
        .route("/markets/{id}", get(get_instrument))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/trade", post(trade))
        .route("/portfolio", get(portfolio))
        .route("/portfolio/{id}", get(holding))
        .with_state(state)
}
