use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use geoplan_core::PlanningError;
use geoplan_core::board::{BoardCommand, BoardController, BoardOutcome, BoardSessions, BoardState};
use geoplan_core::plan::PlanService;
use geoplan_core::store::OrderStore;
use geoplan_db::models::{Order, Plan};

use crate::services::Services;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl From<PlanningError> for AppError {
    fn from(err: PlanningError) -> Self {
        let status = if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else if err.is_invalid_input() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %format!("{err:#}"), "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

fn board_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("board {id} is not open"))
}

fn parse_board_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim())
        .map_err(|_| AppError::bad_request(format!("invalid board id {id:?}: expected a UUID")))
}

// ---------------------------------------------------------------------------
// State, request and response types
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    plans: PlanService,
    orders: Arc<dyn OrderStore>,
    boards: BoardController,
    sessions: BoardSessions,
}

impl AppState {
    pub fn new(plans: PlanService, orders: Arc<dyn OrderStore>, boards: BoardController) -> Self {
        Self {
            plans,
            orders,
            boards,
            sessions: BoardSessions::new(),
        }
    }
}

impl From<Services> for AppState {
    fn from(services: Services) -> Self {
        Self::new(services.plans, services.orders, services.boards)
    }
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct OpenBoardRequest {
    pub plan_id: String,
}

#[derive(Debug, Serialize)]
pub struct PlanDetailResponse {
    #[serde(flatten)]
    pub plan: Plan,
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub board_id: Uuid,
    pub state: BoardState,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub board_id: Uuid,
    #[serde(flatten)]
    pub outcome: BoardOutcome,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/print/{id}", get(print_plan))
        .route("/api/plans", get(plans_on_date))
        .route("/api/plans/recent", get(recent_plans))
        .route("/api/plans/{id}", get(get_plan_detail))
        .route("/api/boards", post(open_board))
        .route("/api/boards/{id}", get(get_board).delete(close_board))
        .route("/api/boards/{id}/commands", post(run_board_command))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(services: Services, bind: &str, port: u16) -> Result<()> {
    let app = build_router(services.into());
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("geoplan serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("geoplan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C; serving until killed");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

async fn index(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let plans = state.plans.find_recent().await?;

    let rows = if plans.is_empty() {
        "<tr><td colspan=\"2\">No recent plans.</td></tr>".to_string()
    } else {
        plans
            .iter()
            .map(|p| {
                format!(
                    "<tr><td><a href=\"/api/plans/{id}\">{date}</a></td><td><a href=\"/print/{id}\">{id}</a></td></tr>",
                    id = p.id,
                    date = p.delivery_date,
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let html = format!(
        "<!DOCTYPE html>\
<html><head><title>geoplan</title></head><body>\
<h1>geoplan</h1>\
<p><a href=\"/api/plans/recent\">/api/plans/recent</a></p>\
<table><tr><th>Delivery date</th><th>Plan</th></tr>{rows}</table>\
</body></html>"
    );

    Ok(Html(html).into_response())
}

/// Printable list of a plan's saved orders; the target of the board's
/// print navigation.
async fn print_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let board = state.boards.open(&id).await?;

    let rows = board
        .orders
        .iter()
        .map(|o| {
            format!(
                "<tr><td>{number}</td><td>{name}</td><td>{address}</td><td>{point}</td></tr>",
                number = o.number,
                name = escape_html(&o.name),
                address = escape_html(o.address.as_deref().unwrap_or("")),
                point = o.point.map(|p| p.to_string()).unwrap_or_default(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let html = format!(
        "<!DOCTYPE html>\
<html><head><title>Plan {date}</title></head><body>\
<h1>Deliveries for {date}</h1>\
<table><tr><th>#</th><th>Order</th><th>Address</th><th>Point</th></tr>{rows}</table>\
</body></html>",
        date = board.delivery_date,
    );

    Ok(Html(html).into_response())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Plan handlers
// ---------------------------------------------------------------------------

async fn recent_plans(State(state): State<AppState>) -> Result<Json<Vec<Plan>>, AppError> {
    Ok(Json(state.plans.find_recent().await?))
}

async fn plans_on_date(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<Plan>>, AppError> {
    Ok(Json(state.plans.find_by_delivery_date(query.date).await?))
}

async fn get_plan_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlanDetailResponse>, AppError> {
    let plan_id =
        Uuid::parse_str(id.trim()).map_err(|_| PlanningError::InvalidPlanId(id.clone()))?;
    let plan = state.plans.get_by_id(plan_id).await?;
    let orders = state
        .orders
        .find_by_plan_id(plan_id)
        .await
        .map_err(PlanningError::from)?;

    Ok(Json(PlanDetailResponse { plan, orders }))
}

// ---------------------------------------------------------------------------
// Board handlers
// ---------------------------------------------------------------------------

async fn open_board(
    State(state): State<AppState>,
    Json(request): Json<OpenBoardRequest>,
) -> Result<(StatusCode, Json<BoardResponse>), AppError> {
    let board = state.boards.open(&request.plan_id).await?;
    let board_id = state.sessions.insert(board.clone()).await;
    tracing::info!(%board_id, plan_id = %board.plan_id, "board session opened");

    Ok((
        StatusCode::CREATED,
        Json(BoardResponse {
            board_id,
            state: board,
        }),
    ))
}

async fn get_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BoardResponse>, AppError> {
    let id = parse_board_id(&id)?;
    let board = state
        .sessions
        .snapshot(id)
        .await
        .ok_or_else(|| board_not_found(id))?;
    Ok(Json(BoardResponse {
        board_id: id,
        state: board,
    }))
}

async fn close_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BoardResponse>, AppError> {
    let id = parse_board_id(&id)?;
    let board = state
        .sessions
        .remove(id)
        .await
        .ok_or_else(|| board_not_found(id))?;
    tracing::info!(board_id = %id, dirty = board.is_dirty(), "board session closed");
    Ok(Json(BoardResponse {
        board_id: id,
        state: board,
    }))
}

async fn run_board_command(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(command): Json<BoardCommand>,
) -> Result<Json<CommandResponse>, AppError> {
    let id = parse_board_id(&id)?;
    let outcome = state
        .sessions
        .execute(id, &state.boards, command)
        .await?
        .ok_or_else(|| board_not_found(id))?;
    Ok(Json(CommandResponse {
        board_id: id,
        outcome,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
