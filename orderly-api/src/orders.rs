use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use orderly_core::Order;
use orderly_order::{CreateOrder, OrderPlacement};
use serde::Deserialize;
use crate::{error::AppError, state::AppState};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(alias = "user_id")]
    pub user_id: i64,
    pub amount: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/{id}", get(get_order))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /orders
/// Validate the user, persist the order, charge it and notify the user.
/// A declined charge is still a 200; the body carries `paymentError`.
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<OrderPlacement>, AppError> {
    let Json(req) = payload
        .map_err(|e| AppError::ValidationError(format!("Invalid request: {}", e.body_text())))?;

    let placement = state
        .orchestrator
        .create_order(CreateOrder {
            user_id: req.user_id,
            amount: req.amount,
            description: req.description,
        })
        .await
        .map_err(AppError::from_order_error)?;

    Ok(Json(placement))
}

/// GET /orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Order>, AppError> {
    let Path(order_id) = path
        .map_err(|e| AppError::ValidationError(format!("Invalid order id: {}", e.body_text())))?;

    let order = state
        .order_repo
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", order_id)))?;

    Ok(Json(order))
}

/// GET /orders?userId=
/// List a user's orders, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Json<Vec<Order>>, AppError> {
    let Query(query) = query
        .map_err(|e| AppError::ValidationError(format!("Invalid query: {}", e.body_text())))?;

    if query.user_id <= 0 {
        return Err(AppError::ValidationError("Invalid userId".to_string()));
    }

    let orders = state.order_repo.list_by_user(query.user_id).await?;
    Ok(Json(orders))
}
