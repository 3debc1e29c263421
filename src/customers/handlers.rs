use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    customers::{dto::CreateCustomerRequest, repo_types::Customer, services},
    error::AppError,
    state::AppState,
};

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/:id", get(get_customer))
        .route("/customers/nic/:nic", get(get_customer_by_nic))
}

#[instrument(skip(state))]
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>, AppError> {
    Ok(Json(services::list_customers(&state).await?))
}

#[instrument(skip(state))]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(services::get_customer(&state, id).await?))
}

#[instrument(skip(state))]
pub async fn get_customer_by_nic(
    State(state): State<AppState>,
    Path(nic): Path<String>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(services::get_customer_by_nic(&state, &nic).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<Customer>), AppError> {
    let Json(payload) = payload?;
    let customer = services::create_customer(&state, &payload.nic, &payload.name).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        HeaderValue::from_str(&format!("/api/customers/{}", customer.id))
            .map_err(|e| AppError::Internal(e.to_string()))?,
    );

    Ok((StatusCode::CREATED, headers, Json(customer)))
}
