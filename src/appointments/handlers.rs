use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    appointments::{dto::CreateAppointmentRequest, repo_types::Appointment, services},
    error::AppError,
    state::AppState,
};

pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route("/appointments/:id", get(get_appointment))
        .route("/appointments/nic/:nic", get(list_appointments_by_nic))
}

#[instrument(skip(state))]
pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    Ok(Json(services::list_appointments(&state).await?))
}

#[instrument(skip(state))]
pub async fn list_appointments_by_nic(
    State(state): State<AppState>,
    Path(nic): Path<String>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    Ok(Json(services::list_appointments_by_nic(&state, &nic).await?))
}

#[instrument(skip(state))]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Appointment>, AppError> {
    Ok(Json(services::get_appointment(&state, id).await?))
}

/// POST /appointments { date, timeSlot, status?, customer?: { nic, name }, customerId? }
#[instrument(skip(state, payload))]
pub async fn create_appointment(
    State(state): State<AppState>,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<Appointment>), AppError> {
    let Json(payload) = payload?;
    let appointment = services::create_appointment(&state, payload).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        HeaderValue::from_str(&format!("/api/appointments/{}", appointment.id))
            .map_err(|e| AppError::Internal(e.to_string()))?,
    );

    Ok((StatusCode::CREATED, headers, Json(appointment)))
}
