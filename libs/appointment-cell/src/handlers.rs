// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use serde::Deserialize;
use chrono::{DateTime, Utc};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, BookAppointmentRequest, CancelAppointmentRequest,
    RescheduleAppointmentRequest,
};
use crate::services::availability::AvailabilityChecker;
use crate::services::booking::AppointmentBookingService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_id: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DoctorAppointmentsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => {
            AppError::NotFound("Appointment not found".to_string())
        },
        AppointmentError::SlotNotAvailable => {
            AppError::Conflict("Appointment slot conflicts with existing booking".to_string())
        },
        AppointmentError::InvalidArgument(msg) => {
            AppError::BadRequest(msg)
        },
        AppointmentError::InvalidStatusTransition(status) => {
            AppError::BadRequest(
                format!("Appointment cannot be modified in current status: {}", status))
        },
        AppointmentError::DependencyUnavailable(msg) => {
            AppError::ExternalService(msg)
        },
    }
}

// ==============================================================================
// AVAILABILITY HANDLER
// ==============================================================================

/// Availability probe for a candidate slot. Returns a definite boolean or an
/// error; a failed store lookup is never reported as "slot unavailable".
#[axum::debug_handler]
pub async fn check_availability(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let checker = AvailabilityChecker::from_config(&state);

    let response = checker
        .check(&query.doctor_id, query.start_time, query.duration_minutes)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(response)))
}

// ==============================================================================
// APPOINTMENT LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.book_appointment(request).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.get_appointment(&appointment_id).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service
        .reschedule_appointment(&appointment_id, request).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service
        .cancel_appointment(&appointment_id, request).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.confirm_appointment(&appointment_id).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.complete_appointment(&appointment_id).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

// ==============================================================================
// LISTING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<DoctorAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .list_doctor_appointments(&doctor_id, query.from, query.to).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .list_patient_appointments(&patient_id).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "patient_id": patient_id,
        "appointments": appointments
    })))
}
