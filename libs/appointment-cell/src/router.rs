// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, patch},
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Availability probe for a candidate slot
        .route("/availability", get(handlers::check_availability))

        // Core appointment lifecycle
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/reschedule", patch(handlers::reschedule_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))

        // Appointment listings
        .route("/doctors/{doctor_id}", get(handlers::get_doctor_appointments))
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))

        .with_state(state)
}
