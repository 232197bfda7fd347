// libs/appointment-cell/src/services/availability.rs
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use std::sync::Arc;
use shared_config::AppConfig;

use crate::models::{AppointmentError, AvailabilityResponse};
use crate::store::{AppointmentStore, HttpAppointmentStore};

/// Decides whether a candidate slot (doctor, start, duration) is free of
/// conflicts with the doctor's existing booked appointments.
///
/// The check is a read-only computation over a snapshot of the appointments
/// collection. It does not serialize against concurrent bookings: two callers
/// can both observe an open slot and both proceed to book. Closing that
/// window requires a conditional write at the booking boundary.
pub struct AvailabilityChecker {
    store: Arc<dyn AppointmentStore>,
    default_duration_minutes: i64,
}

impl AvailabilityChecker {
    pub fn new(store: Arc<dyn AppointmentStore>, default_duration_minutes: i64) -> Self {
        Self { store, default_duration_minutes }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(HttpAppointmentStore::new(config)),
            config.default_appointment_duration_minutes,
        )
    }

    pub fn default_duration_minutes(&self) -> i64 {
        self.default_duration_minutes
    }

    /// Check whether the candidate slot is free for the doctor.
    ///
    /// The candidate interval is half-open `[start, start + duration)`, so a
    /// booking that starts exactly when another ends is not a conflict.
    /// Cancelled and no-show appointments never block.
    pub async fn is_available(
        &self,
        doctor_id: &str,
        candidate_start: DateTime<Utc>,
        candidate_duration_minutes: Option<i64>,
    ) -> Result<bool, AppointmentError> {
        self.is_available_excluding(doctor_id, candidate_start, candidate_duration_minutes, None)
            .await
    }

    /// Same check with one appointment excluded from the conflict set, so a
    /// rescheduled appointment does not conflict with itself.
    pub async fn is_available_excluding(
        &self,
        doctor_id: &str,
        candidate_start: DateTime<Utc>,
        candidate_duration_minutes: Option<i64>,
        exclude_appointment_id: Option<&str>,
    ) -> Result<bool, AppointmentError> {
        if doctor_id.trim().is_empty() {
            return Err(AppointmentError::InvalidArgument(
                "doctor_id must not be empty".to_string()));
        }

        let duration_minutes = candidate_duration_minutes
            .unwrap_or(self.default_duration_minutes);
        if duration_minutes <= 0 {
            return Err(AppointmentError::InvalidArgument(
                format!("duration_minutes must be positive, got {}", duration_minutes)));
        }

        let candidate_end = candidate_end_time(candidate_start, duration_minutes)?;
        debug!("Checking availability for doctor {} from {} to {}",
               doctor_id, candidate_start, candidate_end);

        let existing = self.store.list_for_doctor(doctor_id, None, None).await?;

        for appointment in &existing {
            if !appointment.status.occupies_slot() {
                continue;
            }
            if exclude_appointment_id == Some(appointment.appointment_id.as_str()) {
                continue;
            }

            let existing_start = appointment.start_time;
            let existing_end = appointment.end_time(self.default_duration_minutes);

            if slots_overlap(candidate_start, candidate_end, existing_start, existing_end) {
                warn!("Conflict for doctor {}: candidate [{}, {}) overlaps appointment {}",
                      doctor_id, candidate_start, candidate_end, appointment.appointment_id);
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Availability check packaged for the HTTP surface.
    pub async fn check(
        &self,
        doctor_id: &str,
        candidate_start: DateTime<Utc>,
        candidate_duration_minutes: Option<i64>,
    ) -> Result<AvailabilityResponse, AppointmentError> {
        let available = self
            .is_available(doctor_id, candidate_start, candidate_duration_minutes)
            .await?;
        let duration_minutes = candidate_duration_minutes
            .unwrap_or(self.default_duration_minutes);

        Ok(AvailabilityResponse {
            doctor_id: doctor_id.to_string(),
            start_time: candidate_start,
            end_time: candidate_end_time(candidate_start, duration_minutes)?,
            available,
        })
    }
}

/// Candidate interval end with checked arithmetic: a duration that does not
/// fit the time delta, or pushes the end past the representable range, is
/// invalid input rather than a panic.
fn candidate_end_time(
    candidate_start: DateTime<Utc>,
    duration_minutes: i64,
) -> Result<DateTime<Utc>, AppointmentError> {
    Duration::try_minutes(duration_minutes)
        .and_then(|duration| candidate_start.checked_add_signed(duration))
        .ok_or_else(|| AppointmentError::InvalidArgument(
            format!("duration_minutes out of range: {}", duration_minutes)))
}

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// overlap iff a_start < b_end AND a_end > b_start. Adjacent intervals
/// sharing only an endpoint do not overlap.
fn slots_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}
