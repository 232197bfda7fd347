// libs/appointment-cell/src/services/booking.rs
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use std::sync::Arc;
use shared_config::AppConfig;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    CancelAppointmentRequest, RescheduleAppointmentRequest,
};
use crate::services::availability::AvailabilityChecker;
use crate::store::{AppointmentStore, HttpAppointmentStore};

pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    availability: AvailabilityChecker,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let store: Arc<dyn AppointmentStore> = Arc::new(HttpAppointmentStore::new(config));
        Self::with_store(store, config.default_appointment_duration_minutes)
    }

    pub fn with_store(store: Arc<dyn AppointmentStore>, default_duration_minutes: i64) -> Self {
        let availability = AvailabilityChecker::new(Arc::clone(&store), default_duration_minutes);
        Self { store, availability }
    }

    pub fn availability(&self) -> &AvailabilityChecker {
        &self.availability
    }

    /// Book a new appointment after an availability check.
    ///
    /// The check and the insert are two separate store operations with no
    /// transactional guard between them, so two concurrent bookings for the
    /// same slot can both pass the check. The store would need a conditional
    /// insert keyed on doctor and interval to close that window.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        if request.patient_id.trim().is_empty() {
            return Err(AppointmentError::InvalidArgument(
                "patient_id must not be empty".to_string()));
        }

        let available = self.availability
            .is_available(&request.doctor_id, request.start_time, request.duration_minutes)
            .await?;
        if !available {
            return Err(AppointmentError::SlotNotAvailable);
        }

        let now = Utc::now();
        let appointment = Appointment {
            appointment_id: Appointment::generate_id(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            start_time: request.start_time,
            duration_minutes: request.duration_minutes,
            status: AppointmentStatus::Scheduled,
            reason: request.reason,
            notes: request.notes,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };

        self.store.insert(&appointment).await?;
        info!("Booked appointment {} for doctor {} at {}",
              appointment.appointment_id, appointment.doctor_id, appointment.start_time);

        Ok(appointment)
    }

    pub async fn get_appointment(&self, appointment_id: &str)
        -> Result<Appointment, AppointmentError> {
        self.store.get(appointment_id).await?
            .ok_or(AppointmentError::NotFound)
    }

    /// Move an appointment to a new slot, re-checking availability with the
    /// appointment itself excluded from the conflict set.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: &str,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.get_appointment(appointment_id).await?;

        if appointment.status.is_terminal() {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        let duration = request.new_duration_minutes.or(appointment.duration_minutes);
        let available = self.availability
            .is_available_excluding(
                &appointment.doctor_id,
                request.new_start_time,
                duration,
                Some(appointment_id),
            )
            .await?;
        if !available {
            return Err(AppointmentError::SlotNotAvailable);
        }

        debug!("Rescheduling appointment {} from {} to {}",
               appointment_id, appointment.start_time, request.new_start_time);

        appointment.start_time = request.new_start_time;
        appointment.duration_minutes = duration;
        if let Some(reason) = request.reason {
            appointment.notes = Some(reason);
        }
        appointment.updated_at = Utc::now();

        self.store.update(&appointment).await?;
        Ok(appointment)
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: &str,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.get_appointment(appointment_id).await?;

        if appointment.status.is_terminal() {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        appointment.status = AppointmentStatus::Cancelled;
        appointment.cancellation_reason = request.reason;
        appointment.cancelled_by = request.cancelled_by;
        appointment.cancelled_at = Some(Utc::now());
        appointment.updated_at = Utc::now();

        self.store.update(&appointment).await?;
        info!("Cancelled appointment {}", appointment_id);

        Ok(appointment)
    }

    pub async fn confirm_appointment(&self, appointment_id: &str)
        -> Result<Appointment, AppointmentError> {
        self.transition(appointment_id, AppointmentStatus::Scheduled, AppointmentStatus::Confirmed)
            .await
    }

    pub async fn complete_appointment(&self, appointment_id: &str)
        -> Result<Appointment, AppointmentError> {
        self.transition(appointment_id, AppointmentStatus::Confirmed, AppointmentStatus::Completed)
            .await
    }

    pub async fn list_doctor_appointments(
        &self,
        doctor_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if doctor_id.trim().is_empty() {
            return Err(AppointmentError::InvalidArgument(
                "doctor_id must not be empty".to_string()));
        }

        self.store.list_for_doctor(doctor_id, from, to).await
    }

    pub async fn list_patient_appointments(&self, patient_id: &str)
        -> Result<Vec<Appointment>, AppointmentError> {
        if patient_id.trim().is_empty() {
            return Err(AppointmentError::InvalidArgument(
                "patient_id must not be empty".to_string()));
        }

        self.store.list_for_patient(patient_id).await
    }

    async fn transition(
        &self,
        appointment_id: &str,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.get_appointment(appointment_id).await?;

        if appointment.status != expected {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        appointment.status = next;
        appointment.updated_at = Utc::now();

        self.store.update(&appointment).await?;
        debug!("Appointment {} transitioned to {}", appointment_id, next);

        Ok(appointment)
    }
}
