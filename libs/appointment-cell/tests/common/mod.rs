// Shared test fixtures: an in-memory appointment store and builders.
#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use appointment_cell::models::{Appointment, AppointmentError, AppointmentStatus};
use appointment_cell::store::AppointmentStore;

/// In-memory stand-in for the document-store-backed appointment collection.
pub struct InMemoryAppointmentStore {
    appointments: Mutex<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self { appointments: Mutex::new(Vec::new()) }
    }

    pub fn with_appointments(appointments: Vec<Appointment>) -> Self {
        Self { appointments: Mutex::new(appointments) }
    }

    pub fn all(&self) -> Vec<Appointment> {
        self.appointments.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn list_for_doctor(
        &self,
        doctor_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self.appointments.lock().unwrap();
        Ok(appointments.iter()
            .filter(|a| a.doctor_id == doctor_id)
            .filter(|a| from.map_or(true, |from| a.start_time >= from))
            .filter(|a| to.map_or(true, |to| a.start_time <= to))
            .cloned()
            .collect())
    }

    async fn list_for_patient(&self, patient_id: &str)
        -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self.appointments.lock().unwrap();
        Ok(appointments.iter()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn get(&self, appointment_id: &str)
        -> Result<Option<Appointment>, AppointmentError> {
        let appointments = self.appointments.lock().unwrap();
        Ok(appointments.iter()
            .find(|a| a.appointment_id == appointment_id)
            .cloned())
    }

    async fn insert(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        self.appointments.lock().unwrap().push(appointment.clone());
        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        let mut appointments = self.appointments.lock().unwrap();
        match appointments.iter_mut()
            .find(|a| a.appointment_id == appointment.appointment_id) {
            Some(existing) => {
                *existing = appointment.clone();
                Ok(())
            },
            None => Err(AppointmentError::NotFound),
        }
    }
}

/// Store whose every operation fails, for dependency-failure propagation tests.
pub struct UnavailableStore;

#[async_trait]
impl AppointmentStore for UnavailableStore {
    async fn list_for_doctor(
        &self,
        _doctor_id: &str,
        _from: Option<DateTime<Utc>>,
        _to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        Err(AppointmentError::DependencyUnavailable("store offline".to_string()))
    }

    async fn list_for_patient(&self, _patient_id: &str)
        -> Result<Vec<Appointment>, AppointmentError> {
        Err(AppointmentError::DependencyUnavailable("store offline".to_string()))
    }

    async fn get(&self, _appointment_id: &str)
        -> Result<Option<Appointment>, AppointmentError> {
        Err(AppointmentError::DependencyUnavailable("store offline".to_string()))
    }

    async fn insert(&self, _appointment: &Appointment) -> Result<(), AppointmentError> {
        Err(AppointmentError::DependencyUnavailable("store offline".to_string()))
    }

    async fn update(&self, _appointment: &Appointment) -> Result<(), AppointmentError> {
        Err(AppointmentError::DependencyUnavailable("store offline".to_string()))
    }
}

/// 2025-01-06 at the given time, UTC.
pub fn on_jan_6(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, hour, minute, 0).unwrap()
}

pub fn appointment(
    appointment_id: &str,
    doctor_id: &str,
    start_time: DateTime<Utc>,
    duration_minutes: Option<i64>,
    status: AppointmentStatus,
) -> Appointment {
    Appointment {
        appointment_id: appointment_id.to_string(),
        patient_id: "PAT-1".to_string(),
        doctor_id: doctor_id.to_string(),
        start_time,
        duration_minutes,
        status,
        reason: None,
        notes: None,
        cancellation_reason: None,
        cancelled_by: None,
        cancelled_at: None,
        created_at: start_time,
        updated_at: start_time,
    }
}
