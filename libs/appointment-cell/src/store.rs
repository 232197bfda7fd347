// libs/appointment-cell/src/store.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::docstore::DocStoreClient;

use crate::models::{Appointment, AppointmentError};

/// Narrow data-access seam for the appointments collection. The availability
/// checker and booking service depend on this trait rather than on any
/// particular store client, so the core logic is testable against an
/// in-memory collection.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// All appointments for a doctor, optionally narrowed by start-time
    /// bounds for efficiency; either bound may be supplied on its own.
    /// Callers must not rely on status filtering happening here; an
    /// unfiltered full-history result is valid.
    async fn list_for_doctor(
        &self,
        doctor_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Appointment>, AppointmentError>;

    async fn list_for_patient(&self, patient_id: &str)
        -> Result<Vec<Appointment>, AppointmentError>;

    async fn get(&self, appointment_id: &str)
        -> Result<Option<Appointment>, AppointmentError>;

    async fn insert(&self, appointment: &Appointment) -> Result<(), AppointmentError>;

    async fn update(&self, appointment: &Appointment) -> Result<(), AppointmentError>;
}

/// Document-store-backed implementation over the REST client.
pub struct HttpAppointmentStore {
    client: DocStoreClient,
}

impl HttpAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: DocStoreClient::new(config),
        }
    }

    fn parse_appointments(result: Vec<Value>) -> Result<Vec<Appointment>, AppointmentError> {
        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DependencyUnavailable(
                format!("Failed to parse appointments: {}", e)))
    }
}

#[async_trait]
impl AppointmentStore for HttpAppointmentStore {
    async fn list_for_doctor(
        &self,
        doctor_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut query_parts = vec![
            format!("doctor_id=eq.{}", urlencoding::encode(doctor_id)),
        ];

        if let Some(from) = from {
            query_parts.push(format!("start_time=gte.{}", urlencoding::encode(&from.to_rfc3339())));
        }
        if let Some(to) = to {
            query_parts.push(format!("start_time=lte.{}", urlencoding::encode(&to.to_rfc3339())));
        }

        let path = format!("/v1/appointments?{}&order=start_time.asc",
                           query_parts.join("&"));
        debug!("Listing appointments for doctor {}", doctor_id);

        let result: Vec<Value> = self.client.request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DependencyUnavailable(e.to_string()))?;

        Self::parse_appointments(result)
    }

    async fn list_for_patient(&self, patient_id: &str)
        -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("/v1/appointments?patient_id=eq.{}&order=start_time.asc",
                           urlencoding::encode(patient_id));
        debug!("Listing appointments for patient {}", patient_id);

        let result: Vec<Value> = self.client.request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DependencyUnavailable(e.to_string()))?;

        Self::parse_appointments(result)
    }

    async fn get(&self, appointment_id: &str)
        -> Result<Option<Appointment>, AppointmentError> {
        let path = format!("/v1/appointments?appointment_id=eq.{}",
                           urlencoding::encode(appointment_id));

        let result: Vec<Value> = self.client.request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DependencyUnavailable(e.to_string()))?;

        Ok(Self::parse_appointments(result)?.into_iter().next())
    }

    async fn insert(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        let body = serde_json::to_value(appointment)
            .map_err(|e| AppointmentError::DependencyUnavailable(e.to_string()))?;

        let _: Value = self.client.request(Method::POST, "/v1/appointments", Some(body))
            .await
            .map_err(|e| AppointmentError::DependencyUnavailable(e.to_string()))?;

        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        let path = format!("/v1/appointments?appointment_id=eq.{}",
                           urlencoding::encode(&appointment.appointment_id));
        let body = serde_json::to_value(appointment)
            .map_err(|e| AppointmentError::DependencyUnavailable(e.to_string()))?;

        let _: Value = self.client.request(Method::PATCH, &path, Some(body))
            .await
            .map_err(|e| AppointmentError::DependencyUnavailable(e.to_string()))?;

        Ok(())
    }
}
