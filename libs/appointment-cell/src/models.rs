// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use std::fmt;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub cancelled_by: Option<String>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Generate a new prefixed appointment identifier.
    pub fn generate_id() -> String {
        format!("APT-{}", Uuid::new_v4().simple())
    }

    /// Scheduled end time, falling back to the standard duration when the
    /// appointment does not carry its own. A stored duration too large for
    /// the time arithmetic saturates to the far future so the slot still
    /// blocks rather than panicking on unvetted store data.
    pub fn end_time(&self, default_duration_minutes: i64) -> DateTime<Utc> {
        let minutes = self.duration_minutes.unwrap_or(default_duration_minutes);
        Duration::try_minutes(minutes)
            .and_then(|duration| self.start_time.checked_add_signed(duration))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Whether an appointment in this status still occupies its time slot.
    /// Cancelled and no-show appointments do not block new bookings.
    pub fn occupies_slot(&self) -> bool {
        matches!(self,
            AppointmentStatus::Scheduled |
            AppointmentStatus::Confirmed |
            AppointmentStatus::Completed
        )
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self,
            AppointmentStatus::Completed |
            AppointmentStatus::Cancelled |
            AppointmentStatus::NoShow
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: String,
    pub doctor_id: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: Option<i64>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_start_time: DateTime<Utc>,
    pub new_duration_minutes: Option<i64>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
    pub cancelled_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub doctor_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub available: bool,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment slot not available")]
    SlotNotAvailable,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Appointment store unavailable: {0}")]
    DependencyUnavailable(String),
}
