use std::env;
use tracing::warn;

/// Standard appointment length used when a booking does not carry its own
/// duration. Overridable via DEFAULT_APPOINTMENT_DURATION_MINUTES.
pub const DEFAULT_APPOINTMENT_DURATION_MINUTES: i64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub docstore_url: String,
    pub docstore_api_key: String,
    pub default_appointment_duration_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            docstore_url: env::var("DOCSTORE_URL")
                .unwrap_or_else(|_| {
                    warn!("DOCSTORE_URL not set, using empty value");
                    String::new()
                }),
            docstore_api_key: env::var("DOCSTORE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("DOCSTORE_API_KEY not set, using empty value");
                    String::new()
                }),
            default_appointment_duration_minutes: env::var("DEFAULT_APPOINTMENT_DURATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|minutes| *minutes > 0)
                .unwrap_or(DEFAULT_APPOINTMENT_DURATION_MINUTES),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.docstore_url.is_empty()
            && !self.docstore_api_key.is_empty()
    }
}
