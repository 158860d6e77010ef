use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub clinic_name: String,
    pub bind_address: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            clinic_name: env::var("CLINIC_NAME")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_NAME not set, using default");
                    "DentalClick".to_string()
                }),
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| {
                    warn!("BIND_ADDRESS not set, using default");
                    "0.0.0.0:3000".to_string()
                }),
        }
    }
}
