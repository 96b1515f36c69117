use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub provider_timezone: String,
    pub default_granularity_minutes: i64,
    pub reminder_lead_hours: i64,
    pub max_recurrence_count: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| {
                    warn!("BIND_ADDRESS not set, using default");
                    "0.0.0.0:3000".to_string()
                }),
            provider_timezone: env::var("PROVIDER_TIMEZONE")
                .unwrap_or_else(|_| {
                    warn!("PROVIDER_TIMEZONE not set, using UTC");
                    "UTC".to_string()
                }),
            default_granularity_minutes: read_numeric("DEFAULT_GRANULARITY_MINUTES", 30),
            reminder_lead_hours: read_numeric("REMINDER_LEAD_HOURS", 24),
            max_recurrence_count: read_numeric("MAX_RECURRENCE_COUNT", 52u32),
        }
    }
}

fn read_numeric<T: std::str::FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid number, using default {}", key, default);
            default
        }),
        Err(_) => default,
    }
}
