use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 30;
pub const DEFAULT_OPERATION_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub server_port: u16,
    pub notification_poll_interval_seconds: u64,
    pub notification_operation_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            server_port: DEFAULT_SERVER_PORT,
            notification_poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            notification_operation_timeout_seconds: DEFAULT_OPERATION_TIMEOUT_SECONDS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            server_port: parse_or_default("SERVER_PORT", DEFAULT_SERVER_PORT),
            notification_poll_interval_seconds: positive_or_default(
                "NOTIFICATION_POLL_INTERVAL_SECONDS",
                DEFAULT_POLL_INTERVAL_SECONDS,
            ),
            notification_operation_timeout_seconds: positive_or_default(
                "NOTIFICATION_OPERATION_TIMEOUT_SECONDS",
                DEFAULT_OPERATION_TIMEOUT_SECONDS,
            ),
        };

        if !config.is_supabase_configured() {
            warn!("Supabase not configured - falling back to the in-memory store");
        }

        config
    }

    pub fn is_supabase_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn positive_or_default(key: &str, default: u64) -> u64 {
    match parse_or_default(key, default) {
        0 => {
            warn!("{} must be positive, using default {}", key, default);
            default
        }
        value => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unconfigured() {
        let config = AppConfig::default();
        assert!(!config.is_supabase_configured());
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.notification_poll_interval_seconds, DEFAULT_POLL_INTERVAL_SECONDS);
    }

    #[test]
    fn test_invalid_and_zero_values_fall_back() {
        env::set_var("CLINIC_TEST_POLL_INTERVAL", "abc");
        assert_eq!(positive_or_default("CLINIC_TEST_POLL_INTERVAL", 30), 30);

        env::set_var("CLINIC_TEST_POLL_INTERVAL", "0");
        assert_eq!(positive_or_default("CLINIC_TEST_POLL_INTERVAL", 30), 30);

        env::set_var("CLINIC_TEST_POLL_INTERVAL", " 5 ");
        assert_eq!(positive_or_default("CLINIC_TEST_POLL_INTERVAL", 30), 5);

        env::remove_var("CLINIC_TEST_POLL_INTERVAL");
    }
}
