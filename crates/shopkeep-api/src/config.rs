//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use shopkeep_gateways::llm::{DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_LLM_TIMEOUT};
use shopkeep_gateways::sms::{DEFAULT_SMS_BASE_URL, SmsCredentials};

use crate::error::AppError;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 5000;

/// Text-generation service settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// SMS provider settings. Present only when every credential is set.
#[derive(Debug, Clone)]
pub struct SmsSettings {
    pub base_url: String,
    pub credentials: SmsCredentials,
}

/// Settings for the API binary.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Absent means profiles live in memory.
    pub database_url: Option<String>,
    pub llm: LlmSettings,
    /// Absent means texts are only logged.
    pub sms: Option<SmsSettings>,
    /// YAML title ladder replacing the built-in one.
    pub title_table_path: Option<PathBuf>,
    pub otlp_endpoint: Option<String>,
}

impl ApiConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value does not parse or the SMS
    /// credentials are only partly set.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Blank values count as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value does not parse or the SMS
    /// credentials are only partly set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };

        let timeout = match get("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|e| AppError::Config(format!("LLM_TIMEOUT_SECS must be seconds: {e}")))?,
            None => DEFAULT_LLM_TIMEOUT,
        };

        let sms = match (
            get("SMS_ACCOUNT_SID"),
            get("SMS_AUTH_TOKEN"),
            get("SMS_FROM_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(SmsSettings {
                base_url: get("SMS_BASE_URL").unwrap_or_else(|| DEFAULT_SMS_BASE_URL.to_owned()),
                credentials: SmsCredentials {
                    account_sid,
                    auth_token,
                    from_number,
                },
            }),
            (None, None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "SMS_ACCOUNT_SID, SMS_AUTH_TOKEN and SMS_FROM_NUMBER must be set together"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
            database_url: get("DATABASE_URL"),
            llm: LlmSettings {
                base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_owned()),
                model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_owned()),
                api_key: get("LLM_API_KEY"),
                timeout,
            },
            sms,
            title_table_path: get("TITLE_TABLE_PATH").map(PathBuf::from),
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:5000");
        assert!(config.database_url.is_none());
        assert_eq!(config.llm.base_url, DEFAULT_LLM_BASE_URL);
        assert_eq!(config.llm.timeout, DEFAULT_LLM_TIMEOUT);
        assert!(config.sms.is_none());
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_complete_sms_credentials_enable_sms() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("SMS_ACCOUNT_SID", "AC123"),
            ("SMS_AUTH_TOKEN", "secret"),
            ("SMS_FROM_NUMBER", "+15550100"),
        ]))
        .unwrap();

        let sms = config.sms.unwrap();
        assert_eq!(sms.base_url, DEFAULT_SMS_BASE_URL);
        assert_eq!(sms.credentials.from_number, "+15550100");
    }

    #[test]
    fn test_partial_sms_credentials_are_rejected() {
        let result = ApiConfig::from_lookup(lookup(&[("SMS_ACCOUNT_SID", "AC123")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_bad_port_is_a_config_error() {
        let result = ApiConfig::from_lookup(lookup(&[("PORT", "eighty")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_blank_database_url_means_in_memory() {
        let config = ApiConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap();

        assert!(config.database_url.is_none());
    }
}
