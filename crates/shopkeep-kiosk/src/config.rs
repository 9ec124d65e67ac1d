//! Kiosk configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use shopkeep_questions::domain::bonus::BonusContent;
use uuid::Uuid;

use crate::error::KioskError;
use crate::lifecycle::LifecycleTimings;

/// Default API root.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default client signature sent as `User-Agent`.
pub const DEFAULT_USER_AGENT: &str = concat!("shopkeep-kiosk/", env!("CARGO_PKG_VERSION"));

/// Settings for the kiosk binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KioskConfig {
    pub api_url: String,
    pub visitor_id: String,
    pub assets_dir: Option<PathBuf>,
    /// YAML file replacing the built-in bonus content.
    pub bonus_path: Option<PathBuf>,
    pub user_agent: String,
    pub timings: LifecycleTimings,
}

impl KioskConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Config` if a timing override is not a number of
    /// milliseconds.
    pub fn from_env() -> Result<Self, KioskError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Config` if a timing override is not a number of
    /// milliseconds.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, KioskError> {
        let millis = |key: &str, default: Duration| -> Result<Duration, KioskError> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|e| KioskError::Config(format!("{key} must be milliseconds: {e}"))),
                None => Ok(default),
            }
        };

        let defaults = LifecycleTimings::default();
        let timings = LifecycleTimings {
            approach: millis("SHOPKEEP_APPROACH_MS", defaults.approach)?,
            depart: millis("SHOPKEEP_DEPART_MS", defaults.depart)?,
            respawn_delay: millis("SHOPKEEP_RESPAWN_MS", defaults.respawn_delay)?,
            ..defaults
        };

        Ok(Self {
            api_url: lookup("SHOPKEEP_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            visitor_id: lookup("SHOPKEEP_VISITOR_ID")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            assets_dir: lookup("SHOPKEEP_ASSETS_DIR").map(PathBuf::from),
            bonus_path: lookup("SHOPKEEP_BONUS_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            user_agent: lookup("SHOPKEEP_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            timings,
        })
    }

    /// Loads the bonus content from `bonus_path`, or the built-in content
    /// when no path is configured.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Io` if the file cannot be read and
    /// `KioskError::Config` if it is not valid bonus content.
    pub async fn load_bonus_content(&self) -> Result<BonusContent, KioskError> {
        let Some(path) = &self.bonus_path else {
            return Ok(BonusContent::default());
        };
        let yaml = tokio::fs::read_to_string(path).await?;
        BonusContent::from_yaml_str(&yaml)
            .map_err(|e| KioskError::Config(format!("{}: {e}", path.display())))
    }
}
