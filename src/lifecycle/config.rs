//! Runtime configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `ORDER_CHANNEL_CAPACITY` | 32 |
//! | `NOTIFICATION_CAPACITY` | 64 |
//! | `WORK_LOCK_LEASE_SECS` | unset, locks never expire |
//! | `DEFAULT_RETURN_REASON` | `returned by customer at delivery` |

use crate::workflow::{LockPolicy, WorkflowSettings, DEFAULT_RETURN_REASON};
use chrono::Duration;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const ORDER_CHANNEL_CAPACITY: &str = "ORDER_CHANNEL_CAPACITY";
pub const NOTIFICATION_CAPACITY: &str = "NOTIFICATION_CAPACITY";
pub const WORK_LOCK_LEASE_SECS: &str = "WORK_LOCK_LEASE_SECS";
pub const RETURN_REASON: &str = "DEFAULT_RETURN_REASON";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemConfig {
    /// Mailbox size of each resource actor.
    pub channel_capacity: usize,
    pub notification_capacity: usize,
    /// `None` keeps a claim until it is released.
    pub lock_lease: Option<Duration>,
    pub return_reason: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 32,
            notification_capacity: 64,
            lock_lease: None,
            return_reason: DEFAULT_RETURN_REASON.to_string(),
        }
    }
}

impl SystemConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Absent or blank keys keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = read(ORDER_CHANNEL_CAPACITY) {
            config.channel_capacity = positive(ORDER_CHANNEL_CAPACITY, value)?;
        }
        if let Some(value) = read(NOTIFICATION_CAPACITY) {
            config.notification_capacity = positive(NOTIFICATION_CAPACITY, value)?;
        }
        if let Some(value) = read(WORK_LOCK_LEASE_SECS) {
            let secs: i64 = positive(WORK_LOCK_LEASE_SECS, value.clone())?;
            let lease = Duration::try_seconds(secs).ok_or(ConfigError::Invalid {
                key: WORK_LOCK_LEASE_SECS,
                value,
            })?;
            config.lock_lease = Some(lease);
        }
        if let Some(value) = read(RETURN_REASON) {
            config.return_reason = value;
        }
        Ok(config)
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            lock: LockPolicy {
                lease: self.lock_lease,
            },
            return_reason: self.return_reason.clone(),
        }
    }
}

fn positive<N>(key: &'static str, value: String) -> Result<N, ConfigError>
where
    N: FromStr + PartialOrd + Default,
{
    match value.parse::<N>() {
        Ok(n) if n > N::default() => Ok(n),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}
