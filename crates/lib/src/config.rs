use serde::Deserialize;
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::pubkey::Pubkey;
use std::{fs, path::Path, str::FromStr, time::Duration};

use crate::{
    constant::{
        DEFAULT_COMMITMENT, DEFAULT_CONFIRM_POLL_MILLIS, DEFAULT_CONFIRM_TIMEOUT_SECS,
        DEFAULT_FEE_RECIPIENT, DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_RPC_RETRY_ATTEMPTS,
        DEFAULT_RPC_RETRY_BACKOFF_MILLIS, DEFAULT_SERVICE_FEE_LAMPORTS,
    },
    error::SweepError,
};

/// Immutable runtime configuration, loaded once from TOML and handed to the
/// engine at construction time.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fee: FeeConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

/// The mandatory service fee attached to every reclaim or burn transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    pub lamports: u64,
    pub recipient: String,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            lamports: DEFAULT_SERVICE_FEE_LAMPORTS,
            recipient: DEFAULT_FEE_RECIPIENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub commitment: String,
    pub refresh_interval_secs: u64,
    pub confirm_timeout_secs: u64,
    pub confirm_poll_millis: u64,
    pub rpc_retry_attempts: u32,
    pub rpc_retry_backoff_millis: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            commitment: DEFAULT_COMMITMENT.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            confirm_timeout_secs: DEFAULT_CONFIRM_TIMEOUT_SECS,
            confirm_poll_millis: DEFAULT_CONFIRM_POLL_MILLIS,
            rpc_retry_attempts: DEFAULT_RPC_RETRY_ATTEMPTS,
            rpc_retry_backoff_millis: DEFAULT_RPC_RETRY_BACKOFF_MILLIS,
        }
    }
}

impl Config {
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, SweepError> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            SweepError::ConfigError(format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| SweepError::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        if self.fee.lamports == 0 {
            return Err(SweepError::ConfigError("fee.lamports must be positive".to_string()));
        }
        Pubkey::from_str(&self.fee.recipient).map_err(|e| {
            SweepError::ConfigError(format!(
                "fee.recipient is not a valid address ({}): {e}",
                self.fee.recipient
            ))
        })?;
        CommitmentLevel::from_str(&self.scan.commitment).map_err(|e| {
            SweepError::ConfigError(format!(
                "scan.commitment is not a valid commitment level ({}): {e}",
                self.scan.commitment
            ))
        })?;
        if self.scan.refresh_interval_secs == 0 {
            return Err(SweepError::ConfigError(
                "scan.refresh_interval_secs must be positive".to_string(),
            ));
        }
        if self.scan.confirm_timeout_secs == 0 {
            return Err(SweepError::ConfigError(
                "scan.confirm_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Commitment the engine confirms transactions at. Validated on load.
    pub fn commitment(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: CommitmentLevel::from_str(&self.scan.commitment).unwrap_or_default(),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.scan.refresh_interval_secs)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.scan.confirm_timeout_secs)
    }

    pub fn confirm_poll(&self) -> Duration {
        Duration::from_millis(self.scan.confirm_poll_millis)
    }

    pub fn rpc_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.scan.rpc_retry_backoff_millis)
    }
}
