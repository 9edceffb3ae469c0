//! Chain parameters for the Fermat blockchain.
//!
//! Network-specific consensus parameters that never change at runtime.
//! Used by the versionbits state machine and both difficulty algorithms.
//! - `ChainParams::mainnet()` / `ChainParams::regtest()` for the stock networks
//! - `ChainParams::from_config()` for custom networks loaded from TOML/JSON

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bits in the version field reserved for the top marker.
/// Deployment bits above this position can never signal.
const MAX_DEPLOYMENT_BIT: u8 = 28;

/// Error when constructing chain parameters from configuration.
#[derive(Debug, Clone)]
pub struct ChainParamsError {
    /// The field that is missing or invalid.
    pub field: &'static str,
    /// Description of the error.
    pub message: String,
}

impl ChainParamsError {
    fn missing(field: &'static str) -> Self {
        Self {
            field,
            message: "required field missing".to_string(),
        }
    }

    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ChainParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainParams error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ChainParamsError {}

/// When a deployment's start or timeout condition is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationPoint {
    /// Reached once the chain contains this height.
    Height(u32),
    /// Reached once header time passes this unix timestamp.
    Time(u64),
}

/// Parameters for one soft-fork deployment.
///
/// Signaling is tallied over consecutive windows of `window` blocks aligned
/// to multiples of `window` from genesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentParams {
    /// Deployment name, used in status reports.
    pub name: &'static str,
    /// Bit position in the version field miners set to signal readiness.
    pub bit: u8,
    /// Confirmation window size in blocks.
    pub window: u32,
    /// Signaling blocks required within one window to lock in.
    pub threshold: u32,
    /// Start condition for signal counting.
    pub start: ActivationPoint,
    /// Timeout condition. Carried for operator visibility; a deployment
    /// past its timeout without lock-in simply keeps waiting in STARTED.
    pub timeout: Option<ActivationPoint>,
    /// Blocks after activation during which the deployment's rule effect
    /// stays in force. `None` means it never expires.
    pub max_active_blocks: Option<u32>,
}

impl DeploymentParams {
    /// Validate deployment parameters. Fatal at startup on failure.
    pub fn validate(&self) -> Result<(), ChainParamsError> {
        if self.window == 0 {
            return Err(ChainParamsError::invalid("window", "must be positive"));
        }
        if self.threshold > self.window {
            return Err(ChainParamsError::invalid(
                "threshold",
                format!(
                    "threshold {} exceeds window {}",
                    self.threshold, self.window
                ),
            ));
        }
        if self.bit > MAX_DEPLOYMENT_BIT {
            return Err(ChainParamsError::invalid(
                "bit",
                format!(
                    "bit {} collides with the version marker bits (max {})",
                    self.bit, MAX_DEPLOYMENT_BIT
                ),
            ));
        }
        if let (ActivationPoint::Height(start), Some(ActivationPoint::Height(timeout))) =
            (self.start, self.timeout)
        {
            if timeout <= start {
                return Err(ChainParamsError::invalid(
                    "timeout",
                    format!("timeout height {timeout} not after start height {start}"),
                ));
            }
        }
        Ok(())
    }
}

/// Configuration for loading `ChainParams` from TOML/JSON.
///
/// All fields are optional so partial configs can be validated with clear
/// errors naming the offending field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainParamsConfig {
    /// Target block spacing in seconds.
    pub target_spacing_secs: Option<u64>,
    /// Interim DAA period length in blocks.
    pub interim_period: Option<u32>,
    /// Legacy retarget interval in blocks.
    pub legacy_interval: Option<u32>,
    /// Minimum difficulty encoding (proof-of-work floor).
    pub min_bits: Option<u32>,
    /// Maximum difficulty encoding.
    pub max_bits: Option<u32>,
    /// Signal bit for the interim DAA deployment.
    pub interim_daa_bit: Option<u8>,
    /// Signal-counting window for the interim DAA deployment. Defaults to
    /// `interim_period`.
    pub interim_daa_window: Option<u32>,
    /// Signaling threshold for the interim DAA deployment.
    pub interim_daa_threshold: Option<u32>,
    /// Start condition for the interim DAA deployment.
    pub interim_daa_start: Option<ActivationPoint>,
    /// Timeout condition for the interim DAA deployment.
    pub interim_daa_timeout: Option<ActivationPoint>,
    /// Active-window length; 0 or absent means the effect never expires.
    pub interim_daa_max_active: Option<u32>,
}

/// Network-specific consensus parameters.
///
/// Passed explicitly into the state machine and the difficulty engine,
/// never read from ambient globals.
#[derive(Debug, Clone)]
pub struct ChainParams {
    /// Target block spacing in seconds.
    pub target_spacing_secs: u64,
    /// Interim DAA period length in blocks. Numerically equal to the
    /// deployment window on the stock networks, but an independent knob.
    pub interim_period: u32,
    /// Legacy retarget interval in blocks.
    pub legacy_interval: u32,
    /// Minimum difficulty encoding.
    pub min_bits: u32,
    /// Maximum difficulty encoding.
    pub max_bits: u32,
    /// The interim-DAA soft-fork deployment.
    pub interim_daa: DeploymentParams,
}

impl ChainParams {
    /// Mainnet parameters.
    pub fn mainnet() -> Self {
        Self {
            target_spacing_secs: 30 * 60,
            interim_period: 42,
            legacy_interval: 672,
            min_bits: 180,
            max_bits: 1024,
            interim_daa: DeploymentParams {
                name: "interim_daa",
                bit: 25,
                window: 42,
                threshold: 40,
                start: ActivationPoint::Time(1_704_067_200), // 2024-01-01
                timeout: Some(ActivationPoint::Time(1_767_225_600)), // 2026-01-01
                max_active_blocks: Some(1344),
            },
        }
    }

    /// Regtest parameters: same consensus constants, permissive bounds,
    /// deployment live from genesis.
    pub fn regtest() -> Self {
        Self {
            target_spacing_secs: 30 * 60,
            interim_period: 42,
            legacy_interval: 672,
            min_bits: 16,
            max_bits: 256,
            interim_daa: DeploymentParams {
                name: "interim_daa",
                bit: 25,
                window: 42,
                threshold: 40,
                start: ActivationPoint::Height(0),
                timeout: None,
                max_active_blocks: Some(1344),
            },
        }
    }

    /// Create `ChainParams` from configuration.
    ///
    /// Returns an error naming the specific field if any required field is
    /// missing or the assembled parameters are inconsistent.
    pub fn from_config(config: &ChainParamsConfig) -> Result<Self, ChainParamsError> {
        let params = Self {
            target_spacing_secs: config
                .target_spacing_secs
                .ok_or_else(|| ChainParamsError::missing("target_spacing_secs"))?,
            interim_period: config
                .interim_period
                .ok_or_else(|| ChainParamsError::missing("interim_period"))?,
            legacy_interval: config
                .legacy_interval
                .ok_or_else(|| ChainParamsError::missing("legacy_interval"))?,
            min_bits: config
                .min_bits
                .ok_or_else(|| ChainParamsError::missing("min_bits"))?,
            max_bits: config
                .max_bits
                .ok_or_else(|| ChainParamsError::missing("max_bits"))?,
            interim_daa: DeploymentParams {
                name: "interim_daa",
                bit: config
                    .interim_daa_bit
                    .ok_or_else(|| ChainParamsError::missing("interim_daa_bit"))?,
                // The stock networks tally signals over the same window the
                // interim DAA adjusts on, so the period is the default.
                window: config
                    .interim_daa_window
                    .or(config.interim_period)
                    .ok_or_else(|| ChainParamsError::missing("interim_period"))?,
                threshold: config
                    .interim_daa_threshold
                    .ok_or_else(|| ChainParamsError::missing("interim_daa_threshold"))?,
                start: config
                    .interim_daa_start
                    .ok_or_else(|| ChainParamsError::missing("interim_daa_start"))?,
                timeout: config.interim_daa_timeout,
                // 0 means "never expires"; normalize so the engine has a
                // single representation.
                max_active_blocks: config.interim_daa_max_active.filter(|&m| m > 0),
            },
        };
        params.validate()?;
        Ok(params)
    }

    /// Validate the assembled parameter set. Fatal at startup on failure.
    pub fn validate(&self) -> Result<(), ChainParamsError> {
        if self.target_spacing_secs == 0 {
            return Err(ChainParamsError::invalid(
                "target_spacing_secs",
                "must be positive",
            ));
        }
        if self.interim_period < 3 {
            // The timespan runs from the header before the period to the
            // second-to-last header, which needs at least one gap.
            return Err(ChainParamsError::invalid(
                "interim_period",
                "must be at least 3",
            ));
        }
        if self.legacy_interval < 3 {
            return Err(ChainParamsError::invalid(
                "legacy_interval",
                "must be at least 3",
            ));
        }
        if self.min_bits == 0 || self.min_bits > self.max_bits {
            return Err(ChainParamsError::invalid(
                "min_bits",
                format!(
                    "min_bits {} must be positive and not above max_bits {}",
                    self.min_bits, self.max_bits
                ),
            ));
        }
        self.interim_daa.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> ChainParamsConfig {
        ChainParamsConfig {
            target_spacing_secs: Some(1800),
            interim_period: Some(42),
            legacy_interval: Some(672),
            min_bits: Some(16),
            max_bits: Some(256),
            interim_daa_bit: Some(25),
            interim_daa_window: None,
            interim_daa_threshold: Some(40),
            interim_daa_start: Some(ActivationPoint::Height(0)),
            interim_daa_timeout: None,
            interim_daa_max_active: Some(1344),
        }
    }

    #[test]
    fn test_mainnet_params_valid() {
        let params = ChainParams::mainnet();
        params.validate().unwrap();
        assert_eq!(params.target_spacing_secs, 1800);
        assert_eq!(params.interim_period, 42);
        assert_eq!(params.legacy_interval, 672);
        assert_eq!(params.interim_daa.bit, 25);
        assert_eq!(params.interim_daa.threshold, 40);
        assert_eq!(params.interim_daa.max_active_blocks, Some(1344));
    }

    #[test]
    fn test_regtest_params_valid() {
        ChainParams::regtest().validate().unwrap();
    }

    #[test]
    fn test_from_config_full() {
        let params = ChainParams::from_config(&full_config()).unwrap();
        assert_eq!(params.interim_daa.window, 42);
        assert_eq!(params.interim_daa.max_active_blocks, Some(1344));
    }

    #[test]
    fn test_deployment_window_overrides_period() {
        let mut config = full_config();
        config.interim_daa_window = Some(50);
        let params = ChainParams::from_config(&config).unwrap();
        assert_eq!(params.interim_daa.window, 50);
        assert_eq!(params.interim_period, 42);
    }

    #[test]
    fn test_from_config_missing_field_names_it() {
        let mut config = full_config();
        config.legacy_interval = None;
        let err = ChainParams::from_config(&config).unwrap_err();
        assert_eq!(err.field, "legacy_interval");
        assert!(err.message.contains("missing"));

        let mut config = full_config();
        config.interim_daa_bit = None;
        let err = ChainParams::from_config(&config).unwrap_err();
        assert_eq!(err.field, "interim_daa_bit");
    }

    #[test]
    fn test_threshold_above_window_rejected() {
        let mut config = full_config();
        config.interim_daa_threshold = Some(43);
        let err = ChainParams::from_config(&config).unwrap_err();
        assert_eq!(err.field, "threshold");
    }

    #[test]
    fn test_bit_in_marker_range_rejected() {
        let mut config = full_config();
        config.interim_daa_bit = Some(29);
        let err = ChainParams::from_config(&config).unwrap_err();
        assert_eq!(err.field, "bit");
    }

    #[test]
    fn test_zero_window_rejected() {
        let deployment = DeploymentParams {
            window: 0,
            threshold: 0,
            ..ChainParams::regtest().interim_daa
        };
        let err = deployment.validate().unwrap_err();
        assert_eq!(err.field, "window");
    }

    #[test]
    fn test_zero_max_active_means_never_expires() {
        let mut config = full_config();
        config.interim_daa_max_active = Some(0);
        let params = ChainParams::from_config(&config).unwrap();
        assert_eq!(params.interim_daa.max_active_blocks, None);
    }

    #[test]
    fn test_timeout_before_start_rejected() {
        let deployment = DeploymentParams {
            start: ActivationPoint::Height(100),
            timeout: Some(ActivationPoint::Height(100)),
            ..ChainParams::regtest().interim_daa
        };
        let err = deployment.validate().unwrap_err();
        assert_eq!(err.field, "timeout");
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = full_config();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ChainParamsConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.interim_daa_bit, Some(25));
        assert_eq!(parsed.interim_daa_start, Some(ActivationPoint::Height(0)));
    }
}
