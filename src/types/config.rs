use super::channel::TuningRange;
use thiserror::Error;

/// Default tuner configuration values
pub mod defaults {
    /// Default minimum tunable frequency (24 MHz)
    pub const MIN_FREQUENCY: u64 = 24_000_000;

    /// Default maximum tunable frequency (1.766 GHz)
    pub const MAX_FREQUENCY: u64 = 1_766_000_000;

    /// Default device bandwidth (2.048 MHz)
    pub const BANDWIDTH: u64 = 2_048_000;

    /// Fraction of the bandwidth usable after edge roll-off
    pub const USABLE_BANDWIDTH_FRACTION: f64 = 0.80;

    /// Half-width of the DC spike dead zone (12.5 kHz)
    pub const DEAD_ZONE_HALF_WIDTH: u64 = 12_500;

    /// Default startup center frequency (144.390 MHz)
    pub const INITIAL_FREQUENCY: u64 = 144_390_000;
}

/// Configuration rejected at construction time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("minimum frequency {min} Hz is not below maximum frequency {max} Hz")]
    InvalidRange { min: u64, max: u64 },

    #[error("bandwidth must be greater than zero")]
    ZeroBandwidth,

    #[error("usable bandwidth fraction {0} is outside (0, 1]")]
    InvalidFraction(f64),

    #[error("initial frequency {frequency} Hz is outside the tunable range ({min} - {max} Hz)")]
    InitialFrequencyOutOfRange { frequency: u64, min: u64, max: u64 },
}

/// Device description for one wideband tuner
#[derive(Debug, Clone)]
pub struct TunerConfig {
    /// Lowest tunable frequency in Hz
    pub min_frequency: u64,
    /// Highest tunable frequency in Hz
    pub max_frequency: u64,
    /// Instantaneous device bandwidth in Hz
    pub bandwidth: u64,
    /// Fraction of the bandwidth usable for channel placement, in (0, 1]
    pub usable_bandwidth_fraction: f64,
    /// Half-width of the forbidden zone around the center frequency in Hz
    /// Zero disables the zone
    pub dead_zone_half_width: u64,
    /// Center frequency at startup in Hz
    pub initial_frequency: u64,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            min_frequency: defaults::MIN_FREQUENCY,
            max_frequency: defaults::MAX_FREQUENCY,
            bandwidth: defaults::BANDWIDTH,
            usable_bandwidth_fraction: defaults::USABLE_BANDWIDTH_FRACTION,
            dead_zone_half_width: defaults::DEAD_ZONE_HALF_WIDTH,
            initial_frequency: defaults::INITIAL_FREQUENCY,
        }
    }
}

impl TunerConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_frequency >= self.max_frequency {
            return Err(ConfigError::InvalidRange {
                min: self.min_frequency,
                max: self.max_frequency,
            });
        }

        if self.bandwidth == 0 {
            return Err(ConfigError::ZeroBandwidth);
        }

        if !(self.usable_bandwidth_fraction > 0.0 && self.usable_bandwidth_fraction <= 1.0) {
            return Err(ConfigError::InvalidFraction(self.usable_bandwidth_fraction));
        }

        if self.initial_frequency < self.min_frequency || self.initial_frequency > self.max_frequency
        {
            return Err(ConfigError::InitialFrequencyOutOfRange {
                frequency: self.initial_frequency,
                min: self.min_frequency,
                max: self.max_frequency,
            });
        }

        if self.dead_zone_half_width.saturating_mul(2) >= self.usable_bandwidth() {
            log::warn!(
                "dead zone of {} Hz fills the usable bandwidth of {} Hz, most admissions will fail",
                self.dead_zone_half_width * 2,
                self.usable_bandwidth()
            );
        }

        Ok(())
    }

    /// Bandwidth available for channel placement, in Hz (rounded down)
    pub fn usable_bandwidth(&self) -> u64 {
        (self.bandwidth as f64 * self.usable_bandwidth_fraction) as u64
    }

    /// The absolute tunable range described by this configuration
    pub fn tuning_range(&self) -> TuningRange {
        TuningRange::new(self.min_frequency, self.max_frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(TunerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = TunerConfig {
            min_frequency: 200_000_000,
            max_frequency: 100_000_000,
            ..TunerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                min: 200_000_000,
                max: 100_000_000
            })
        );
    }

    #[test]
    fn test_zero_bandwidth_rejected() {
        let config = TunerConfig {
            bandwidth: 0,
            ..TunerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroBandwidth));
    }

    #[test]
    fn test_fraction_bounds() {
        let mut config = TunerConfig::default();

        config.usable_bandwidth_fraction = 1.0;
        assert!(config.validate().is_ok());

        config.usable_bandwidth_fraction = 0.0;
        assert!(config.validate().is_err());

        config.usable_bandwidth_fraction = 1.5;
        assert!(config.validate().is_err());

        config.usable_bandwidth_fraction = -0.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initial_frequency_must_be_tunable() {
        let config = TunerConfig {
            min_frequency: 100_000_000,
            max_frequency: 200_000_000,
            initial_frequency: 99_000_000,
            ..TunerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InitialFrequencyOutOfRange { .. })
        ));
    }

    #[test]
    fn test_usable_bandwidth_rounds_down() {
        let config = TunerConfig {
            bandwidth: 1_000_000,
            usable_bandwidth_fraction: 0.80,
            ..TunerConfig::default()
        };
        assert_eq!(config.usable_bandwidth(), 800_000);

        let config = TunerConfig {
            bandwidth: 1_000_001,
            usable_bandwidth_fraction: 0.5,
            ..TunerConfig::default()
        };
        assert_eq!(config.usable_bandwidth(), 500_000);
    }
}
