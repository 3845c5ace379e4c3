use std::{error, fmt, ops::RangeInclusive};

/// How [`crate::HyperLogLog::cardinality`] turns registers into an estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Estimator {
    /// Harmonic mean with linear counting below `2.5 * m`.
    Classic,
    /// LogLog-Beta: harmonic mean with a per-precision polynomial bias
    /// correction in the number of zero registers.
    #[default]
    LogLogBeta,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) precision: u8,
    pub(crate) num_registers: usize,
    pub(crate) alpha: f64,
    pub(crate) estimator: Estimator,
}

impl Config {
    pub const PRECISIONS: RangeInclusive<u8> = 4..=18;

    pub fn new(precision: u8) -> Result<Self, ConfigError> {
        Self::with_estimator(precision, Estimator::default())
    }

    pub fn with_estimator(precision: u8, estimator: Estimator) -> Result<Self, ConfigError> {
        if !Self::PRECISIONS.contains(&precision) {
            return Err(ConfigError::InvalidPrecision(precision));
        }
        let num_registers = 1 << precision;
        Ok(Self {
            precision,
            num_registers,
            alpha: alpha(num_registers),
            estimator,
        })
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn num_registers(&self) -> usize {
        self.num_registers
    }

    pub fn estimator(&self) -> Estimator {
        self.estimator
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.precision == other.precision && self.estimator == other.estimator
    }
}

impl Eq for Config {}

#[derive(Clone, Debug)]
pub enum ConfigError {
    InvalidPrecision(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPrecision(precision) => write!(
                f,
                "the precision should be in [{}, {}], got {}",
                Config::PRECISIONS.start(),
                Config::PRECISIONS.end(),
                precision
            ),
        }
    }
}

impl error::Error for ConfigError {}

fn alpha(num_registers: usize) -> f64 {
    debug_assert!(num_registers & (num_registers - 1) == 0); // non-zero power of 2
    match num_registers {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (num_registers as f64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_precisions() {
        for precision in Config::PRECISIONS {
            let config = Config::new(precision).unwrap();
            assert_eq!(config.num_registers(), 1 << precision);
        }
    }

    #[test]
    fn rejects_unsupported_precisions() {
        for precision in [0, 1, 3, 19, 32, 64] {
            assert!(matches!(
                Config::new(precision),
                Err(ConfigError::InvalidPrecision(p)) if p == precision
            ));
        }
    }

    #[test]
    fn compares_precision_and_estimator() {
        assert_eq!(Config::new(14).unwrap(), Config::new(14).unwrap());
        assert_ne!(Config::new(14).unwrap(), Config::new(16).unwrap());
        assert_ne!(
            Config::with_estimator(14, Estimator::Classic).unwrap(),
            Config::with_estimator(14, Estimator::LogLogBeta).unwrap()
        );
    }
}
