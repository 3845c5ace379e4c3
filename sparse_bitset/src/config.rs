use std::{error, fmt};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) domain_size: u32,
}

impl Config {
    /// Largest supported domain, `2^31 - 1`.
    pub const MAX_DOMAIN_SIZE: u32 = i32::MAX as u32;

    pub fn new(domain_size: u32) -> Result<Self, ConfigError> {
        if domain_size == 0 || domain_size > Self::MAX_DOMAIN_SIZE {
            return Err(ConfigError::InvalidDomainSize(domain_size));
        }
        Ok(Self { domain_size })
    }

    pub fn domain_size(&self) -> u32 {
        self.domain_size
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain_size: Self::MAX_DOMAIN_SIZE,
        }
    }
}

#[derive(Clone, Debug)]
pub enum ConfigError {
    InvalidDomainSize(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDomainSize(size) => write!(
                f,
                "the domain size should be in [1, {}], got {}",
                Config::MAX_DOMAIN_SIZE,
                size
            ),
        }
    }
}

impl error::Error for ConfigError {}
