//! HyperLogLog over byte strings.
//!
//! Each item is fingerprinted with the 64-bit seed-fixed hash. The top
//! `precision` bits pick one of `m = 2^precision` registers; the rank of the
//! remaining bits (leading zeros + 1) is kept in that register if it beats
//! the current value. Merging is a register-wise maximum, so it is
//! idempotent, commutative and associative, and the cardinality is derived
//! from the registers on demand.

mod beta;
mod config;
mod linear_counting;
use std::{error, fmt, iter::repeat};

use fingerprint::hash64;
use sketch_traits::{CardinalitySketch, New};

use crate::{beta::beta, linear_counting::linear_counting};
pub use crate::config::{Config, ConfigError, Estimator};

#[derive(Clone, Debug)]
pub struct HyperLogLog {
    config: Config,
    registers: Vec<u8>,
    num_zero_registers: usize,
    /// Running sum of `2^-register` over all registers.
    z_inv: f64,
}

impl New for HyperLogLog {
    type Config = Config;

    fn new(config: &Self::Config) -> Self {
        Self {
            config: config.clone(),
            registers: repeat(0).take(config.num_registers).collect(),
            num_zero_registers: config.num_registers,
            z_inv: config.num_registers as f64,
        }
    }
}

impl CardinalitySketch for HyperLogLog {
    type Item = [u8];
    type Cardinality = f64;
    type MergeError = MergeError;

    #[inline]
    fn insert(&mut self, item: &Self::Item) {
        self.offer_hashed(hash64(item));
    }

    #[inline]
    fn merge(&mut self, other: &Self) -> Result<(), Self::MergeError> {
        if self.config != other.config {
            return Err(MergeError::ConfigMismatch);
        }

        self.registers
            .iter_mut()
            .zip(other.registers.iter())
            .for_each(|(s, o)| *s = *o.max(s));
        self.z_inv = self.registers.iter().map(|&r| inv_pow2(r)).sum::<f64>();
        self.num_zero_registers = self.registers.iter().filter(|&n| *n == 0).count();
        Ok(())
    }

    #[inline]
    fn clear(&mut self) {
        self.registers.fill(0);
        self.z_inv = self.config.num_registers as f64;
        self.num_zero_registers = self.config.num_registers;
    }

    #[inline]
    fn cardinality(&self) -> f64 {
        let m = self.config.num_registers as f64;
        match self.config.estimator {
            Estimator::Classic => {
                let estimate = self.config.alpha * m * m / self.z_inv;
                // small range correction for estimate <= (5/2)m
                if estimate <= 2.5 * m && self.num_zero_registers > 0 {
                    linear_counting(self.config.num_registers, self.num_zero_registers)
                } else {
                    // No large range correction: with 64-bit fingerprints
                    // hash collisions only matter far beyond 2^32 / 30.
                    estimate
                }
            }
            Estimator::LogLogBeta => {
                let zeros = self.num_zero_registers;
                self.config.alpha * m * (m - zeros as f64)
                    / (self.z_inv + beta(zeros, self.config.precision))
            }
        }
    }
}

impl HyperLogLog {
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn precision(&self) -> u8 {
        self.config.precision
    }

    #[inline]
    pub fn num_registers(&self) -> usize {
        self.config.num_registers
    }

    #[inline]
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Same as [`CardinalitySketch::insert`].
    #[inline]
    pub fn offer(&mut self, item: &[u8]) {
        self.insert(item);
    }

    /// Updates the sketch with an already computed 64-bit fingerprint.
    #[inline]
    pub fn offer_hashed(&mut self, hash: u64) {
        let precision = u32::from(self.config.precision);
        let index = (hash >> (u64::BITS - precision)) as usize;
        // The guard bit caps the rank at 64 - precision + 1.
        let w = (hash << precision) | (1 << (precision - 1));
        let rank = w.leading_zeros() as u8 + 1;
        self.update_register(index, rank);
    }

    /// Returns a new sketch holding the union of `self` and `other`.
    pub fn merged(&self, other: &Self) -> Result<Self, MergeError> {
        let mut union = self.clone();
        union.merge(other)?;
        Ok(union)
    }

    #[inline]
    fn update_register(&mut self, index: usize, rank: u8) {
        let register = &mut self.registers[index];
        if rank > *register {
            if *register == 0 {
                self.num_zero_registers -= 1;
            }
            self.z_inv -= inv_pow2(*register);
            self.z_inv += inv_pow2(rank);
            *register = rank;
        }
    }
}

impl PartialEq for HyperLogLog {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config && self.registers == other.registers
    }
}

impl Eq for HyperLogLog {}

#[inline]
fn inv_pow2(rank: u8) -> f64 {
    2.0_f64.powi(-i32::from(rank))
}

#[derive(Clone, Debug)]
pub enum MergeError {
    ConfigMismatch,
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::ConfigMismatch => write!(f, "sketch configs do not match"),
        }
    }
}

impl error::Error for MergeError {}
