//! Sparse Bit Set
//!
//! An exact set summary over a hashed domain of up to `2^31 - 1` indices. An
//! item is reduced to `(hash32(item) & 0x7fffffff) % domain_size` and that
//! index is set. Occupancy grows with the number of distinct items seen, not
//! with the domain: the set is kept as an ordered map from word number
//! (`index / 64`) to a 64-bit word, and a word only exists once one of its
//! bits has been set.
//!
//! Cardinality is exact up to fingerprint collisions inside the domain.

mod config;
use std::{collections::BTreeMap, error, fmt};

use fingerprint::hash32;
use sketch_traits::{CardinalitySketch, New};

pub use crate::config::{Config, ConfigError};

const WORD_BITS: u32 = u64::BITS;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseBitSet {
    config: Config,
    words: BTreeMap<u32, u64>,
    num_set: usize,
}

impl Default for SparseBitSet {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl New for SparseBitSet {
    type Config = Config;

    fn new(config: &Self::Config) -> Self {
        Self {
            config: config.clone(),
            words: BTreeMap::new(),
            num_set: 0,
        }
    }
}

impl CardinalitySketch for SparseBitSet {
    type Item = [u8];
    type Cardinality = usize;
    type MergeError = MergeError;

    #[inline]
    fn insert(&mut self, item: &Self::Item) {
        let index = (hash32(item) & 0x7fff_ffff) % self.config.domain_size;
        self.insert_index(index);
    }

    fn merge(&mut self, other: &Self) -> Result<(), Self::MergeError> {
        if self.config != other.config {
            return Err(MergeError::ConfigMismatch);
        }

        for (&word_index, &other_word) in other.words.iter() {
            let word = self.words.entry(word_index).or_insert(0);
            self.num_set += (other_word & !*word).count_ones() as usize;
            *word |= other_word;
        }
        Ok(())
    }

    #[inline]
    fn clear(&mut self) {
        self.words.clear();
        self.num_set = 0;
    }

    #[inline]
    fn cardinality(&self) -> usize {
        self.num_set
    }
}

impl SparseBitSet {
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sets `index` and returns whether it was previously unset.
    ///
    /// Panics if `index` is outside the domain.
    pub fn insert_index(&mut self, index: u32) -> bool {
        assert!(
            index < self.config.domain_size,
            "index {} outside of domain of size {}",
            index,
            self.config.domain_size
        );
        let (word_index, mask) = Self::locate(index);
        let word = self.words.entry(word_index).or_insert(0);
        if *word & mask != 0 {
            return false;
        }
        *word |= mask;
        self.num_set += 1;
        true
    }

    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        let (word_index, mask) = Self::locate(index);
        self.words
            .get(&word_index)
            .map_or(false, |word| word & mask != 0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_set == 0
    }

    /// Number of allocated 64-bit words.
    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Set indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.words
            .iter()
            .flat_map(|(&word_index, &word)| SetBits {
                base: word_index * WORD_BITS,
                word,
            })
    }

    #[inline]
    fn locate(index: u32) -> (u32, u64) {
        (index / WORD_BITS, 1 << (index % WORD_BITS))
    }
}

struct SetBits {
    base: u32,
    word: u64,
}

impl Iterator for SetBits {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.word == 0 {
            return None;
        }
        let bit = self.word.trailing_zeros();
        self.word &= self.word - 1;
        Some(self.base + bit)
    }
}

#[derive(Clone, Debug)]
pub enum MergeError {
    ConfigMismatch,
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::ConfigMismatch => write!(f, "bit set domain sizes do not match"),
        }
    }
}

impl error::Error for MergeError {}
