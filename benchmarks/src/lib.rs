//! Accuracy and speed experiments for the set summaries.

pub mod algo;
pub mod data;
pub mod exact;
pub mod experiment;
pub mod memory;
