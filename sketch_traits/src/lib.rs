use std::error;

/// A mergeable summary of the distinct items it has seen.
pub trait CardinalitySketch {
    type Item: ?Sized;
    type Cardinality;
    type MergeError: error::Error;

    fn insert(&mut self, item: &Self::Item);

    /// Folds `other` into `self`. Sketches built with different configs are
    /// rejected rather than reconciled.
    fn merge(&mut self, other: &Self) -> Result<(), Self::MergeError>;

    fn clear(&mut self);

    fn cardinality(&self) -> Self::Cardinality;
}

pub trait New {
    type Config;

    fn new(config: &Self::Config) -> Self;
}
