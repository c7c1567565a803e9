//! Core scoring math

pub mod probability;

pub use probability::win_probabilities;
