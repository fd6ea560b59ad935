//! Keyword-based industry segmentation of customer names.

pub mod classifier;

pub use classifier::{classify, Segment};
