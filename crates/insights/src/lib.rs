//! Automated insights — a stateless rule pass over computed metrics.

pub mod rules;

pub use rules::generate_insights;
