//! Core math modules.

pub mod autocorr;
pub mod regression;
pub mod smoothing;
pub mod stats;
