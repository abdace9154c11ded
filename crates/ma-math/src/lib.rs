//! Marketing analytics math utilities.

pub mod math;

pub use math::autocorr::*;
pub use math::regression::*;
pub use math::smoothing::*;
pub use math::stats::*;
