pub mod bootstrap;
pub mod monte_carlo;

pub use bootstrap::Bootstrap;
pub use monte_carlo::{confidence_intervals, ConfidenceIntervals};
