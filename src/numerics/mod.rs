//! Numerical support layer: bounded simplex optimization, robust scalar
//! root finding, monotone interpolation, and the few special-function and
//! linear-algebra primitives the distribution framework consumes.

pub mod interpolation;
pub mod linalg;
pub mod nelder_mead;
pub mod root_finding;
pub mod special;
