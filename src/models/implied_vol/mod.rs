//! Implied volatility inversion
//!
//! Recovers the Black-Scholes volatility that reproduces an observed option price,
//! using Brent's method over a fixed bracket. Every failure collapses to a tagged
//! [`ImpliedVol::NoSolution`] so callers can drop the quote without error handling.

pub mod solver;
pub mod types;

pub use solver::*;
pub use types::*;
