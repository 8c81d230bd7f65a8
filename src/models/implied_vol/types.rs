use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower end of the volatility search bracket.
pub const DEFAULT_LOWER_BOUND: f64 = 1e-6;
/// Upper end of the volatility search bracket (500% annualised).
pub const DEFAULT_UPPER_BOUND: f64 = 5.0;

/// Configuration for the bracketed implied volatility search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Lower volatility bound of the bracket
    pub lower_bound: f64,
    /// Upper volatility bound of the bracket
    pub upper_bound: f64,
    /// Tolerance on the bracket width; the price residual uses it scaled by the
    /// quote when the quote is below 1.0
    pub tolerance: f64,
    /// Iteration cap for Brent's method
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            lower_bound: DEFAULT_LOWER_BOUND,
            upper_bound: DEFAULT_UPPER_BOUND,
            tolerance: 1e-12,
            max_iterations: 100,
        }
    }
}

impl SolverConfig {
    pub fn with_bounds(mut self, lower_bound: f64, upper_bound: f64) -> Self {
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Whether `sigma` lies strictly inside the bracket.
    pub fn contains(&self, sigma: f64) -> bool {
        sigma > self.lower_bound && sigma < self.upper_bound
    }
}

/// Why an inversion produced no volatility. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoSolutionReason {
    /// Non-positive (or non-finite) time to expiration or price
    InvalidInput,
    /// Objective has the same sign at both bracket ends
    NoBracket,
    /// Root finder hit its iteration cap or failed internally
    NonConvergence,
    /// Root finder returned a bracket endpoint
    BoundaryRoot,
}

impl fmt::Display for NoSolutionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NoSolutionReason::InvalidInput => "invalid input",
            NoSolutionReason::NoBracket => "no root in bracket",
            NoSolutionReason::NonConvergence => "root finder did not converge",
            NoSolutionReason::BoundaryRoot => "root at bracket endpoint",
        };
        f.write_str(s)
    }
}

/// Outcome of a single implied volatility inversion.
///
/// Volatility is a fraction (0.20 = 20%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ImpliedVol {
    Solved(f64),
    NoSolution(NoSolutionReason),
}

impl ImpliedVol {
    pub fn is_solved(&self) -> bool {
        matches!(self, ImpliedVol::Solved(_))
    }

    pub fn sigma(&self) -> Option<f64> {
        match *self {
            ImpliedVol::Solved(sigma) => Some(sigma),
            ImpliedVol::NoSolution(_) => None,
        }
    }

    /// Volatility in percent, for display.
    pub fn as_percent(&self) -> Option<f64> {
        self.sigma().map(|s| s * 100.0)
    }
}
