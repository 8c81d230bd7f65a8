use roots::{find_root_brent, Convergency, SearchError};
use tracing::{debug, trace};

use super::types::{ImpliedVol, NoSolutionReason, SolverConfig};
use crate::models::bs::price;
use crate::models::OptionType;

/// Recover sigma from an observed option price over the default bracket `[1e-6, 5.0]`.
///
/// Returns [`ImpliedVol::NoSolution`] when `T <= 0`, `observed_price <= 0`, the
/// bracket does not straddle a root, or Brent's method fails. Never panics.
///
/// # Example
///
/// ```rust
/// use iv_surface::{implied_volatility, price, OptionType};
///
/// let p = price(OptionType::Call, 100.0, 100.0, 1.0, 0.05, 0.20, 0.0);
/// let iv = implied_volatility(OptionType::Call, p, 100.0, 100.0, 1.0, 0.05, 0.0);
/// assert!((iv.sigma().unwrap() - 0.20).abs() < 1e-8);
/// ```
#[allow(non_snake_case)]
pub fn implied_volatility(
    option_type: OptionType,
    observed_price: f64,
    S: f64,
    K: f64,
    T: f64,
    r: f64,
    q: f64,
) -> ImpliedVol {
    implied_volatility_with_config(
        option_type,
        observed_price,
        S,
        K,
        T,
        r,
        q,
        &SolverConfig::default(),
    )
}

/// Same as [`implied_volatility`] with an explicit bracket, tolerance and iteration cap.
#[allow(non_snake_case, clippy::too_many_arguments)]
pub fn implied_volatility_with_config(
    option_type: OptionType,
    observed_price: f64,
    S: f64,
    K: f64,
    T: f64,
    r: f64,
    q: f64,
    config: &SolverConfig,
) -> ImpliedVol {
    if !valid_inputs(observed_price, S, K, T, r, q) {
        trace!(observed_price, S, K, T, "rejecting quote before solving");
        return ImpliedVol::NoSolution(NoSolutionReason::InvalidInput);
    }
    if !(config.lower_bound > 0.0 && config.lower_bound < config.upper_bound) {
        debug!(
            lower = config.lower_bound,
            upper = config.upper_bound,
            "invalid solver bracket"
        );
        return ImpliedVol::NoSolution(NoSolutionReason::InvalidInput);
    }

    let objective = |sigma: f64| price(option_type, S, K, T, r, sigma, q) - observed_price;
    let mut convergency = PriceConvergency::new(config, observed_price);

    match find_root_brent(
        config.lower_bound,
        config.upper_bound,
        &objective,
        &mut convergency,
    ) {
        Ok(sigma) if sigma.is_finite() && config.contains(sigma) => ImpliedVol::Solved(sigma),
        Ok(sigma) => {
            debug!(sigma, K, T, "root landed on bracket endpoint");
            ImpliedVol::NoSolution(NoSolutionReason::BoundaryRoot)
        }
        Err(SearchError::NoBracketing) => {
            debug!(observed_price, K, T, %option_type, "price not reachable inside bracket");
            ImpliedVol::NoSolution(NoSolutionReason::NoBracket)
        }
        Err(e) => {
            debug!(error = ?e, K, T, "brent search failed");
            ImpliedVol::NoSolution(NoSolutionReason::NonConvergence)
        }
    }
}

/// Stopping rule for the Brent search.
///
/// The price residual is measured against the quote (never looser than
/// `tolerance`), so sub-cent prices are not accepted at a bracket end just because
/// they are small. The bracket width is measured absolutely.
struct PriceConvergency {
    residual_eps: f64,
    width_eps: f64,
    max_iter: usize,
}

impl PriceConvergency {
    fn new(config: &SolverConfig, observed_price: f64) -> Self {
        Self {
            residual_eps: config.tolerance * observed_price.min(1.0),
            width_eps: config.tolerance,
            max_iter: config.max_iterations,
        }
    }
}

impl Convergency<f64> for PriceConvergency {
    fn is_root_found(&mut self, y: f64) -> bool {
        y.abs() < self.residual_eps
    }

    fn is_converged(&mut self, x1: f64, x2: f64) -> bool {
        (x1 - x2).abs() < self.width_eps
    }

    fn is_iteration_limit_reached(&mut self, iter: usize) -> bool {
        iter >= self.max_iter
    }
}

#[allow(non_snake_case)]
fn valid_inputs(observed_price: f64, S: f64, K: f64, T: f64, r: f64, q: f64) -> bool {
    // NaN fails every comparison, so these also reject non-finite values
    T > 0.0
        && observed_price > 0.0
        && S > 0.0
        && K > 0.0
        && T.is_finite()
        && observed_price.is_finite()
        && S.is_finite()
        && K.is_finite()
        && r.is_finite()
        && q.is_finite()
}
