// Black-Scholes pricing for European options with an optional continuous dividend
// yield. A single q-parameterised formula backs every public variant so the
// dividend-free helpers are exactly the q = 0 case.

use super::OptionType;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Standard normal CDF, Φ(x) = ½·erfc(−x/√2).
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x * FRAC_1_SQRT_2)
}

/// Standard normal density.
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Returns `(d1, d2)` for the given inputs.
#[allow(non_snake_case)]
pub fn d1_d2(S: f64, K: f64, T: f64, r: f64, sigma: f64, q: f64) -> (f64, f64) {
    let sig_sqrt_t = sigma * T.sqrt();
    let d1 = ((S / K).ln() + (r - q + 0.5 * sigma * sigma) * T) / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

/// Theoretical value of a European option under Black-Scholes.
///
/// Requires `S > 0`, `K > 0`, `T > 0` and `sigma > 0`. `T = 0` or `sigma = 0`
/// divide by zero inside `d1`; callers must filter those out beforehand.
#[allow(non_snake_case)]
pub fn price(option_type: OptionType, S: f64, K: f64, T: f64, r: f64, sigma: f64, q: f64) -> f64 {
    debug_assert!(S > 0.0 && K > 0.0, "spot and strike must be positive");
    debug_assert!(T > 0.0 && sigma > 0.0, "time and volatility must be positive");

    let (d1, d2) = d1_d2(S, K, T, r, sigma, q);
    let disc_spot = S * (-q * T).exp();
    let disc_strike = K * (-r * T).exp();

    match option_type {
        OptionType::Call => disc_spot * norm_cdf(d1) - disc_strike * norm_cdf(d2),
        OptionType::Put => disc_strike * norm_cdf(-d2) - disc_spot * norm_cdf(-d1),
    }
}

/// Price of a European call option with continuous dividend yield `q`.
#[allow(non_snake_case)]
pub fn bs_call_price(S: f64, K: f64, T: f64, r: f64, q: f64, sigma: f64) -> f64 {
    price(OptionType::Call, S, K, T, r, sigma, q)
}

/// Price of a European put option with continuous dividend yield `q`.
#[allow(non_snake_case)]
pub fn bs_put_price(S: f64, K: f64, T: f64, r: f64, q: f64, sigma: f64) -> f64 {
    price(OptionType::Put, S, K, T, r, sigma, q)
}

/// Price of a European call option on a non-dividend-paying underlying.
#[allow(non_snake_case)]
pub fn bs_call_price_no_div(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> f64 {
    price(OptionType::Call, S, K, T, r, sigma, 0.0)
}

/// Price of a European put option on a non-dividend-paying underlying.
#[allow(non_snake_case)]
pub fn bs_put_price_no_div(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> f64 {
    price(OptionType::Put, S, K, T, r, sigma, 0.0)
}

/// Sensitivity of the option value to sigma. Identical for calls and puts.
#[allow(non_snake_case)]
pub fn vega(S: f64, K: f64, T: f64, r: f64, sigma: f64, q: f64) -> f64 {
    let (d1, _) = d1_d2(S, K, T, r, sigma, q);
    S * (-q * T).exp() * norm_pdf(d1) * T.sqrt()
}
