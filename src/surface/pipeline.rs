use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

use super::config::SurfaceConfig;
use super::source::OptionChainSource;
use super::types::*;
use crate::models::implied_vol::{implied_volatility_with_config, ImpliedVol, SolverConfig};
use crate::models::utils::{mid_price, moneyness};
use crate::models::OptionType;

/// Builds the implied volatility point cloud for one ticker snapshot
pub struct SurfacePipeline {
    config: SurfaceConfig,
    /// Valuation timestamp (UNIX seconds, normally midnight UTC of today)
    as_of: i64,
}

impl SurfacePipeline {
    pub fn new(config: SurfaceConfig, as_of: i64) -> Self {
        Self { config, as_of }
    }

    /// Fetch, filter, invert and assemble. Quotes without a volatility are dropped;
    /// an empty result is an error.
    pub fn run(&self, source: &dyn OptionChainSource) -> Result<SurfaceData> {
        let ticker = source.ticker().to_string();
        let option_type = self.config.option_type;

        let expirations = source
            .expirations()
            .with_context(|| format!("Error fetching options for {}", ticker))?;
        let expirations =
            select_expirations(&expirations, self.as_of, self.config.min_days_to_expiry);
        if expirations.is_empty() {
            return Err(anyhow!(
                "No available option expiration dates for {}.",
                ticker
            ));
        }
        debug!(count = expirations.len(), %ticker, "expirations selected");

        let mut quotes = Vec::new();
        for &expiration in &expirations {
            match source.option_chain(expiration) {
                Ok(chain) => {
                    quotes.extend(collect_quotes(&chain, option_type, self.as_of));
                }
                Err(e) => {
                    warn!(expiration, error = %e, "Failed to fetch option chain, skipping");
                }
            }
        }
        if quotes.is_empty() {
            return Err(anyhow!("No option data available after filtering."));
        }

        let spot = source
            .spot_price()
            .context("An error occurred while fetching spot price data")?;
        if !(spot > 0.0 && spot.is_finite()) {
            return Err(anyhow!(
                "Failed to retrieve spot price data for {}: got {}",
                ticker,
                spot
            ));
        }

        let (lo, hi) = self.config.strike_window(spot);
        let quotes = filter_strike_window(quotes, lo, hi);

        let ctx = MarketContext {
            spot,
            risk_free_rate: self.config.risk_free_rate,
            dividend_yield: self.config.dividend_yield,
            option_type,
        };

        let attempted = quotes.len();
        let solved = solve_quotes(&quotes, &ctx, &self.config.solver);
        let points = assemble_points(&solved, spot);
        let dropped = attempted - points.len();

        info!(
            %ticker,
            %option_type,
            spot,
            attempted,
            dropped,
            solved = points.len(),
            "implied volatility pass complete"
        );

        if points.is_empty() {
            return Err(anyhow!(
                "No implied volatilities could be computed for {} ({} quotes attempted).",
                ticker,
                attempted
            ));
        }

        Ok(SurfaceData {
            ticker,
            spot,
            option_type,
            points,
            attempted,
            dropped,
        })
    }
}

/// Expirations strictly later than `as_of + min_days` days, ascending.
/// The cutoff saturates instead of wrapping.
pub fn select_expirations(expirations: &[i64], as_of: i64, min_days: i64) -> Vec<i64> {
    let cutoff = as_of.saturating_add(min_days.saturating_mul(SECONDS_PER_DAY));
    let mut selected: Vec<i64> = expirations
        .iter()
        .copied()
        .filter(|&exp| exp > cutoff)
        .collect();
    selected.sort_unstable();
    selected.dedup();
    selected
}

/// Whole calendar days from `as_of` to `expiration`
pub fn days_between(as_of: i64, expiration: i64) -> i64 {
    (expiration - as_of).div_euclid(SECONDS_PER_DAY)
}

/// Two-sided rows of the requested type, priced at mid
pub fn collect_quotes(
    chain: &OptionChain,
    option_type: OptionType,
    as_of: i64,
) -> Vec<OptionQuote> {
    let days = days_between(as_of, chain.expiration);
    let time_to_expiration = days as f64 / DAYS_PER_YEAR;

    chain
        .rows(option_type)
        .iter()
        .filter(|row| row.is_two_sided())
        .map(|row| OptionQuote {
            expiration: chain.expiration,
            strike: row.strike,
            bid: row.bid,
            ask: row.ask,
            mid: mid_price(row.bid, row.ask),
            days_to_expiration: days,
            time_to_expiration,
        })
        .collect()
}

/// Keep strikes inside `[lo, hi]`
pub fn filter_strike_window(quotes: Vec<OptionQuote>, lo: f64, hi: f64) -> Vec<OptionQuote> {
    quotes
        .into_iter()
        .filter(|q| q.strike >= lo && q.strike <= hi)
        .collect()
}

/// Invert every quote independently. Output order matches input order.
pub fn solve_quotes(
    quotes: &[OptionQuote],
    ctx: &MarketContext,
    solver: &SolverConfig,
) -> Vec<(OptionQuote, ImpliedVol)> {
    quotes
        .par_iter()
        .map(|quote| {
            let iv = implied_volatility_with_config(
                ctx.option_type,
                quote.mid,
                ctx.spot,
                quote.strike,
                quote.time_to_expiration,
                ctx.risk_free_rate,
                ctx.dividend_yield,
                solver,
            );
            (*quote, iv)
        })
        .collect()
}

/// Drop unsolved quotes, convert to percent and sort by strike
pub fn assemble_points(solved: &[(OptionQuote, ImpliedVol)], spot: f64) -> Vec<SurfacePoint> {
    let mut points: Vec<SurfacePoint> = solved
        .iter()
        .filter_map(|(quote, iv)| {
            iv.as_percent().map(|implied_vol_pct| SurfacePoint {
                expiration: quote.expiration,
                time_to_expiration: quote.time_to_expiration,
                strike: quote.strike,
                moneyness: moneyness(quote.strike, spot),
                mid: quote.mid,
                implied_vol_pct,
            })
        })
        .collect();

    points.sort_by(|a, b| {
        a.strike
            .partial_cmp(&b.strike)
            .unwrap_or(Ordering::Equal)
            .then(a.expiration.cmp(&b.expiration))
    });
    points
}
