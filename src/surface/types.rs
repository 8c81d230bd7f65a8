use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::OptionType;

pub const SECONDS_PER_DAY: i64 = 86_400;
/// Day count used to turn calendar days into years (ACT/365)
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Raw quote row as delivered by a market-data source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteRow {
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
}

impl QuoteRow {
    /// Both sides of the market must be quoted
    pub fn is_two_sided(&self) -> bool {
        self.bid > 0.0 && self.ask > 0.0
    }
}

/// Calls and puts for a single expiration
#[derive(Debug, Clone, Default)]
pub struct OptionChain {
    /// Expiration timestamp (UNIX seconds)
    pub expiration: i64,
    pub calls: Vec<QuoteRow>,
    pub puts: Vec<QuoteRow>,
}

impl OptionChain {
    pub fn rows(&self, option_type: OptionType) -> &[QuoteRow] {
        match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        }
    }
}

/// A quote ready for inversion: strike, mid price and time to expiration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionQuote {
    /// Expiration timestamp (UNIX seconds), kept for grouping
    pub expiration: i64,
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
    /// (bid + ask) / 2
    pub mid: f64,
    pub days_to_expiration: i64,
    /// Time to expiration in years
    pub time_to_expiration: f64,
}

/// Market inputs shared by every quote of one surface run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketContext {
    pub spot: f64,
    pub risk_free_rate: f64,
    pub dividend_yield: f64,
    pub option_type: OptionType,
}

/// Which quantity goes on the surface's strike axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    #[default]
    Strike,
    Moneyness,
}

impl AxisKind {
    pub fn label(self) -> &'static str {
        match self {
            AxisKind::Strike => "Strike Price ($)",
            AxisKind::Moneyness => "Moneyness (Strike / Spot)",
        }
    }

    pub fn value(self, point: &SurfacePoint) -> f64 {
        match self {
            AxisKind::Strike => point.strike,
            AxisKind::Moneyness => point.moneyness,
        }
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One solved point of the implied volatility cloud
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub expiration: i64,
    /// Time to expiration in years
    pub time_to_expiration: f64,
    pub strike: f64,
    /// Strike / spot
    pub moneyness: f64,
    pub mid: f64,
    /// Implied volatility in percent
    pub implied_vol_pct: f64,
}

/// Output of a surface run
#[derive(Debug, Clone)]
pub struct SurfaceData {
    pub ticker: String,
    pub spot: f64,
    pub option_type: OptionType,
    /// Solved points, sorted by strike
    pub points: Vec<SurfacePoint>,
    /// Quotes that reached the solver
    pub attempted: usize,
    /// Quotes dropped because no volatility reproduces their price
    pub dropped: usize,
}
