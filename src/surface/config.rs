use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::types::AxisKind;
use crate::models::implied_vol::SolverConfig;
use crate::models::OptionType;

/// Longest expiry cutoff accepted, in days (100 years)
pub const MAX_DAYS_TO_EXPIRY: i64 = 36_500;

/// Output image settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Camera yaw in radians
    pub yaw: f64,
    /// Camera pitch in radians
    pub pitch: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 800,
            yaw: 0.7,
            pitch: 0.35,
        }
    }
}

/// Main configuration for a surface run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    #[serde(default = "default_ticker")]
    pub ticker: String,

    /// Continuously compounded risk-free rate (0.015 = 1.5%)
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    /// Continuous dividend yield (0.013 = 1.3%)
    #[serde(default = "default_dividend_yield")]
    pub dividend_yield: f64,

    #[serde(default)]
    pub option_type: OptionType,

    #[serde(default)]
    pub axis: AxisKind,

    /// Lowest strike kept, as a percentage of spot
    #[serde(default = "default_min_strike_pct")]
    pub min_strike_pct: f64,

    /// Highest strike kept, as a percentage of spot
    #[serde(default = "default_max_strike_pct")]
    pub max_strike_pct: f64,

    /// Expirations must be strictly later than this many days out
    #[serde(default = "default_min_days_to_expiry")]
    pub min_days_to_expiry: i64,

    /// Nodes per axis of the interpolation grid
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,

    #[serde(default)]
    pub solver: SolverConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            ticker: default_ticker(),
            risk_free_rate: default_risk_free_rate(),
            dividend_yield: default_dividend_yield(),
            option_type: OptionType::default(),
            axis: AxisKind::default(),
            min_strike_pct: default_min_strike_pct(),
            max_strike_pct: default_max_strike_pct(),
            min_days_to_expiry: default_min_days_to_expiry(),
            grid_size: default_grid_size(),
            solver: SolverConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl SurfaceConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut config: SurfaceConfig =
            toml::from_str(s).context("Failed to parse surface configuration")?;
        config.ticker = config.ticker.trim().to_uppercase();
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticker.is_empty() || self.ticker.len() > 10 {
            return Err(anyhow!(
                "Ticker symbol must be 1-10 characters, got {:?}",
                self.ticker
            ));
        }
        if !(50.0..=199.0).contains(&self.min_strike_pct) {
            return Err(anyhow!(
                "Minimum strike percentage must be within [50, 199], got {}",
                self.min_strike_pct
            ));
        }
        if !(51.0..=200.0).contains(&self.max_strike_pct) {
            return Err(anyhow!(
                "Maximum strike percentage must be within [51, 200], got {}",
                self.max_strike_pct
            ));
        }
        if self.min_strike_pct >= self.max_strike_pct {
            return Err(anyhow!(
                "Minimum percentage must be less than maximum percentage."
            ));
        }
        if !self.risk_free_rate.is_finite() || !self.dividend_yield.is_finite() {
            return Err(anyhow!("Risk-free rate and dividend yield must be finite"));
        }
        if !(0..=MAX_DAYS_TO_EXPIRY).contains(&self.min_days_to_expiry) {
            return Err(anyhow!(
                "min_days_to_expiry must be within [0, {}], got {}",
                MAX_DAYS_TO_EXPIRY,
                self.min_days_to_expiry
            ));
        }
        if self.grid_size < 2 {
            return Err(anyhow!("grid_size must be at least 2, got {}", self.grid_size));
        }
        let solver = &self.solver;
        if !(solver.lower_bound > 0.0 && solver.lower_bound < solver.upper_bound) {
            return Err(anyhow!(
                "Solver bracket must satisfy 0 < lower < upper, got [{}, {}]",
                solver.lower_bound,
                solver.upper_bound
            ));
        }
        if solver.max_iterations == 0 || solver.tolerance <= 0.0 {
            return Err(anyhow!(
                "Solver needs a positive tolerance and at least one iteration"
            ));
        }
        if self.render.width == 0 || self.render.height == 0 {
            return Err(anyhow!("Render dimensions must be non-zero"));
        }
        Ok(())
    }

    /// Strike window `[lo, hi]` in price terms for a given spot
    pub fn strike_window(&self, spot: f64) -> (f64, f64) {
        (
            spot * (self.min_strike_pct / 100.0),
            spot * (self.max_strike_pct / 100.0),
        )
    }
}

fn default_ticker() -> String {
    "SPY".to_string()
}

fn default_risk_free_rate() -> f64 {
    0.015
}

fn default_dividend_yield() -> f64 {
    0.013
}

fn default_min_strike_pct() -> f64 {
    80.0
}

fn default_max_strike_pct() -> f64 {
    120.0
}

fn default_min_days_to_expiry() -> i64 {
    7
}

fn default_grid_size() -> usize {
    50
}
