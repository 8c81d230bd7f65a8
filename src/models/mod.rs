pub mod bs;
pub mod implied_vol;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// European option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    #[default]
    Call,
    Put,
}

impl OptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(anyhow::anyhow!("Invalid option type: {}", other)),
        }
    }
}

/// Utility functions shared by the surface builder
pub mod utils {
    /// Moneyness as used on the surface axis: K / S
    pub fn moneyness(strike: f64, spot: f64) -> f64 {
        strike / spot
    }

    /// Mid-market price from a bid/ask pair
    pub fn mid_price(bid: f64, ask: f64) -> f64 {
        (bid + ask) / 2.0
    }
}
