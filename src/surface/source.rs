//! Market-data seam for the surface builder.
//!
//! The pipeline only talks to [`OptionChainSource`]; [`CsvChainSource`] serves a
//! recorded option-chain snapshot from disk.

use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use super::types::{OptionChain, QuoteRow};
use crate::models::OptionType;

/// Provider of listed option quotes and the underlying's spot price
pub trait OptionChainSource: Send + Sync {
    /// Ticker symbol this source serves
    fn ticker(&self) -> &str;

    /// All listed expirations as UNIX timestamps
    fn expirations(&self) -> Result<Vec<i64>>;

    /// Calls and puts for one expiration
    fn option_chain(&self, expiration: i64) -> Result<OptionChain>;

    /// Latest spot price of the underlying
    fn spot_price(&self) -> Result<f64>;
}

/// Snapshot row layout
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "symbol", default)]
    symbol: String,
    #[serde(rename = "option_type")]
    option_type: String,
    #[serde(rename = "strike_price")]
    strike_price: f64,
    #[serde(rename = "bid", default)]
    bid: f64,
    #[serde(rename = "ask", default)]
    ask: f64,
    #[serde(rename = "underlying_price")]
    underlying_price: f64,
    #[serde(rename = "expiration_ts")]
    expiration_ts: i64,
}

/// Option chain snapshot loaded from CSV
#[derive(Debug, Clone)]
pub struct CsvChainSource {
    ticker: String,
    chains: BTreeMap<i64, OptionChain>,
    spot: Option<f64>,
}

impl CsvChainSource {
    pub fn from_path<P: AsRef<Path>>(ticker: &str, path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open snapshot {}", path.display()))?;
        Self::from_reader(ticker, file)
            .with_context(|| format!("Failed to load snapshot {}", path.display()))
    }

    pub fn from_reader<R: Read>(ticker: &str, reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let mut chains: BTreeMap<i64, OptionChain> = BTreeMap::new();
        let mut spot = None;

        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result.with_context(|| format!("Bad snapshot row {}", line + 1))?;
            let option_type: OptionType = row
                .option_type
                .parse()
                .with_context(|| format!("Bad snapshot row {} ({})", line + 1, row.symbol))?;
            let quote = QuoteRow {
                strike: row.strike_price,
                bid: row.bid,
                ask: row.ask,
            };

            let chain = chains
                .entry(row.expiration_ts)
                .or_insert_with(|| OptionChain {
                    expiration: row.expiration_ts,
                    ..OptionChain::default()
                });
            match option_type {
                OptionType::Call => chain.calls.push(quote),
                OptionType::Put => chain.puts.push(quote),
            }

            // last observed underlying wins, like a closing print
            if row.underlying_price > 0.0 {
                spot = Some(row.underlying_price);
            }
        }

        if chains.is_empty() {
            return Err(anyhow!("Snapshot for {} contains no option rows", ticker));
        }

        Ok(Self {
            ticker: ticker.trim().to_uppercase(),
            chains,
            spot,
        })
    }

    /// Number of quote rows across all expirations
    pub fn len(&self) -> usize {
        self.chains
            .values()
            .map(|c| c.calls.len() + c.puts.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OptionChainSource for CsvChainSource {
    fn ticker(&self) -> &str {
        &self.ticker
    }

    fn expirations(&self) -> Result<Vec<i64>> {
        Ok(self.chains.keys().copied().collect())
    }

    fn option_chain(&self, expiration: i64) -> Result<OptionChain> {
        self.chains
            .get(&expiration)
            .cloned()
            .ok_or_else(|| anyhow!("No option chain for expiration {}", expiration))
    }

    fn spot_price(&self) -> Result<f64> {
        self.spot
            .ok_or_else(|| anyhow!("Failed to retrieve spot price data for {}.", self.ticker))
    }
}
