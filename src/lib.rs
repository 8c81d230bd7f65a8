//! # IV-Surface: Implied Volatility Surfaces from Listed Option Chains
//!
//! `iv-surface` recovers Black-Scholes implied volatilities from option mid prices and
//! assembles them into a (time-to-expiration, strike, implied volatility) surface.
//!
//! ## Core Features
//!
//! - **Black-Scholes Pricing**: European calls and puts with continuous dividend yield
//! - **Implied Volatility**: Brent-bracketed inversion over `[1e-6, 5.0]` with a tagged
//!   result instead of sentinel values
//! - **Surface Building**: expiry/strike filtering, parallel per-quote inversion,
//!   linear grid interpolation and 3D SVG rendering
//!
//! ## Quick Start
//!
//! ```rust
//! use iv_surface::{implied_volatility, price, ImpliedVol, OptionType};
//!
//! // Reference Black-Scholes value: S=100, K=100, T=1, r=5%, sigma=20%
//! let call = price(OptionType::Call, 100.0, 100.0, 1.0, 0.05, 0.20, 0.0);
//! assert!((call - 10.4506).abs() < 1e-4);
//!
//! match implied_volatility(OptionType::Call, call, 100.0, 100.0, 1.0, 0.05, 0.0) {
//!     ImpliedVol::Solved(sigma) => assert!((sigma - 0.20).abs() < 1e-8),
//!     ImpliedVol::NoSolution(reason) => panic!("unexpected: {}", reason),
//! }
//! ```
//!
//! ## Building a Surface
//!
//! ```rust,no_run
//! use iv_surface::{build_surface, CsvChainSource, SurfaceConfig};
//!
//! let config = SurfaceConfig::default();
//! let source = CsvChainSource::from_path("SPY", "spy_snapshot.csv")?;
//! let as_of = 1_735_689_600; // 2025-01-01 00:00:00 UTC
//! let (data, grid) = build_surface(&source, config, as_of)?;
//! println!("{} points, {} grid nodes filled", data.points.len(), grid.filled());
//! # Ok::<(), anyhow::Error>(())
//! ```

// ================================================================================================
// MODULES
// ================================================================================================

pub mod models;
pub mod surface;

// ================================================================================================
// IMPORTS
// ================================================================================================

use anyhow::Result;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

// Pricing and inversion
pub use models::bs::{
    bs_call_price, bs_call_price_no_div, bs_put_price, bs_put_price_no_div, price, vega,
};
pub use models::implied_vol::{
    implied_volatility, implied_volatility_with_config, ImpliedVol, NoSolutionReason,
    SolverConfig,
};
pub use models::OptionType;

// Surface building
pub use surface::{
    render_surface_svg, AxisKind, CsvChainSource, MarketContext, OptionChain,
    OptionChainSource, OptionQuote, QuoteRow, RenderConfig, RenderOptions, SurfaceConfig,
    SurfaceData, SurfaceGrid, SurfacePipeline, SurfacePoint,
};

/// Build the implied volatility surface for one snapshot.
///
/// Runs the full pipeline against `source` and interpolates the solved points onto a
/// `config.grid_size` square grid along the configured axis.
///
/// # Arguments
///
/// * `source` - Market-data provider for one ticker
/// * `config` - Rates, option type, strike window, solver and grid settings
/// * `as_of` - Valuation timestamp (UNIX seconds); expirations and time to expiry are
///   measured from it
///
/// # Errors
///
/// * No expiration beyond `min_days_to_expiry`
/// * No two-sided quotes of the requested type
/// * Spot price unavailable
/// * No quote produced an implied volatility
/// * Fewer than two solved points to interpolate
///
/// Individual quotes that cannot be inverted are dropped silently (counted in
/// [`SurfaceData::dropped`]).
pub fn build_surface(
    source: &dyn OptionChainSource,
    config: SurfaceConfig,
    as_of: i64,
) -> Result<(SurfaceData, SurfaceGrid)> {
    config.validate()?;
    let axis = config.axis;
    let grid_size = config.grid_size;

    let data = SurfacePipeline::new(config, as_of).run(source)?;
    let grid = SurfaceGrid::interpolate(&data.points, axis, grid_size)?;
    Ok((data, grid))
}
