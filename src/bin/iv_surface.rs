// Builds an implied volatility surface from an option-chain snapshot CSV and writes
// it as a 3D SVG chart.
//
// Usage:
//     iv_surface <snapshot.csv> <as_of_unix_ts> [config.toml] [output.svg]
//
// The CSV needs the columns
//     symbol,option_type,strike_price,bid,ask,underlying_price,expiration_ts
// Log verbosity follows RUST_LOG (default: info).

use std::env;
use std::process;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use iv_surface::{build_surface, render_surface_svg, CsvChainSource, RenderOptions, SurfaceConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run() {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} <snapshot.csv> <as_of_unix_ts> [config.toml] [output.svg]\nExample: {} spy.csv 1735689600 surface.toml",
            args[0], args[0]
        );
        process::exit(2);
    }
    let csv_path = &args[1];
    let as_of: i64 = args[2]
        .parse()
        .with_context(|| format!("Invalid as-of timestamp {:?}", args[2]))?;
    let config = match args.get(3) {
        Some(path) => SurfaceConfig::from_file(path)?,
        None => SurfaceConfig::default(),
    };
    let output = args.get(4).map(String::as_str).unwrap_or("iv_surface.svg");

    let source = CsvChainSource::from_path(&config.ticker, csv_path)?;
    info!(rows = source.len(), ticker = %config.ticker, "snapshot loaded");

    let render = RenderOptions::for_ticker(&config.ticker, &config.render);
    let axis = config.axis;
    let (data, grid) = build_surface(&source, config, as_of)?;

    println!(
        "{} {} surface | spot {:.2} | {} solved, {} dropped",
        data.ticker,
        data.option_type,
        data.spot,
        data.points.len(),
        data.dropped
    );
    println!("  T (y)  | {:>24} | IV (%)", axis.label());
    for p in &data.points {
        println!(
            "{:8.4} | {:>24.4} | {:6.2}",
            p.time_to_expiration,
            axis.value(p),
            p.implied_vol_pct
        );
    }

    render_surface_svg(&grid, &render, output)?;
    println!("Chart saved to {}", output);
    Ok(())
}
