
use iv_surface::surface::pipeline::{assemble_points, collect_quotes, solve_quotes};
use iv_surface::{
    build_surface, render_surface_svg, AxisKind, MarketContext, OptionChain, OptionType,
    QuoteRow, RenderOptions, SolverConfig, SurfaceConfig, SurfaceGrid, SurfacePipeline,
};
use test_utils::*;

/// Calls from the recorded snapshot: window, two-sidedness and attrition counts.
#[test]
fn test_fixture_calls_pipeline() {
    let source = load_fixture();
    let config = fixture_config(OptionType::Call);

    let data = SurfacePipeline::new(config, AS_OF)
        .run(&source)
        .expect("pipeline failed");

    assert_eq!(data.ticker, "SPY");
    assert_eq!(data.spot, SPOT);
    // 3 expiries beyond 7 days x 9 strikes in [80, 120], one quote without a bid
    assert_eq!(data.attempted, 26);
    // the 150.50 quote on a 100 spot is not reachable by any volatility
    assert_eq!(data.dropped, 1);
    assert_eq!(data.points.len(), 25);

    for p in &data.points {
        assert!(p.strike >= 80.0 && p.strike <= 120.0);
        assert!(p.time_to_expiration > 7.0 / 365.0);
        assert!((p.moneyness - p.strike / SPOT).abs() < 1e-12);
        assert!(p.implied_vol_pct > 0.0 && p.implied_vol_pct < 500.0);
    }

    // sorted by strike
    assert!(data.points.windows(2).all(|w| w[0].strike <= w[1].strike));
}

/// Recovered volatilities match the smile the fixture was priced from.
#[test]
fn test_fixture_recovers_smile() {
    let source = load_fixture();

    for option_type in [OptionType::Call, OptionType::Put] {
        let data = SurfacePipeline::new(fixture_config(option_type), AS_OF)
            .run(&source)
            .expect("pipeline failed");

        let mut compared = 0;
        for p in data.points.iter().filter(|p| p.mid > 0.5) {
            let expected = smile_vol(p.strike, p.time_to_expiration) * 100.0;
            assert!(
                (p.implied_vol_pct - expected).abs() < 0.1,
                "{} K={} T={:.4}: expected {:.3}%, got {:.3}%",
                option_type,
                p.strike,
                p.time_to_expiration,
                expected,
                p.implied_vol_pct
            );
            compared += 1;
        }
        assert!(compared >= 10, "only {} points compared", compared);
    }
}

/// Puts come from the put side of the chain, all of them solvable.
#[test]
fn test_fixture_puts_pipeline() {
    let source = load_fixture();
    let data = SurfacePipeline::new(fixture_config(OptionType::Put), AS_OF)
        .run(&source)
        .expect("pipeline failed");

    assert_eq!(data.option_type, OptionType::Put);
    assert_eq!(data.attempted, 27);
    assert_eq!(data.dropped, 0);
}

#[test]
fn test_no_expiration_after_cutoff() {
    let source = SyntheticSource::new(vec![2, 5, 7], vec![95.0, 100.0, 105.0]);
    let err = SurfacePipeline::new(fixture_config(OptionType::Call), AS_OF)
        .run(&source)
        .unwrap_err();
    assert!(
        err.to_string().contains("No available option expiration dates"),
        "unexpected error: {}",
        err
    );
}

/// A failing expiration is skipped, the rest still builds.
#[test]
fn test_failed_chain_is_skipped() {
    let mut source = SyntheticSource::new(vec![30, 60, 90], vec![90.0, 100.0, 110.0]);
    source.failing_days = vec![60];

    let data = SurfacePipeline::new(fixture_config(OptionType::Call), AS_OF)
        .run(&source)
        .expect("pipeline failed");

    assert_eq!(data.attempted, 6);
    assert!(data
        .points
        .iter()
        .all(|p| p.expiration != AS_OF + 60 * SECONDS_PER_DAY));
}

#[test]
fn test_all_chains_failing_is_terminal() {
    let mut source = SyntheticSource::new(vec![30, 60], vec![100.0]);
    source.failing_days = vec![30, 60];

    let err = SurfacePipeline::new(fixture_config(OptionType::Call), AS_OF)
        .run(&source)
        .unwrap_err();
    assert!(err.to_string().contains("No option data available"));
}

#[test]
fn test_missing_spot_is_terminal() {
    let mut source = SyntheticSource::new(vec![30], vec![100.0]);
    source.spot = None;

    assert!(SurfacePipeline::new(fixture_config(OptionType::Call), AS_OF)
        .run(&source)
        .is_err());
}

/// Every quote unsolvable: nothing survives assembly.
#[test]
fn test_nothing_solvable_is_terminal() {
    let chain = OptionChain {
        expiration: AS_OF + 30 * SECONDS_PER_DAY,
        calls: vec![QuoteRow {
            strike: 100.0,
            bid: 200.0,
            ask: 201.0,
        }],
        puts: Vec::new(),
    };
    let quotes = collect_quotes(&chain, OptionType::Call, AS_OF);
    let ctx = MarketContext {
        spot: SPOT,
        risk_free_rate: RATE,
        dividend_yield: DIV_YIELD,
        option_type: OptionType::Call,
    };
    let solved = solve_quotes(&quotes, &ctx, &SolverConfig::default());
    assert_eq!(solved.len(), 1);
    assert!(assemble_points(&solved, SPOT).is_empty());
}

#[test]
fn test_collect_quotes_mid_and_tte() {
    let chain = OptionChain {
        expiration: AS_OF + 73 * SECONDS_PER_DAY,
        calls: vec![
            QuoteRow {
                strike: 100.0,
                bid: 4.0,
                ask: 4.5,
            },
            QuoteRow {
                strike: 105.0,
                bid: 0.0,
                ask: 2.0,
            },
        ],
        puts: vec![QuoteRow {
            strike: 95.0,
            bid: 1.0,
            ask: 1.2,
        }],
    };

    let calls = collect_quotes(&chain, OptionType::Call, AS_OF);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].mid, 4.25);
    assert_eq!(calls[0].days_to_expiration, 73);
    assert!((calls[0].time_to_expiration - 0.2).abs() < 1e-12);

    let puts = collect_quotes(&chain, OptionType::Put, AS_OF);
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].strike, 95.0);
}

/// Grid nodes on the data reproduce the data; nodes outside stay masked.
#[test]
fn test_grid_interpolation() {
    let xyz = vec![
        (0.25, 90.0, 30.0),
        (0.25, 100.0, 20.0),
        (0.25, 110.0, 26.0),
        (0.75, 95.0, 28.0),
        (0.75, 105.0, 24.0),
    ];
    let grid = SurfaceGrid::from_xyz(&xyz, AxisKind::Strike, 5).expect("grid failed");

    assert_eq!(grid.xs, vec![0.25, 0.375, 0.5, 0.625, 0.75]);
    assert_eq!(grid.ys, vec![90.0, 95.0, 100.0, 105.0, 110.0]);

    // on the first slice
    assert_eq!(grid.get(0, 0), Some(30.0));
    assert_eq!(grid.get(0, 2), Some(20.0));
    assert_eq!(grid.get(0, 1), Some(25.0));
    // last slice only spans 95..105
    assert_eq!(grid.get(4, 0), None);
    assert_eq!(grid.get(4, 4), None);
    assert_eq!(grid.get(4, 2), Some(26.0));
    // halfway in time at K=100: (20 + 26) / 2
    let mid = grid.get(2, 2).expect("node should be filled");
    assert!((mid - 23.0).abs() < 1e-12);
    // outside the later slice's strike range
    assert_eq!(grid.get(2, 0), None);

    let (lo, hi) = grid.z_range().expect("values present");
    assert!(lo >= 20.0 && hi <= 30.0);
}

#[test]
fn test_grid_needs_two_points() {
    assert!(SurfaceGrid::from_xyz(&[(0.5, 100.0, 20.0)], AxisKind::Strike, 10).is_err());
    assert!(SurfaceGrid::from_xyz(&[], AxisKind::Moneyness, 10).is_err());
    assert!(
        SurfaceGrid::from_xyz(&[(0.5, 100.0, 20.0), (0.5, 110.0, 22.0)], AxisKind::Strike, 1)
            .is_err()
    );
}

/// Single expiry: the grid is the slice repeated across a zero-width time axis.
#[test]
fn test_grid_single_expiry() {
    let xyz = vec![(0.5, 0.9, 30.0), (0.5, 1.1, 20.0)];
    let grid = SurfaceGrid::from_xyz(&xyz, AxisKind::Moneyness, 3).expect("grid failed");
    assert_eq!(grid.filled(), 9);
    assert!((grid.get(1, 1).unwrap() - 25.0).abs() < 1e-12);
}

/// Full run on the fixture down to an SVG file.
#[test]
fn test_build_and_render_surface() {
    let source = load_fixture();
    let config = SurfaceConfig {
        axis: AxisKind::Moneyness,
        ..fixture_config(OptionType::Call)
    };
    let render = RenderOptions::for_ticker("SPY", &config.render);

    let (data, grid) = build_surface(&source, config, AS_OF).expect("surface failed");
    assert_eq!(grid.axis, AxisKind::Moneyness);
    assert_eq!(grid.xs.len(), 20);
    assert!(grid.filled() > 0);
    assert!((grid.ys[0] - 0.8).abs() < 1e-12);
    assert!((grid.ys[19] - 1.2).abs() < 1e-12);
    assert!(data.points.len() >= 2);

    let path = std::env::temp_dir().join(format!("iv_surface_test_{}.svg", std::process::id()));
    render_surface_svg(&grid, &render, &path).expect("render failed");
    let svg = std::fs::read_to_string(&path).expect("svg written");
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Implied Volatility Surface for SPY Options"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_invalid_config_rejected() {
    let source = load_fixture();
    let config = SurfaceConfig {
        min_strike_pct: 120.0,
        max_strike_pct: 110.0,
        ..fixture_config(OptionType::Call)
    };
    let err = build_surface(&source, config, AS_OF).unwrap_err();
    assert!(err
        .to_string()
        .contains("Minimum percentage must be less than maximum percentage."));
}

#[test]
fn test_config_from_toml() {
    let doc = r#"
        ticker = "qqq"
        risk_free_rate = 0.04
        option_type = "put"
        axis = "moneyness"
        min_strike_pct = 90.0
        max_strike_pct = 110.0

        [solver]
        upper_bound = 3.0
        max_iterations = 50
    "#;
    let config = SurfaceConfig::from_toml_str(doc).expect("config should parse");

    assert_eq!(config.ticker, "QQQ");
    assert_eq!(config.option_type, OptionType::Put);
    assert_eq!(config.axis, AxisKind::Moneyness);
    assert_eq!(config.dividend_yield, 0.013);
    assert_eq!(config.solver.upper_bound, 3.0);
    assert_eq!(config.solver.lower_bound, 1e-6);
    assert_eq!(config.solver.max_iterations, 50);

    assert!(SurfaceConfig::from_toml_str("min_strike_pct = 40.0").is_err());
    assert!(SurfaceConfig::from_toml_str("option_type = \"straddle\"").is_err());
}
