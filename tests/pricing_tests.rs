use iv_surface::{
    bs_call_price, bs_call_price_no_div, bs_put_price, bs_put_price_no_div, price, OptionType,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Textbook value: S=100, K=100, T=1, r=5%, sigma=20%, no dividends.
#[test]
fn test_reference_call_value() {
    let call = price(OptionType::Call, 100.0, 100.0, 1.0, 0.05, 0.20, 0.0);
    assert!(
        (call - 10.450_583_572).abs() < 1e-8,
        "call should be 10.4506, got {}",
        call
    );

    let put = price(OptionType::Put, 100.0, 100.0, 1.0, 0.05, 0.20, 0.0);
    assert!(
        (put - 5.573_526_022).abs() < 1e-8,
        "put should be 5.5735, got {}",
        put
    );
}

/// The dividend-free helpers are the q = 0 case of the general formula.
#[test]
fn test_no_dividend_variants_match() {
    let cases = [
        (100.0, 90.0, 0.25, 0.03, 0.35),
        (50.0, 55.0, 2.0, -0.005, 0.8),
        (4500.0, 4700.0, 0.08, 0.045, 0.15),
    ];
    for &(s, k, t, r, sigma) in &cases {
        assert_eq!(
            bs_call_price_no_div(s, k, t, r, sigma),
            bs_call_price(s, k, t, r, 0.0, sigma)
        );
        assert_eq!(
            bs_put_price_no_div(s, k, t, r, sigma),
            bs_put_price(s, k, t, r, 0.0, sigma)
        );
        assert_eq!(
            bs_call_price(s, k, t, r, 0.0, sigma),
            price(OptionType::Call, s, k, t, r, sigma, 0.0)
        );
    }
}

/// A continuous dividend yield lowers calls and raises puts.
#[test]
fn test_dividend_yield_direction() {
    let no_div_call = bs_call_price(100.0, 100.0, 1.0, 0.02, 0.0, 0.25);
    let div_call = bs_call_price(100.0, 100.0, 1.0, 0.02, 0.03, 0.25);
    assert!(div_call < no_div_call);

    let no_div_put = bs_put_price(100.0, 100.0, 1.0, 0.02, 0.0, 0.25);
    let div_put = bs_put_price(100.0, 100.0, 1.0, 0.02, 0.03, 0.25);
    assert!(div_put > no_div_put);
}

/// Put-call parity and non-negativity across randomly drawn inputs.
#[test]
fn test_put_call_parity_and_non_negativity() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..2_000 {
        let s: f64 = rng.gen_range(1.0..500.0);
        let k: f64 = s * rng.gen_range(0.3..3.0);
        let t: f64 = rng.gen_range(0.001..5.0);
        let r: f64 = rng.gen_range(-0.02..0.10);
        let q: f64 = rng.gen_range(0.0..0.06);
        let sigma: f64 = rng.gen_range(0.001..5.0);

        let call = price(OptionType::Call, s, k, t, r, sigma, q);
        let put = price(OptionType::Put, s, k, t, r, sigma, q);

        assert!(call > -1e-9 * s, "negative call {} for {:?}", call, (s, k, t, r, q, sigma));
        assert!(put > -1e-9 * s, "negative put {} for {:?}", put, (s, k, t, r, q, sigma));

        let parity = s * (-q * t).exp() - k * (-r * t).exp();
        assert!(
            (call - put - parity).abs() < 1e-9 * s.max(k),
            "parity broken: C-P={} vs {} for {:?}",
            call - put,
            parity,
            (s, k, t, r, q, sigma)
        );
    }
}

/// Call value strictly increases with sigma across the search bracket.
#[test]
fn test_call_monotone_in_sigma() {
    for &k in &[90.0, 100.0, 110.0] {
        for &q in &[0.0, 0.02] {
            let mut prev = f64::NEG_INFINITY;
            for i in 1..=100 {
                let sigma = 0.05 * i as f64;
                let p = price(OptionType::Call, 100.0, k, 1.0, 0.05, sigma, q);
                assert!(
                    p > prev,
                    "call not increasing at sigma={} (K={}, q={}): {} <= {}",
                    sigma,
                    k,
                    q,
                    p,
                    prev
                );
                prev = p;
            }
        }
    }
}

/// Call value at the top of the bracket stays below spot when q = 0.
#[test]
fn test_call_bounded_by_spot() {
    let p = price(OptionType::Call, 100.0, 100.0, 1.0, 0.05, 5.0, 0.0);
    assert!(p < 100.0);
    assert!(p > 95.0, "sigma=5 call should be close to spot, got {}", p);
}
