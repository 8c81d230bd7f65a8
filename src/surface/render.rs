use anyhow::{anyhow, Result};
use plotters::prelude::*;
use std::path::Path;

use super::config::RenderConfig;
use super::grid::SurfaceGrid;

/// Labels and camera for one rendered surface
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub yaw: f64,
    pub pitch: f64,
}

impl RenderOptions {
    pub fn for_ticker(ticker: &str, render: &RenderConfig) -> Self {
        Self {
            title: format!("Implied Volatility Surface for {} Options", ticker),
            width: render.width,
            height: render.height,
            yaw: render.yaw,
            pitch: render.pitch,
        }
    }
}

/// Blue (low) to yellow (high) ramp on a normalised value
fn surface_color(norm: f64) -> HSLColor {
    let n = if norm.is_finite() { norm.clamp(0.0, 1.0) } else { 0.0 };
    HSLColor(0.66 - 0.51 * n, 0.75, 0.5)
}

/// Widen a zero-width range so the axis can be drawn
fn axis_range(lo: f64, hi: f64) -> std::ops::Range<f64> {
    if hi - lo > 1e-12 {
        lo..hi
    } else {
        let pad = (lo.abs() * 0.01).max(1e-3);
        (lo - pad)..(hi + pad)
    }
}

/// Render the interpolated surface as a 3D SVG chart.
///
/// X is time to expiration, the vertical axis is implied volatility (%), depth is
/// strike or moneyness. Masked grid cells are left out.
pub fn render_surface_svg<P: AsRef<Path>>(
    grid: &SurfaceGrid,
    options: &RenderOptions,
    path: P,
) -> Result<()> {
    let (z_min, z_max) = grid
        .z_range()
        .ok_or_else(|| anyhow!("Surface grid has no interpolated values to render"))?;
    let (x_first, x_last) = match (grid.xs.first(), grid.xs.last()) {
        (Some(a), Some(b)) => (*a, *b),
        _ => return Err(anyhow!("Surface grid has no time nodes")),
    };
    let (y_first, y_last) = match (grid.ys.first(), grid.ys.last()) {
        (Some(a), Some(b)) => (*a, *b),
        _ => return Err(anyhow!("Surface grid has no axis nodes")),
    };

    let root =
        SVGBackend::new(path.as_ref(), (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(&options.title, ("sans-serif", 26))
        .build_cartesian_3d(
            axis_range(x_first, x_last),
            axis_range(z_min, z_max),
            axis_range(y_first, y_last),
        )?;

    chart.with_projection(|mut pb| {
        pb.yaw = options.yaw;
        pb.pitch = options.pitch;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.15))
        .max_light_lines(3)
        .draw()?;

    let span = (z_max - z_min).max(1e-12);
    let mut cells = Vec::new();
    for iy in 0..grid.ys.len().saturating_sub(1) {
        for ix in 0..grid.xs.len().saturating_sub(1) {
            let corners = [
                (ix, iy),
                (ix + 1, iy),
                (ix + 1, iy + 1),
                (ix, iy + 1),
            ];
            let values: Option<Vec<f64>> =
                corners.iter().map(|&(cx, cy)| grid.get(cx, cy)).collect();
            let Some(values) = values else {
                continue;
            };

            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let polygon: Vec<(f64, f64, f64)> = corners
                .iter()
                .zip(values.iter())
                .map(|(&(cx, cy), &z)| (grid.xs[cx], z, grid.ys[cy]))
                .collect();
            cells.push((polygon, surface_color((mean - z_min) / span)));
        }
    }

    chart.draw_series(
        cells
            .into_iter()
            .map(|(polygon, color)| Polygon::new(polygon, color.filled())),
    )?;

    // plotters' 3D axes carry no titles; list them under the chart instead
    let legend_style = ("sans-serif", 14).into_font();
    let base_y = options.height as i32 - 70;
    let legend = [
        "x: Time to Expiration (years)".to_string(),
        "y: Implied Volatility (%)".to_string(),
        format!("z: {}", grid.axis.label()),
    ];
    for (i, line) in legend.iter().enumerate() {
        root.draw(&Text::new(
            line.as_str(),
            (15, base_y + 18 * i as i32),
            legend_style.clone(),
        ))?;
    }

    root.present()?;
    Ok(())
}
