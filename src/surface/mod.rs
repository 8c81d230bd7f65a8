//! Surface builder
//!
//! Turns an option-chain snapshot into an implied volatility point cloud, grids it
//! and renders it. The numerical work per quote is delegated to
//! [`crate::models::implied_vol`]; everything here is selection, bookkeeping and
//! presentation.

pub mod config;
pub mod grid;
pub mod pipeline;
pub mod render;
pub mod source;
pub mod types;

pub use config::{RenderConfig, SurfaceConfig};
pub use grid::SurfaceGrid;
pub use pipeline::SurfacePipeline;
pub use render::{render_surface_svg, RenderOptions};
pub use source::{CsvChainSource, OptionChainSource};
pub use types::*;
