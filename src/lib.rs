//! svgpad - SVG markup tooling for live preview editors
//!
//! svgpad minifies SVG markup without touching whitespace- or quote-sensitive
//! regions, and normalizes the root `viewBox` into a working coordinate space
//! that overlay renderers (grids, selection markers, cursor readouts) share
//! with the artwork.

mod coords;
mod error;
mod grid;
mod minify;
pub mod normalize;
mod number;
mod pan_zoom;
mod root_tag;
mod selection;
mod serialize;
mod vault;

use std::sync::OnceLock;

pub use coords::*;
pub use error::*;
pub use grid::*;
pub use minify::*;
pub use normalize::{
    Align, AspectRatio, DEFAULT_PRESERVE_ASPECT_RATIO, RootAttributes, ViewBox, WORKING_EXPANSION,
};
pub use number::*;
pub use pan_zoom::*;
pub use selection::*;
pub use vault::*;

/// Minify an SVG string, rounding decimals to `precision` digits if given.
pub fn minify(svg: &str, precision: Option<u32>) -> String {
    static DEFAULT: OnceLock<Minifier> = OnceLock::new();
    DEFAULT
        .get_or_init(|| Minifier::new(&Options::default()).expect("default patterns compile"))
        .minify(svg, precision)
}

/// Minify an SVG string with custom options.
///
/// Only invalid options produce an error; any input text minifies.
pub fn minify_with_options(svg: &str, options: &Options) -> Result<String, SvgpadError> {
    let minifier = Minifier::new(options)?;
    Ok(minifier.minify(svg, options.precision))
}

/// Minification options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Number of decimal places kept on decimal literals (default: 2, `None` keeps all)
    pub precision: Option<u32>,
    /// Attributes whose quoted values are never rewritten
    pub protected_attributes: Vec<String>,
    /// Elements whose whole block is exempt from rounding
    pub opaque_elements: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            precision: Some(2),
            protected_attributes: ["id", "href", "style", "xmlns"]
                .map(String::from)
                .to_vec(),
            opaque_elements: ["style", "script"].map(String::from).to_vec(),
        }
    }
}
