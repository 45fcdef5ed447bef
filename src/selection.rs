//! Selected coordinates and the cursor readout.
//!
//! Selecting `10,20 30 40` in the editor marks the points (10, 20) and
//! (30, 40) on the preview; hovering shows the document coordinate under
//! the pointer.

use crate::coords::{OverlayMetrics, Point};
use crate::error::SvgpadError;
use crate::number::{parse_float_prefix, shortest, to_fixed};

/// Parse selected text as a flat list of `x y` pairs.
///
/// Tokens are separated by whitespace and/or commas and read as leading
/// numbers (`"12px"` is 12). Empty text, an odd count or a token with no
/// leading number yields `None`.
pub fn parse_points(text: &str) -> Option<Vec<Point>> {
    let numbers = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(parse_float_prefix)
        .collect::<Option<Vec<f64>>>()?;

    if numbers.is_empty() || numbers.len() % 2 != 0 {
        return None;
    }

    Some(
        numbers
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
            .collect(),
    )
}

/// A selection marker: a ring with a crosshair through it and a coordinate label.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub center: Point,
    pub radius: f64,
    pub stroke: f64,
    /// Half length of each crosshair arm
    pub crosshair: f64,
    pub label: String,
    pub label_size: f64,
    /// Outline width behind the label
    pub label_halo: f64,
}

impl Marker {
    pub fn new(center: Point, metrics: &OverlayMetrics) -> Self {
        let radius = metrics.marker_radius;
        Self {
            center,
            radius,
            stroke: metrics.marker_stroke,
            crosshair: 2.0 * radius,
            label: format!("{}, {}", shortest(center.x), shortest(center.y)),
            label_size: 2.5 * radius,
            label_halo: 2.0 * metrics.marker_stroke,
        }
    }
}

pub fn markers(points: &[Point], metrics: &OverlayMetrics) -> Vec<Marker> {
    points.iter().map(|&p| Marker::new(p, metrics)).collect()
}

/// `points` attribute for the line joining several selected points.
pub fn polyline_points(points: &[Point]) -> Option<String> {
    if points.len() < 2 {
        return None;
    }
    let pairs: Vec<String> = points
        .iter()
        .map(|p| format!("{},{}", shortest(p.x), shortest(p.y)))
        .collect();
    Some(pairs.join(" "))
}

/// Cursor readout text: `x, y` with `digits` fractional digits each.
pub fn format_readout(point: Point, digits: u32) -> Result<String, SvgpadError> {
    Ok(format!(
        "{}, {}",
        to_fixed(point.x, digits)?,
        to_fixed(point.y, digits)?
    ))
}

/// Where the readout is drawn: just above the pointer.
pub fn readout_anchor(point: Point, metrics: &OverlayMetrics) -> Point {
    Point::new(point.x, point.y - metrics.readout_offset)
}
