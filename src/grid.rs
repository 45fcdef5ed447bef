//! Grid overlay geometry.
//!
//! The grid divides the source viewBox (not the working one) into equal
//! columns and rows, outlines it, and labels each interior line with its
//! coordinate.

use crate::coords::{OverlayMetrics, Point};
use crate::normalize::ViewBox;
use crate::number::{fixed, parse_precision, shortest};

/// Most columns or rows the grid can have.
pub const GRID_MAX_DIVISIONS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    view_box: ViewBox,
    columns: u32,
    rows: u32,
}

/// Which edge of the source viewBox a label sits beyond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelEdge {
    /// Above the top edge, centered on a vertical line
    Top,
    /// Left of the left edge, vertically centered on a horizontal line
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLabel {
    pub position: Point,
    pub text: String,
    pub edge: LabelEdge,
}

impl GridLayout {
    /// Divisions are clamped to `1..=GRID_MAX_DIVISIONS`.
    pub fn new(view_box: ViewBox, columns: u32, rows: u32) -> Self {
        Self {
            view_box,
            columns: columns.clamp(1, GRID_MAX_DIVISIONS),
            rows: rows.clamp(1, GRID_MAX_DIVISIONS),
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// X positions of the interior vertical lines.
    pub fn vertical_lines(&self) -> Vec<f64> {
        divide(self.view_box.x, self.view_box.width, self.columns)
    }

    /// Y positions of the interior horizontal lines.
    pub fn horizontal_lines(&self) -> Vec<f64> {
        divide(self.view_box.y, self.view_box.height, self.rows)
    }

    /// Path data for the border followed by every interior line.
    pub fn path_data(&self) -> String {
        let vb = &self.view_box;
        let (left, top) = (shortest(vb.x), shortest(vb.y));
        let right = shortest(vb.x + vb.width);
        let bottom = shortest(vb.y + vb.height);

        let mut d = format!("M {left} {top} H {right} V {bottom} H {left} Z");
        for x in self.vertical_lines() {
            d.push_str(&format!(" M {} {top} V {bottom}", shortest(x)));
        }
        for y in self.horizontal_lines() {
            d.push_str(&format!(" M {left} {} H {right}", shortest(y)));
        }
        d
    }

    /// Coordinate labels for the interior lines, kept `grid_label_gap` away
    /// from the border.
    pub fn labels(&self, metrics: &OverlayMetrics) -> Vec<GridLabel> {
        let gap = metrics.grid_label_gap;
        let columns = self.vertical_lines().into_iter().map(|x| GridLabel {
            position: Point::new(x, self.view_box.y - gap),
            text: fixed(x, 0),
            edge: LabelEdge::Top,
        });
        let rows = self.horizontal_lines().into_iter().map(|y| GridLabel {
            position: Point::new(self.view_box.x - gap, y),
            text: fixed(y, 0),
            edge: LabelEdge::Left,
        });
        columns.chain(rows).collect()
    }
}

/// Read a division count from user input; anything unusable means one.
pub fn parse_divisions(input: &str) -> u32 {
    parse_precision(input)
        .unwrap_or(1)
        .clamp(1, GRID_MAX_DIVISIONS)
}

fn divide(start: f64, length: f64, parts: u32) -> Vec<f64> {
    let step = length / parts as f64;
    (1..parts).map(|i| start + step * i as f64).collect()
}
