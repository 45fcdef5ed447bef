//! Preview pan and zoom.

use crate::coords::Point;
use crate::number::round_to;

/// Smallest zoom the wheel can reach.
pub const MIN_ZOOM: f64 = 0.1;

/// Zoom change per wheel notch.
pub const ZOOM_STEP: f64 = 0.1;

/// The preview transform: `screen = translate + zoom * local`, with the
/// origin at the preview's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanZoom {
    pub zoom: f64,
    pub translate: Point,
}

impl Default for PanZoom {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            translate: Point::new(0.0, 0.0),
        }
    }
}

/// Anchor of a drag: the pointer position relative to the translation at
/// the moment the drag started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    anchor: Point,
}

impl PanZoom {
    /// Step the zoom for one wheel event, keeping the point under `pointer` fixed.
    ///
    /// A positive `delta_y` (scrolling down) zooms out.
    pub fn zoom_at(&mut self, pointer: Point, delta_y: f64) {
        self.zoom = self.scale();
        let step = if delta_y > 0.0 { -ZOOM_STEP } else { ZOOM_STEP };
        let stepped = (self.zoom + step).max(MIN_ZOOM);
        let zoom = round_to(stepped, 2).unwrap_or(stepped);

        let target = self.to_local(pointer);
        self.translate = Point::new(pointer.x - target.x * zoom, pointer.y - target.y * zoom);
        self.zoom = zoom;
    }

    pub fn start_pan(&self, pointer: Point) -> PanGesture {
        PanGesture {
            anchor: Point::new(pointer.x - self.translate.x, pointer.y - self.translate.y),
        }
    }

    /// Move the preview so the content follows the pointer.
    pub fn pan(&mut self, gesture: &PanGesture, pointer: Point) {
        self.translate = Point::new(pointer.x - gesture.anchor.x, pointer.y - gesture.anchor.y);
    }

    /// Undo the transform: preview coordinates of a screen point.
    pub fn to_local(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translate.x) / self.scale(),
            (screen.y - self.translate.y) / self.scale(),
        )
    }

    pub fn to_screen(&self, local: Point) -> Point {
        Point::new(
            self.translate.x + local.x * self.scale(),
            self.translate.y + local.y * self.scale(),
        )
    }

    /// `zoom` held to `MIN_ZOOM` or more. A non-finite zoom counts as 1.
    fn scale(&self) -> f64 {
        if self.zoom.is_finite() {
            self.zoom.max(MIN_ZOOM)
        } else {
            1.0
        }
    }
}
