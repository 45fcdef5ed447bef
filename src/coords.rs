//! Mapping between screen pixels and document units.
//!
//! Overlays are drawn in the document's own coordinate space, so anything that
//! should look the same size at every zoom (strokes, labels, markers) has to be
//! scaled by the document length of one screen pixel.

use crate::normalize::{AspectRatio, ViewBox};
use crate::pan_zoom::{MIN_ZOOM, PanZoom};

/// Grid line width in pixels.
pub const GRID_STROKE_PX: f64 = 1.0;
/// Grid label font size in pixels.
pub const GRID_LABEL_PX: f64 = 10.0;
/// Gap between a grid line and its label in pixels.
pub const GRID_LABEL_GAP_PX: f64 = 2.0;
/// Selection marker radius in pixels.
pub const MARKER_RADIUS_PX: f64 = 5.0;
/// Selection marker outline width in pixels.
pub const MARKER_STROKE_PX: f64 = 1.0;
/// Cursor readout font size in pixels.
pub const READOUT_FONT_PX: f64 = 10.0;
/// Outline drawn behind the cursor readout text in pixels.
pub const READOUT_HALO_PX: f64 = 2.0;
/// Offset of the cursor readout from the pointer in pixels.
pub const READOUT_OFFSET_PX: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Parse `X,Y`.
    pub fn parse(value: &str) -> Option<Self> {
        let (x, y) = value.split_once(',')?;
        let point = Self::new(x.trim().parse().ok()?, y.trim().parse().ok()?);
        (point.x.is_finite() && point.y.is_finite()).then_some(point)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Parse `WxH`.
    pub fn parse(value: &str) -> Option<Self> {
        let (w, h) = value.split_once(['x', 'X'])?;
        Some(Self::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
    }

    fn is_usable(&self) -> bool {
        positive(self.width) && positive(self.height)
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Document units per screen pixel when `geometry` is fitted into `viewport`
/// (meet rule) and then scaled by `zoom`.
///
/// Returns `None` when any dimension or the zoom is not a positive finite number.
pub fn units_per_pixel(geometry: &ViewBox, viewport: Size, zoom: f64) -> Option<f64> {
    if !positive(geometry.width) || !positive(geometry.height) {
        return None;
    }
    if !viewport.is_usable() || !positive(zoom) {
        return None;
    }

    let upp = if geometry.aspect() > viewport.width / viewport.height {
        geometry.width / (viewport.width * zoom)
    } else {
        geometry.height / (viewport.height * zoom)
    };
    positive(upp).then_some(upp)
}

/// Pixel-constant overlay sizes, in document units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMetrics {
    pub grid_stroke: f64,
    pub grid_label_size: f64,
    pub grid_label_gap: f64,
    pub marker_radius: f64,
    pub marker_stroke: f64,
    pub readout_font_size: f64,
    pub readout_halo: f64,
    pub readout_offset: f64,
}

impl OverlayMetrics {
    pub fn new(units_per_pixel: f64) -> Self {
        Self {
            grid_stroke: GRID_STROKE_PX * units_per_pixel,
            grid_label_size: GRID_LABEL_PX * units_per_pixel,
            grid_label_gap: GRID_LABEL_GAP_PX * units_per_pixel,
            marker_radius: MARKER_RADIUS_PX * units_per_pixel,
            marker_stroke: MARKER_STROKE_PX * units_per_pixel,
            readout_font_size: READOUT_FONT_PX * units_per_pixel,
            readout_halo: READOUT_HALO_PX * units_per_pixel,
            readout_offset: READOUT_OFFSET_PX * units_per_pixel,
        }
    }
}

/// Everything needed to map between the preview and the working geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    working: ViewBox,
    aspect: AspectRatio,
    viewport: Size,
    pan_zoom: PanZoom,
    units_per_pixel: f64,
}

impl CoordinateMapper {
    /// `None` when the geometry or viewport is degenerate, or the zoom is
    /// below [`MIN_ZOOM`].
    pub fn new(
        working: ViewBox,
        aspect: AspectRatio,
        viewport: Size,
        pan_zoom: PanZoom,
    ) -> Option<Self> {
        if !working.is_valid() || pan_zoom.zoom.is_nan() || pan_zoom.zoom < MIN_ZOOM {
            return None;
        }
        let units_per_pixel = units_per_pixel(&working, viewport, pan_zoom.zoom)?;
        Some(Self {
            working,
            aspect,
            viewport,
            pan_zoom,
            units_per_pixel,
        })
    }

    pub fn units_per_pixel(&self) -> f64 {
        self.units_per_pixel
    }

    pub fn overlay_metrics(&self) -> OverlayMetrics {
        OverlayMetrics::new(self.units_per_pixel)
    }

    pub fn screen_to_document(&self, screen: Point) -> Point {
        let local = self.pan_zoom.to_local(screen);
        let (sx, sy, tx, ty) = self.view_box_transform();
        Point::new((local.x - tx) / sx, (local.y - ty) / sy)
    }

    pub fn document_to_screen(&self, doc: Point) -> Point {
        let (sx, sy, tx, ty) = self.view_box_transform();
        self.pan_zoom
            .to_screen(Point::new(doc.x * sx + tx, doc.y * sy + ty))
    }

    /// Scale and offset of the viewBox-to-viewport transform, before pan/zoom.
    fn view_box_transform(&self) -> (f64, f64, f64, f64) {
        let vb = &self.working;
        let sx = self.viewport.width / vb.width;
        let sy = self.viewport.height / vb.height;

        match self.aspect.align.factors() {
            None => (sx, sy, -vb.x * sx, -vb.y * sy),
            Some((ax, ay)) => {
                let s = if self.aspect.slice { sx.max(sy) } else { sx.min(sy) };
                let tx = (self.viewport.width - vb.width * s) * ax - vb.x * s;
                let ty = (self.viewport.height - vb.height * s) * ay - vb.y * s;
                (s, s, tx, ty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Align;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_units_per_pixel_width_binds() {
        let geometry = ViewBox::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(
            units_per_pixel(&geometry, Size::new(800.0, 600.0), 1.0),
            Some(0.25)
        );
    }

    #[test]
    fn test_units_per_pixel_height_binds() {
        let geometry = ViewBox::new(-50.0, -50.0, 100.0, 100.0);
        assert_eq!(
            units_per_pixel(&geometry, Size::new(800.0, 400.0), 2.0),
            Some(0.125)
        );
    }

    #[test]
    fn test_units_per_pixel_decreases_with_zoom() {
        let geometry = ViewBox::new(-50.0, -25.0, 200.0, 100.0);
        let viewport = Size::new(640.0, 480.0);
        let mut last = f64::INFINITY;
        for step in 1..50 {
            let upp = units_per_pixel(&geometry, viewport, step as f64 * 0.1).unwrap();
            assert!(upp > 0.0);
            assert!(upp < last);
            last = upp;
        }
    }

    #[test]
    fn test_units_per_pixel_degenerate() {
        let geometry = ViewBox::new(0.0, 0.0, 200.0, 100.0);
        let viewport = Size::new(800.0, 600.0);
        assert_eq!(units_per_pixel(&geometry, Size::new(0.0, 600.0), 1.0), None);
        assert_eq!(units_per_pixel(&geometry, Size::new(800.0, -1.0), 1.0), None);
        assert_eq!(units_per_pixel(&geometry, viewport, 0.0), None);
        assert_eq!(units_per_pixel(&geometry, viewport, f64::NAN), None);
        assert_eq!(
            units_per_pixel(&ViewBox::new(0.0, 0.0, 0.0, 100.0), viewport, 1.0),
            None
        );
        assert_eq!(
            units_per_pixel(&ViewBox::new(0.0, 0.0, 10.0, f64::INFINITY), viewport, 1.0),
            None
        );
    }

    #[test]
    fn test_mapper_meet_centers_content() {
        let mapper = CoordinateMapper::new(
            ViewBox::new(0.0, 0.0, 200.0, 100.0),
            AspectRatio::default(),
            Size::new(800.0, 600.0),
            PanZoom::default(),
        )
        .unwrap();

        assert!(close(
            mapper.screen_to_document(Point::new(400.0, 300.0)),
            Point::new(100.0, 50.0)
        ));
        // Letterboxed: the top 100px are above the content.
        assert!(close(
            mapper.screen_to_document(Point::new(0.0, 100.0)),
            Point::new(0.0, 0.0)
        ));
        assert_eq!(mapper.units_per_pixel(), 0.25);
    }

    #[test]
    fn test_mapper_with_pan_zoom() {
        let pan_zoom = PanZoom {
            zoom: 2.0,
            translate: Point::new(-400.0, -300.0),
        };
        let mapper = CoordinateMapper::new(
            ViewBox::new(0.0, 0.0, 200.0, 100.0),
            AspectRatio::default(),
            Size::new(800.0, 600.0),
            pan_zoom,
        )
        .unwrap();

        assert!(close(
            mapper.screen_to_document(Point::new(400.0, 300.0)),
            Point::new(100.0, 50.0)
        ));
        assert_eq!(mapper.units_per_pixel(), 0.125);
    }

    #[test]
    fn test_mapper_alignments() {
        let working = ViewBox::new(-10.0, -10.0, 20.0, 10.0);
        let viewport = Size::new(100.0, 100.0);
        let min = AspectRatio {
            align: Align::XMinYMin,
            slice: false,
        };
        let mapper = CoordinateMapper::new(working, min, viewport, PanZoom::default()).unwrap();
        assert!(close(
            mapper.document_to_screen(Point::new(-10.0, -10.0)),
            Point::new(0.0, 0.0)
        ));

        let max = AspectRatio {
            align: Align::XMaxYMax,
            slice: false,
        };
        let mapper = CoordinateMapper::new(working, max, viewport, PanZoom::default()).unwrap();
        assert!(close(
            mapper.document_to_screen(Point::new(10.0, 0.0)),
            Point::new(100.0, 100.0)
        ));

        let stretch = AspectRatio {
            align: Align::None,
            slice: false,
        };
        let mapper = CoordinateMapper::new(working, stretch, viewport, PanZoom::default()).unwrap();
        assert!(close(
            mapper.document_to_screen(Point::new(10.0, 0.0)),
            Point::new(100.0, 100.0)
        ));
        assert!(close(
            mapper.document_to_screen(Point::new(0.0, -5.0)),
            Point::new(50.0, 50.0)
        ));
    }

    #[test]
    fn test_mapper_slice_crops() {
        let mapper = CoordinateMapper::new(
            ViewBox::new(0.0, 0.0, 200.0, 100.0),
            AspectRatio {
                align: Align::XMidYMid,
                slice: true,
            },
            Size::new(100.0, 100.0),
            PanZoom::default(),
        )
        .unwrap();
        // Scale 1: the middle 100 units of the width are visible.
        assert!(close(
            mapper.screen_to_document(Point::new(0.0, 0.0)),
            Point::new(50.0, 0.0)
        ));
    }

    #[test]
    fn test_mapper_round_trip() {
        let mapper = CoordinateMapper::new(
            ViewBox::new(-35.0, 12.5, 70.0, 40.0),
            AspectRatio::default(),
            Size::new(320.0, 480.0),
            PanZoom {
                zoom: 1.7,
                translate: Point::new(13.0, -44.0),
            },
        )
        .unwrap();
        let screen = Point::new(123.0, 321.0);
        let doc = mapper.screen_to_document(screen);
        assert!(close(mapper.document_to_screen(doc), screen));
    }

    #[test]
    fn test_mapper_rejects_degenerate() {
        let working = ViewBox::new(0.0, 0.0, 10.0, 10.0);
        let aspect = AspectRatio::default();
        assert!(CoordinateMapper::new(working, aspect, Size::new(0.0, 10.0), PanZoom::default()).is_none());
        let frozen = PanZoom {
            zoom: 0.0,
            ..PanZoom::default()
        };
        assert!(CoordinateMapper::new(working, aspect, Size::new(10.0, 10.0), frozen).is_none());
        let tiny = PanZoom {
            zoom: MIN_ZOOM / 2.0,
            ..PanZoom::default()
        };
        assert!(CoordinateMapper::new(working, aspect, Size::new(10.0, 10.0), tiny).is_none());
        assert!(
            CoordinateMapper::new(
                ViewBox::new(0.0, 0.0, -1.0, 10.0),
                aspect,
                Size::new(10.0, 10.0),
                PanZoom::default()
            )
            .is_none()
        );
    }

    #[test]
    fn test_overlay_metrics_scale() {
        let metrics = OverlayMetrics::new(0.5);
        assert_eq!(metrics.grid_stroke, 0.5);
        assert_eq!(metrics.grid_label_size, 5.0);
        assert_eq!(metrics.grid_label_gap, 1.0);
        assert_eq!(metrics.marker_radius, 2.5);
        assert_eq!(metrics.readout_halo, 1.0);
        assert_eq!(metrics.readout_offset, 1.5);
    }

    #[test]
    fn test_parse_point_and_size() {
        assert_eq!(Size::parse("800x600"), Some(Size::new(800.0, 600.0)));
        assert_eq!(Size::parse("800"), None);
        assert_eq!(Point::parse("-3.5, 4"), Some(Point::new(-3.5, 4.0)));
        assert_eq!(Point::parse("1;2"), None);
    }
}
