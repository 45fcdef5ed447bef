//! Root viewBox normalization.
//!
//! The preview shows the artwork inside a working coordinate space twice as
//! large as its own viewBox, so that grids and markers have room around the
//! artwork. This module derives that space from whatever sizing the root tag
//! carries and rewrites the tag to use it.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::number::shortest;
use crate::root_tag::RootTag;
use crate::serialize::splice_tag;

/// Factor by which the working geometry grows the source viewBox on each axis.
pub const WORKING_EXPANSION: f64 = 2.0;

/// `preserveAspectRatio` used when the source has a viewBox but no policy.
pub const DEFAULT_PRESERVE_ASPECT_RATIO: &str = "xMidYMid meet";

/// A viewBox rectangle in document units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Parse `min-x min-y width height`, separated by whitespace and/or commas.
    ///
    /// Anything other than exactly four finite numbers with a positive width
    /// and height is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value
            .split(|c: char| c.is_ascii_whitespace() || c == ',')
            .filter(|s| !s.is_empty());

        let x = parts.next()?.parse().ok()?;
        let y = parts.next()?.parse().ok()?;
        let width = parts.next()?.parse().ok()?;
        let height = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }

        let view_box = Self::new(x, y, width, height);
        view_box.is_valid().then_some(view_box)
    }

    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Grow by `factor` on both axes, keeping the same center.
    pub fn expand(&self, factor: f64) -> Self {
        let width = self.width * factor;
        let height = self.height * factor;
        Self {
            x: self.x - (width - self.width) / 2.0,
            y: self.y - (height - self.height) / 2.0,
            width,
            height,
        }
    }

    /// The working geometry: this viewBox occupies its middle half on each axis.
    pub fn working(&self) -> Self {
        self.expand(WORKING_EXPANSION)
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            shortest(self.x),
            shortest(self.y),
            shortest(self.width),
            shortest(self.height)
        )
    }
}

/// The alignment half of `preserveAspectRatio`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    None,
    XMinYMin,
    XMidYMin,
    XMaxYMin,
    XMinYMid,
    #[default]
    XMidYMid,
    XMaxYMid,
    XMinYMax,
    XMidYMax,
    XMaxYMax,
}

impl Align {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "none" => Align::None,
            "xMinYMin" => Align::XMinYMin,
            "xMidYMin" => Align::XMidYMin,
            "xMaxYMin" => Align::XMaxYMin,
            "xMinYMid" => Align::XMinYMid,
            "xMidYMid" => Align::XMidYMid,
            "xMaxYMid" => Align::XMaxYMid,
            "xMinYMax" => Align::XMinYMax,
            "xMidYMax" => Align::XMidYMax,
            "xMaxYMax" => Align::XMaxYMax,
            _ => return None,
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            Align::None => "none",
            Align::XMinYMin => "xMinYMin",
            Align::XMidYMin => "xMidYMin",
            Align::XMaxYMin => "xMaxYMin",
            Align::XMinYMid => "xMinYMid",
            Align::XMidYMid => "xMidYMid",
            Align::XMaxYMid => "xMaxYMid",
            Align::XMinYMax => "xMinYMax",
            Align::XMidYMax => "xMidYMax",
            Align::XMaxYMax => "xMaxYMax",
        }
    }

    /// Share of the free space placed before the content on each axis
    /// (0 for min, 0.5 for mid, 1 for max). `None` for non-uniform scaling.
    pub fn factors(self) -> Option<(f64, f64)> {
        let (x, y) = match self {
            Align::None => return None,
            Align::XMinYMin => (0.0, 0.0),
            Align::XMidYMin => (0.5, 0.0),
            Align::XMaxYMin => (1.0, 0.0),
            Align::XMinYMid => (0.0, 0.5),
            Align::XMidYMid => (0.5, 0.5),
            Align::XMaxYMid => (1.0, 0.5),
            Align::XMinYMax => (0.0, 1.0),
            Align::XMidYMax => (0.5, 1.0),
            Align::XMaxYMax => (1.0, 1.0),
        };
        Some((x, y))
    }
}

/// A parsed `preserveAspectRatio` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AspectRatio {
    pub align: Align,
    /// `slice` instead of `meet`
    pub slice: bool,
}

impl AspectRatio {
    /// Parse `[defer] <align> [meet|slice]`.
    pub fn parse(value: &str) -> Option<Self> {
        let mut tokens = value.split_ascii_whitespace().peekable();
        if tokens.peek() == Some(&"defer") {
            tokens.next();
        }

        let align = Align::parse(tokens.next()?)?;
        let slice = match tokens.next() {
            None | Some("meet") => false,
            Some("slice") => true,
            Some(_) => return None,
        };
        if tokens.next().is_some() {
            return None;
        }

        Some(Self { align, slice })
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.slice { "slice" } else { "meet" };
        write!(f, "{} {}", self.align.as_str(), mode)
    }
}

/// Sizing information read from the root tag.
///
/// All fields are `None` when the markup has no usable root tag. A `viewBox`
/// that does not parse is kept as written, without `geometry` or `working`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootAttributes {
    /// `viewBox` as written, or synthesized from `width`/`height`
    pub view_box: Option<String>,
    /// `preserveAspectRatio` as written
    pub preserve_aspect_ratio: Option<String>,
    /// The parsed source viewBox
    pub geometry: Option<ViewBox>,
    /// The source viewBox expanded by [`WORKING_EXPANSION`]
    pub working: Option<ViewBox>,
}

impl RootAttributes {
    /// Whether overlays have a coordinate space to draw in.
    pub fn has_geometry(&self) -> bool {
        self.working.is_some()
    }

    /// The aspect policy overlays should use: the written one, or the default
    /// when a viewBox exists.
    pub fn aspect_ratio(&self) -> Option<AspectRatio> {
        match &self.preserve_aspect_ratio {
            Some(value) => Some(AspectRatio::parse(value).unwrap_or_default()),
            None if self.view_box.is_some() => Some(AspectRatio::default()),
            None => None,
        }
    }
}

/// Read the root tag's sizing attributes and derive the working geometry.
pub fn parse(markup: &str) -> RootAttributes {
    let tag = match RootTag::locate(markup) {
        Ok(Some(tag)) => tag,
        Ok(None) => {
            debug!("no svg start tag");
            return RootAttributes::default();
        }
        Err(e) => {
            debug!(%e, "unreadable svg start tag");
            return RootAttributes::default();
        }
    };

    let preserve_aspect_ratio = non_empty(tag.get("preserveAspectRatio"));
    let view_box = non_empty(tag.get("viewBox")).or_else(|| synthesize_view_box(&tag));

    let geometry = view_box.as_deref().and_then(ViewBox::parse);
    if let (None, Some(value)) = (geometry, &view_box) {
        debug!(view_box = %value, "unusable viewBox, no working geometry");
    }

    RootAttributes {
        view_box,
        preserve_aspect_ratio,
        geometry,
        working: geometry.map(|g| g.working()),
    }
}

/// Rewrite the root tag for the preview: sizing attributes go, the working
/// viewBox and an aspect policy come in. Nothing outside the tag changes.
pub fn rewrite(markup: &str, attrs: &RootAttributes) -> String {
    let mut tag = match RootTag::locate(markup) {
        Ok(Some(tag)) => tag,
        _ => return markup.to_string(),
    };

    tag.remove("width");
    tag.remove("height");

    if let Some(working) = attrs.working {
        tag.set("viewBox", working.to_string());
    } else if let Some(view_box) = &attrs.view_box {
        tag.set("viewBox", view_box.as_str());
    }

    let has_view_box = attrs.working.is_some() || attrs.view_box.is_some();
    if has_view_box && attrs.preserve_aspect_ratio.is_none() {
        tag.set("preserveAspectRatio", DEFAULT_PRESERVE_ASPECT_RATIO);
    }

    splice_tag(markup, &tag)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn synthesize_view_box(tag: &RootTag) -> Option<String> {
    let width = pixel_length(tag.get("width")?)?;
    let height = pixel_length(tag.get("height")?)?;
    Some(format!("0 0 {} {}", shortest(width), shortest(height)))
}

/// A plain positive number, optionally in `px`. Percentages and other units
/// do not describe a coordinate space.
fn pixel_length(value: &str) -> Option<f64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^([0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:px)?$").expect("valid regex")
    });

    let caps = re.captures(value)?;
    let length: f64 = caps[1].parse().ok()?;
    (length.is_finite() && length > 0.0).then_some(length)
}
