use serde::{Deserialize, Serialize};

/// Zoom bounds for the canvas viewport
pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 4.0;

/// Default grid spacing in diagram units
pub const GRID_SPACING: f64 = 20.0;

/// Margin added around the content bounds when auto-sizing the board
pub const BOARD_MARGIN: f64 = 200.0;

/// Minimum board size when the diagram is empty
pub const MIN_BOARD_WIDTH: f64 = 1600.0;
pub const MIN_BOARD_HEIGHT: f64 = 1200.0;

/// A point in diagram or screen space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Round a value to the nearest multiple of `spacing`.
/// Identity when `spacing` is zero or negative.
pub fn snap(value: f64, spacing: f64) -> f64 {
    if spacing <= 0.0 {
        return value;
    }
    (value / spacing).round() * spacing
}

/// Clamped distance from a point to the segment `a`–`b`.
/// Degenerates to point distance when the segment has zero length.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let cx = a.x + t * dx;
    let cy = a.y + t * dy;
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

/// Axis-aligned extent of diagram content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn of_rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        Bounds {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Board dimensions for the given content, with a fixed margin on every side.
/// Falls back to the default minimum box when the diagram is empty.
pub fn board_size(bounds: Option<Bounds>) -> (f64, f64) {
    match bounds {
        Some(b) => (
            (b.width() + 2.0 * BOARD_MARGIN).max(MIN_BOARD_WIDTH),
            (b.height() + 2.0 * BOARD_MARGIN).max(MIN_BOARD_HEIGHT),
        ),
        None => (MIN_BOARD_WIDTH, MIN_BOARD_HEIGHT),
    }
}

/// Affine screen<->diagram transform: `diagram = screen / zoom - origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub origin: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            zoom: 1.0,
            origin: Point::default(),
        }
    }
}

impl Viewport {
    pub fn screen_to_diagram(&self, p: Point) -> Point {
        Point::new(p.x / self.zoom - self.origin.x, p.y / self.zoom - self.origin.y)
    }

    pub fn diagram_to_screen(&self, p: Point) -> Point {
        Point::new(
            (p.x + self.origin.x) * self.zoom,
            (p.y + self.origin.y) * self.zoom,
        )
    }

    /// Set the zoom level, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Multiply the zoom by `factor`, keeping the diagram point under the
    /// screen-space `focus` fixed. The pan offset is re-derived from the
    /// inverse transform of the focus after the zoom change.
    pub fn apply_zoom_factor(&mut self, factor: f64, focus: Point) {
        let anchor = self.screen_to_diagram(focus);
        self.set_zoom(self.zoom * factor);
        self.origin = Point::new(focus.x / self.zoom - anchor.x, focus.y / self.zoom - anchor.y);
    }
}
