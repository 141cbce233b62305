use serde::{Deserialize, Serialize};

use crate::geom::Point;

pub const DEFAULT_BRUSH_COLOR: &str = "#ffffff";
pub const DEFAULT_BRUSH_WIDTH: f64 = 3.0;
pub const MIN_BRUSH_WIDTH: f64 = 1.0;
pub const MAX_BRUSH_WIDTH: f64 = 50.0;

/// One continuous freehand ink gesture. Immutable once committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: String,
    pub points: Vec<Point>,
    pub color: String,
    pub width: f64,
}

/// Freehand drawing state for one diagram: committed stroke history, the
/// at-most-one stroke currently being drawn, and the brush settings.
#[derive(Debug, Clone)]
pub struct DrawingState {
    strokes: Vec<Stroke>,
    in_progress: Option<Stroke>,
    pub enabled: bool,
    brush_color: String,
    brush_width: f64,
    next_id: u64,
}

impl Default for DrawingState {
    fn default() -> Self {
        DrawingState::new()
    }
}

impl DrawingState {
    pub fn new() -> Self {
        DrawingState {
            strokes: Vec::new(),
            in_progress: None,
            enabled: false,
            brush_color: DEFAULT_BRUSH_COLOR.to_string(),
            brush_width: DEFAULT_BRUSH_WIDTH,
            next_id: 0,
        }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn in_progress(&self) -> Option<&Stroke> {
        self.in_progress.as_ref()
    }

    pub fn brush_color(&self) -> &str {
        &self.brush_color
    }

    pub fn set_brush_color(&mut self, color: &str) {
        self.brush_color = color.to_string();
    }

    pub fn brush_width(&self) -> f64 {
        self.brush_width
    }

    pub fn set_brush_width(&mut self, width: f64) {
        self.brush_width = width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH);
    }

    /// Open a new stroke at `p`. A stroke already in progress is committed
    /// first: a fresh press cannot happen mid-gesture under a single
    /// pointer, so an open stroke means its release event was lost.
    pub fn begin(&mut self, p: Point) {
        if self.in_progress.is_some() {
            self.end();
        }
        let id = format!("stroke_{}", self.next_id);
        self.next_id += 1;
        self.in_progress = Some(Stroke {
            id,
            points: vec![p],
            color: self.brush_color.clone(),
            width: self.brush_width,
        });
    }

    /// Append a point to the stroke in progress. No-op when none is open.
    pub fn extend(&mut self, p: Point) {
        if let Some(stroke) = &mut self.in_progress {
            stroke.points.push(p);
        }
    }

    /// Commit the stroke in progress to history. A single-point stroke is
    /// kept as a dot.
    pub fn end(&mut self) {
        if let Some(stroke) = self.in_progress.take() {
            self.strokes.push(stroke);
        }
    }

    /// Remove the most recently committed stroke. No-op on empty history.
    pub fn undo(&mut self) {
        self.strokes.pop();
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.in_progress = None;
    }

    /// Replace the stroke history from a loaded document, resuming id
    /// generation past the highest persisted stroke id.
    pub fn load(&mut self, strokes: Vec<Stroke>) {
        self.next_id = strokes
            .iter()
            .filter_map(|s| s.id.rsplit('_').next()?.parse::<u64>().ok())
            .map(|n| n + 1)
            .max()
            .unwrap_or(0);
        self.strokes = strokes;
        self.in_progress = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn begin_extend_end_commits_stroke() {
        let mut d = DrawingState::new();
        d.begin(p(0.0, 0.0));
        d.extend(p(1.0, 1.0));
        d.extend(p(2.0, 0.0));
        assert!(d.in_progress().is_some());
        d.end();
        assert!(d.in_progress().is_none());
        assert_eq!(d.strokes().len(), 1);
        assert_eq!(d.strokes()[0].points.len(), 3);
    }

    #[test]
    fn single_point_stroke_is_kept_as_dot() {
        let mut d = DrawingState::new();
        d.begin(p(5.0, 5.0));
        d.end();
        assert_eq!(d.strokes().len(), 1);
        assert_eq!(d.strokes()[0].points, vec![p(5.0, 5.0)]);
    }

    #[test]
    fn begin_while_open_commits_previous() {
        let mut d = DrawingState::new();
        d.begin(p(0.0, 0.0));
        d.extend(p(1.0, 0.0));
        d.begin(p(10.0, 10.0));
        assert_eq!(d.strokes().len(), 1);
        assert_eq!(d.in_progress().unwrap().points, vec![p(10.0, 10.0)]);
    }

    #[test]
    fn undo_pops_last_and_is_noop_when_empty() {
        let mut d = DrawingState::new();
        d.undo(); // empty history: nothing happens
        d.begin(p(0.0, 0.0));
        d.end();
        d.begin(p(1.0, 0.0));
        d.end();
        d.undo();
        assert_eq!(d.strokes().len(), 1);
        assert_eq!(d.strokes()[0].points, vec![p(0.0, 0.0)]);
    }

    #[test]
    fn brush_width_clamps() {
        let mut d = DrawingState::new();
        d.set_brush_width(500.0);
        assert_eq!(d.brush_width(), MAX_BRUSH_WIDTH);
        d.set_brush_width(0.0);
        assert_eq!(d.brush_width(), MIN_BRUSH_WIDTH);
    }

    #[test]
    fn new_strokes_capture_brush_settings() {
        let mut d = DrawingState::new();
        d.set_brush_color("#ff0000");
        d.set_brush_width(7.0);
        d.begin(p(0.0, 0.0));
        d.end();
        assert_eq!(d.strokes()[0].color, "#ff0000");
        assert_eq!(d.strokes()[0].width, 7.0);
    }

    #[test]
    fn load_resumes_id_generation() {
        let mut d = DrawingState::new();
        d.load(vec![Stroke {
            id: "stroke_4".into(),
            points: vec![p(0.0, 0.0)],
            color: "#fff".into(),
            width: 3.0,
        }]);
        d.begin(p(1.0, 1.0));
        d.end();
        assert_eq!(d.strokes()[1].id, "stroke_5");
    }
}
