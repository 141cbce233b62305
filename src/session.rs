//! Per-view interaction state: zoom/pan, grid snapping, the current
//! selection and the hover-suggestion timer. One of these exists per open
//! canvas view; nothing in here is ever persisted.

use crate::geom::{self, Point, Viewport, GRID_SPACING};

/// Delay before a hover suggestion fires, in seconds
pub const HOVER_DELAY_SECS: f64 = 0.6;

/// Cancelable delay before acting on a hover (e.g. showing a connection
/// suggestion). Armed on pointer enter, canceled on leave; the owner
/// polls [`HoverTimer::ready`] from its tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverTimer {
    armed_at: Option<f64>,
}

impl HoverTimer {
    pub fn arm(&mut self, now: f64) {
        self.armed_at = Some(now);
    }

    pub fn cancel(&mut self) {
        self.armed_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// True once the delay has elapsed; disarms so it fires once.
    pub fn ready(&mut self, now: f64) -> bool {
        match self.armed_at {
            Some(armed) if now - armed >= HOVER_DELAY_SECS => {
                self.armed_at = None;
                true
            }
            _ => false,
        }
    }
}

/// All view-local state for one canvas.
#[derive(Debug, Clone)]
pub struct ViewSession {
    pub viewport: Viewport,
    pub grid_enabled: bool,
    pub grid_spacing: f64,
    selection: Vec<String>,
    pub hover: HoverTimer,
}

impl Default for ViewSession {
    fn default() -> Self {
        ViewSession::new()
    }
}

impl ViewSession {
    pub fn new() -> Self {
        ViewSession {
            viewport: Viewport::default(),
            grid_enabled: true,
            grid_spacing: GRID_SPACING,
            selection: Vec::new(),
            hover: HoverTimer::default(),
        }
    }

    /// Apply grid snapping to a diagram-space coordinate. Identity while
    /// the grid is off.
    pub fn snap(&self, value: f64) -> f64 {
        if self.grid_enabled {
            geom::snap(value, self.grid_spacing)
        } else {
            value
        }
    }

    pub fn snap_point(&self, p: Point) -> Point {
        Point::new(self.snap(p.x), self.snap(p.y))
    }

    // --- Selection ---------------------------------------------------------

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    /// Replace the selection with a single item, or clear it with `None`.
    pub fn select_only(&mut self, id: Option<&str>) {
        self.selection.clear();
        if let Some(id) = id {
            self.selection.push(id.to_string());
        }
    }

    /// Toggle one item in or out of the selection (shift-click).
    pub fn toggle_selected(&mut self, id: &str) {
        match self.selection.iter().position(|s| s == id) {
            Some(pos) => {
                self.selection.remove(pos);
            }
            None => self.selection.push(id.to_string()),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Drop selected ids that no longer resolve, after deletions.
    pub fn retain_selection(&mut self, exists: impl Fn(&str) -> bool) {
        self.selection.retain(|id| exists(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn snap_respects_grid_toggle() {
        let mut session = ViewSession::new();
        assert_eq!(session.snap(47.0), 40.0);
        session.grid_enabled = false;
        assert_eq!(session.snap(47.0), 47.0);
    }

    #[test]
    fn selection_toggle_and_replace() {
        let mut session = ViewSession::new();
        session.toggle_selected("a");
        session.toggle_selected("b");
        assert!(session.is_selected("a"));
        session.toggle_selected("a");
        assert!(!session.is_selected("a"));

        session.select_only(Some("c"));
        assert_eq!(session.selection(), ["c".to_string()]);
        session.select_only(None);
        assert!(session.selection().is_empty());
    }

    #[test]
    fn retain_selection_drops_stale_ids() {
        let mut session = ViewSession::new();
        session.toggle_selected("keep");
        session.toggle_selected("gone");
        session.retain_selection(|id| id == "keep");
        assert_eq!(session.selection(), ["keep".to_string()]);
    }

    #[test]
    fn hover_timer_fires_once_after_delay() {
        let mut hover = HoverTimer::default();
        assert!(!hover.ready(10.0));
        hover.arm(10.0);
        // Just before the deadline
        assert!(!hover.ready(10.5));
        assert!(hover.ready(10.7));
        // Disarmed after firing
        assert!(!hover.ready(20.0));
    }

    #[test]
    fn hover_timer_cancel_disarms() {
        let mut hover = HoverTimer::default();
        hover.arm(0.0);
        hover.cancel();
        assert!(!hover.ready(100.0));
    }
}
