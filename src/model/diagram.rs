use indexmap::IndexMap;

use super::edge::Edge;
use super::item::DiagramItem;
use super::stroke::DrawingState;

/// One tab's canvas: items in insertion (z) order, edges, ink strokes and
/// the active-task pointer. All mutation beyond trivial setters goes
/// through `ops::*` so cascades stay centralized.
#[derive(Debug, Clone)]
pub struct Diagram {
    items: IndexMap<String, DiagramItem>,
    edges: Vec<Edge>,
    pub drawing: DrawingState,
    /// Index of the task currently in focus, if any
    pub current_task: Option<usize>,
    next_item_id: u64,
    next_edge_id: u64,
}

impl Default for Diagram {
    fn default() -> Self {
        Diagram::new()
    }
}

impl Diagram {
    pub fn new() -> Self {
        Diagram {
            items: IndexMap::new(),
            edges: Vec::new(),
            drawing: DrawingState::new(),
            current_task: None,
            next_item_id: 0,
            next_edge_id: 0,
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &DiagramItem> {
        self.items.values()
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut DiagramItem> {
        self.items.values_mut()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn get_item(&self, id: &str) -> Option<&DiagramItem> {
        self.items.get(id)
    }

    pub fn get_item_mut(&mut self, id: &str) -> Option<&mut DiagramItem> {
        self.items.get_mut(id)
    }

    pub fn contains_item(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut Vec<Edge> {
        &mut self.edges
    }

    /// Mint a fresh item id like `box_7`
    pub fn next_item_id(&mut self, prefix: &str) -> String {
        let id = format!("{}_{}", prefix, self.next_item_id);
        self.next_item_id += 1;
        id
    }

    pub fn next_edge_id(&mut self) -> String {
        let id = format!("edge_{}", self.next_edge_id);
        self.next_edge_id += 1;
        id
    }

    pub fn insert_item(&mut self, item: DiagramItem) {
        self.items.insert(item.id.clone(), item);
    }

    /// Remove an item record only; edge and task cascades live in
    /// `ops::item_ops::remove_item`.
    pub(crate) fn take_item(&mut self, id: &str) -> Option<DiagramItem> {
        self.items.shift_remove(id)
    }

    /// Topmost item containing the point, scanning newest-first
    pub fn item_at(&self, x: f64, y: f64) -> Option<&str> {
        self.item_at_with_margin(x, y, 0.0)
    }

    /// Topmost item within `margin` of the point, for forgiving drop targets
    pub fn item_at_with_margin(&self, x: f64, y: f64, margin: f64) -> Option<&str> {
        self.items
            .values()
            .rev()
            .find(|item| item.contains_with_margin(x, y, margin))
            .map(|item| item.id.as_str())
    }

    /// Set the focused task; selecting the focused task again clears it.
    pub fn set_current_task(&mut self, index: usize) {
        if self.current_task == Some(index) {
            self.current_task = None;
        } else {
            self.current_task = Some(index);
        }
    }

    /// Replace all content from a loaded document, resuming id counters
    /// past the highest persisted numeric suffix.
    pub fn load(
        &mut self,
        items: Vec<DiagramItem>,
        edges: Vec<Edge>,
        strokes: Vec<super::stroke::Stroke>,
        current_task: Option<usize>,
    ) {
        self.next_item_id = items
            .iter()
            .filter_map(|i| numeric_suffix(&i.id))
            .map(|n| n + 1)
            .max()
            .unwrap_or(0);
        self.next_edge_id = edges
            .iter()
            .filter_map(|e| numeric_suffix(&e.id))
            .map(|n| n + 1)
            .max()
            .unwrap_or(0);
        self.items = items.into_iter().map(|i| (i.id.clone(), i)).collect();
        self.edges = edges;
        self.drawing.load(strokes);
        self.current_task = current_task;
    }
}

fn numeric_suffix(id: &str) -> Option<u64> {
    id.rsplit('_').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::ItemKind;
    use pretty_assertions::assert_eq;

    fn item(d: &mut Diagram, kind: ItemKind, x: f64, y: f64) -> String {
        let id = d.next_item_id(kind.as_str());
        d.insert_item(DiagramItem::from_preset(id.clone(), kind, x, y, ""));
        id
    }

    #[test]
    fn ids_are_sequential_per_diagram() {
        let mut d = Diagram::new();
        assert_eq!(item(&mut d, ItemKind::Box, 0.0, 0.0), "box_0");
        assert_eq!(item(&mut d, ItemKind::Cloud, 0.0, 0.0), "cloud_1");
    }

    #[test]
    fn item_at_prefers_topmost() {
        let mut d = Diagram::new();
        let below = item(&mut d, ItemKind::Box, 0.0, 0.0);
        let above = item(&mut d, ItemKind::Box, 50.0, 20.0);
        // Point inside both rectangles
        assert_eq!(d.item_at(60.0, 30.0), Some(above.as_str()));
        // Point only inside the first
        assert_eq!(d.item_at(10.0, 10.0), Some(below.as_str()));
        assert_eq!(d.item_at(-100.0, -100.0), None);
    }

    #[test]
    fn current_task_toggles() {
        let mut d = Diagram::new();
        d.set_current_task(2);
        assert_eq!(d.current_task, Some(2));
        d.set_current_task(2);
        assert_eq!(d.current_task, None);
        d.set_current_task(1);
        d.set_current_task(4);
        assert_eq!(d.current_task, Some(4));
    }

    #[test]
    fn load_resumes_id_counters() {
        let mut d = Diagram::new();
        let items = vec![
            DiagramItem::from_preset("box_3".into(), ItemKind::Box, 0.0, 0.0, ""),
            DiagramItem::from_preset("cloud_11".into(), ItemKind::Cloud, 0.0, 0.0, ""),
        ];
        let edges = vec![Edge::new("edge_5".into(), "box_3".into(), "cloud_11".into())];
        d.load(items, edges, Vec::new(), None);
        assert_eq!(d.next_item_id("box"), "box_12");
        assert_eq!(d.next_edge_id(), "edge_6");
    }
}
