//! Diagram item operations: creation from presets, geometry edits, type
//! conversion and the removal cascade. Operations on unknown ids are
//! silent no-ops.

use crate::geom::Bounds;
use crate::model::{Diagram, DiagramItem, ItemKind, Tab};

use super::{edge_ops, task_ops};

/// Create an item of the given kind at (x, y). Blank text falls back to
/// the kind's preset label.
pub fn add_item(diagram: &mut Diagram, kind: ItemKind, x: f64, y: f64, text: &str) -> String {
    let id = diagram.next_item_id(kind.as_str());
    diagram.insert_item(DiagramItem::from_preset(id.clone(), kind, x, y, text));
    id
}

/// Create an item and connect it from `source_id` in one step.
pub fn add_item_connected(
    diagram: &mut Diagram,
    source_id: &str,
    kind: ItemKind,
    x: f64,
    y: f64,
    text: &str,
) -> String {
    let id = add_item(diagram, kind, x, y, text);
    edge_ops::add_edge(diagram, source_id, &id);
    id
}

/// Create a new task in the tab's list and a linked task item on its
/// canvas. Returns `None` for a blank title.
pub fn add_task_item(tab: &mut Tab, x: f64, y: f64, title: &str, now: f64) -> Option<String> {
    let index = tab.tasks.add(title, None, now)?;
    let id = tab.diagram.next_item_id("task");
    let mut item = DiagramItem::from_preset(id.clone(), ItemKind::Task, x, y, title);
    item.task_index = Some(index);
    tab.diagram.insert_item(item);
    Some(id)
}

/// Create a task item and connect it from `source_id` in one step.
pub fn add_task_item_connected(
    tab: &mut Tab,
    source_id: &str,
    x: f64,
    y: f64,
    title: &str,
    now: f64,
) -> Option<String> {
    let id = add_task_item(tab, x, y, title, now)?;
    edge_ops::add_edge(&mut tab.diagram, source_id, &id);
    Some(id)
}

/// Place a reference to an existing task row on the canvas. The same task
/// may be referenced by several items.
pub fn add_task_reference(tab: &mut Tab, task_index: usize, x: f64, y: f64) -> Option<String> {
    let title = tab.tasks.get(task_index)?.title.clone();
    let id = tab.diagram.next_item_id("task");
    let mut item = DiagramItem::from_preset(id.clone(), ItemKind::Task, x, y, &title);
    item.task_index = Some(task_index);
    tab.diagram.insert_item(item);
    Some(id)
}

/// Turn an existing visual item into a task item backed by a new task
/// titled `title`.
pub fn convert_to_task(tab: &mut Tab, item_id: &str, title: &str, now: f64) {
    if !tab.diagram.contains_item(item_id) {
        return;
    }
    let Some(index) = tab.tasks.add(title, None, now) else {
        return;
    };
    let preset = ItemKind::Task.preset();
    if let Some(item) = tab.diagram.get_item_mut(item_id) {
        item.kind = ItemKind::Task;
        item.task_index = Some(index);
        item.text = title.to_string();
        item.color = preset.color.to_string();
        item.text_color = preset.text_color.to_string();
    }
}

pub fn move_item(diagram: &mut Diagram, item_id: &str, x: f64, y: f64) {
    if let Some(item) = diagram.get_item_mut(item_id) {
        item.x = x;
        item.y = y;
    }
}

/// Resize an item, clamping to its kind's minimum size.
pub fn resize_item(diagram: &mut Diagram, item_id: &str, width: f64, height: f64) {
    if let Some(item) = diagram.get_item_mut(item_id) {
        let (min_w, min_h) = item.kind.min_size();
        item.width = width.max(min_w);
        item.height = height.max(min_h);
    }
}

/// Set an item's display text. Task-linked items should go through
/// `sync::rename_item` instead so the backing task follows.
pub fn set_text(diagram: &mut Diagram, item_id: &str, text: &str) {
    if let Some(item) = diagram.get_item_mut(item_id) {
        item.text = text.to_string();
    }
}

/// Convert an item to another kind, preserving id, position, size and
/// text. Colors reset to the new kind's preset; fields the new kind
/// cannot carry are cleared.
pub fn set_kind(diagram: &mut Diagram, item_id: &str, kind: ItemKind) {
    let Some(item) = diagram.get_item_mut(item_id) else {
        return;
    };
    if item.kind == kind {
        return;
    }
    let preset = kind.preset();
    item.kind = kind;
    item.color = preset.color.to_string();
    item.text_color = preset.text_color.to_string();
    if kind != ItemKind::Task {
        item.task_index = None;
    }
    if kind != ItemKind::Image {
        item.image_data = None;
    }
    if kind != ItemKind::Note {
        item.note_markdown = None;
    }
}

pub fn set_note_markdown(diagram: &mut Diagram, item_id: &str, markdown: &str) {
    if let Some(item) = diagram.get_item_mut(item_id) {
        item.note_markdown = if markdown.is_empty() {
            None
        } else {
            Some(markdown.to_string())
        };
    }
}

pub fn set_folder_path(diagram: &mut Diagram, item_id: &str, path: &str) {
    if let Some(item) = diagram.get_item_mut(item_id) {
        item.folder_path = if path.is_empty() {
            None
        } else {
            Some(path.to_string())
        };
    }
}

/// Link an item to another tab (by name) or project file it drills into.
pub fn set_sub_diagram(diagram: &mut Diagram, item_id: &str, target: &str) {
    if let Some(item) = diagram.get_item_mut(item_id) {
        item.sub_diagram = if target.is_empty() {
            None
        } else {
            Some(target.to_string())
        };
    }
}

pub fn set_reminder(diagram: &mut Diagram, item_id: &str, at: Option<f64>) {
    if let Some(item) = diagram.get_item_mut(item_id) {
        item.reminder_at = at;
    }
}

/// Delete an item. Edges touching it go with it; a task-linked item also
/// removes its backing task, which in turn repairs every other link (see
/// `task_ops::remove_task`).
pub fn remove_item(tab: &mut Tab, item_id: &str) {
    let Some(item) = tab.diagram.take_item(item_id) else {
        return;
    };
    edge_ops::remove_edges_touching(&mut tab.diagram, item_id);
    if let Some(index) = item.task_index {
        task_ops::remove_task(&mut tab.tasks, &mut tab.diagram, index);
    }
}

/// Split an item into one child per label, laid out in a row beneath it
/// and each connected back to the original. A task item's children become
/// subtasks of its backing task. Returns the new item ids.
pub fn breakdown(tab: &mut Tab, item_id: &str, labels: &[&str], now: f64) -> Vec<String> {
    let Some(source) = tab.diagram.get_item(item_id) else {
        return Vec::new();
    };
    let kind = source.kind;
    let parent_task = source.task_index;
    let preset = kind.preset();
    let padding = 40.0;
    let row_width = labels.len() as f64 * (preset.width + padding) - padding;
    let start_x = source.x + source.width / 2.0 - row_width / 2.0;
    let y = source.y + source.height + padding * 2.0;

    let mut ids = Vec::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        let x = start_x + i as f64 * (preset.width + padding);
        let id = add_item(&mut tab.diagram, kind, x, y, label);
        if kind == ItemKind::Task
            && let Some(index) = tab.tasks.add(label, parent_task, now)
            && let Some(item) = tab.diagram.get_item_mut(&id)
        {
            item.task_index = Some(index);
        }
        edge_ops::add_edge(&mut tab.diagram, item_id, &id);
        ids.push(id);
    }
    ids
}

/// Bounding box over all items and committed strokes; `None` for an
/// empty canvas.
pub fn content_bounds(diagram: &Diagram) -> Option<Bounds> {
    let mut bounds: Option<Bounds> = None;
    let mut grow = |b: Bounds| {
        bounds = Some(match bounds {
            Some(acc) => acc.union(b),
            None => b,
        });
    };
    for item in diagram.items() {
        grow(Bounds::of_rect(item.x, item.y, item.width, item.height));
    }
    for stroke in diagram.drawing.strokes() {
        for p in &stroke.points {
            grow(Bounds::of_rect(p.x, p.y, 0.0, 0.0));
        }
    }
    bounds
}

/// Chain every item with edges in reading order (top-to-bottom, then
/// left-to-right). Existing connections are kept.
pub fn connect_all(diagram: &mut Diagram) {
    let mut ordered: Vec<(f64, f64, String)> = diagram
        .items()
        .map(|i| (i.y, i.x, i.id.clone()))
        .collect();
    if ordered.len() < 2 {
        return;
    }
    ordered.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    for pair in ordered.windows(2) {
        edge_ops::add_edge(diagram, &pair[0].2, &pair[1].2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_item_uses_preset_defaults() {
        let mut tab = Tab::new("t");
        let id = add_item(&mut tab.diagram, ItemKind::Database, 10.0, 10.0, "");
        let item = tab.diagram.get_item(&id).unwrap();
        assert_eq!(item.text, "Database");
        assert_eq!((item.width, item.height), (160.0, 90.0));
    }

    #[test]
    fn add_task_item_links_list_and_canvas() {
        let mut tab = Tab::new("t");
        let id = add_task_item(&mut tab, 0.0, 0.0, "Write tests", 0.0).unwrap();
        assert_eq!(tab.tasks.len(), 1);
        assert_eq!(tab.diagram.get_item(&id).unwrap().task_index, Some(0));
        assert!(add_task_item(&mut tab, 0.0, 0.0, "  ", 0.0).is_none());
    }

    #[test]
    fn resize_clamps_to_kind_floor() {
        let mut tab = Tab::new("t");
        let id = add_item(&mut tab.diagram, ItemKind::Box, 0.0, 0.0, "");
        resize_item(&mut tab.diagram, &id, 5.0, 5.0);
        let item = tab.diagram.get_item(&id).unwrap();
        assert_eq!((item.width, item.height), (40.0, 30.0));

        let note = add_item(&mut tab.diagram, ItemKind::Note, 0.0, 0.0, "");
        resize_item(&mut tab.diagram, &note, 5.0, 5.0);
        let item = tab.diagram.get_item(&note).unwrap();
        assert_eq!((item.width, item.height), (60.0, 40.0));
    }

    #[test]
    fn set_kind_preserves_geometry_and_clears_foreign_fields() {
        let mut tab = Tab::new("t");
        let id = add_task_item(&mut tab, 30.0, 40.0, "task", 0.0).unwrap();
        resize_item(&mut tab.diagram, &id, 200.0, 120.0);
        set_kind(&mut tab.diagram, &id, ItemKind::Cloud);
        let item = tab.diagram.get_item(&id).unwrap();
        assert_eq!(item.kind, ItemKind::Cloud);
        assert_eq!((item.x, item.y), (30.0, 40.0));
        assert_eq!((item.width, item.height), (200.0, 120.0));
        assert_eq!(item.text, "task");
        assert_eq!(item.color, "#6a9ddb");
        assert_eq!(item.task_index, None);
    }

    #[test]
    fn convert_to_task_backs_item_with_new_task() {
        let mut tab = Tab::new("t");
        let id = add_item(&mut tab.diagram, ItemKind::Box, 0.0, 0.0, "Idea");
        convert_to_task(&mut tab, &id, "Idea", 0.0);
        let item = tab.diagram.get_item(&id).unwrap();
        assert_eq!(item.kind, ItemKind::Task);
        assert_eq!(item.task_index, Some(0));
        assert_eq!(tab.tasks.get(0).unwrap().title, "Idea");
    }

    #[test]
    fn remove_item_cascades_edges_and_task() {
        let mut tab = Tab::new("t");
        let keep = add_task_item(&mut tab, 0.0, 0.0, "keep", 0.0).unwrap();
        let gone = add_task_item(&mut tab, 300.0, 0.0, "gone", 0.0).unwrap();
        edge_ops::add_edge(&mut tab.diagram, &keep, &gone);

        remove_item(&mut tab, &gone);
        assert!(tab.diagram.get_item(&gone).is_none());
        assert!(tab.diagram.edges().is_empty());
        assert_eq!(tab.tasks.len(), 1);
        assert_eq!(tab.tasks.get(0).unwrap().title, "keep");
        assert_eq!(tab.diagram.get_item(&keep).unwrap().task_index, Some(0));
    }

    #[test]
    fn remove_unlinked_item_leaves_tasks_alone() {
        let mut tab = Tab::new("t");
        add_task_item(&mut tab, 0.0, 0.0, "task", 0.0).unwrap();
        let plain = add_item(&mut tab.diagram, ItemKind::Box, 0.0, 0.0, "");
        remove_item(&mut tab, &plain);
        assert_eq!(tab.tasks.len(), 1);
    }

    #[test]
    fn breakdown_of_task_item_creates_subtasks() {
        let mut tab = Tab::new("t");
        let id = add_task_item(&mut tab, 100.0, 100.0, "Ship", 0.0).unwrap();
        let children = breakdown(&mut tab, &id, &["Build", "Test"], 0.0);
        assert_eq!(children.len(), 2);
        assert_eq!(tab.tasks.len(), 3);
        assert_eq!(tab.tasks.get(1).unwrap().title, "Build");
        assert_eq!(tab.tasks.get(1).unwrap().indent_level, 1);
        // Each child connected back to the source
        assert_eq!(tab.diagram.edges().len(), 2);
        for child in &children {
            let item = tab.diagram.get_item(child).unwrap();
            assert!(item.y > 100.0);
            assert!(item.task_index.is_some());
        }
    }

    #[test]
    fn content_bounds_covers_items_and_strokes() {
        let mut tab = Tab::new("t");
        assert!(content_bounds(&tab.diagram).is_none());
        add_item(&mut tab.diagram, ItemKind::Box, 0.0, 0.0, "");
        tab.diagram.drawing.begin(crate::geom::Point::new(500.0, -50.0));
        tab.diagram.drawing.end();
        let b = content_bounds(&tab.diagram).unwrap();
        assert_eq!((b.min_x, b.min_y), (0.0, -50.0));
        assert_eq!((b.max_x, b.max_y), (500.0, 60.0));
    }

    #[test]
    fn connect_all_chains_in_reading_order() {
        let mut tab = Tab::new("t");
        let c = add_item(&mut tab.diagram, ItemKind::Box, 0.0, 200.0, "");
        let a = add_item(&mut tab.diagram, ItemKind::Box, 0.0, 0.0, "");
        let b = add_item(&mut tab.diagram, ItemKind::Box, 300.0, 0.0, "");
        connect_all(&mut tab.diagram);
        let pairs: Vec<(&str, &str)> = tab
            .diagram
            .edges()
            .iter()
            .map(|e| (e.from_id.as_str(), e.to_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![(a.as_str(), b.as_str()), (b.as_str(), c.as_str())]);
    }
}
