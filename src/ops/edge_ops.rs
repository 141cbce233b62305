//! Edge store operations: connect, disconnect, describe and hit-test the
//! arrows between diagram items.

use crate::geom::{self, Point};
use crate::model::{Diagram, Edge};

/// Connect two items. Self-loops, duplicate connections and unknown
/// endpoints are rejected. Returns the new edge id.
pub fn add_edge(diagram: &mut Diagram, from_id: &str, to_id: &str) -> Option<String> {
    if from_id == to_id {
        return None;
    }
    if !diagram.contains_item(from_id) || !diagram.contains_item(to_id) {
        return None;
    }
    if diagram
        .edges()
        .iter()
        .any(|e| e.from_id == from_id && e.to_id == to_id)
    {
        return None;
    }
    let id = diagram.next_edge_id();
    diagram
        .edges_mut()
        .push(Edge::new(id.clone(), from_id.to_string(), to_id.to_string()));
    Some(id)
}

/// Remove an edge by id. Returns false for unknown ids.
pub fn remove_edge(diagram: &mut Diagram, edge_id: &str) -> bool {
    let edges = diagram.edges_mut();
    match edges.iter().position(|e| e.id == edge_id) {
        Some(pos) => {
            edges.remove(pos);
            true
        }
        None => false,
    }
}

/// Remove the edge from `from_id` to `to_id`, if one exists.
pub fn remove_edge_between(diagram: &mut Diagram, from_id: &str, to_id: &str) -> bool {
    let edges = diagram.edges_mut();
    match edges
        .iter()
        .position(|e| e.from_id == from_id && e.to_id == to_id)
    {
        Some(pos) => {
            edges.remove(pos);
            true
        }
        None => false,
    }
}

/// Drop every edge with `item_id` as either endpoint. Part of the item
/// removal cascade.
pub fn remove_edges_touching(diagram: &mut Diagram, item_id: &str) {
    diagram.edges_mut().retain(|e| !e.touches(item_id));
}

pub fn set_description(diagram: &mut Diagram, edge_id: &str, description: &str) {
    if let Some(edge) = diagram.edges_mut().iter_mut().find(|e| e.id == edge_id) {
        edge.description = description.to_string();
    }
}

pub fn get_description<'a>(diagram: &'a Diagram, edge_id: &str) -> &'a str {
    diagram
        .edges()
        .iter()
        .find(|e| e.id == edge_id)
        .map(|e| e.description.as_str())
        .unwrap_or("")
}

/// Closest edge within `threshold` of the point, treating each edge as
/// the segment between its endpoints' centers. Equidistant edges go to
/// the most recently added one; edges with a missing endpoint never
/// match.
pub fn hit_test<'a>(diagram: &'a Diagram, p: Point, threshold: f64) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for edge in diagram.edges().iter().rev() {
        let (Some(from), Some(to)) = (
            diagram.get_item(&edge.from_id),
            diagram.get_item(&edge.to_id),
        ) else {
            continue;
        };
        let dist = geom::distance_to_segment(p, from.center(), to.center());
        if dist <= threshold && best.is_none_or(|(_, d)| dist < d) {
            best = Some((edge.id.as_str(), dist));
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiagramItem, ItemKind};
    use pretty_assertions::assert_eq;

    fn diagram_with(items: &[(&str, f64, f64)]) -> Diagram {
        let mut d = Diagram::new();
        for (id, x, y) in items {
            d.insert_item(DiagramItem::from_preset(
                id.to_string(),
                ItemKind::Box,
                *x,
                *y,
                "",
            ));
        }
        d
    }

    #[test]
    fn add_edge_rejects_self_loops_and_duplicates() {
        let mut d = diagram_with(&[("a", 0.0, 0.0), ("b", 200.0, 0.0)]);
        assert!(add_edge(&mut d, "a", "a").is_none());
        let id = add_edge(&mut d, "a", "b").unwrap();
        assert_eq!(id, "edge_0");
        assert!(add_edge(&mut d, "a", "b").is_none());
        // Reverse direction is a distinct connection
        assert!(add_edge(&mut d, "b", "a").is_some());
        assert_eq!(d.edges().len(), 2);
    }

    #[test]
    fn add_edge_requires_existing_endpoints() {
        let mut d = diagram_with(&[("a", 0.0, 0.0)]);
        assert!(add_edge(&mut d, "a", "ghost").is_none());
        assert!(d.edges().is_empty());
    }

    #[test]
    fn remove_variants() {
        let mut d = diagram_with(&[("a", 0.0, 0.0), ("b", 200.0, 0.0), ("c", 400.0, 0.0)]);
        let ab = add_edge(&mut d, "a", "b").unwrap();
        add_edge(&mut d, "b", "c").unwrap();
        add_edge(&mut d, "c", "a").unwrap();

        assert!(remove_edge(&mut d, &ab));
        assert!(!remove_edge(&mut d, &ab));
        assert!(remove_edge_between(&mut d, "b", "c"));
        remove_edges_touching(&mut d, "a");
        assert!(d.edges().is_empty());
    }

    #[test]
    fn description_round_trip() {
        let mut d = diagram_with(&[("a", 0.0, 0.0), ("b", 200.0, 0.0)]);
        let id = add_edge(&mut d, "a", "b").unwrap();
        assert_eq!(get_description(&d, &id), "");
        set_description(&mut d, &id, "depends on");
        assert_eq!(get_description(&d, &id), "depends on");
        assert_eq!(get_description(&d, "ghost"), "");
    }

    #[test]
    fn hit_test_matches_near_midpoint() {
        // Boxes are 120x60, so centers are (60,30) and (460,30)
        let mut d = diagram_with(&[("a", 0.0, 0.0), ("b", 400.0, 0.0)]);
        let id = add_edge(&mut d, "a", "b").unwrap();
        assert_eq!(hit_test(&d, Point::new(260.0, 35.0), 8.0), Some(id.as_str()));
        assert_eq!(hit_test(&d, Point::new(260.0, 80.0), 8.0), None);
    }

    #[test]
    fn hit_test_prefers_closest_edge() {
        // Two parallel segments: y = 30 (older) and y = 36 (newer)
        let mut d = diagram_with(&[
            ("a", 0.0, 0.0),
            ("b", 400.0, 0.0),
            ("c", 0.0, 6.0),
            ("d", 400.0, 6.0),
        ]);
        let near = add_edge(&mut d, "a", "b").unwrap();
        let far = add_edge(&mut d, "c", "d").unwrap();
        // Both within threshold; the closer one wins even though it is older
        assert_eq!(hit_test(&d, Point::new(260.0, 30.0), 8.0), Some(near.as_str()));
        // Equidistant: the most recently added edge wins
        assert_eq!(hit_test(&d, Point::new(260.0, 33.0), 8.0), Some(far.as_str()));
    }

    #[test]
    fn hit_test_skips_dangling_edges() {
        let mut d = diagram_with(&[("a", 0.0, 0.0), ("b", 400.0, 0.0)]);
        add_edge(&mut d, "a", "b").unwrap();
        d.take_item("b");
        assert_eq!(hit_test(&d, Point::new(260.0, 30.0), 8.0), None);
    }
}
