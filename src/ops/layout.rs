//! Automatic arrangement of diagram items: grid, single row or column,
//! and a layered layout that follows edge direction.

use std::collections::{HashMap, HashSet};

use crate::model::Diagram;

use super::item_ops;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Grid,
    Horizontal,
    Vertical,
    Hierarchical,
}

const PADDING: f64 = 40.0;
const START_X: f64 = 60.0;
const START_Y: f64 = 60.0;

pub fn arrange(diagram: &mut Diagram, layout: Layout) {
    if diagram.item_count() == 0 {
        return;
    }
    match layout {
        Layout::Grid => arrange_grid(diagram),
        Layout::Horizontal => arrange_flow(diagram, true),
        Layout::Vertical => arrange_flow(diagram, false),
        Layout::Hierarchical => arrange_hierarchical(diagram),
    }
}

fn by_position(a: &(f64, f64, String), b: &(f64, f64, String)) -> std::cmp::Ordering {
    a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
}

/// Uniform grid of square-ish shape, cells sized to the largest item.
/// Items keep their reading order.
fn arrange_grid(diagram: &mut Diagram) {
    let n = diagram.item_count();
    let cols = ((n as f64).sqrt().ceil() as usize).max(1);

    let mut ordered: Vec<(f64, f64, String)> = diagram
        .items()
        .map(|i| (i.y, i.x, i.id.clone()))
        .collect();
    ordered.sort_by(by_position);

    let cell_w = diagram.items().map(|i| i.width).fold(0.0, f64::max) + PADDING;
    let cell_h = diagram.items().map(|i| i.height).fold(0.0, f64::max) + PADDING;

    for (idx, (_, _, id)) in ordered.iter().enumerate() {
        let row = idx / cols;
        let col = idx % cols;
        item_ops::move_item(
            diagram,
            id,
            START_X + col as f64 * cell_w,
            START_Y + row as f64 * cell_h,
        );
    }
}

/// Single row (or column), items packed with uniform padding in their
/// current order along the flow axis.
fn arrange_flow(diagram: &mut Diagram, horizontal: bool) {
    let mut ordered: Vec<(f64, f64, String)> = diagram
        .items()
        .map(|i| {
            if horizontal {
                (i.x, i.y, i.id.clone())
            } else {
                (i.y, i.x, i.id.clone())
            }
        })
        .collect();
    ordered.sort_by(by_position);

    let mut cursor = if horizontal { START_X } else { START_Y };
    for (_, _, id) in &ordered {
        let (w, h) = diagram
            .get_item(id)
            .map(|i| (i.width, i.height))
            .unwrap_or((0.0, 0.0));
        if horizontal {
            item_ops::move_item(diagram, id, cursor, START_Y);
            cursor += w + PADDING;
        } else {
            item_ops::move_item(diagram, id, START_X, cursor);
            cursor += h + PADDING;
        }
    }
}

/// Layered DAG layout. Connected components are found over the undirected
/// edge graph and arranged side by side; within a component, layers
/// follow edge direction from the roots down.
fn arrange_hierarchical(diagram: &mut Diagram) {
    let ids: Vec<String> = diagram.items().map(|i| i.id.clone()).collect();
    let id_set: HashSet<&str> = ids.iter().map(|s| s.as_str()).collect();
    let edge_pairs: Vec<(String, String)> = diagram
        .edges()
        .iter()
        .map(|e| (e.from_id.clone(), e.to_id.clone()))
        .collect();

    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut neighbors: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in &edge_pairs {
        let (from, to) = (from.as_str(), to.as_str());
        if id_set.contains(from) && id_set.contains(to) {
            outgoing.entry(from).or_default().push(to);
            incoming.entry(to).or_default().push(from);
            neighbors.entry(from).or_default().push(to);
            neighbors.entry(to).or_default().push(from);
        }
    }

    // Components discovered in reading order so the result is stable
    let mut seeds: Vec<(f64, f64, String)> = diagram
        .items()
        .map(|i| (i.y, i.x, i.id.clone()))
        .collect();
    seeds.sort_by(by_position);

    let mut visited: HashSet<&str> = HashSet::new();
    let mut components: Vec<Vec<&str>> = Vec::new();
    for (_, _, seed) in &seeds {
        if visited.contains(seed.as_str()) {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![seed.as_str()];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            component.push(id);
            if let Some(adjacent) = neighbors.get(id) {
                stack.extend(adjacent.iter().copied().filter(|n| !visited.contains(n)));
            }
        }
        components.push(component);
    }

    let component_gap = PADDING * 2.0;
    let mut x_offset = START_X;

    for component in components {
        let component_set: HashSet<&str> = component.iter().copied().collect();

        // Roots: no incoming edges inside the component. A cycle has no
        // roots, so fall back to the topmost item.
        let mut roots: Vec<&str> = component
            .iter()
            .copied()
            .filter(|id| {
                !incoming
                    .get(id)
                    .is_some_and(|inc| inc.iter().any(|i| component_set.contains(i)))
            })
            .collect();
        if roots.is_empty() {
            let topmost = component
                .iter()
                .copied()
                .min_by(|a, b| {
                    let pos = |id: &str| {
                        diagram
                            .get_item(id)
                            .map(|i| (i.y, i.x))
                            .unwrap_or((0.0, 0.0))
                    };
                    pos(a).partial_cmp(&pos(b)).unwrap_or(std::cmp::Ordering::Equal)
                });
            roots.extend(topmost);
        }

        // Layer assignment from the roots. Each node expands its children
        // once; later visits only deepen its own layer, which keeps cycles
        // from looping.
        let mut layers: HashMap<&str, usize> = HashMap::new();
        let mut expanded: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&str, usize)> = roots.iter().map(|r| (*r, 0)).collect();
        while let Some((id, layer)) = stack.pop() {
            let entry = layers.entry(id).or_insert(layer);
            if layer > *entry {
                *entry = layer;
            }
            if !expanded.insert(id) {
                continue;
            }
            for child in outgoing.get(id).into_iter().flatten() {
                if component_set.contains(child) {
                    stack.push((*child, layer + 1));
                }
            }
        }
        for id in &component {
            layers.entry(*id).or_insert(0);
        }

        // Bucket by layer, each layer ordered by original x
        let mut by_layer: HashMap<usize, Vec<&str>> = HashMap::new();
        for id in &component {
            by_layer.entry(layers[id]).or_default().push(*id);
        }

        for ids in by_layer.values_mut() {
            ids.sort_by(|a, b| {
                let x = |id: &str| diagram.get_item(id).map(|i| i.x).unwrap_or(0.0);
                x(a).partial_cmp(&x(b)).unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let max_height = component
            .iter()
            .filter_map(|id| diagram.get_item(id))
            .map(|i| i.height)
            .fold(0.0, f64::max);
        let layer_spacing = max_height + PADDING * 2.0;

        let mut layer_nums: Vec<usize> = by_layer.keys().copied().collect();
        layer_nums.sort_unstable();

        let widths: HashMap<&str, f64> = component
            .iter()
            .filter_map(|id| diagram.get_item(id).map(|i| (*id, i.width)))
            .collect();
        let max_layer_width = layer_nums
            .iter()
            .map(|n| {
                let ids = &by_layer[n];
                ids.iter().map(|id| widths.get(id).copied().unwrap_or(0.0)).sum::<f64>()
                    + PADDING * (ids.len().saturating_sub(1)) as f64
            })
            .fold(0.0, f64::max);

        let moves: Vec<(String, f64, f64)> = {
            let mut out = Vec::new();
            let mut y = START_Y;
            for n in &layer_nums {
                let mut x = x_offset;
                for id in &by_layer[n] {
                    out.push((id.to_string(), x, y));
                    x += widths.get(id).copied().unwrap_or(0.0) + PADDING;
                }
                y += layer_spacing;
            }
            out
        };
        for (id, x, y) in moves {
            item_ops::move_item(diagram, &id, x, y);
        }

        x_offset += max_layer_width + component_gap;
    }
}
