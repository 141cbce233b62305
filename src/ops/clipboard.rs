//! Clipboard payloads for diagram content.
//!
//! Copied selections are encoded as a self-describing JSON document so
//! they survive a round trip through the system clipboard and can be
//! pasted into another tab or another running instance. Plain text and
//! images paste through their own entry points.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::geom::Point;
use crate::model::{Diagram, DiagramItem, ItemKind, Tab};

use super::{edge_ops, item_ops};

pub const CLIPBOARD_FORMAT: &str = "actiondraw-diagram";
pub const CLIPBOARD_VERSION: u32 = 1;

/// Largest dimension of a pasted image item, preserving aspect ratio
const MAX_IMAGE_DIM: f64 = 400.0;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard text is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("clipboard payload is not a diagram selection")]
    UnknownFormat,
    #[error("unsupported clipboard payload version {0}")]
    UnsupportedVersion(u32),
}

/// One copied item; field names match the external clipboard format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default, with = "crate::model::item::opt_index")]
    pub task_index: Option<usize>,
    pub color: String,
    pub text_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(
        rename = "subDiagramPath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_diagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_markdown: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardEdge {
    pub from_id: String,
    pub to_id: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub format: String,
    pub version: u32,
    pub items: Vec<ClipboardItem>,
    pub edges: Vec<ClipboardEdge>,
}

impl ClipboardPayload {
    fn new(items: Vec<ClipboardItem>, edges: Vec<ClipboardEdge>) -> Self {
        ClipboardPayload {
            format: CLIPBOARD_FORMAT.to_string(),
            version: CLIPBOARD_VERSION,
            items,
            edges,
        }
    }
}

fn to_clipboard_item(item: &DiagramItem) -> ClipboardItem {
    ClipboardItem {
        id: item.id.clone(),
        kind: item.kind,
        x: item.x,
        y: item.y,
        width: item.width,
        height: item.height,
        text: item.text.clone(),
        task_index: item.task_index,
        color: item.color.clone(),
        text_color: item.text_color.clone(),
        image_data: item.image_data.clone(),
        sub_diagram: item.sub_diagram.clone(),
        note_markdown: item.note_markdown.clone(),
    }
}

pub fn encode(payload: &ClipboardPayload) -> Result<String, ClipboardError> {
    Ok(serde_json::to_string(payload)?)
}

/// Parse clipboard text, verifying the format marker and version.
pub fn decode(text: &str) -> Result<ClipboardPayload, ClipboardError> {
    let payload: ClipboardPayload = serde_json::from_str(text)?;
    if payload.format != CLIPBOARD_FORMAT {
        return Err(ClipboardError::UnknownFormat);
    }
    if payload.version != CLIPBOARD_VERSION {
        return Err(ClipboardError::UnsupportedVersion(payload.version));
    }
    Ok(payload)
}

/// Copy a selection: the named items plus every edge whose two endpoints
/// are both inside it. Returns `None` when no id resolves.
pub fn copy_items(diagram: &Diagram, item_ids: &[&str]) -> Option<ClipboardPayload> {
    let items: Vec<ClipboardItem> = item_ids
        .iter()
        .filter_map(|id| diagram.get_item(id))
        .map(to_clipboard_item)
        .collect();
    if items.is_empty() {
        return None;
    }
    let selected: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    let edges = diagram
        .edges()
        .iter()
        .filter(|e| selected.contains(&e.from_id.as_str()) && selected.contains(&e.to_id.as_str()))
        .map(|e| ClipboardEdge {
            from_id: e.from_id.clone(),
            to_id: e.to_id.clone(),
            description: e.description.clone(),
        })
        .collect();
    Some(ClipboardPayload::new(items, edges))
}

/// Copy a single edge together with both endpoint items.
pub fn copy_edge(diagram: &Diagram, edge_id: &str) -> Option<ClipboardPayload> {
    let edge = diagram.edges().iter().find(|e| e.id == edge_id)?;
    let from = diagram.get_item(&edge.from_id)?;
    let to = diagram.get_item(&edge.to_id)?;
    Some(ClipboardPayload::new(
        vec![to_clipboard_item(from), to_clipboard_item(to)],
        vec![ClipboardEdge {
            from_id: edge.from_id.clone(),
            to_id: edge.to_id.clone(),
            description: edge.description.clone(),
        }],
    ))
}

/// Paste a payload centered on `at`. Every item gets a fresh id; edges are
/// remapped through the new ids, dropping self-loops and duplicates. Task
/// links survive only when the index exists in the destination tab's list
/// (`task_count`). Returns the new item ids.
pub fn paste_payload(
    diagram: &mut Diagram,
    payload: &ClipboardPayload,
    at: Point,
    task_count: usize,
) -> Vec<String> {
    if payload.items.is_empty() {
        return Vec::new();
    }
    let min_x = payload.items.iter().map(|i| i.x).fold(f64::INFINITY, f64::min);
    let min_y = payload.items.iter().map(|i| i.y).fold(f64::INFINITY, f64::min);
    let max_x = payload
        .items
        .iter()
        .map(|i| i.x + i.width)
        .fold(f64::NEG_INFINITY, f64::max);
    let max_y = payload
        .items
        .iter()
        .map(|i| i.y + i.height)
        .fold(f64::NEG_INFINITY, f64::max);
    let offset_x = at.x - (min_x + max_x) / 2.0;
    let offset_y = at.y - (min_y + max_y) / 2.0;

    let mut id_map: HashMap<String, String> = HashMap::new();
    let mut new_ids = Vec::with_capacity(payload.items.len());
    for entry in &payload.items {
        let id = diagram.next_item_id(entry.kind.as_str());
        let task_index = entry.task_index.filter(|&i| i < task_count);
        diagram.insert_item(DiagramItem {
            id: id.clone(),
            kind: entry.kind,
            x: entry.x + offset_x,
            y: entry.y + offset_y,
            width: entry.width,
            height: entry.height,
            text: entry.text.clone(),
            task_index,
            color: entry.color.clone(),
            text_color: entry.text_color.clone(),
            image_data: entry.image_data.clone(),
            sub_diagram: entry.sub_diagram.clone(),
            note_markdown: entry.note_markdown.clone(),
            folder_path: None,
            reminder_at: None,
        });
        id_map.insert(entry.id.clone(), id.clone());
        new_ids.push(id);
    }

    for edge in &payload.edges {
        let (Some(from), Some(to)) = (id_map.get(&edge.from_id), id_map.get(&edge.to_id)) else {
            continue;
        };
        if let Some(id) = edge_ops::add_edge(diagram, from, to)
            && !edge.description.is_empty()
        {
            edge_ops::set_description(diagram, &id, &edge.description);
        }
    }
    new_ids
}

/// A line of pasted text with its indentation depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub level: usize,
    pub text: String,
}

/// Recover an outline from indented plain text. A tab counts as four
/// spaces; each strictly deeper indent opens a level, and a shallower one
/// pops back to the nearest open level.
pub fn parse_text_hierarchy(text: &str) -> Vec<TextEntry> {
    let mut entries = Vec::new();
    let mut indent_stack: Vec<usize> = Vec::new();
    for raw_line in text.lines() {
        if raw_line.trim().is_empty() {
            continue;
        }
        let indent: usize = raw_line
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .map(|c| if c == '\t' { 4 } else { 1 })
            .sum();
        let level = if indent_stack.is_empty() {
            indent_stack.push(indent);
            0
        } else if indent > *indent_stack.last().unwrap_or(&0) {
            indent_stack.push(indent);
            indent_stack.len() - 1
        } else {
            while indent_stack.last().is_some_and(|&top| indent < top) {
                indent_stack.pop();
            }
            if indent_stack.is_empty() {
                indent_stack.push(indent);
                0
            } else if indent > *indent_stack.last().unwrap_or(&0) {
                indent_stack.push(indent);
                indent_stack.len() - 1
            } else {
                indent_stack.len() - 1
            }
        };
        entries.push(TextEntry {
            level,
            text: raw_line.trim().to_string(),
        });
    }
    entries
}

const TEXT_PASTE_INDENT_SPACING: f64 = 160.0;
const TEXT_PASTE_ROW_SPACING: f64 = 90.0;

/// Paste indented text as either a chain of task items (with matching
/// entries in the task list) or plain boxes, centered on `at` and
/// connected top to bottom. Returns the new item ids.
pub fn paste_text(tab: &mut Tab, text: &str, at: Point, as_tasks: bool, now: f64) -> Vec<String> {
    let entries = parse_text_hierarchy(text);
    if entries.is_empty() {
        return Vec::new();
    }

    let positions: Vec<(f64, f64)> = entries
        .iter()
        .enumerate()
        .map(|(row, e)| {
            (
                e.level as f64 * TEXT_PASTE_INDENT_SPACING,
                row as f64 * TEXT_PASTE_ROW_SPACING,
            )
        })
        .collect();
    let min_x = positions.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_x = positions.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = positions[0].1;
    let max_y = positions[positions.len() - 1].1;
    let offset_x = at.x - (min_x + max_x) / 2.0;
    let offset_y = at.y - (min_y + max_y) / 2.0;

    let mut new_ids = Vec::with_capacity(entries.len());
    let mut previous_id: Option<String> = None;
    // Task row created at each open outline level, for parent lookups
    let mut task_stack: Vec<usize> = Vec::new();

    for (entry, &(px, py)) in entries.iter().zip(&positions) {
        let x = px + offset_x;
        let y = py + offset_y;
        task_stack.truncate(entry.level);

        let id = if as_tasks {
            let parent = entry.level.checked_sub(1).and_then(|l| task_stack.get(l).copied());
            let Some(row) = tab.tasks.add(&entry.text, parent, now) else {
                continue;
            };
            task_stack.push(row);
            let id = tab.diagram.next_item_id("task");
            let mut item =
                DiagramItem::from_preset(id.clone(), ItemKind::Task, x, y, &entry.text);
            item.task_index = Some(row);
            tab.diagram.insert_item(item);
            id
        } else {
            item_ops::add_item(&mut tab.diagram, ItemKind::Box, x, y, &entry.text)
        };

        if let Some(prev) = &previous_id {
            edge_ops::add_edge(&mut tab.diagram, prev, &id);
        }
        previous_id = Some(id.clone());
        new_ids.push(id);
    }
    new_ids
}

/// Paste an image (already base64-encoded) as an image item at `at`,
/// scaled down so its largest dimension is at most 400 pixels.
pub fn paste_image(
    diagram: &mut Diagram,
    data: &str,
    pixel_width: f64,
    pixel_height: f64,
    at: Point,
) -> Option<String> {
    if data.is_empty() || pixel_width <= 0.0 || pixel_height <= 0.0 {
        return None;
    }
    let scale = (MAX_IMAGE_DIM / pixel_width.max(pixel_height)).min(1.0);
    let id = item_ops::add_item(diagram, ItemKind::Image, at.x, at.y, "");
    if let Some(item) = diagram.get_item_mut(&id) {
        item.width = pixel_width * scale;
        item.height = pixel_height * scale;
        item.image_data = Some(data.to_string());
    }
    Some(id)
}
