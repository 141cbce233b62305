use serde::{Deserialize, Serialize};

/// Kind of a diagram item. `Task` items reference an entry in the same
/// tab's task list; all other kinds are purely visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Box,
    Task,
    Database,
    Server,
    Cloud,
    Note,
    Freetext,
    Obstacle,
    Wish,
    Image,
    Chatgpt,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Box => "box",
            ItemKind::Task => "task",
            ItemKind::Database => "database",
            ItemKind::Server => "server",
            ItemKind::Cloud => "cloud",
            ItemKind::Note => "note",
            ItemKind::Freetext => "freetext",
            ItemKind::Obstacle => "obstacle",
            ItemKind::Wish => "wish",
            ItemKind::Image => "image",
            ItemKind::Chatgpt => "chatgpt",
        }
    }

    /// Minimum size when resizing. Text-heavy kinds get a larger floor.
    pub fn min_size(self) -> (f64, f64) {
        match self {
            ItemKind::Note | ItemKind::Freetext => (60.0, 40.0),
            _ => (40.0, 30.0),
        }
    }
}

/// Default appearance for a freshly created item of a given kind
#[derive(Debug, Clone, Copy)]
pub struct ItemPreset {
    pub width: f64,
    pub height: f64,
    pub color: &'static str,
    pub text: &'static str,
    pub text_color: &'static str,
}

impl ItemKind {
    pub fn preset(self) -> ItemPreset {
        match self {
            ItemKind::Box => ItemPreset {
                width: 120.0,
                height: 60.0,
                color: "#4a9eff",
                text: "Box",
                text_color: "#f5f6f8",
            },
            ItemKind::Task => ItemPreset {
                width: 140.0,
                height: 70.0,
                color: "#82c3a5",
                text: "Task",
                text_color: "#1b2028",
            },
            ItemKind::Database => ItemPreset {
                width: 160.0,
                height: 90.0,
                color: "#c18f5e",
                text: "Database",
                text_color: "#1b2028",
            },
            ItemKind::Server => ItemPreset {
                width: 150.0,
                height: 90.0,
                color: "#3d495c",
                text: "Server",
                text_color: "#f5f6f8",
            },
            ItemKind::Cloud => ItemPreset {
                width: 170.0,
                height: 100.0,
                color: "#6a9ddb",
                text: "Cloud",
                text_color: "#1b2028",
            },
            ItemKind::Note => ItemPreset {
                width: 160.0,
                height: 110.0,
                color: "#f7e07b",
                text: "Note",
                text_color: "#1b2028",
            },
            ItemKind::Freetext => ItemPreset {
                width: 200.0,
                height: 140.0,
                color: "#f5f0e6",
                text: "",
                text_color: "#2d3436",
            },
            ItemKind::Obstacle => ItemPreset {
                width: 140.0,
                height: 100.0,
                color: "#e74c3c",
                text: "Obstacle",
                text_color: "#ffffff",
            },
            ItemKind::Wish => ItemPreset {
                width: 140.0,
                height: 100.0,
                color: "#f1c40f",
                text: "Wish",
                text_color: "#2d3436",
            },
            ItemKind::Image => ItemPreset {
                width: 200.0,
                height: 150.0,
                color: "#2a3444",
                text: "",
                text_color: "#f5f6f8",
            },
            ItemKind::Chatgpt => ItemPreset {
                width: 180.0,
                height: 90.0,
                color: "#1f8f6b",
                text: "Ask ChatGPT",
                text_color: "#f5f6f8",
            },
        }
    }
}

/// Serialize an optional task index using the `-1 == unlinked` convention
/// of the persisted document format.
pub(crate) mod opt_index {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(v.map(|i| i as i64).unwrap_or(-1))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(d)?;
        Ok(if raw < 0 { None } else { Some(raw as usize) })
    }
}

/// A rectangular shape on the diagram canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramItem {
    pub id: String,
    #[serde(rename = "item_type")]
    pub kind: ItemKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub text: String,
    /// Index into the owning tab's task list; `None` for unlinked items.
    /// Only meaningful for `ItemKind::Task`.
    #[serde(default, with = "opt_index")]
    pub task_index: Option<usize>,
    pub color: String,
    pub text_color: String,
    /// Base64-encoded PNG payload, only for `ItemKind::Image`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// Pointer to another tab (by name) or project file this item drills
    /// down into
    #[serde(
        rename = "sub_diagram_path",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_diagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    /// Reminder timestamp, epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_at: Option<f64>,
}

impl DiagramItem {
    /// Create an item of the given kind from its preset. An empty or blank
    /// `text` falls back to the preset label.
    pub fn from_preset(id: String, kind: ItemKind, x: f64, y: f64, text: &str) -> Self {
        let preset = kind.preset();
        let label = if text.trim().is_empty() {
            preset.text.to_string()
        } else {
            text.to_string()
        };
        DiagramItem {
            id,
            kind,
            x,
            y,
            width: preset.width,
            height: preset.height,
            text: label,
            task_index: None,
            color: preset.color.to_string(),
            text_color: preset.text_color.to_string(),
            image_data: None,
            sub_diagram: None,
            note_markdown: None,
            folder_path: None,
            reminder_at: None,
        }
    }

    /// Center of the item's rectangle, used for edge routing
    pub fn center(&self) -> crate::geom::Point {
        crate::geom::Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.contains_with_margin(x, y, 0.0)
    }

    pub fn contains_with_margin(&self, x: f64, y: f64, margin: f64) -> bool {
        x >= self.x - margin
            && x <= self.x + self.width + margin
            && y >= self.y - margin
            && y <= self.y + self.height + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn preset_fills_defaults() {
        let item = DiagramItem::from_preset("box_0".into(), ItemKind::Box, 10.0, 20.0, "");
        assert_eq!(item.text, "Box");
        assert_eq!(item.width, 120.0);
        assert_eq!(item.color, "#4a9eff");
    }

    #[test]
    fn explicit_text_overrides_preset_label() {
        let item = DiagramItem::from_preset("box_1".into(), ItemKind::Box, 0.0, 0.0, "Auth");
        assert_eq!(item.text, "Auth");
    }

    #[test]
    fn contains_respects_margin() {
        let item = DiagramItem::from_preset("box_0".into(), ItemKind::Box, 100.0, 100.0, "");
        assert!(!item.contains(95.0, 100.0));
        assert!(item.contains_with_margin(95.0, 100.0, 10.0));
    }

    #[test]
    fn task_index_round_trips_as_minus_one() {
        let mut item = DiagramItem::from_preset("task_0".into(), ItemKind::Task, 0.0, 0.0, "t");
        item.task_index = None;
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["task_index"], -1);
        item.task_index = Some(3);
        let json = serde_json::to_string(&item).unwrap();
        let back: DiagramItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.task_index, Some(3));
    }
}
