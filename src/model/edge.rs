use serde::{Deserialize, Serialize};

/// A directed connection between two diagram items.
///
/// Both endpoints must reference existing items; edges are removed when
/// either endpoint is deleted (see `ops::edge_ops::remove_edges_touching`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    #[serde(default)]
    pub description: String,
}

impl Edge {
    pub fn new(id: String, from_id: String, to_id: String) -> Self {
        Edge {
            id,
            from_id,
            to_id,
            description: String::new(),
        }
    }

    pub fn touches(&self, item_id: &str) -> bool {
        self.from_id == item_id || self.to_id == item_id
    }
}
