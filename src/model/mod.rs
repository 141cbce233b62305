//! Core data model: tasks, diagram items, edges, ink strokes and the
//! tab/project aggregates that tie them together.

pub mod diagram;
pub mod edge;
pub mod item;
pub mod stroke;
pub mod tab;
pub mod task;

pub use diagram::Diagram;
pub use edge::Edge;
pub use item::{DiagramItem, ItemKind, ItemPreset};
pub use stroke::{DrawingState, Stroke};
pub use tab::{Project, Tab};
pub use task::{Task, TaskList};
