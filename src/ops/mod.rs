//! Operations over the model: item/edge/task mutation with their
//! cross-model cascades, clipboard transfer, and automatic layout.

pub mod clipboard;
pub mod edge_ops;
pub mod item_ops;
pub mod layout;
pub mod sync;
pub mod task_ops;
