//! Data model and interaction logic for a task tracker with a linked
//! diagramming canvas.
//!
//! A [`model::Project`] is an ordered set of tabs; each tab pairs a
//! [`model::TaskList`] with a [`model::Diagram`] of items, edges and ink
//! strokes. Diagram items may reference tasks by index, and the `ops`
//! modules keep those references consistent through every mutation.
//! Projects persist as versioned JSON documents via [`io::project_io`].

pub mod geom;
pub mod io;
pub mod model;
pub mod ops;
pub mod session;
pub mod util;

pub use model::{Diagram, DiagramItem, Edge, ItemKind, Project, Stroke, Tab, Task, TaskList};
pub use session::ViewSession;
