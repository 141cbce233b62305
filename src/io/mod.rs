//! Project file persistence.

pub mod project_io;

pub use project_io::{
    ProjectError, load_project, save_project, sub_diagram_progress, PROJECT_EXTENSION,
    PROJECT_VERSION,
};
