use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::item::opt_index;
use crate::model::{DiagramItem, Edge, Project, Stroke, Tab, Task, TaskList};

pub const PROJECT_VERSION: &str = "1.1";
pub const PROJECT_EXTENSION: &str = "progress";

/// Error type for project I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid project file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

// --- Document structs -------------------------------------------------------
//
// The on-disk shape of a project file. Kept separate from the model so
// format concerns (version fallbacks, `-1` index conventions, defaulted
// fields) stay out of the in-memory types.

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProjectDoc {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Vec<TabDoc>>,
    #[serde(default)]
    pub active_tab: usize,
    // v1.0 files carry a single task list and diagram at the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<TasksDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<DiagramDoc>,
}

fn default_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TabDoc {
    #[serde(default = "default_tab_name")]
    pub name: String,
    #[serde(default)]
    pub tasks: TasksDoc,
    #[serde(default)]
    pub diagram: DiagramDoc,
    #[serde(default)]
    pub priority: u8,
}

fn default_tab_name() -> String {
    "Tab".to_string()
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TasksDoc {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DiagramDoc {
    #[serde(default)]
    pub items: Vec<DiagramItem>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    #[serde(default, with = "opt_index")]
    pub current_task_index: Option<usize>,
}

// --- Model <-> document -----------------------------------------------------

pub fn to_document(project: &Project, saved_at: &str) -> ProjectDoc {
    ProjectDoc {
        version: PROJECT_VERSION.to_string(),
        saved_at: Some(saved_at.to_string()),
        tabs: Some(
            project
                .tabs()
                .iter()
                .map(|tab| TabDoc {
                    name: tab.name.clone(),
                    tasks: TasksDoc {
                        tasks: tab.tasks.tasks().to_vec(),
                    },
                    diagram: DiagramDoc {
                        items: tab.diagram.items().cloned().collect(),
                        edges: tab.diagram.edges().to_vec(),
                        strokes: tab.diagram.drawing.strokes().to_vec(),
                        current_task_index: tab.diagram.current_task,
                    },
                    priority: tab.priority,
                })
                .collect(),
        ),
        active_tab: project.active_tab(),
        tasks: None,
        diagram: None,
    }
}

/// Rebuild the in-memory project from a document. A v1.0 file (no `tabs`
/// array) becomes a single tab named "Main". References are repaired on
/// the way in: edges missing an endpoint are dropped, task links out of
/// range are unlinked, and id counters resume past the highest loaded id.
pub fn from_document(doc: ProjectDoc) -> Project {
    let tabs_docs = match doc.tabs {
        Some(tabs) => tabs,
        None => vec![TabDoc {
            name: "Main".to_string(),
            tasks: doc.tasks.unwrap_or_default(),
            diagram: doc.diagram.unwrap_or_default(),
            priority: 0,
        }],
    };

    let tabs: Vec<Tab> = tabs_docs.into_iter().map(build_tab).collect();
    Project::from_tabs(tabs, doc.active_tab)
}

fn build_tab(doc: TabDoc) -> Tab {
    let task_count = doc.tasks.tasks.len();
    let mut tab = Tab::new(&doc.name);
    tab.priority = doc.priority.min(crate::model::tab::MAX_PRIORITY);
    tab.tasks = TaskList::from_tasks(doc.tasks.tasks);

    let mut items = doc.diagram.items;
    let mut dropped_links = 0usize;
    for item in &mut items {
        if item.task_index.is_some_and(|i| i >= task_count) {
            item.task_index = None;
            dropped_links += 1;
        }
    }
    if dropped_links > 0 {
        log::warn!(
            "tab {:?}: unlinked {} item(s) pointing past the task list",
            tab.name,
            dropped_links
        );
    }

    let item_ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    let (edges, dangling): (Vec<Edge>, Vec<Edge>) = doc
        .diagram
        .edges
        .into_iter()
        .partition(|e| item_ids.contains(&e.from_id.as_str()) && item_ids.contains(&e.to_id.as_str()));
    if !dangling.is_empty() {
        log::warn!(
            "tab {:?}: dropped {} edge(s) with missing endpoints",
            tab.name,
            dangling.len()
        );
    }

    let current_task = doc.diagram.current_task_index.filter(|&i| i < task_count);
    tab.diagram
        .load(items, edges, doc.diagram.strokes, current_task);
    tab
}

// --- Files ------------------------------------------------------------------

/// Write `content` to `path` through a temp file in the same directory,
/// so a crash mid-write never leaves a truncated project file.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Append the `.progress` extension when the path has none.
pub fn normalize_path(path: &Path) -> PathBuf {
    match path.extension() {
        Some(_) => path.to_path_buf(),
        None => path.with_extension(PROJECT_EXTENSION),
    }
}

/// Save a project, stamping it with the current save time.
pub fn save_project(path: &Path, project: &Project) -> Result<PathBuf, ProjectError> {
    let path = normalize_path(path);
    let saved_at = chrono::Local::now().to_rfc3339();
    let doc = to_document(project, &saved_at);
    let content = serde_json::to_string(&doc)?;
    atomic_write(&path, content.as_bytes())?;
    log::info!("project saved to {}", path.display());
    Ok(path)
}

pub fn load_project(path: &Path) -> Result<Project, ProjectError> {
    let text = fs::read_to_string(path).map_err(|e| ProjectError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let doc: ProjectDoc = serde_json::from_str(&text)?;
    log::info!(
        "loaded project {} (format {})",
        path.display(),
        doc.version
    );
    Ok(from_document(doc))
}

/// Completion percentage of a linked project file, aggregated over all of
/// its tabs. `None` when the file is missing or unreadable; relative
/// paths resolve against `base`, the directory of the linking project.
pub fn sub_diagram_progress(base: Option<&Path>, link: &str) -> Option<f64> {
    if link.is_empty() {
        return None;
    }
    let mut path = PathBuf::from(link);
    if path.is_relative()
        && let Some(base) = base
    {
        path = base.join(path);
    }
    let project = load_project(&path).ok()?;
    let (total, completed) = project
        .tabs()
        .iter()
        .flat_map(|tab| tab.tasks.iter())
        .fold((0usize, 0usize), |(total, done), task| {
            (total + 1, done + task.completed as usize)
        });
    if total == 0 {
        return Some(0.0);
    }
    Some(completed as f64 / total as f64 * 100.0)
}
