//! Cross-model glue between a tab's task list and its diagram.
//!
//! The task list owns titles and completion; diagram items never cache
//! them. Display state is resolved on demand with [`resolve_display`],
//! and edits from the canvas write through with [`rename_item`].

use crate::model::{DiagramItem, Project, Tab, TaskList};

/// What the canvas should render for one item right now.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDisplay {
    pub text: String,
    pub completed: bool,
    /// True when this item's task is the focused one
    pub is_current: bool,
    /// Seconds left on the task's countdown, when one is running
    pub countdown_remaining: Option<f64>,
    pub countdown_expired: bool,
}

/// Join an item with its backing task. Unlinked items and stale indices
/// fall back to the item's own text.
pub fn resolve_display(
    item: &DiagramItem,
    tasks: &TaskList,
    current_task: Option<usize>,
    now: f64,
) -> ItemDisplay {
    let linked = item.task_index.and_then(|i| tasks.get(i).map(|t| (i, t)));
    match linked {
        Some((index, task)) => ItemDisplay {
            text: task.title.clone(),
            completed: task.completed,
            is_current: current_task == Some(index),
            countdown_remaining: task.countdown_remaining(now),
            countdown_expired: task.countdown_expired(now),
        },
        None => ItemDisplay {
            text: item.text.clone(),
            completed: false,
            is_current: false,
            countdown_remaining: None,
            countdown_expired: false,
        },
    }
}

/// Rename an item from the canvas. For a task-linked item the new title is
/// written through to the backing task, so every reference to it follows.
pub fn rename_item(tab: &mut Tab, item_id: &str, text: &str) {
    let Some(item) = tab.diagram.get_item_mut(item_id) else {
        return;
    };
    item.text = text.to_string();
    if let Some(index) = item.task_index {
        tab.tasks.rename(index, text);
    }
}

/// A tab that embeds a link to some target tab, with enough of its state
/// to render a progress badge.
#[derive(Debug, Clone, PartialEq)]
pub struct TabLink {
    pub tab_index: usize,
    pub name: String,
    pub completion_percent: f64,
    pub active_task_title: String,
}

/// All tabs holding an item that drills down into the tab at
/// `target_index` (linked by tab name).
pub fn tabs_linking_to(project: &Project, target_index: usize) -> Vec<TabLink> {
    let Some(target) = project.tab(target_index) else {
        return Vec::new();
    };
    project
        .tabs()
        .iter()
        .enumerate()
        .filter(|(i, tab)| {
            *i != target_index
                && tab
                    .diagram
                    .items()
                    .any(|item| item.sub_diagram.as_deref() == Some(target.name.as_str()))
        })
        .map(|(i, tab)| TabLink {
            tab_index: i,
            name: tab.name.clone(),
            completion_percent: tab.tasks.percentage_complete(),
            active_task_title: tab.tasks.current_active_task_title().to_string(),
        })
        .collect()
}

/// Completion percentage of the tab a sub-diagram link points at, resolved
/// by tab name within the same project.
pub fn linked_tab_progress(project: &Project, target_name: &str) -> Option<f64> {
    let index = project.find_tab(target_name)?;
    Some(project.tab(index)?.tasks.percentage_complete())
}
