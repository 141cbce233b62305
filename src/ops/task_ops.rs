//! Task list operations that must stay consistent with the diagram:
//! removal shifts every index-based reference, so the cascade lives here
//! rather than on `TaskList`.

use crate::model::{Diagram, TaskList};

/// Remove the task at `index` with its subtree and repair every diagram
/// reference: items linked to a removed row become unlinked placeholders,
/// links past the removed range shift down, and the focused-task pointer
/// follows the same rules. Returns the removed row indices.
pub fn remove_task(tasks: &mut TaskList, diagram: &mut Diagram, index: usize) -> Vec<usize> {
    let removed = tasks.remove_at(index);
    if removed.is_empty() {
        return removed;
    }
    // remove_at drains a contiguous range
    let start = removed[0];
    let count = removed.len();

    for item in diagram.items_mut() {
        item.task_index = shift(item.task_index, start, count);
    }
    diagram.current_task = shift(diagram.current_task, start, count);
    removed
}

fn shift(index: Option<usize>, start: usize, count: usize) -> Option<usize> {
    match index {
        Some(i) if i >= start + count => Some(i - count),
        Some(i) if i >= start => None,
        other => other,
    }
}

/// Toggle a task's completion from the diagram side. Out-of-range indices
/// are ignored.
pub fn set_task_completed(tasks: &mut TaskList, index: usize, completed: bool, now: f64) {
    if index < tasks.len() {
        tasks.set_completed(index, completed, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiagramItem, ItemKind};
    use pretty_assertions::assert_eq;

    fn linked_item(d: &mut Diagram, task_index: usize) -> String {
        let id = d.next_item_id("task");
        let mut item = DiagramItem::from_preset(id.clone(), ItemKind::Task, 0.0, 0.0, "t");
        item.task_index = Some(task_index);
        d.insert_item(item);
        id
    }

    #[test]
    fn removal_unlinks_and_shifts_references() {
        let mut tasks = TaskList::new();
        for title in ["a", "b", "c"] {
            tasks.add(title, None, 0.0);
        }
        let mut d = Diagram::new();
        let before = linked_item(&mut d, 0);
        let at = linked_item(&mut d, 1);
        let after = linked_item(&mut d, 2);
        d.set_current_task(2);

        let removed = remove_task(&mut tasks, &mut d, 1);
        assert_eq!(removed, vec![1]);
        assert_eq!(d.get_item(&before).unwrap().task_index, Some(0));
        assert_eq!(d.get_item(&at).unwrap().task_index, None);
        assert_eq!(d.get_item(&after).unwrap().task_index, Some(1));
        assert_eq!(d.current_task, Some(1));
    }

    #[test]
    fn removal_takes_subtree_with_references() {
        let mut tasks = TaskList::new();
        tasks.add("parent", None, 0.0);
        tasks.add("tail", None, 0.0);
        tasks.add("child", Some(0), 0.0);
        // rows: parent(0), child(1), tail(2)
        let mut d = Diagram::new();
        let child_item = linked_item(&mut d, 1);
        let tail_item = linked_item(&mut d, 2);

        let removed = remove_task(&mut tasks, &mut d, 0);
        assert_eq!(removed, vec![0, 1]);
        assert_eq!(tasks.len(), 1);
        assert_eq!(d.get_item(&child_item).unwrap().task_index, None);
        assert_eq!(d.get_item(&tail_item).unwrap().task_index, Some(0));
    }

    #[test]
    fn unknown_index_is_a_noop() {
        let mut tasks = TaskList::new();
        tasks.add("a", None, 0.0);
        let mut d = Diagram::new();
        assert!(remove_task(&mut tasks, &mut d, 5).is_empty());
        assert_eq!(tasks.len(), 1);
    }
}
