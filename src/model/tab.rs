use super::diagram::Diagram;
use super::task::TaskList;

pub const MAX_PRIORITY: u8 = 3;

/// One workspace tab: a task list with its linked diagram canvas.
#[derive(Debug, Clone, Default)]
pub struct Tab {
    pub name: String,
    /// Display priority, 0 (none) through 3 (highest)
    pub priority: u8,
    pub tasks: TaskList,
    pub diagram: Diagram,
}

impl Tab {
    pub fn new(name: &str) -> Self {
        Tab {
            name: name.to_string(),
            priority: 0,
            tasks: TaskList::new(),
            diagram: Diagram::new(),
        }
    }
}

/// A whole project: an ordered set of tabs, at least one of which always
/// exists, plus the index of the tab currently shown.
#[derive(Debug, Clone)]
pub struct Project {
    tabs: Vec<Tab>,
    active_tab: usize,
}

impl Default for Project {
    fn default() -> Self {
        Project::new()
    }
}

impl Project {
    /// A fresh project starts with a single empty tab.
    pub fn new() -> Self {
        Project {
            tabs: vec![Tab::new("Main")],
            active_tab: 0,
        }
    }

    /// Rebuild from loaded tabs. An empty list falls back to the default
    /// single tab; an out-of-range active index is clamped.
    pub fn from_tabs(mut tabs: Vec<Tab>, active_tab: usize) -> Self {
        if tabs.is_empty() {
            tabs.push(Tab::new("Main"));
        }
        let active_tab = active_tab.min(tabs.len() - 1);
        Project { tabs, active_tab }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    pub fn tab_mut(&mut self, index: usize) -> Option<&mut Tab> {
        self.tabs.get_mut(index)
    }

    pub fn active_tab(&self) -> usize {
        self.active_tab
    }

    pub fn active(&self) -> &Tab {
        &self.tabs[self.active_tab]
    }

    pub fn active_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active_tab]
    }

    pub fn set_active_tab(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.active_tab = index;
        }
    }

    pub fn find_tab(&self, name: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.name == name)
    }

    /// Append a new empty tab and return its index.
    pub fn add_tab(&mut self, name: &str) -> usize {
        self.tabs.push(Tab::new(name));
        self.tabs.len() - 1
    }

    /// Remove a tab, keeping the active index on the same tab where
    /// possible. The last remaining tab cannot be removed.
    pub fn remove_tab(&mut self, index: usize) -> bool {
        if self.tabs.len() <= 1 || index >= self.tabs.len() {
            return false;
        }
        self.tabs.remove(index);
        if self.active_tab > index || self.active_tab >= self.tabs.len() {
            self.active_tab = self.active_tab.saturating_sub(1);
        }
        true
    }

    /// Rename a tab. Blank names and unknown indices are ignored.
    pub fn rename_tab(&mut self, index: usize, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.tabs.get_mut(index) {
            Some(tab) if tab.name != name => {
                tab.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    /// Reorder a tab, keeping the active tab pointing at the same tab.
    pub fn move_tab(&mut self, from: usize, to: usize) {
        if from == to || from >= self.tabs.len() || to >= self.tabs.len() {
            return;
        }
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        self.active_tab = if self.active_tab == from {
            to
        } else if from < self.active_tab && self.active_tab <= to {
            self.active_tab - 1
        } else if to <= self.active_tab && self.active_tab < from {
            self.active_tab + 1
        } else {
            self.active_tab
        };
    }

    pub fn set_priority(&mut self, index: usize, priority: u8) {
        if let Some(tab) = self.tabs.get_mut(index) {
            tab.priority = priority.min(MAX_PRIORITY);
        }
    }

    /// Open (or create) the tab dedicated to one task of the tab at
    /// `tab_index`, named after the task's title, and make it active. A
    /// newly created tab is seeded with the task's subtree as its own list.
    /// Returns the target tab index.
    pub fn drill_to_task(&mut self, tab_index: usize, task_row: usize) -> Option<usize> {
        let title = self.tabs.get(tab_index)?.tasks.get(task_row)?.title.clone();
        let target = match self.find_tab(&title) {
            Some(existing) => existing,
            None => {
                let subtasks = self.tabs[tab_index].tasks.subtasks_of(task_row);
                let index = self.add_tab(&title);
                self.tabs[index].tasks = subtasks;
                index
            }
        };
        self.active_tab = target;
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project(names: &[&str]) -> Project {
        let mut p = Project::new();
        p.rename_tab(0, names[0]);
        for name in &names[1..] {
            p.add_tab(name);
        }
        p
    }

    #[test]
    fn new_project_has_one_tab() {
        let p = Project::new();
        assert_eq!(p.tabs().len(), 1);
        assert_eq!(p.active_tab(), 0);
    }

    #[test]
    fn last_tab_cannot_be_removed() {
        let mut p = Project::new();
        assert!(!p.remove_tab(0));
        assert_eq!(p.tabs().len(), 1);
    }

    #[test]
    fn removing_earlier_tab_keeps_active_stable() {
        let mut p = project(&["a", "b", "c"]);
        p.set_active_tab(2);
        assert!(p.remove_tab(0));
        assert_eq!(p.active().name, "c");
        assert_eq!(p.active_tab(), 1);
    }

    #[test]
    fn removing_active_last_tab_clamps() {
        let mut p = project(&["a", "b"]);
        p.set_active_tab(1);
        assert!(p.remove_tab(1));
        assert_eq!(p.active_tab(), 0);
    }

    #[test]
    fn move_tab_follows_active() {
        let mut p = project(&["a", "b", "c"]);
        p.set_active_tab(0);
        p.move_tab(0, 2);
        assert_eq!(p.active().name, "a");
        assert_eq!(p.active_tab(), 2);

        p.move_tab(0, 1); // b, c, a -> c, b, a
        assert_eq!(p.active().name, "a");
    }

    #[test]
    fn priority_is_clamped() {
        let mut p = Project::new();
        p.set_priority(0, 9);
        assert_eq!(p.tab(0).unwrap().priority, 3);
    }

    #[test]
    fn drill_creates_tab_seeded_with_subtasks() {
        let mut p = Project::new();
        {
            let tasks = &mut p.active_mut().tasks;
            tasks.add("Build backend", None, 0.0);
            tasks.add("Schema", Some(0), 0.0);
            tasks.add("API", Some(0), 0.0);
        }
        let target = p.drill_to_task(0, 0).unwrap();
        assert_eq!(p.active_tab(), target);
        assert_eq!(p.active().name, "Build backend");
        let titles: Vec<&str> = p.active().tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Schema", "API"]);
    }

    #[test]
    fn drill_reuses_existing_tab() {
        let mut p = Project::new();
        p.active_mut().tasks.add("Ship it", None, 0.0);
        p.add_tab("Ship it");
        let target = p.drill_to_task(0, 0).unwrap();
        assert_eq!(target, 1);
        assert_eq!(p.tabs().len(), 2);
    }

    #[test]
    fn from_tabs_clamps_active_and_never_empty() {
        let p = Project::from_tabs(Vec::new(), 7);
        assert_eq!(p.tabs().len(), 1);
        assert_eq!(p.active_tab(), 0);

        let p = Project::from_tabs(vec![Tab::new("a"), Tab::new("b")], 9);
        assert_eq!(p.active_tab(), 1);
    }
}
