use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use super::item::opt_index;
use crate::util::timeparse::{self, ParseError};

/// A single tracked task with time accounting.
///
/// Titles and completion are owned here; linked diagram items mirror them
/// for display only (see `ops::sync`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Accumulated working time, in minutes
    #[serde(default)]
    pub time_spent: f64,
    /// Epoch seconds when timing started. Not persisted: a loaded task is
    /// idle until completion is toggled again.
    #[serde(skip)]
    pub started_at: Option<f64>,
    #[serde(default, with = "opt_index")]
    pub parent_index: Option<usize>,
    #[serde(default)]
    pub indent_level: usize,
    /// Custom estimate in minutes, overriding the running average
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_estimate: Option<f64>,
    /// Countdown timer length in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_duration: Option<f64>,
    /// Epoch seconds when the countdown was (re)started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_start: Option<f64>,
    /// Reminder timestamp, epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_at: Option<f64>,
}

impl Task {
    pub fn new(title: String) -> Self {
        Task {
            title,
            completed: false,
            time_spent: 0.0,
            started_at: None,
            parent_index: None,
            indent_level: 0,
            custom_estimate: None,
            countdown_duration: None,
            countdown_start: None,
            reminder_at: None,
        }
    }

    /// Seconds remaining on the countdown, or `None` when no timer is set
    pub fn countdown_remaining(&self, now: f64) -> Option<f64> {
        let (duration, start) = (self.countdown_duration?, self.countdown_start?);
        Some((duration - (now - start)).max(0.0))
    }

    /// Countdown progress in [0, 1], counting down from 1
    pub fn countdown_progress(&self, now: f64) -> Option<f64> {
        let (duration, start) = (self.countdown_duration?, self.countdown_start?);
        if duration <= 0.0 {
            return Some(0.0);
        }
        Some((1.0 - (now - start) / duration).clamp(0.0, 1.0))
    }

    /// True when the countdown ran out before the task was completed
    pub fn countdown_expired(&self, now: f64) -> bool {
        if self.completed {
            return false;
        }
        match (self.countdown_duration, self.countdown_start) {
            (Some(duration), Some(start)) => now - start >= duration,
            _ => false,
        }
    }

    pub fn countdown_active(&self) -> bool {
        self.countdown_duration.is_some() && self.countdown_start.is_some()
    }
}

/// Ordered task list for one tab. Indentation levels encode the subtree
/// structure; children follow their parent contiguously.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        TaskList { tasks: Vec::new() }
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        TaskList { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Task> {
        self.tasks.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Add a task, starting its clock at `now`. With a parent, the new task
    /// is inserted after the parent's existing subtree at one deeper indent.
    /// Returns the insertion index, or `None` for a blank title.
    pub fn add(&mut self, title: &str, parent: Option<usize>, now: f64) -> Option<usize> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let mut task = Task::new(title.to_string());
        task.started_at = Some(now);

        let mut insert_pos = self.tasks.len();
        if let Some(parent_row) = parent
            && parent_row < self.tasks.len()
        {
            let indent = self.tasks[parent_row].indent_level + 1;
            task.parent_index = Some(parent_row);
            task.indent_level = indent;
            insert_pos = parent_row + 1;
            while insert_pos < self.tasks.len() && self.tasks[insert_pos].indent_level >= indent {
                insert_pos += 1;
            }
        }

        self.tasks.insert(insert_pos, task);
        Some(insert_pos)
    }

    /// Rename a task. Blank titles and unknown indices are ignored.
    /// Returns true when the title actually changed.
    pub fn rename(&mut self, index: usize, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        match self.tasks.get_mut(index) {
            Some(task) if task.title != title => {
                task.title = title.to_string();
                true
            }
            _ => false,
        }
    }

    /// Set completion. Completing finalizes elapsed time and clears any
    /// countdown; un-completing restarts the clock.
    pub fn set_completed(&mut self, index: usize, completed: bool, now: f64) {
        let Some(task) = self.tasks.get_mut(index) else {
            return;
        };
        task.completed = completed;
        if completed {
            if let Some(started) = task.started_at.take() {
                task.time_spent += (now - started) / 60.0;
            }
            task.countdown_duration = None;
            task.countdown_start = None;
        } else {
            task.started_at = Some(now);
        }
    }

    /// Reorder a task to a new index. Out-of-range indices are ignored.
    pub fn move_task(&mut self, from: usize, to: usize) {
        if from == to || from >= self.tasks.len() || to >= self.tasks.len() {
            return;
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
    }

    /// Remove the task at `index` together with its subtree. Returns the
    /// removed row indices in ascending order, so callers can fix up
    /// diagram references (see `ops::task_ops::remove_task`).
    pub fn remove_at(&mut self, index: usize) -> Vec<usize> {
        let Some(task) = self.tasks.get(index) else {
            return Vec::new();
        };
        let indent = task.indent_level;
        let mut end = index + 1;
        while end < self.tasks.len() && self.tasks[end].indent_level > indent {
            end += 1;
        }
        self.tasks.drain(index..end);
        let count = end - index;
        for task in &mut self.tasks {
            task.parent_index = match task.parent_index {
                Some(p) if p >= end => Some(p - count),
                Some(p) if p >= index => None,
                other => other,
            };
        }
        (index..end).collect()
    }

    /// Fold elapsed wall time into `time_spent` for running tasks. Called
    /// periodically for display; correctness never depends on the cadence.
    pub fn tick(&mut self, now: f64) {
        for task in &mut self.tasks {
            if !task.completed
                && let Some(started) = task.started_at
            {
                task.time_spent += (now - started) / 60.0;
                task.started_at = Some(now);
            }
        }
    }

    // --- Derived metrics ---------------------------------------------------

    /// Completed percentage; 0 for an empty list, never NaN.
    pub fn percentage_complete(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        completed as f64 / self.tasks.len() as f64 * 100.0
    }

    /// Average recorded time over completed tasks, in minutes
    pub fn average_task_time(&self) -> f64 {
        let times: Vec<f64> = self
            .tasks
            .iter()
            .filter(|t| t.completed && t.time_spent > 0.0)
            .map(|t| t.time_spent)
            .collect();
        if times.is_empty() {
            return 0.0;
        }
        times.iter().sum::<f64>() / times.len() as f64
    }

    /// Estimated minutes for one task: recorded time when completed, the
    /// custom estimate when set, else the running average.
    pub fn estimate_task_time(&self, index: usize) -> f64 {
        let Some(task) = self.tasks.get(index) else {
            return 0.0;
        };
        if task.completed {
            return task.time_spent;
        }
        if let Some(estimate) = task.custom_estimate {
            return estimate;
        }
        self.average_task_time()
    }

    /// Total estimated minutes over all incomplete tasks
    pub fn total_estimated_time(&self) -> f64 {
        (0..self.tasks.len())
            .filter(|&i| !self.tasks[i].completed)
            .map(|i| self.estimate_task_time(i))
            .sum()
    }

    /// Cumulative minutes until the task at `index` completes, counting the
    /// remaining time of the task currently being worked on.
    pub fn estimate_completion_time(&self, index: usize) -> f64 {
        let Some(task) = self.tasks.get(index) else {
            return 0.0;
        };
        if task.completed {
            return 0.0;
        }
        let Some(first) = self.tasks.iter().position(|t| !t.completed) else {
            return 0.0;
        };

        let mut cumulative = 0.0;
        for i in first..=index {
            if self.tasks[i].completed {
                continue;
            }
            let estimate = self.estimate_task_time(i);
            if estimate == 0.0 {
                continue;
            }
            if i == first {
                cumulative += (estimate - self.tasks[i].time_spent).max(0.0);
            } else {
                cumulative += estimate;
            }
        }
        cumulative
    }

    /// Wall-clock time of day when the task at `index` is estimated to
    /// complete, formatted `%H:%M`; empty when there is no estimate.
    pub fn estimated_time_of_day(&self, index: usize, now: DateTime<Local>) -> String {
        let minutes = self.estimate_completion_time(index);
        if minutes == 0.0 {
            return String::new();
        }
        format_eta(now, minutes)
    }

    /// Time of day when everything remaining is estimated to complete
    pub fn estimated_completion_time_of_day(&self, now: DateTime<Local>) -> String {
        let total = self.total_estimated_time();
        if total == 0.0 {
            return String::new();
        }
        format_eta(now, total)
    }

    /// Title of the first incomplete task, the one being worked on
    pub fn current_active_task_title(&self) -> &str {
        self.tasks
            .iter()
            .find(|t| !t.completed)
            .map(|t| t.title.as_str())
            .unwrap_or("")
    }

    // --- Countdown and estimates -------------------------------------------

    /// Set a countdown timer from a duration string (`"30s"`, `"2m"`,
    /// `"1.5h"`, bare seconds). Rejects invalid input without mutating.
    pub fn set_countdown(&mut self, index: usize, input: &str, now: f64) -> Result<(), ParseError> {
        let secs = timeparse::parse_duration_secs(input)?;
        if let Some(task) = self.tasks.get_mut(index) {
            task.countdown_duration = Some(secs);
            task.countdown_start = Some(now);
        }
        Ok(())
    }

    pub fn clear_countdown(&mut self, index: usize) {
        if let Some(task) = self.tasks.get_mut(index) {
            task.countdown_duration = None;
            task.countdown_start = None;
        }
    }

    /// Restart an existing countdown to its full duration
    pub fn restart_countdown(&mut self, index: usize, now: f64) {
        if let Some(task) = self.tasks.get_mut(index)
            && task.countdown_duration.is_some()
        {
            task.countdown_start = Some(now);
        }
    }

    /// Set or clear (empty input) a custom estimate from a time string
    /// (`"45"`, `"30m"`, `"2h"`). Rejects invalid input without mutating.
    pub fn set_custom_estimate(&mut self, index: usize, input: &str) -> Result<(), ParseError> {
        let estimate = if input.trim().is_empty() {
            None
        } else {
            Some(timeparse::parse_estimate_minutes(input)?)
        };
        if let Some(task) = self.tasks.get_mut(index) {
            task.custom_estimate = estimate;
        }
        Ok(())
    }

    /// Set a reminder from a date/time string. Rejects invalid input
    /// without mutating.
    pub fn set_reminder(
        &mut self,
        index: usize,
        input: &str,
        now: DateTime<Local>,
    ) -> Result<(), ParseError> {
        let at = timeparse::parse_reminder(input, now)?;
        if let Some(task) = self.tasks.get_mut(index) {
            task.reminder_at = Some(at);
        }
        Ok(())
    }

    /// Extract a parent's child subtree as a standalone list with
    /// normalized indentation and parent indices (drill-down into a tab).
    pub fn subtasks_of(&self, parent_row: usize) -> TaskList {
        let Some(parent) = self.tasks.get(parent_row) else {
            return TaskList::new();
        };
        let base_indent = parent.indent_level + 1;
        let mut out: Vec<Task> = Vec::new();
        let mut last_at_level: Vec<Option<usize>> = Vec::new();

        for task in self.tasks[parent_row + 1..]
            .iter()
            .take_while(|t| t.indent_level > parent.indent_level)
        {
            let level = task.indent_level.saturating_sub(base_indent);
            let mut copy = task.clone();
            copy.indent_level = level;
            copy.parent_index = if level == 0 {
                None
            } else {
                last_at_level.get(level - 1).copied().flatten()
            };

            last_at_level.truncate(level + 1);
            while last_at_level.len() <= level {
                last_at_level.push(None);
            }
            out.push(copy);
            last_at_level[level] = Some(out.len() - 1);
        }

        TaskList::from_tasks(out)
    }
}

fn format_eta(now: DateTime<Local>, minutes: f64) -> String {
    let eta = now + Duration::seconds((minutes * 60.0) as i64);
    eta.format("%H:%M").to_string()
}
