//! In-memory task store.
//!
//! The store owns the only copy of every task for the lifetime of a session.
//! Callers read through slices and views and mutate only through the
//! operations below. Operations addressed by id are no-ops when the id is
//! unknown; they report that by returning `None`.

use crate::error::AppError;
use crate::model::{NewTask, Task, TaskPatch};
use crate::urgency::classify_urgency;
use log::debug;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Insertion order, as rearranged by `reorder`.
    #[default]
    Default,
    Impact,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Default => Self::Impact,
            Self::Impact => Self::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Impact => "impact",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "impact" => Ok(Self::Impact),
            other => Err(AppError::invalid_input(format!(
                "sort order must be default or impact (got '{other}')"
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    last_id_nanos: i128,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn add(&mut self, new_task: NewTask) -> &Task {
        self.add_at(new_task, OffsetDateTime::now_utc())
    }

    /// Appends a task created at `now`. The id is derived from the timestamp
    /// and bumped past the previous one so ids stay unique even when two
    /// tasks share a clock reading.
    pub fn add_at(&mut self, new_task: NewTask, now: OffsetDateTime) -> &Task {
        let nanos = now.unix_timestamp_nanos().max(self.last_id_nanos + 1);
        self.last_id_nanos = nanos;

        let task = Task {
            id: format!("task-{nanos}"),
            text: new_task.text,
            priority: new_task.priority,
            impact: new_task.impact,
            urgency: classify_urgency(new_task.due_date, now),
            due_date: new_task.due_date,
            delegated_to: new_task.delegated_to,
            completed: new_task.completed,
            created_at: now,
        };
        debug!(
            "event=task_add id={} urgency={} position={}",
            task.id,
            task.urgency,
            self.tasks.len()
        );

        let index = self.tasks.len();
        self.tasks.push(task);
        &self.tasks[index]
    }

    pub fn toggle(&mut self, id: &str) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.completed = !task.completed;
        debug!("event=task_toggle id={} completed={}", task.id, task.completed);
        Some(&*task)
    }

    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);
        debug!("event=task_delete id={} position={}", removed.id, index);
        Some(removed)
    }

    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Option<&Task> {
        self.update_at(id, patch, OffsetDateTime::now_utc())
    }

    /// Merges `patch` into the task and re-derives its urgency against `now`.
    pub fn update_at(&mut self, id: &str, patch: TaskPatch, now: OffsetDateTime) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;

        if let Some(text) = patch.text {
            task.text = text;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(impact) = patch.impact {
            task.impact = impact;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(delegated_to) = patch.delegated_to {
            task.delegated_to = delegated_to;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.urgency = classify_urgency(task.due_date, now);

        debug!("event=task_update id={} urgency={}", task.id, task.urgency);
        Some(&*task)
    }

    /// Moves the task at `from` so that it ends up at `to`, shifting the
    /// tasks in between. Both indices must address existing tasks.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), AppError> {
        let len = self.tasks.len();
        if from >= len || to >= len {
            return Err(AppError::invalid_input(format!(
                "position out of range (have {len} tasks)"
            )));
        }

        let task = self.tasks.remove(from);
        debug!("event=task_reorder id={} from={} to={}", task.id, from, to);
        self.tasks.insert(to, task);
        Ok(())
    }

    /// Tasks ranked by impact, high first. Ties keep storage order.
    pub fn sorted_by_impact(&self) -> Vec<&Task> {
        let mut view: Vec<&Task> = self.tasks.iter().collect();
        view.sort_by_key(|task| task.impact.rank());
        view
    }

    pub fn view(&self, order: SortOrder) -> Vec<&Task> {
        match order {
            SortOrder::Default => self.tasks.iter().collect(),
            SortOrder::Impact => self.sorted_by_impact(),
        }
    }

    pub fn delegated(&self, order: SortOrder) -> Vec<&Task> {
        self.view(order)
            .into_iter()
            .filter(|task| task.delegated_to.is_some())
            .collect()
    }
}
