//! Task CRUD over a pluggable store.
//!
//! The store only knows how to load and save the whole list; every mutation
//! here is load, change, save. Lists are small (tens of tasks).

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::task::{clamp_hours, Difficulty, Priority, StudyTask, DEFAULT_HOURS};

/// Persistence collaborator. The CLI backs this with a JSON file.
pub trait TaskStore {
    fn load(&self) -> Result<Vec<StudyTask>>;
    fn save(&mut self, tasks: &[StudyTask]) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tasks: Vec<StudyTask>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<StudyTask>) -> Self {
        Self { tasks }
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Result<Vec<StudyTask>> {
        Ok(self.tasks.clone())
    }

    fn save(&mut self, tasks: &[StudyTask]) -> Result<()> {
        self.tasks = tasks.to_vec();
        Ok(())
    }
}

/// Unvalidated user input for a new task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub subject: String,
    pub description: String,
    pub deadline: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub difficulty: Difficulty,
    pub priority: Priority,
    pub icon: Option<String>,
}

impl TaskDraft {
    pub fn new(subject: impl Into<String>, deadline: NaiveDate) -> Self {
        Self {
            subject: subject.into(),
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    pub fn into_task(self) -> Result<StudyTask> {
        let subject = self.subject.trim();
        if subject.is_empty() {
            bail!("subject is required");
        }
        let Some(deadline) = self.deadline else {
            bail!("deadline is required");
        };

        let raw_hours = self.estimated_hours.unwrap_or(DEFAULT_HOURS);
        let hours = clamp_hours(raw_hours);
        if hours != raw_hours {
            tracing::warn!(raw_hours, hours, "estimated hours clamped");
        }

        let mut task = StudyTask::new(subject, deadline)
            .with_hours(hours)
            .with_difficulty(self.difficulty)
            .with_priority(self.priority)
            .with_description(self.description.trim());
        task.icon = self.icon.filter(|i| !i.trim().is_empty());
        Ok(task)
    }
}

/// Task list operations over a `TaskStore`.
#[derive(Debug, Clone)]
pub struct TaskBook<S: TaskStore> {
    store: S,
}

impl<S: TaskStore> TaskBook<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All tasks, normalized.
    pub fn tasks(&self) -> Result<Vec<StudyTask>> {
        Ok(self.store.load()?.iter().map(StudyTask::normalized).collect())
    }

    pub fn get(&self, id: &str) -> Result<Option<StudyTask>> {
        Ok(self.tasks()?.into_iter().find(|t| t.id == id))
    }

    pub fn add(&mut self, draft: TaskDraft) -> Result<StudyTask> {
        let task = draft.into_task()?;
        let mut tasks = self.tasks()?;
        if tasks.iter().any(|t| t.id == task.id) {
            bail!("task id {} already exists", task.id);
        }
        tasks.push(task.clone());
        self.store.save(&tasks)?;
        tracing::info!(id = %task.id, subject = %task.subject, "task added");
        Ok(task)
    }

    pub fn remove(&mut self, id: &str) -> Result<StudyTask> {
        let mut tasks = self.tasks()?;
        let Some(pos) = tasks.iter().position(|t| t.id == id) else {
            bail!("no task with id {id}");
        };
        let removed = tasks.remove(pos);
        self.store.save(&tasks)?;
        tracing::info!(id, "task removed");
        Ok(removed)
    }

    /// Flip the completion flag; returns the updated task.
    pub fn toggle_completion(&mut self, id: &str) -> Result<StudyTask> {
        self.update(id, |t| t.is_completed = !t.is_completed)
    }

    /// Set the focus-session override. Blank input leaves the task unchanged.
    pub fn set_session_duration(&mut self, id: &str, duration: &str) -> Result<StudyTask> {
        let duration = duration.trim();
        if duration.is_empty() {
            return match self.get(id)? {
                Some(task) => Ok(task),
                None => bail!("no task with id {id}"),
            };
        }
        self.update(id, |t| t.custom_session_duration = Some(duration.to_string()))
    }

    fn update(&mut self, id: &str, change: impl FnOnce(&mut StudyTask)) -> Result<StudyTask> {
        let mut tasks = self.tasks()?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            bail!("no task with id {id}");
        };
        change(task);
        let updated = task.clone();
        self.store.save(&tasks)?;
        tracing::info!(id, "task updated");
        Ok(updated)
    }
}
