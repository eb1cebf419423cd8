use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use studyplan_core::{ChatTurn, StudentProfile, StudyTask, TaskStore};

pub const HOME_ENV: &str = "STUDYPLAN_HOME";
const TASKS_SCHEMA_VERSION: u32 = 1;

pub fn studyplan_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set (or set STUDYPLAN_HOME)")?;
    Ok(PathBuf::from(home).join(".studyplan"))
}

pub fn ensure_studyplan_home() -> Result<PathBuf> {
    let dir = studyplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskFile {
    schema_version: u32,
    tasks: Vec<StudyTask>,
}

/// `tasks.json` under the studyplan home.
#[derive(Debug, Clone)]
pub struct JsonTaskStore {
    path: PathBuf,
}

impl JsonTaskStore {
    pub fn open() -> Result<Self> {
        Ok(Self::at(ensure_studyplan_home()?.join("tasks.json")))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for JsonTaskStore {
    fn load(&self) -> Result<Vec<StudyTask>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file: TaskFile = read_json(&self.path)?;
        if file.schema_version > TASKS_SCHEMA_VERSION {
            bail!(
                "{} has schema_version {} (this build reads up to {})",
                self.path.display(),
                file.schema_version,
                TASKS_SCHEMA_VERSION
            );
        }
        Ok(file.tasks)
    }

    fn save(&mut self, tasks: &[StudyTask]) -> Result<()> {
        let file = TaskFile {
            schema_version: TASKS_SCHEMA_VERSION,
            tasks: tasks.to_vec(),
        };
        write_json(&self.path, &file)?;
        tracing::info!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}

pub fn profile_path() -> Result<PathBuf> {
    Ok(ensure_studyplan_home()?.join("profile.json"))
}

/// Saved profile, or the default one when none exists yet.
pub fn read_profile() -> Result<StudentProfile> {
    let p = profile_path()?;
    if !p.exists() {
        return Ok(StudentProfile::default());
    }
    let profile: StudentProfile = read_json(&p)?;
    Ok(profile.normalized())
}

pub fn write_profile(profile: &StudentProfile) -> Result<()> {
    write_json(&profile_path()?, profile)
}

pub fn guidebook_path() -> Result<PathBuf> {
    Ok(ensure_studyplan_home()?.join("guidebook.md"))
}

pub fn read_guidebook() -> Result<Option<String>> {
    let p = guidebook_path()?;
    if !p.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(Some(s))
}

pub fn write_guidebook(markdown: &str) -> Result<()> {
    let p = guidebook_path()?;
    fs::write(&p, markdown).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn chat_path() -> Result<PathBuf> {
    Ok(ensure_studyplan_home()?.join("chat.json"))
}

pub fn read_chat_history() -> Result<Vec<ChatTurn>> {
    let p = chat_path()?;
    if !p.exists() {
        return Ok(Vec::new());
    }
    read_json(&p)
}

pub fn write_chat_history(turns: &[ChatTurn]) -> Result<()> {
    write_json(&chat_path()?, turns)
}

pub fn clear_chat_history() -> Result<()> {
    let p = chat_path()?;
    if p.exists() {
        fs::remove_file(&p).with_context(|| format!("remove {}", p.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use studyplan_core::task::{DEFAULT_HOURS, UNTITLED_SUBJECT};
    use studyplan_core::{Difficulty, Priority, TaskBook};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("studyplan-{name}-{nanos}.json"))
    }

    #[test]
    fn json_store_round_trips_with_schema_wrapper() {
        let path = temp_file("store");
        let mut store = JsonTaskStore::at(path.clone());
        assert!(store.load().unwrap().is_empty());

        let task = StudyTask::new("Calculus", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()).with_id("a");
        store.save(&[task.clone()]).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["schema_version"], 1);
        assert_eq!(store.load().unwrap(), vec![task]);
        fs::remove_file(path).ok();
    }

    #[test]
    fn malformed_records_load_with_defaults() {
        let path = temp_file("malformed");
        fs::write(
            &path,
            r#"{"schema_version": 1, "tasks": [
                {"id":"a","subject":"Calculus","deadline":"2026-03-02","estimatedHours":"5"},
                {"id":"b","subject":null,"deadline":"2026-03-03","estimated_hours":40},
                {"id":"c","subject":"Art","deadline":"2026-03-04","difficulty":null,"priority":null},
                {"id":"d","subject":"Music","deadline":"2026-03-05","difficulty":"Extreme","priority":"asap"}
            ]}"#,
        )
        .unwrap();

        let book = TaskBook::new(JsonTaskStore::at(path.clone()));
        let tasks = book.tasks().unwrap();
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].estimated_hours, DEFAULT_HOURS);
        assert_eq!(tasks[1].subject, UNTITLED_SUBJECT);
        assert_eq!(tasks[1].estimated_hours, 24.0);
        for t in &tasks[2..] {
            assert_eq!(t.difficulty, Difficulty::Medium);
            assert_eq!(t.priority, Priority::Medium);
        }
        fs::remove_file(path).ok();
    }

    #[test]
    fn newer_schema_is_rejected() {
        let path = temp_file("schema");
        fs::write(&path, r#"{"schema_version": 99, "tasks": []}"#).unwrap();
        let err = JsonTaskStore::at(path.clone()).load().unwrap_err();
        assert!(err.to_string().contains("schema_version 99"));
        fs::remove_file(path).ok();
    }
}
