//! Filtering and sorting for the task table.

use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::task::{Difficulty, StudyTask};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    DeadlineAsc,
    DeadlineDesc,
    DifficultyDesc,
    DifficultyAsc,
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "deadline" | "deadline-asc" => Ok(SortOrder::DeadlineAsc),
            "deadline-desc" => Ok(SortOrder::DeadlineDesc),
            "difficulty" | "difficulty-desc" => Ok(SortOrder::DifficultyDesc),
            "difficulty-asc" => Ok(SortOrder::DifficultyAsc),
            _ => bail!("unknown sort order '{s}'"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub sort: SortOrder,
}

impl TaskQuery {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn matches(&self, task: &StudyTask) -> bool {
        if let Some(d) = self.difficulty {
            if task.difficulty != d {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                task.subject.to_lowercase().contains(&term)
                    || task.description.to_lowercase().contains(&term)
            }
        }
    }

    /// Matching tasks in the requested order. Ties keep input order.
    pub fn apply(&self, tasks: &[StudyTask]) -> Vec<StudyTask> {
        let mut out: Vec<StudyTask> = tasks.iter().filter(|t| self.matches(t)).cloned().collect();
        match self.sort {
            SortOrder::DeadlineAsc => out.sort_by(|a, b| a.deadline.cmp(&b.deadline)),
            SortOrder::DeadlineDesc => out.sort_by(|a, b| b.deadline.cmp(&a.deadline)),
            SortOrder::DifficultyDesc => out.sort_by(|a, b| b.difficulty.score().cmp(&a.difficulty.score())),
            SortOrder::DifficultyAsc => out.sort_by_key(|t| t.difficulty.score()),
        }
        out
    }
}
