//! Daily action plan: what to work on next and in what session shape.

use serde::{Deserialize, Serialize};

use crate::task::{Difficulty, StudyTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    DeepWork,
    QuickWin,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionRecommendation {
    pub kind: SessionKind,
    pub duration: &'static str,
}

impl SessionRecommendation {
    pub fn label(&self) -> &'static str {
        match self.kind {
            SessionKind::DeepWork => "Deep Work",
            SessionKind::QuickWin => "Quick Win",
            SessionKind::Standard => "Standard",
        }
    }
}

pub fn recommend_session(hours: f64, difficulty: Difficulty) -> SessionRecommendation {
    if difficulty.is_hard() {
        SessionRecommendation {
            kind: SessionKind::DeepWork,
            duration: "45-60m",
        }
    } else if hours < 1.0 {
        SessionRecommendation {
            kind: SessionKind::QuickWin,
            duration: "15-25m",
        }
    } else {
        SessionRecommendation {
            kind: SessionKind::Standard,
            duration: "30-45m",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaEntry {
    pub task: StudyTask,
    pub recommendation: SessionRecommendation,
}

impl AgendaEntry {
    pub fn display_duration(&self) -> &str {
        self.task
            .custom_session_duration
            .as_deref()
            .unwrap_or(self.recommendation.duration)
    }
}

/// Pending tasks: highest priority, then earliest deadline, then hardest.
pub fn daily_plan(tasks: &[StudyTask]) -> Vec<AgendaEntry> {
    let mut pending: Vec<StudyTask> = tasks
        .iter()
        .filter(|t| !t.is_completed)
        .map(StudyTask::normalized)
        .collect();

    pending.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then_with(|| a.deadline.cmp(&b.deadline))
            .then_with(|| b.difficulty.score().cmp(&a.difficulty.score()))
    });

    pending
        .into_iter()
        .map(|task| {
            let recommendation = recommend_session(task.estimated_hours, task.difficulty);
            AgendaEntry { task, recommendation }
        })
        .collect()
}
