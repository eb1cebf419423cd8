//! Descriptive statistics over the task list.

use serde::{Deserialize, Serialize};

use crate::task::{normalize_tasks, Difficulty, StudyTask};

const BAR_LABEL_MAX: usize = 10;
const BAR_LABEL_KEEP: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HoursSummary {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl HoursSummary {
    pub fn from_tasks(tasks: &[StudyTask]) -> Self {
        let mut hours: Vec<f64> = normalize_tasks(tasks)
            .iter()
            .map(|t| t.estimated_hours)
            .collect();
        if hours.is_empty() {
            return Self::default();
        }

        let count = hours.len();
        let total: f64 = hours.iter().sum();
        let mean = total / count as f64;
        let variance = hours.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / count as f64;

        hours.sort_by(f64::total_cmp);
        let median = if count % 2 == 0 {
            (hours[count / 2 - 1] + hours[count / 2]) / 2.0
        } else {
            hours[count / 2]
        };

        Self {
            count,
            total,
            mean,
            median,
            std_dev: variance.sqrt(),
        }
    }
}

/// Non-empty difficulty buckets, easiest first.
pub fn difficulty_distribution(tasks: &[StudyTask]) -> Vec<(Difficulty, usize)> {
    Difficulty::ALL
        .iter()
        .map(|d| (*d, tasks.iter().filter(|t| t.difficulty == *d).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadBar {
    pub label: String,
    pub hours: f64,
    pub difficulty_score: u8,
}

/// Chart label: subjects longer than ten characters keep the first eight.
pub fn bar_label(subject: &str) -> String {
    if subject.chars().count() > BAR_LABEL_MAX {
        let head: String = subject.chars().take(BAR_LABEL_KEEP).collect();
        format!("{head}...")
    } else {
        subject.to_string()
    }
}

pub fn workload_bars(tasks: &[StudyTask]) -> Vec<WorkloadBar> {
    normalize_tasks(tasks)
        .iter()
        .map(|t| WorkloadBar {
            label: bar_label(&t.subject),
            hours: t.estimated_hours,
            difficulty_score: t.difficulty.score(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAnalysis {
    pub total_hours: f64,
    /// Mean of the 1-4 difficulty scores; 0 when there are no tasks.
    pub average_difficulty: f64,
    pub hardest_subject: Option<String>,
}

pub fn analyze(tasks: &[StudyTask]) -> TaskAnalysis {
    let tasks = normalize_tasks(tasks);
    let total_hours = tasks.iter().map(|t| t.estimated_hours).sum();
    let average_difficulty = if tasks.is_empty() {
        0.0
    } else {
        tasks.iter().map(|t| f64::from(t.difficulty.score())).sum::<f64>() / tasks.len() as f64
    };

    let mut hardest: Option<&StudyTask> = None;
    for task in &tasks {
        if hardest.is_none_or(|h| task.difficulty.score() > h.difficulty.score()) {
            hardest = Some(task);
        }
    }

    TaskAnalysis {
        total_hours,
        average_difficulty,
        hardest_subject: hardest.map(|t| t.subject.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(subject: &str, hours: f64, difficulty: Difficulty) -> StudyTask {
        StudyTask::new(subject, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap())
            .with_hours(hours)
            .with_difficulty(difficulty)
    }

    #[test]
    fn summary_of_empty_list_is_zero() {
        assert_eq!(HoursSummary::from_tasks(&[]), HoursSummary::default());
    }

    #[test]
    fn summary_median_and_spread() {
        let tasks = vec![
            task("a", 2.0, Difficulty::Easy),
            task("b", 4.0, Difficulty::Easy),
            task("c", 4.0, Difficulty::Easy),
            task("d", 6.0, Difficulty::Easy),
        ];
        let s = HoursSummary::from_tasks(&tasks);
        assert_eq!(s.count, 4);
        assert_eq!(s.total, 16.0);
        assert_eq!(s.mean, 4.0);
        assert_eq!(s.median, 4.0);
        assert!((s.std_dev - 2.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn distribution_skips_empty_buckets() {
        let tasks = vec![
            task("a", 1.0, Difficulty::Hard),
            task("b", 1.0, Difficulty::Easy),
            task("c", 1.0, Difficulty::Hard),
        ];
        assert_eq!(
            difficulty_distribution(&tasks),
            vec![(Difficulty::Easy, 1), (Difficulty::Hard, 2)]
        );
    }

    #[test]
    fn long_labels_are_truncated() {
        assert_eq!(bar_label("Physics"), "Physics");
        assert_eq!(bar_label("Literature"), "Literature");
        assert_eq!(bar_label("Linear Algebra"), "Linear A...");
    }

    #[test]
    fn analysis_picks_first_hardest() {
        let tasks = vec![
            task("Essay", 3.0, Difficulty::Medium),
            task("Calculus", 5.0, Difficulty::VeryHard),
            task("Compilers", 8.0, Difficulty::VeryHard),
        ];
        let a = analyze(&tasks);
        assert_eq!(a.total_hours, 16.0);
        assert!((a.average_difficulty - 10.0 / 3.0).abs() < 1e-9);
        assert_eq!(a.hardest_subject.as_deref(), Some("Calculus"));

        assert_eq!(analyze(&[]).hardest_subject, None);
    }
}
