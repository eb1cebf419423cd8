//! Student archetype classification.
//!
//! An ordered rule table over a handful of signals; the first rule that
//! matches decides the archetype, and `Balancer` is the fallback.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::{Performance, StudentProfile};
use crate::task::{normalize_tasks, Priority, StudyTask};

/// Workload score used when re-classifying during plan refinement.
pub const REFINE_WORKLOAD_SCORE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    BurntOut,
    DeadlineFighter,
    Perfectionist,
    Explorer,
    Balancer,
}

impl Archetype {
    pub fn name(self) -> &'static str {
        match self {
            Archetype::BurntOut => "The Burnt-out Warrior",
            Archetype::DeadlineFighter => "The Deadline Fighter",
            Archetype::Perfectionist => "The Perfectionist",
            Archetype::Explorer => "The Explorer",
            Archetype::Balancer => "The Balancer",
        }
    }

    /// Stable key for templates and JSON output.
    pub fn template_key(self) -> &'static str {
        match self {
            Archetype::BurntOut => "burnt_out",
            Archetype::DeadlineFighter => "deadline_fighter",
            Archetype::Perfectionist => "perfectionist",
            Archetype::Explorer => "explorer",
            Archetype::Balancer => "balancer",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Archetype::BurntOut => {
                "You are capable, but you are carrying too much while your energy is at rock bottom. Burnout risk is very high."
            }
            Archetype::DeadlineFighter => {
                "You run on adrenaline. You have the energy, but urgent tasks are piling up faster than you clear them."
            }
            Archetype::Perfectionist => {
                "You do well, but you tend to spend too long on one thing and run short of time for the rest."
            }
            Archetype::Explorer => {
                "You are fresh and have room to spare. This is the moment to go deep or study ahead."
            }
            Archetype::Balancer => {
                "You are keeping a steady pace. Not too much pressure, not too much idle time."
            }
        }
    }

    pub fn schedule_style(self) -> &'static str {
        match self {
            Archetype::BurntOut => {
                "Recovery Mode: very short sessions (25m) with long breaks (15m). Cut every non-urgent task."
            }
            Archetype::DeadlineFighter => {
                "Sprint Mode: strict time-boxing with zero distractions. 'Eat the Frog' right away."
            }
            Archetype::Perfectionist => {
                "Optimization Mode: set a hard stop for each task and apply the 80/20 rule."
            }
            Archetype::Explorer => {
                "Deep Dive Mode: long deep-work sessions (90m) focused on extended study."
            }
            Archetype::Balancer => {
                "Consistency Mode: standard Pomodoro (25/5), kept up every day."
            }
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Archetype::BurntOut => "❤️‍🩹",
            Archetype::DeadlineFighter => "🔥",
            Archetype::Perfectionist => "💎",
            Archetype::Explorer => "🚀",
            Archetype::Balancer => "⚖️",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.name())
    }
}

/// Everything a classification rule is allowed to look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeSignals {
    pub energy_level: i32,
    pub performance: Performance,
    pub workload_score: f64,
    pub high_priority_count: usize,
    pub mean_hours: f64,
}

impl ArchetypeSignals {
    pub fn collect(tasks: &[StudyTask], profile: &StudentProfile, workload_score: f64) -> Self {
        let tasks = normalize_tasks(tasks);
        let total: f64 = tasks.iter().map(|t| t.estimated_hours).sum();
        let mean_hours = if tasks.is_empty() {
            0.0
        } else {
            total / tasks.len() as f64
        };

        Self {
            energy_level: profile.normalized().energy_level,
            performance: profile.performance,
            workload_score,
            high_priority_count: tasks.iter().filter(|t| t.priority == Priority::High).count(),
            mean_hours,
        }
    }
}

pub type ArchetypeRule = fn(&ArchetypeSignals) -> bool;

/// Evaluated top to bottom; first match wins.
pub const ARCHETYPE_RULES: &[(Archetype, ArchetypeRule)] = &[
    (Archetype::BurntOut, |s| s.energy_level <= 4 && s.workload_score >= 7.0),
    (Archetype::DeadlineFighter, |s| {
        s.high_priority_count >= 3 && s.energy_level >= 6
    }),
    (Archetype::Perfectionist, |s| {
        matches!(s.performance, Performance::Good | Performance::Excellent) && s.mean_hours > 3.0
    }),
    (Archetype::Explorer, |s| s.energy_level >= 8 && s.workload_score <= 5.0),
];

/// Heuristic intensity in 1..=10: half a point per hour plus two per hard task.
pub fn workload_score(tasks: &[StudyTask]) -> f64 {
    let tasks = normalize_tasks(tasks);
    let total_hours: f64 = tasks.iter().map(|t| t.estimated_hours).sum();
    let hard = tasks.iter().filter(|t| t.difficulty.is_hard()).count();
    (total_hours * 0.5 + hard as f64 * 2.0).clamp(1.0, 10.0)
}

pub fn classify_signals(signals: &ArchetypeSignals) -> Archetype {
    ARCHETYPE_RULES
        .iter()
        .find(|(_, rule)| rule(signals))
        .map(|(archetype, _)| *archetype)
        .unwrap_or(Archetype::Balancer)
}

pub fn classify(tasks: &[StudyTask], profile: &StudentProfile, workload_score: f64) -> Archetype {
    let signals = ArchetypeSignals::collect(tasks, profile, workload_score);
    let archetype = classify_signals(&signals);
    tracing::debug!(archetype = archetype.template_key(), ?signals, "classified student");
    archetype
}
