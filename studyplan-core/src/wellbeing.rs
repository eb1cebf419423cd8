//! Workload & wellbeing scoring engine.
//!
//! Deterministic model: weighted demand and deadline pressure are compared
//! against a capacity derived from energy and self-assessed performance. The
//! resulting stress ratio maps onto a 10..=98 wellbeing index, and a second
//! pass models the effect of following the coaching plan.
//!
//! Pure: no clock, no I/O. The caller passes `now`.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::profile::{Performance, StudentProfile};
use crate::task::{normalize_tasks, Difficulty, Priority, StudyTask};
use crate::time::days_until;

/// Daily capacity of an average student, in weighted hours.
pub const BASE_DAILY_CAPACITY: f64 = 10.0;
/// Wellbeing points lost per unit of stress ratio.
pub const STRESS_SLOPE: f64 = 35.0;
pub const CURRENT_MIN: f64 = 10.0;
pub const CURRENT_MAX: f64 = 98.0;

const URGENCY_LOAD_SHARE: f64 = 0.8;
const OPTIMIZED_LOAD_FACTOR: f64 = 0.85;
const OPTIMIZED_CAPACITY_FACTOR: f64 = 1.15;
const CAPACITY_EPSILON: f64 = 1e-9;

pub fn difficulty_weight(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 1.0,
        Difficulty::Medium => 1.4,
        Difficulty::Hard => 2.2,
        Difficulty::VeryHard => 3.0,
    }
}

pub fn priority_multiplier(priority: Priority) -> f64 {
    match priority {
        Priority::High => 1.5,
        Priority::Medium => 1.1,
        Priority::Low => 1.0,
    }
}

pub fn urgency_multiplier(diff_days: i64) -> f64 {
    match diff_days {
        d if d <= 1 => 2.5,
        d if d <= 3 => 1.8,
        d if d <= 7 => 1.2,
        _ => 1.0,
    }
}

pub fn efficiency(performance: Performance) -> f64 {
    match performance {
        Performance::Weak => 0.8,
        Performance::Average => 0.9,
        Performance::Good => 1.1,
        Performance::Excellent => 1.25,
    }
}

/// Energy 1..=10 maps to 0.68..=1.4.
pub fn energy_capacity(energy_level: i32) -> f64 {
    0.6 + f64::from(energy_level) / 12.5
}

/// Knobs of the "projected" pass.
///
/// `min_improvement` is the guaranteed gain shown to the student even when the
/// optimized model alone would show less.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub min_improvement: f64,
    pub projected_cap: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            min_improvement: 5.0,
            projected_cap: 99.0,
        }
    }
}

impl ScoringPolicy {
    /// Policy that keeps `current <= projected <= 100`: a negative gain
    /// becomes 0, a cap is held in `CURRENT_MAX..=100`, and non-finite
    /// values take the defaults.
    pub fn normalized(&self) -> ScoringPolicy {
        let defaults = ScoringPolicy::default();
        let min_improvement = if self.min_improvement.is_finite() {
            self.min_improvement.max(0.0)
        } else {
            defaults.min_improvement
        };
        let projected_cap = if self.projected_cap.is_finite() {
            self.projected_cap.clamp(CURRENT_MAX, 100.0)
        } else {
            defaults.projected_cap
        };
        ScoringPolicy {
            min_improvement,
            projected_cap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadLevel {
    Overloaded,
    Balanced,
    Light,
}

impl WorkloadLevel {
    pub fn label(self) -> &'static str {
        match self {
            WorkloadLevel::Overloaded => "Overloaded",
            WorkloadLevel::Balanced => "Balanced",
            WorkloadLevel::Light => "Light",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureLevel {
    Urgent,
    Stable,
}

impl PressureLevel {
    pub fn label(self) -> &'static str {
        match self {
            PressureLevel::Urgent => "Urgent (deadline-driven)",
            PressureLevel::Stable => "Stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityLevel {
    LowEnergy,
    Ready,
}

impl CapacityLevel {
    pub fn label(self) -> &'static str {
        match self {
            CapacityLevel::LowEnergy => "Low energy",
            CapacityLevel::Ready => "Ready",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellbeingFactors {
    pub workload: WorkloadLevel,
    pub pressure: PressureLevel,
    pub capacity: CapacityLevel,
}

/// Intermediate scalars of one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total_weighted_hours: f64,
    pub urgency_penalty: f64,
    pub energy_capacity: f64,
    pub efficiency: f64,
    pub total_capacity: f64,
    pub effective_load: f64,
    pub stress_ratio: f64,
    pub optimized_stress_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WellbeingStats {
    pub total_hours: f64,
    /// 10..=98, before any optimization.
    pub current: i32,
    /// At most 99; at least `current + min_improvement` unless capped.
    pub projected: i32,
    pub factors: WellbeingFactors,
    pub breakdown: ScoreBreakdown,
}

/// Score `tasks` for `profile` with the default policy.
pub fn compute_wellbeing<Z: TimeZone>(
    tasks: &[StudyTask],
    profile: &StudentProfile,
    now: &DateTime<Z>,
) -> WellbeingStats {
    compute_wellbeing_with(tasks, profile, now, &ScoringPolicy::default())
}

pub fn compute_wellbeing_with<Z: TimeZone>(
    tasks: &[StudyTask],
    profile: &StudentProfile,
    now: &DateTime<Z>,
    policy: &ScoringPolicy,
) -> WellbeingStats {
    let tasks = normalize_tasks(tasks);
    let profile = profile.normalized();
    let policy = policy.normalized();

    // Demand
    let mut total_weighted_hours = 0.0;
    let mut urgency_penalty = 0.0;
    for task in &tasks {
        total_weighted_hours += task.estimated_hours * difficulty_weight(task.difficulty);

        let urgency = urgency_multiplier(days_until(task.deadline, now));
        urgency_penalty += task.estimated_hours * urgency * priority_multiplier(task.priority);
    }

    // Capacity
    let energy_capacity = energy_capacity(profile.energy_level);
    let efficiency = efficiency(profile.performance);
    let total_capacity = BASE_DAILY_CAPACITY * energy_capacity * efficiency;

    let effective_load = total_weighted_hours.max(urgency_penalty * URGENCY_LOAD_SHARE);
    let stress_ratio = if tasks.is_empty() {
        0.0
    } else {
        effective_load / total_capacity.max(CAPACITY_EPSILON)
    };

    let current_raw = (100.0 - stress_ratio * STRESS_SLOPE).clamp(CURRENT_MIN, CURRENT_MAX);

    let optimized_load = effective_load * OPTIMIZED_LOAD_FACTOR;
    let optimized_capacity = (total_capacity * OPTIMIZED_CAPACITY_FACTOR).max(CAPACITY_EPSILON);
    let optimized_stress_ratio = optimized_load / optimized_capacity;
    let projected_candidate = 100.0 - optimized_stress_ratio * STRESS_SLOPE;

    let improvement = (projected_candidate - current_raw).max(policy.min_improvement);
    let projected_raw = (current_raw + improvement).min(policy.projected_cap);

    let factors = WellbeingFactors {
        workload: if stress_ratio > 1.3 {
            WorkloadLevel::Overloaded
        } else if stress_ratio > 0.8 {
            WorkloadLevel::Balanced
        } else {
            WorkloadLevel::Light
        },
        pressure: if urgency_penalty > total_weighted_hours * 1.4 {
            PressureLevel::Urgent
        } else {
            PressureLevel::Stable
        },
        capacity: if energy_capacity < 0.9 {
            CapacityLevel::LowEnergy
        } else {
            CapacityLevel::Ready
        },
    };

    let stats = WellbeingStats {
        total_hours: tasks.iter().map(|t| t.estimated_hours).sum(),
        current: current_raw.round() as i32,
        projected: projected_raw.round() as i32,
        factors,
        breakdown: ScoreBreakdown {
            total_weighted_hours,
            urgency_penalty,
            energy_capacity,
            efficiency,
            total_capacity,
            effective_load,
            stress_ratio,
            optimized_stress_ratio,
        },
    };

    tracing::debug!(
        tasks = tasks.len(),
        stress_ratio,
        current = stats.current,
        projected = stats.projected,
        "computed wellbeing"
    );

    stats
}
