//! Study task model.
//!
//! Tasks arrive from user input, the JSON store and LLM output, so every
//! consumer normalizes before reading numbers out of them.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::NaiveDate;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

pub const MIN_HOURS: f64 = 0.5;
pub const MAX_HOURS: f64 = 24.0;
/// Used when an estimate is missing or not a finite number.
pub const DEFAULT_HOURS: f64 = 2.0;
pub const UNTITLED_SUBJECT: &str = "Untitled subject";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[serde(alias = "Easy")]
    Easy,
    #[default]
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Hard")]
    Hard,
    #[serde(alias = "VeryHard", alias = "very-hard")]
    VeryHard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::VeryHard,
    ];

    /// Display score used by charts and sorting (1-4).
    pub fn score(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::VeryHard => 4,
        }
    }

    pub fn is_hard(self) -> bool {
        matches!(self, Difficulty::Hard | Difficulty::VeryHard)
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::VeryHard => "Very hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "easy" | "e" => Ok(Difficulty::Easy),
            "medium" | "med" | "m" => Ok(Difficulty::Medium),
            "hard" | "h" => Ok(Difficulty::Hard),
            "veryhard" | "vh" => Ok(Difficulty::VeryHard),
            _ => bail!("unknown difficulty '{s}' (expected easy, medium, hard, very-hard)"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[serde(alias = "Low")]
    Low,
    #[default]
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl Priority {
    /// Ordering weight for the daily plan (High first).
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "lo" | "l" => Ok(Priority::Low),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "high" | "hi" | "h" => Ok(Priority::High),
            _ => bail!("unknown priority '{s}' (expected low, medium, high)"),
        }
    }
}

/// One academic assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyTask {
    pub id: String,

    #[serde(default, deserialize_with = "lenient")]
    pub subject: String,

    #[serde(default, deserialize_with = "lenient")]
    pub description: String,

    pub deadline: NaiveDate,

    /// Hours; clamped to 0.5..=24 by `normalized`.
    #[serde(
        default = "default_hours",
        alias = "estimatedHours",
        deserialize_with = "deserialize_hours"
    )]
    pub estimated_hours: f64,

    #[serde(default, deserialize_with = "lenient")]
    pub difficulty: Difficulty,

    #[serde(default, deserialize_with = "lenient")]
    pub priority: Priority,

    #[serde(default, alias = "isCompleted", deserialize_with = "lenient")]
    pub is_completed: bool,

    /// Focus-session override such as "45m" or "1.5h".
    #[serde(
        default,
        alias = "customSessionDuration",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_session_duration: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

fn default_hours() -> f64 {
    DEFAULT_HOURS
}

/// Either a well-formed `T` or anything else, so one bad field never
/// rejects the whole record.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

impl<T> Lenient<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Lenient::Valid(v) => Some(v),
            Lenient::Invalid(_) => None,
        }
    }
}

/// `None` when the value is present but malformed or null.
pub(crate) fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Lenient::<T>::deserialize(deserializer)?.into_option())
}

/// Malformed or null values become `T::default()`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(lenient_option(deserializer)?.unwrap_or_default())
}

/// Anything that is not a number (strings, null, objects) becomes
/// `DEFAULT_HOURS`.
fn deserialize_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_option(deserializer)?.unwrap_or(DEFAULT_HOURS))
}

/// Clamp an hour estimate into the accepted range. Non-finite input falls back
/// to `DEFAULT_HOURS`.
pub fn clamp_hours(hours: f64) -> f64 {
    if !hours.is_finite() {
        return DEFAULT_HOURS;
    }
    hours.clamp(MIN_HOURS, MAX_HOURS)
}

impl StudyTask {
    pub fn new(subject: impl Into<String>, deadline: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject: subject.into(),
            description: String::new(),
            deadline,
            estimated_hours: DEFAULT_HOURS,
            difficulty: Difficulty::Medium,
            priority: Priority::Medium,
            is_completed: false,
            custom_session_duration: None,
            icon: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = clamp_hours(hours);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Copy with hours clamped and a placeholder subject when blank.
    /// Applying it twice yields the same task.
    pub fn normalized(&self) -> StudyTask {
        let mut task = self.clone();
        task.estimated_hours = clamp_hours(task.estimated_hours);
        let subject = task.subject.trim();
        task.subject = if subject.is_empty() {
            UNTITLED_SUBJECT.to_string()
        } else {
            subject.to_string()
        };
        task
    }
}

pub fn normalize_tasks(tasks: &[StudyTask]) -> Vec<StudyTask> {
    tasks.iter().map(StudyTask::normalized).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn clamp_hours_bounds_and_nan() {
        assert_eq!(clamp_hours(100.0), 24.0);
        assert_eq!(clamp_hours(0.0), 0.5);
        assert_eq!(clamp_hours(-3.0), 0.5);
        assert_eq!(clamp_hours(3.5), 3.5);
        assert_eq!(clamp_hours(f64::NAN), DEFAULT_HOURS);
        assert_eq!(clamp_hours(f64::INFINITY), DEFAULT_HOURS);
    }

    #[test]
    fn normalized_is_idempotent() {
        let mut t = StudyTask::new("  ", date(2026, 3, 1));
        t.estimated_hours = 40.0;

        let once = t.normalized();
        let twice = once.normalized();
        assert_eq!(once, twice);
        assert_eq!(once.subject, UNTITLED_SUBJECT);
        assert_eq!(once.estimated_hours, 24.0);
    }

    #[test]
    fn deserialize_fills_defaults() {
        let json = r#"{"id":"t1","subject":"Calculus","deadline":"2026-03-01","estimated_hours":null}"#;
        let t: StudyTask = serde_json::from_str(json).unwrap();
        assert_eq!(t.estimated_hours, DEFAULT_HOURS);
        assert_eq!(t.difficulty, Difficulty::Medium);
        assert_eq!(t.priority, Priority::Medium);
        assert!(!t.is_completed);
    }

    #[test]
    fn deserialize_accepts_camel_case_fields() {
        let json = r#"{"id":"t1","subject":"Web","deadline":"2026-03-01","estimatedHours":8,"difficulty":"VeryHard","priority":"High","isCompleted":true}"#;
        let t: StudyTask = serde_json::from_str(json).unwrap();
        assert_eq!(t.estimated_hours, 8.0);
        assert_eq!(t.difficulty, Difficulty::VeryHard);
        assert_eq!(t.priority, Priority::High);
        assert!(t.is_completed);
    }

    #[test]
    fn malformed_fields_fall_back_to_defaults() {
        let json = r#"{"id":"t1","subject":null,"description":7,"deadline":"2026-03-01",
            "estimatedHours":"5","difficulty":null,"priority":null,"isCompleted":null,
            "customSessionDuration":45,"icon":false}"#;
        let t: StudyTask = serde_json::from_str(json).unwrap();
        assert_eq!(t.subject, "");
        assert_eq!(t.description, "");
        assert_eq!(t.estimated_hours, DEFAULT_HOURS);
        assert_eq!(t.difficulty, Difficulty::Medium);
        assert_eq!(t.priority, Priority::Medium);
        assert!(!t.is_completed);
        assert_eq!(t.custom_session_duration, None);
        assert_eq!(t.icon, None);
        assert_eq!(t.normalized().subject, UNTITLED_SUBJECT);
    }

    #[test]
    fn unknown_enum_values_become_medium() {
        let json = r#"{"id":"t1","subject":"Art","deadline":"2026-03-01","difficulty":"Extreme","priority":"urgent"}"#;
        let t: StudyTask = serde_json::from_str(json).unwrap();
        assert_eq!(t.difficulty, Difficulty::Medium);
        assert_eq!(t.priority, Priority::Medium);
    }

    #[test]
    fn well_formed_values_survive_lenient_parsing() {
        let json = r#"{"id":"t1","subject":"Art","deadline":"2026-03-01","estimated_hours":3.5,
            "difficulty":"very_hard","priority":"low","is_completed":true,
            "custom_session_duration":"50m","icon":"🎨"}"#;
        let t: StudyTask = serde_json::from_str(json).unwrap();
        assert_eq!(t.estimated_hours, 3.5);
        assert_eq!(t.difficulty, Difficulty::VeryHard);
        assert_eq!(t.priority, Priority::Low);
        assert!(t.is_completed);
        assert_eq!(t.custom_session_duration.as_deref(), Some("50m"));
        assert_eq!(t.icon.as_deref(), Some("🎨"));
    }

    #[test]
    fn parse_enum_aliases() {
        assert_eq!("very-hard".parse::<Difficulty>().unwrap(), Difficulty::VeryHard);
        assert_eq!("Very_Hard".parse::<Difficulty>().unwrap(), Difficulty::VeryHard);
        assert_eq!("HI".parse::<Priority>().unwrap(), Priority::High);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn builder_clamps_hours() {
        let t = StudyTask::new("Physics", date(2026, 3, 1)).with_hours(0.1);
        assert_eq!(t.estimated_hours, 0.5);
    }
}
