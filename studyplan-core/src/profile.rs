//! Student self-assessment used by the scoring engine and prompts.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Deserializer, Serialize};

use crate::task::{lenient, lenient_option};

pub const MIN_ENERGY: i32 = 1;
pub const MAX_ENERGY: i32 = 10;
pub const DEFAULT_ENERGY: i32 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    Weak,
    Average,
    #[default]
    Good,
    Excellent,
}

impl Performance {
    pub fn label(self) -> &'static str {
        match self {
            Performance::Weak => "Weak",
            Performance::Average => "Average",
            Performance::Good => "Good",
            Performance::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Performance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weak" => Ok(Performance::Weak),
            "average" | "avg" => Ok(Performance::Average),
            "good" => Ok(Performance::Good),
            "excellent" => Ok(Performance::Excellent),
            _ => bail!("unknown performance '{s}' (expected weak, average, good, excellent)"),
        }
    }
}

/// VARK learning style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    Visual,
    Auditory,
    ReadWrite,
    Kinesthetic,
    Mixed,
}

impl LearningStyle {
    pub fn label(self) -> &'static str {
        match self {
            LearningStyle::Visual => "Visual",
            LearningStyle::Auditory => "Auditory",
            LearningStyle::ReadWrite => "Read/Write",
            LearningStyle::Kinesthetic => "Kinesthetic",
            LearningStyle::Mixed => "Mixed",
        }
    }
}

impl FromStr for LearningStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match key.as_str() {
            "visual" | "v" => Ok(LearningStyle::Visual),
            "auditory" | "aural" | "a" => Ok(LearningStyle::Auditory),
            "readwrite" | "reading" | "r" => Ok(LearningStyle::ReadWrite),
            "kinesthetic" | "k" => Ok(LearningStyle::Kinesthetic),
            "mixed" | "multimodal" => Ok(LearningStyle::Mixed),
            _ => bail!("unknown learning style '{s}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMethod {
    Pomodoro,
    Flowtime,
    TimeBlocking,
    SpacedRepetition,
    Feynman,
    Other(String),
}

impl StudyMethod {
    pub fn label(&self) -> &str {
        match self {
            StudyMethod::Pomodoro => "Pomodoro",
            StudyMethod::Flowtime => "Flowtime",
            StudyMethod::TimeBlocking => "Time blocking",
            StudyMethod::SpacedRepetition => "Spaced repetition",
            StudyMethod::Feynman => "Feynman technique",
            StudyMethod::Other(name) => name,
        }
    }
}

impl FromStr for StudyMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            bail!("study method must not be empty");
        }
        let key: String = trimmed
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        Ok(match key.as_str() {
            "pomodoro" => StudyMethod::Pomodoro,
            "flowtime" | "flow" => StudyMethod::Flowtime,
            "timeblocking" | "timeblock" => StudyMethod::TimeBlocking,
            "spacedrepetition" | "spaced" => StudyMethod::SpacedRepetition,
            "feynman" | "feynmantechnique" => StudyMethod::Feynman,
            _ => StudyMethod::Other(trimmed.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default, deserialize_with = "lenient")]
    pub performance: Performance,

    /// 1-10.
    #[serde(default = "default_energy", deserialize_with = "deserialize_energy")]
    pub energy_level: i32,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub learning_style: Option<LearningStyle>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub study_method: Option<StudyMethod>,
}

fn default_energy() -> i32 {
    DEFAULT_ENERGY
}

/// Non-integer energy (fractions, strings, null) falls back to the default.
fn deserialize_energy<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_option(deserializer)?.unwrap_or(DEFAULT_ENERGY))
}

impl Default for StudentProfile {
    fn default() -> Self {
        Self {
            performance: Performance::default(),
            energy_level: DEFAULT_ENERGY,
            learning_style: None,
            study_method: None,
        }
    }
}

impl StudentProfile {
    pub fn new(performance: Performance, energy_level: i32) -> Self {
        Self {
            performance,
            energy_level: energy_level.clamp(MIN_ENERGY, MAX_ENERGY),
            learning_style: None,
            study_method: None,
        }
    }

    pub fn with_learning_style(mut self, style: LearningStyle) -> Self {
        self.learning_style = Some(style);
        self
    }

    pub fn with_study_method(mut self, method: StudyMethod) -> Self {
        self.study_method = Some(method);
        self
    }

    pub fn normalized(&self) -> StudentProfile {
        let mut profile = self.clone();
        profile.energy_level = profile.energy_level.clamp(MIN_ENERGY, MAX_ENERGY);
        profile
    }

    pub fn learning_style_label(&self) -> &str {
        self.learning_style.map_or("Mixed", LearningStyle::label)
    }

    pub fn study_method_label(&self) -> &str {
        self.study_method.as_ref().map_or("Pomodoro", StudyMethod::label)
    }
}
