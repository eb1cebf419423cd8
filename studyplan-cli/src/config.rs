use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use chrono_tz::Tz;
use studyplan_core::ScoringPolicy;

use crate::state::ensure_studyplan_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub planner: PlannerSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// "gemini", "openai" or "anthropic".
    pub provider: String,
    pub model: String,
    /// Empty means the provider's public endpoint.
    pub base_url: String,
    pub temperature: f32,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub max_tokens: u32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: String::new(),
            temperature: 0.7,
            api_key_env: "GEMINI_API_KEY".to_string(),
            max_tokens: 4096,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSection {
    /// IANA zone used to decide which calendar day "now" is.
    pub timezone: String,
    /// Guaranteed wellbeing gain shown for the coached plan.
    pub min_improvement: f64,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            min_improvement: ScoringPolicy::default().min_improvement,
        }
    }
}

impl PlannerSection {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid planner.timezone '{}': {e}", self.timezone))
    }

    pub fn scoring_policy(&self) -> ScoringPolicy {
        let policy = ScoringPolicy {
            min_improvement: self.min_improvement,
            ..ScoringPolicy::default()
        }
        .normalized();
        if policy.min_improvement != self.min_improvement {
            tracing::warn!(
                configured = self.min_improvement,
                used = policy.min_improvement,
                "planner.min_improvement out of range"
            );
        }
        policy
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// tracing filter directive; RUST_LOG takes precedence.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_studyplan_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
