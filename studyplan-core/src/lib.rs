//! studyplan-core: task model, wellbeing scoring and archetypes for the
//! studyplan assistant. No I/O here; storage and LLM access are injected.

pub mod agenda;
pub mod archetype;
pub mod focus;
pub mod guidebook;
pub mod mentor;
pub mod profile;
pub mod prompts;
pub mod query;
pub mod stats;
pub mod task;
pub mod taskbook;
pub mod time;
pub mod wellbeing;

pub use agenda::{daily_plan, recommend_session, AgendaEntry, SessionKind, SessionRecommendation};
pub use archetype::{classify, workload_score, Archetype, ArchetypeSignals, ARCHETYPE_RULES};
pub use focus::{FocusTimer, TimerMode};
pub use guidebook::{extract_mermaid, parse_sections, split_bold, GuideLine, GuideSection, Span};
pub use mentor::{GenerationKind, GenerationRequest, Mentor, MentorReply, TextGenerator};
pub use profile::{LearningStyle, Performance, StudentProfile, StudyMethod};
pub use prompts::{ChatContext, ChatRole, ChatTurn, MindMapOptions, PlanContext};
pub use query::{SortOrder, TaskQuery};
pub use stats::{analyze, difficulty_distribution, workload_bars, HoursSummary, TaskAnalysis};
pub use task::{Difficulty, Priority, StudyTask};
pub use taskbook::{MemoryStore, TaskBook, TaskDraft, TaskStore};
pub use time::{days_until, parse_deadline};
pub use wellbeing::{
    compute_wellbeing, compute_wellbeing_with, CapacityLevel, PressureLevel, ScoreBreakdown,
    ScoringPolicy, WellbeingFactors, WellbeingStats, WorkloadLevel,
};
