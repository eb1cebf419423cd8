//! Prompt templates for the study mentor.
//!
//! Plain strings, no model-specific formatting. Every builder takes already
//! computed scores so the templates stay free of scoring logic.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::archetype::{classify, workload_score, Archetype, REFINE_WORKLOAD_SCORE};
use crate::profile::StudentProfile;
use crate::task::{normalize_tasks, StudyTask};
use crate::wellbeing::{compute_wellbeing_with, ScoringPolicy, WellbeingStats};

pub const CHAT_PLAN_CHARS: usize = 2000;
pub const REFINE_PLAN_CHARS: usize = 1500;
pub const CHAT_HISTORY_TURNS: usize = 6;

/// Section headings the generated guidebook is asked to use.
pub const GUIDEBOOK_SECTIONS: [&str; 5] = [
    "Learning Profile",
    "Core Strategy",
    "Personal Roadmap",
    "Personal Advice",
    "Wellbeing",
];

/// First `max` characters of `text`, with `...` appended when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Everything the study-plan prompt reports about the student.
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub tasks: Vec<StudyTask>,
    pub profile: StudentProfile,
    pub stats: WellbeingStats,
    pub workload_score: f64,
    pub archetype: Archetype,
}

impl PlanContext {
    pub fn build<Z: TimeZone>(
        tasks: &[StudyTask],
        profile: &StudentProfile,
        now: &DateTime<Z>,
        policy: &ScoringPolicy,
    ) -> Self {
        let tasks = normalize_tasks(tasks);
        let profile = profile.normalized();
        let stats = compute_wellbeing_with(&tasks, &profile, now, policy);
        let workload_score = workload_score(&tasks);
        let archetype = classify(&tasks, &profile, workload_score);
        Self {
            tasks,
            profile,
            stats,
            workload_score,
            archetype,
        }
    }
}

fn tasks_json(tasks: &[StudyTask]) -> String {
    serde_json::to_string_pretty(tasks).unwrap_or_else(|_| "[]".to_string())
}

pub fn study_plan_prompt(ctx: &PlanContext) -> String {
    let p = &ctx.profile;
    let s = &ctx.stats;
    let a = ctx.archetype;
    let style = p.learning_style_label();
    let method = p.study_method_label();
    let [profile_h, strategy_h, roadmap_h, advice_h, wellbeing_h] = GUIDEBOOK_SECTIONS;

    format!(
        r#"Role: you are "StudyPlan Mentor", an educational psychologist and time-management coach who personalizes everything.

STUDENT DATA:
- Profile: performance {performance}, energy {energy}/10.
- Learning style (VARK): **{style}**.
- Preferred method: **{method}**.
- Workload score: {workload:.1}/10.
- Stats: {count} tasks, {hours} hours in total.

WELLBEING ANALYSIS (objective, computed):
- CURRENT wellbeing (before the plan): **{current}/100**.
- PROJECTED wellbeing (after the plan): **{projected}/100**.
- Key factors: workload ({workload_f}), deadline pressure ({pressure_f}), personal energy ({capacity_f}).
=> Explain why the score goes up, e.g. less deadline pressure through prioritization, or splitting an overloaded workload into digestible pieces.

STUDENT ARCHETYPE:
- Type: **{name}** {icon}
- Traits: {description}
- Schedule style: {schedule}

TASKS:
{tasks}

OUTPUT (Markdown):
Write a highly personal plan that talks directly to the "{name}" archetype.

*SPECIAL NOTES*:
- The student learns in a "{style}" way; suggest approaches that fit.
- Apply the "{method}" method when designing the schedule.
- EMPHASIZE raising wellbeing from {current} to {projected}.

### 👤 {profile_h}
- **Archetype**: {name}
- **Learning style**: {style} (one quick tip to make the most of it).
- **Wellbeing impact**: from **{current}** ➔ **{projected}** / 100.
- **Factors**: {workload_f} | {pressure_f} | {capacity_f}. (One sentence on what this means.)

### 📊 {strategy_h} (based on {schedule} + {method})
- Explain how today is arranged.
- **Tactics**: how to use {method} for the specific tasks above.
- **Golden rule for today**: one rule the student must remember.

### 📅 {roadmap_h}
*IMPORTANT: build the timeline around "{schedule}" and split blocks by "{method}".*

Present it as a list with icons, for example:
**Day 1 - [date]**:
- 08:00 - 08:25: [icon] Task A (block 1 - {method})
- 08:25 - 08:30: Short break
- ...

### 💡 {advice_h}
- Specifically for "{performance}" performance.
- Specifically for energy {energy}.
- **{style} corner**: a memory tip that suits this learning style.

### 🧘 {wellbeing_h}
- One inspiring quote for "{name}".
"#,
        performance = p.performance,
        energy = p.energy_level,
        workload = ctx.workload_score,
        count = ctx.tasks.len(),
        hours = s.total_hours,
        current = s.current,
        projected = s.projected,
        workload_f = s.factors.workload.label(),
        pressure_f = s.factors.pressure.label(),
        capacity_f = s.factors.capacity.label(),
        name = a.name(),
        icon = a.icon(),
        description = a.description(),
        schedule = a.schedule_style(),
        tasks = tasks_json(&ctx.tasks),
    )
}

pub fn refine_prompt(tasks: &[StudyTask], plan: &str, comment: &str, profile: &StudentProfile) -> String {
    let archetype = classify(&normalize_tasks(tasks), profile, REFINE_WORKLOAD_SCORE);
    format!(
        r#"CONTEXT: you are StudyPlan Mentor.
STUDENT ARCHETYPE: {name} ({schedule}).
EXTENDED PROFILE: learns in a {style} way, prefers {method}.

CURRENT PLAN: {plan}
STUDENT FEEDBACK: "{comment}"

TASK: adjust the guidebook.
IMPORTANT:
1. Keep the Markdown structure ({sections}).
2. Every change must fit the "{name}" archetype and their learning style.
3. Update the concrete schedule to match what the student asked for.
"#,
        name = archetype.name(),
        schedule = archetype.schedule_style(),
        style = profile.learning_style_label(),
        method = profile.study_method_label(),
        plan = truncate_chars(plan, REFINE_PLAN_CHARS),
        comment = comment.trim(),
        sections = GUIDEBOOK_SECTIONS.join(", "),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMapOptions {
    pub show_difficulty: bool,
    pub show_hours: bool,
    pub show_deadline: bool,
}

impl Default for MindMapOptions {
    fn default() -> Self {
        Self {
            show_difficulty: true,
            show_hours: false,
            show_deadline: false,
        }
    }
}

/// Compact per-task objects: `s` subject, `d` difficulty, `h` hours, `dl` deadline.
pub fn mind_map_nodes(tasks: &[StudyTask], options: MindMapOptions) -> Vec<Value> {
    normalize_tasks(tasks)
        .iter()
        .map(|t| {
            let mut node = Map::new();
            node.insert("s".into(), json!(t.subject));
            if options.show_difficulty {
                node.insert("d".into(), json!(t.difficulty.label()));
            }
            if options.show_hours {
                node.insert("h".into(), json!(format!("{}h", t.estimated_hours)));
            }
            if options.show_deadline {
                node.insert("dl".into(), json!(t.deadline.format("%Y-%m-%d").to_string()));
            }
            Value::Object(node)
        })
        .collect()
}

pub fn mind_map_prompt(tasks: &[StudyTask], options: MindMapOptions) -> String {
    let nodes = serde_json::to_string_pretty(&mind_map_nodes(tasks, options))
        .unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"You are a visual-thinking and Mermaid.js expert.
DATA: {nodes}
REQUEST: produce Mermaid.js code of type "graph LR".
Output ONLY the code block.
"#
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    Student,
    Mentor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn student(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Student,
            content: content.into(),
        }
    }

    pub fn mentor(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Mentor,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatContext {
    pub plan: String,
    pub profile: StudentProfile,
    pub task_summary: String,
}

/// One line per pending task, used as chat context.
pub fn task_summary(tasks: &[StudyTask]) -> String {
    normalize_tasks(tasks)
        .iter()
        .filter(|t| !t.is_completed)
        .map(|t| {
            format!(
                "- {} ({}, {}h, due {})",
                t.subject,
                t.difficulty.label(),
                t.estimated_hours,
                t.deadline.format("%Y-%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn mentor_chat_prompt(message: &str, ctx: &ChatContext, history: &[ChatTurn]) -> String {
    let start = history.len().saturating_sub(CHAT_HISTORY_TURNS);
    let history_text = history[start..]
        .iter()
        .map(|turn| {
            let who = match turn.role {
                ChatRole::Student => "Student",
                ChatRole::Mentor => "Mentor",
            };
            format!("{who}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"ROLE: you are StudyPlan Mentor. You just wrote a study plan for this student.

CONTEXT (current plan, shortened):
{plan}

CONTEXT (student profile):
- Energy: {energy}/10
- Learning style: {style}
- Method: {method}

CONTEXT (open tasks):
{tasks}

TASK: answer the student's question about the plan you wrote.
- Explain WHY you arranged it that way.
- Encourage the student.
- If they want changes, point them to `studyplan refine`; here you only explain and advise.
- Keep the answer short (under 100 words), friendly, with emoji.

CHAT HISTORY:
{history_text}

STUDENT ASKS: "{message}"

MENTOR ANSWERS:
"#,
        plan = truncate_chars(&ctx.plan, CHAT_PLAN_CHARS),
        energy = ctx.profile.energy_level,
        style = ctx.profile.learning_style_label(),
        method = ctx.profile.study_method_label(),
        tasks = ctx.task_summary,
        message = message.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{LearningStyle, Performance};
    use crate::task::{Difficulty, Priority};
    use chrono::{NaiveDate, Utc};

    fn tasks() -> Vec<StudyTask> {
        vec![
            StudyTask::new("Calculus", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
                .with_id("1")
                .with_hours(5.0)
                .with_difficulty(Difficulty::Hard)
                .with_priority(Priority::High),
            StudyTask::new("Philosophy", NaiveDate::from_ymd_opt(2026, 3, 6).unwrap())
                .with_id("2")
                .with_hours(2.0)
                .with_difficulty(Difficulty::Easy),
        ]
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("héllo", 2), "hé...");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn study_plan_prompt_reports_scores_and_archetype() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let profile = StudentProfile::new(Performance::Average, 5).with_learning_style(LearningStyle::Visual);
        let ctx = PlanContext::build(&tasks(), &profile, &now, &ScoringPolicy::default());
        let prompt = study_plan_prompt(&ctx);

        assert!(prompt.contains(&format!("**{}/100**", ctx.stats.current)));
        assert!(prompt.contains(&format!("**{}/100**", ctx.stats.projected)));
        assert!(prompt.contains("Workload score: 5.5/10."));
        assert!(prompt.contains("2 tasks, 7 hours"));
        assert!(prompt.contains("**Visual**"));
        assert!(prompt.contains("**Pomodoro**"));
        assert!(prompt.contains(ctx.archetype.name()));
        assert!(prompt.contains("\"Calculus\""));
        for heading in GUIDEBOOK_SECTIONS {
            assert!(prompt.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn refine_prompt_truncates_plan() {
        let plan = "x".repeat(3000);
        let prompt = refine_prompt(&tasks(), &plan, "  more breaks please ", &StudentProfile::default());
        assert!(prompt.contains(&format!("{}...", "x".repeat(REFINE_PLAN_CHARS))));
        assert!(!prompt.contains(&"x".repeat(REFINE_PLAN_CHARS + 1)));
        assert!(prompt.contains("\"more breaks please\""));
    }

    #[test]
    fn mind_map_nodes_follow_options() {
        let nodes = mind_map_nodes(&tasks(), MindMapOptions::default());
        assert_eq!(nodes[0], json!({"s": "Calculus", "d": "Hard"}));

        let all = MindMapOptions {
            show_difficulty: false,
            show_hours: true,
            show_deadline: true,
        };
        let nodes = mind_map_nodes(&tasks(), all);
        assert_eq!(nodes[1], json!({"s": "Philosophy", "h": "2h", "dl": "2026-03-06"}));
        assert!(mind_map_prompt(&tasks(), all).contains("graph LR"));
    }

    #[test]
    fn chat_prompt_keeps_last_six_turns() {
        let history: Vec<ChatTurn> = (0..8)
            .map(|i| {
                if i % 2 == 0 {
                    ChatTurn::student(format!("question {i}"))
                } else {
                    ChatTurn::mentor(format!("answer {i}"))
                }
            })
            .collect();
        let ctx = ChatContext {
            plan: "p".repeat(2500),
            profile: StudentProfile::default(),
            task_summary: task_summary(&tasks()),
        };
        let prompt = mentor_chat_prompt("why so early?", &ctx, &history);

        assert!(!prompt.contains("question 0"));
        assert!(!prompt.contains("answer 1"));
        assert!(prompt.contains("Student: question 2"));
        assert!(prompt.contains("Mentor: answer 7"));
        assert!(prompt.contains(&format!("{}...", "p".repeat(CHAT_PLAN_CHARS))));
        assert!(prompt.contains("- Calculus (Hard, 5h, due 2026-03-02)"));
        assert!(prompt.contains("STUDENT ASKS: \"why so early?\""));
    }
}
