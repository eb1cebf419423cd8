//! Plain-text terminal output.

use std::fmt::Write;

use studyplan_core::{
    AgendaEntry, Archetype, GuideLine, GuideSection, HoursSummary, Span, StudentProfile, StudyTask,
    TaskAnalysis, WellbeingStats,
};
use studyplan_core::stats::WorkloadBar;
use studyplan_core::Difficulty;

fn spans(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|s| match s {
            Span::Plain(t) => t.clone(),
            Span::Bold(t) => t.to_uppercase(),
        })
        .collect()
}

pub fn task_table(tasks: &[StudyTask]) -> String {
    if tasks.is_empty() {
        return "No tasks yet. Add one with: studyplan task add <subject> --deadline <date>\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<24} {:<10} {:>6} {:<9} {:<6} {}",
        "ID", "SUBJECT", "DEADLINE", "HOURS", "DIFF", "PRIO", "DONE"
    );
    for t in tasks {
        let subject = match &t.icon {
            Some(icon) => format!("{icon} {}", t.subject),
            None => t.subject.clone(),
        };
        let _ = writeln!(
            out,
            "{:<10} {:<24} {:<10} {:>6.1} {:<9} {:<6} {}",
            short_id(&t.id),
            subject,
            t.deadline.format("%Y-%m-%d"),
            t.estimated_hours,
            t.difficulty.label(),
            t.priority.label(),
            if t.is_completed { "yes" } else { "" }
        );
    }
    out
}

/// First eight characters of a task id; enough to address it on the CLI.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

pub fn profile(p: &StudentProfile) -> String {
    format!(
        "Performance:    {}\nEnergy:         {}/10\nLearning style: {}\nStudy method:   {}\n",
        p.performance,
        p.energy_level,
        p.learning_style_label(),
        p.study_method_label()
    )
}

pub fn wellbeing(stats: &WellbeingStats, archetype: Archetype, workload_score: f64, explain: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Wellbeing now:       {}/100", stats.current);
    let _ = writeln!(out, "With a coached plan: {}/100", stats.projected);
    let _ = writeln!(
        out,
        "Factors:             {} | {} | {}",
        stats.factors.workload.label(),
        stats.factors.pressure.label(),
        stats.factors.capacity.label()
    );
    let _ = writeln!(out, "Total hours:         {}", stats.total_hours);
    let _ = writeln!(out, "Workload score:      {workload_score:.1}/10");
    let _ = writeln!(out, "Archetype:           {archetype}");
    let _ = writeln!(out, "  {}", archetype.description());
    let _ = writeln!(out, "  {}", archetype.schedule_style());

    if explain {
        let b = &stats.breakdown;
        let _ = writeln!(out, "\nBreakdown:");
        let _ = writeln!(out, "  weighted hours     {:.2}", b.total_weighted_hours);
        let _ = writeln!(out, "  urgency penalty    {:.2}", b.urgency_penalty);
        let _ = writeln!(out, "  effective load     {:.2}", b.effective_load);
        let _ = writeln!(out, "  energy capacity    {:.2}", b.energy_capacity);
        let _ = writeln!(out, "  efficiency         {:.2}", b.efficiency);
        let _ = writeln!(out, "  total capacity     {:.2}", b.total_capacity);
        let _ = writeln!(out, "  stress ratio       {:.3}", b.stress_ratio);
        let _ = writeln!(out, "  optimized ratio    {:.3}", b.optimized_stress_ratio);
    }
    out
}

pub fn stats(
    summary: &HoursSummary,
    analysis: &TaskAnalysis,
    distribution: &[(Difficulty, usize)],
    bars: &[WorkloadBar],
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Tasks: {}  total {}h  mean {:.1}h  median {:.1}h  sd {:.2}",
        summary.count, summary.total, summary.mean, summary.median, summary.std_dev
    );
    let _ = writeln!(out, "Average difficulty: {:.2}/4", analysis.average_difficulty);
    if let Some(subject) = &analysis.hardest_subject {
        let _ = writeln!(out, "Hardest subject:    {subject}");
    }
    if !distribution.is_empty() {
        let _ = writeln!(out, "\nDifficulty:");
        for (d, n) in distribution {
            let _ = writeln!(out, "  {:<10} {}", d.label(), "#".repeat(*n));
        }
    }
    if !bars.is_empty() {
        let _ = writeln!(out, "\nHours by task:");
        for bar in bars {
            let width = bar.hours.round() as usize;
            let _ = writeln!(out, "  {:<11} {:<24} {}h", bar.label, "=".repeat(width), bar.hours);
        }
    }
    out
}

pub fn agenda(entries: &[AgendaEntry]) -> String {
    if entries.is_empty() {
        return "Nothing pending. Enjoy the break.\n".to_string();
    }
    let mut out = String::new();
    for (i, e) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. [{}] {} ({}, due {}) - {} {}",
            i + 1,
            e.task.priority.label(),
            e.task.subject,
            e.task.difficulty.label(),
            e.task.deadline.format("%Y-%m-%d"),
            e.recommendation.label(),
            e.display_duration()
        );
    }
    out
}

pub fn guidebook(sections: &[GuideSection]) -> String {
    let mut out = String::new();
    for section in sections {
        let _ = writeln!(out, "== {} ==", section.title);
        for line in section.lines() {
            let _ = match line {
                GuideLine::Bullet(s) => writeln!(out, "  * {}", spans(&s)),
                GuideLine::Quote(s) => writeln!(out, "  \"{}\"", spans(&s)),
                GuideLine::Paragraph(s) => writeln!(out, "  {}", spans(&s)),
            };
        }
        out.push('\n');
    }
    out
}
