//! Focus timer: a focus/break state machine driven by one-second ticks.

use serde::{Deserialize, Serialize};

use crate::task::StudyTask;

pub const DEFAULT_FOCUS_SECONDS: u32 = 25 * 60;
pub const HARD_FOCUS_SECONDS: u32 = 45 * 60;
pub const BREAK_SECONDS: u32 = 5 * 60;
pub const MIN_ADJUSTED_SECONDS: u32 = 60;

/// Leading decimal number of `s`, ignoring whatever follows it.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

/// Seconds for a duration like `"45m"`, `"1.5h"` or `"30"` (minutes).
///
/// Blank, unparseable or non-positive input yields the 25 minute default.
pub fn parse_session_duration(input: Option<&str>) -> u32 {
    let Some(raw) = input else {
        return DEFAULT_FOCUS_SECONDS;
    };
    let s = raw.trim().to_lowercase();

    let seconds = if s.contains('h') {
        leading_number(&s.replacen('h', "", 1)).map(|h| h * 3600.0)
    } else if s.contains('m') {
        leading_number(&s.replacen('m', "", 1)).map(|m| m * 60.0)
    } else {
        leading_number(&s).map(|m| m * 60.0)
    };

    match seconds {
        Some(secs) if secs.is_finite() && secs >= 1.0 => secs.min(f64::from(u32::MAX)).floor() as u32,
        _ => DEFAULT_FOCUS_SECONDS,
    }
}

/// Length of the first focus block for `task`.
pub fn initial_focus_seconds(task: &StudyTask) -> u32 {
    match task.custom_session_duration.as_deref() {
        Some(custom) => parse_session_duration(Some(custom)),
        None if task.difficulty.is_hard() => HARD_FOCUS_SECONDS,
        None => DEFAULT_FOCUS_SECONDS,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Focus,
    Break,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTimer {
    mode: TimerMode,
    remaining: u32,
    initial: u32,
    active: bool,
    sessions_completed: u32,
    /// Focus length restored after a break.
    focus_seconds: u32,
}

impl FocusTimer {
    pub fn for_task(task: &StudyTask) -> Self {
        let initial = initial_focus_seconds(task);
        Self {
            mode: TimerMode::Focus,
            remaining: initial,
            initial,
            active: false,
            sessions_completed: 0,
            focus_seconds: parse_session_duration(task.custom_session_duration.as_deref()),
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn initial(&self) -> u32 {
        self.initial
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.remaining = self.initial;
    }

    /// Shift the block by `minutes` while paused. Never below one minute.
    pub fn adjust(&mut self, minutes: i32) {
        if self.active {
            return;
        }
        let shifted = i64::from(self.remaining) + i64::from(minutes) * 60;
        let clamped = shifted.clamp(i64::from(MIN_ADJUSTED_SECONDS), i64::from(u32::MAX));
        self.remaining = clamped as u32;
        self.initial = self.remaining;
    }

    /// Advance one second. Returns the mode just finished, if any.
    pub fn tick(&mut self) -> Option<TimerMode> {
        if !self.active {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }

        self.active = false;
        let finished = self.mode;
        match finished {
            TimerMode::Focus => {
                self.sessions_completed += 1;
                self.mode = TimerMode::Break;
                self.initial = BREAK_SECONDS;
            }
            TimerMode::Break => {
                self.mode = TimerMode::Focus;
                self.initial = self.focus_seconds;
            }
        }
        self.remaining = self.initial;
        Some(finished)
    }

    /// Elapsed share of the current block in 0..=1.
    pub fn progress(&self) -> f64 {
        if self.initial == 0 {
            return 0.0;
        }
        f64::from(self.initial - self.remaining.min(self.initial)) / f64::from(self.initial)
    }

    pub fn format_clock(&self) -> String {
        format_clock(self.remaining)
    }
}

pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Difficulty;
    use chrono::NaiveDate;

    fn task() -> StudyTask {
        StudyTask::new("Calculus", NaiveDate::from_ymd_opt(2026, 3, 3).unwrap())
    }

    #[test]
    fn parse_duration_forms() {
        assert_eq!(parse_session_duration(Some("45m")), 2700);
        assert_eq!(parse_session_duration(Some("1.5h")), 5400);
        assert_eq!(parse_session_duration(Some(" 1H ")), 3600);
        assert_eq!(parse_session_duration(Some("30")), 1800);
        assert_eq!(parse_session_duration(Some("45 min")), 2700);
        assert_eq!(parse_session_duration(Some("soon")), 1500);
        assert_eq!(parse_session_duration(Some("")), 1500);
        assert_eq!(parse_session_duration(Some("-5m")), 1500);
        assert_eq!(parse_session_duration(None), 1500);
    }

    #[test]
    fn initial_length_depends_on_difficulty() {
        assert_eq!(initial_focus_seconds(&task()), 1500);
        assert_eq!(initial_focus_seconds(&task().with_difficulty(Difficulty::VeryHard)), 2700);

        let mut custom = task().with_difficulty(Difficulty::Hard);
        custom.custom_session_duration = Some("20m".to_string());
        assert_eq!(initial_focus_seconds(&custom), 1200);
    }

    #[test]
    fn focus_completes_into_break_then_back() {
        let mut timer = FocusTimer::for_task(&task().with_difficulty(Difficulty::Hard));
        assert_eq!(timer.remaining(), 2700);
        assert_eq!(timer.tick(), None);

        timer.toggle();
        for _ in 0..2699 {
            assert_eq!(timer.tick(), None);
        }
        assert_eq!(timer.format_clock(), "00:01");
        assert_eq!(timer.tick(), Some(TimerMode::Focus));
        assert_eq!(timer.mode(), TimerMode::Break);
        assert_eq!(timer.remaining(), BREAK_SECONDS);
        assert_eq!(timer.sessions_completed(), 1);
        assert!(!timer.is_active());

        timer.toggle();
        for _ in 0..BREAK_SECONDS {
            timer.tick();
        }
        assert_eq!(timer.mode(), TimerMode::Focus);
        // After a break the block falls back to the task's own duration.
        assert_eq!(timer.remaining(), DEFAULT_FOCUS_SECONDS);
    }

    #[test]
    fn adjust_has_floor_and_is_ignored_while_running() {
        let mut timer = FocusTimer::for_task(&task());
        timer.adjust(-30);
        assert_eq!(timer.remaining(), 60);
        assert_eq!(timer.initial(), 60);

        timer.adjust(5);
        assert_eq!(timer.remaining(), 360);

        timer.toggle();
        timer.adjust(5);
        assert_eq!(timer.remaining(), 360);
    }

    #[test]
    fn reset_and_progress() {
        let mut timer = FocusTimer::for_task(&task());
        timer.toggle();
        for _ in 0..750 {
            timer.tick();
        }
        assert!((timer.progress() - 0.5).abs() < 1e-9);
        timer.reset();
        assert_eq!(timer.remaining(), 1500);
        assert!(!timer.is_active());
        assert_eq!(format_clock(65), "01:05");
    }
}
