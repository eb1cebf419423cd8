use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

struct Sandbox {
    home: PathBuf,
}

impl Sandbox {
    fn new(name: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let home = std::env::temp_dir().join(format!("studyplan-cli-{name}-{nanos}"));
        fs::create_dir_all(&home).unwrap();
        Self { home }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_studyplan"))
            .args(args)
            .env("STUDYPLAN_HOME", &self.home)
            .env_remove("RUST_LOG")
            .env_remove("GEMINI_API_KEY")
            .output()
            .unwrap()
    }

    fn ok(&self, args: &[&str]) -> String {
        let out = self.run(args);
        assert!(
            out.status.success(),
            "studyplan {args:?} failed: {}",
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8(out.stdout).unwrap()
    }

    fn json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        serde_json::from_str(&self.ok(&full)).unwrap()
    }

    fn add(&self, subject: &str, extra: &[&str]) -> String {
        let mut args = vec!["task", "add", subject];
        args.extend_from_slice(extra);
        let task = self.json(&args);
        task["id"].as_str().unwrap().to_string()
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.home).ok();
    }
}

#[test]
fn added_tasks_are_listed_and_persisted() {
    let sb = Sandbox::new("tasks");
    sb.add("Calculus", &["--deadline", "+3", "--hours", "100", "--difficulty", "hard"]);
    sb.add("History essay", &["--deadline", "+10", "--difficulty", "easy"]);

    let tasks = sb.json(&["task", "list"]);
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["subject"], "Calculus");
    assert_eq!(tasks[0]["estimated_hours"], 24.0);
    assert_eq!(tasks[0]["difficulty"], "hard");

    let easy = sb.json(&["task", "list", "--difficulty", "easy"]);
    assert_eq!(easy.as_array().unwrap().len(), 1);

    let raw: Value = serde_json::from_str(&fs::read_to_string(sb.home.join("tasks.json")).unwrap()).unwrap();
    assert_eq!(raw["schema_version"], 1);
}

#[test]
fn blank_subject_is_rejected() {
    let sb = Sandbox::new("blank");
    let out = sb.run(&["task", "add", "  ", "--deadline", "tomorrow"]);
    assert!(!out.status.success());
}

#[test]
fn done_and_remove_accept_id_prefixes() {
    let sb = Sandbox::new("prefix");
    let id = sb.add("Physics", &["--deadline", "+2"]);

    let done = sb.json(&["task", "done", &id[..8]]);
    assert_eq!(done["is_completed"], true);
    assert!(sb.json(&["today"]).as_array().unwrap().is_empty());

    let out = sb.ok(&["task", "remove", &id[..8]]);
    assert!(out.contains("Removed Physics"));
    assert!(sb.json(&["task", "list"]).as_array().unwrap().is_empty());
}

#[test]
fn empty_workload_scores_near_full_wellbeing() {
    let sb = Sandbox::new("empty");
    let report = sb.json(&["wellbeing"]);
    assert_eq!(report["wellbeing"]["current"], 98);
    assert_eq!(report["wellbeing"]["projected"], 99);
    assert_eq!(report["wellbeing"]["total_hours"], 0.0);
    assert_eq!(report["workload_score"], 1.0);
}

#[test]
fn exhausted_student_with_urgent_work_is_burnt_out() {
    let sb = Sandbox::new("burnt");
    sb.ok(&["profile", "set", "--energy", "3", "--performance", "weak"]);
    for subject in ["Calculus", "Physics", "Chemistry", "Biology"] {
        sb.add(subject, &["--deadline", "tomorrow", "--hours", "8", "--difficulty", "very-hard", "--priority", "high"]);
    }

    let report = sb.json(&["wellbeing"]);
    assert_eq!(report["archetype"]["key"], "burnt_out");
    let current = report["wellbeing"]["current"].as_i64().unwrap();
    let projected = report["wellbeing"]["projected"].as_i64().unwrap();
    assert!((10..=98).contains(&current));
    assert!(projected >= (current + 5).min(99));

    let text = sb.ok(&["wellbeing", "--explain"]);
    assert!(text.contains("stress ratio"));
}

#[test]
fn profile_updates_merge() {
    let sb = Sandbox::new("profile");
    sb.ok(&["profile", "set", "--energy", "4"]);
    sb.ok(&["profile", "set", "--learning-style", "visual"]);

    let profile = sb.json(&["profile", "show"]);
    assert_eq!(profile["energy_level"], 4);
    assert_eq!(profile["performance"], "good");
    assert_eq!(profile["learning_style"], "visual");

    assert!(!sb.run(&["profile", "set", "--energy", "11"]).status.success());
}

#[test]
fn today_puts_high_priority_first() {
    let sb = Sandbox::new("today");
    sb.add("Reading", &["--deadline", "+1", "--priority", "low"]);
    sb.add("Exam prep", &["--deadline", "+7", "--priority", "high"]);

    let agenda = sb.json(&["today"]);
    assert_eq!(agenda[0]["task"]["subject"], "Exam prep");
    assert_eq!(agenda[1]["task"]["subject"], "Reading");
}

#[test]
fn prompts_can_be_inspected_offline() {
    let sb = Sandbox::new("prompts");
    sb.add("Organic Chemistry", &["--deadline", "+5", "--hours", "6"]);

    let plan = sb.ok(&["plan", "--prompt-only"]);
    assert!(plan.contains("Organic Chemistry"));

    let map = sb.ok(&["mindmap", "--prompt-only", "--hours"]);
    assert!(map.contains("Organic Chemistry"));
    assert!(map.contains("6h"));
}

#[test]
fn plan_without_api_key_explains_what_is_missing() {
    let sb = Sandbox::new("nokey");
    sb.add("Calculus", &["--deadline", "+3"]);
    let out = sb.run(&["plan"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("GEMINI_API_KEY"));
}

#[test]
fn focus_block_counts_down() {
    let sb = Sandbox::new("focus");
    let id = sb.add("Statistics", &["--deadline", "+2"]);
    sb.ok(&["task", "session", &id, "1m"]);

    let info = sb.json(&["focus", &id]);
    assert_eq!(info["focus_seconds"], 60);

    let out = sb.ok(&["focus", &id, "--run", "--tick-ms", "1"]);
    assert!(out.contains("Focus on Statistics for 01:00"));
    assert!(out.contains("Take a 05:00 break"));
}

#[test]
fn config_init_writes_defaults() {
    let sb = Sandbox::new("config");
    let out = sb.ok(&["config", "init"]);
    assert!(out.contains("Wrote"));
    assert!(sb.home.join("config.toml").exists());

    let cfg = sb.json(&["config", "show"]);
    assert_eq!(cfg["llm"]["provider"], "gemini");
    assert_eq!(cfg["planner"]["timezone"], "UTC");
}

#[test]
fn hand_edited_files_with_bad_fields_still_load() {
    let sb = Sandbox::new("lenient");
    fs::write(
        sb.home.join("tasks.json"),
        r#"{"schema_version":1,"tasks":[{"id":"x1","subject":null,"deadline":"2026-03-02","estimatedHours":"5","difficulty":"Extreme","priority":null}]}"#,
    )
    .unwrap();
    fs::write(sb.home.join("profile.json"), r#"{"energy_level": 6.5}"#).unwrap();

    let tasks = sb.json(&["task", "list"]);
    assert_eq!(tasks[0]["subject"], "Untitled subject");
    assert_eq!(tasks[0]["estimated_hours"], 2.0);
    assert_eq!(tasks[0]["difficulty"], "medium");

    let profile = sb.json(&["profile", "show"]);
    assert_eq!(profile["performance"], "good");
    assert_eq!(profile["energy_level"], 7);
}
