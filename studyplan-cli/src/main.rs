use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde_json::json;

use studyplan_core::focus::format_clock;
use studyplan_core::prompts::{mind_map_prompt, refine_prompt, study_plan_prompt, task_summary};
use studyplan_core::{
    analyze, daily_plan, difficulty_distribution, parse_deadline, parse_sections, workload_bars,
    ChatContext, ChatTurn, Difficulty, FocusTimer, HoursSummary, LearningStyle, Mentor,
    MindMapOptions, Performance, PlanContext, Priority, SortOrder, StudentProfile, StudyMethod,
    StudyTask, TaskBook, TaskDraft, TaskQuery, TimerMode,
};

mod config;
mod llm;
mod render;
mod state;

use config::Config;
use llm::LlmClient;
use state::JsonTaskStore;

#[derive(Parser, Debug)]
#[command(
    name = "studyplan",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("STUDYPLAN_BUILD_SHA"), ")"),
    about = "Study planner with workload and wellbeing scoring"
)]
struct Cli {
    /// Machine-readable output for data commands
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add, list and update study tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Show or update your self-assessment
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Hours and difficulty statistics
    Stats,

    /// Current and projected wellbeing plus your study archetype
    Wellbeing {
        /// Print the intermediate scores
        #[arg(long)]
        explain: bool,
    },

    /// Pending tasks in the order to tackle them, with session lengths
    Today,

    /// Focus session for one task
    Focus {
        /// Task id (or unique prefix)
        id: String,

        /// Run the countdown instead of only printing the session length
        #[arg(long)]
        run: bool,

        /// Milliseconds per timer second (for demos)
        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,
    },

    /// Generate the personalized guidebook with the mentor
    Plan {
        /// Print the prompt and exit without calling the model
        #[arg(long)]
        prompt_only: bool,

        /// Show the saved guidebook instead of generating a new one
        #[arg(long, conflicts_with = "prompt_only")]
        show: bool,
    },

    /// Ask the mentor to adjust the saved guidebook
    Refine {
        /// What should change
        comment: String,

        #[arg(long)]
        prompt_only: bool,
    },

    /// Mermaid mind map of the task list
    Mindmap {
        /// Include estimated hours
        #[arg(long)]
        hours: bool,

        /// Include deadlines
        #[arg(long)]
        deadline: bool,

        /// Leave difficulty out
        #[arg(long)]
        no_difficulty: bool,

        #[arg(long)]
        prompt_only: bool,
    },

    /// Ask the mentor a question about your plan
    Chat {
        message: Option<String>,

        /// Forget the conversation so far
        #[arg(long)]
        reset: bool,
    },

    /// Manage ~/.studyplan/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Add a task
    Add {
        subject: String,

        /// YYYY-MM-DD, today, tomorrow or +N (days)
        #[arg(long)]
        deadline: String,

        /// Estimated hours (clamped to 0.5-24)
        #[arg(long)]
        hours: Option<f64>,

        /// easy, medium, hard, very-hard
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,

        /// low, medium, high
        #[arg(long, default_value = "medium")]
        priority: Priority,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        icon: Option<String>,
    },

    /// List tasks
    List {
        /// Case-insensitive search over subject and description
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// deadline, deadline-desc, difficulty, difficulty-asc
        #[arg(long, default_value = "deadline")]
        sort: SortOrder,
    },

    /// Delete a task
    Remove { id: String },

    /// Toggle a task's completion
    Done { id: String },

    /// Set a custom focus-session length such as 45m or 1.5h
    Session { id: String, duration: String },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,

    /// Update any subset of the profile fields
    Set {
        /// weak, average, good, excellent
        #[arg(long)]
        performance: Option<Performance>,

        /// 1-10
        #[arg(long, value_parser = clap::value_parser!(i32).range(1..=10))]
        energy: Option<i32>,

        /// visual, auditory, read-write, kinesthetic, mixed
        #[arg(long)]
        learning_style: Option<LearningStyle>,

        /// pomodoro, flowtime, time-blocking, spaced-repetition, feynman, or free text
        #[arg(long)]
        method: Option<StudyMethod>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn init_tracing(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_tracing(&cfg.logging.level);

    let tz = cfg.planner.tz()?;
    let now = Utc::now().with_timezone(&tz);
    let mut book = TaskBook::new(JsonTaskStore::open()?);

    match cli.command {
        Command::Task { command } => task_command(command, &mut book, &now, cli.json)?,

        Command::Profile { command } => match command {
            ProfileCommand::Show => print_profile(&state::read_profile()?, cli.json)?,
            ProfileCommand::Set {
                performance,
                energy,
                learning_style,
                method,
            } => {
                let mut profile = state::read_profile()?;
                if let Some(p) = performance {
                    profile.performance = p;
                }
                if let Some(e) = energy {
                    profile.energy_level = e;
                }
                if learning_style.is_some() {
                    profile.learning_style = learning_style;
                }
                if method.is_some() {
                    profile.study_method = method;
                }
                let profile = profile.normalized();
                state::write_profile(&profile)?;
                print_profile(&profile, cli.json)?;
            }
        },

        Command::Stats => {
            let tasks = book.tasks()?;
            let summary = HoursSummary::from_tasks(&tasks);
            let analysis = analyze(&tasks);
            let distribution = difficulty_distribution(&tasks);
            let bars = workload_bars(&tasks);
            if cli.json {
                let distribution: Vec<_> = distribution
                    .iter()
                    .map(|(d, n)| json!({ "difficulty": d, "count": n }))
                    .collect();
                print_json(&json!({
                    "summary": summary,
                    "analysis": analysis,
                    "distribution": distribution,
                    "bars": bars,
                }))?;
            } else {
                print!("{}", render::stats(&summary, &analysis, &distribution, &bars));
            }
        }

        Command::Wellbeing { explain } => {
            let ctx = PlanContext::build(&book.tasks()?, &state::read_profile()?, &now, &cfg.planner.scoring_policy());
            if cli.json {
                print_json(&json!({
                    "wellbeing": ctx.stats,
                    "workload_score": ctx.workload_score,
                    "archetype": {
                        "key": ctx.archetype.template_key(),
                        "name": ctx.archetype.name(),
                        "icon": ctx.archetype.icon(),
                        "description": ctx.archetype.description(),
                        "schedule_style": ctx.archetype.schedule_style(),
                    },
                }))?;
            } else {
                print!("{}", render::wellbeing(&ctx.stats, ctx.archetype, ctx.workload_score, explain));
            }
        }

        Command::Today => {
            let entries = daily_plan(&book.tasks()?);
            if cli.json {
                print_json(&entries)?;
            } else {
                print!("{}", render::agenda(&entries));
            }
        }

        Command::Focus { id, run, tick_ms } => {
            let task = find_task(&book, &id)?;
            focus(&task, run, tick_ms, cli.json).await?;
        }

        Command::Plan { prompt_only, show } => {
            let tasks = book.tasks()?;
            let profile = state::read_profile()?;
            if show {
                let Some(markdown) = state::read_guidebook()? else {
                    bail!("no guidebook yet; run: studyplan plan");
                };
                print_guidebook(&markdown, cli.json)?;
            } else if prompt_only {
                let ctx = PlanContext::build(&tasks, &profile, &now, &cfg.planner.scoring_policy());
                println!("{}", study_plan_prompt(&ctx));
            } else {
                if tasks.is_empty() {
                    bail!("no tasks yet; add one with: studyplan task add <subject> --deadline <date>");
                }
                let reply = mentor(&cfg)?.study_plan(&tasks, &profile, &now);
                if reply.is_fallback() {
                    eprintln!("{}", reply.text);
                } else {
                    state::write_guidebook(&reply.text)?;
                    print_guidebook(&reply.text, cli.json)?;
                }
            }
        }

        Command::Refine { comment, prompt_only } => {
            let Some(plan) = state::read_guidebook()? else {
                bail!("no guidebook to refine; run: studyplan plan");
            };
            let tasks = book.tasks()?;
            let profile = state::read_profile()?;
            if prompt_only {
                println!("{}", refine_prompt(&tasks, &plan, &comment, &profile));
            } else {
                let reply = mentor(&cfg)?.refine_plan(&tasks, &plan, &comment, &profile);
                if reply.is_fallback() {
                    eprintln!("{}", reply.text);
                } else {
                    state::write_guidebook(&reply.text)?;
                    print_guidebook(&reply.text, cli.json)?;
                }
            }
        }

        Command::Mindmap {
            hours,
            deadline,
            no_difficulty,
            prompt_only,
        } => {
            let tasks = book.tasks()?;
            let options = MindMapOptions {
                show_difficulty: !no_difficulty,
                show_hours: hours,
                show_deadline: deadline,
            };
            if prompt_only {
                println!("{}", mind_map_prompt(&tasks, options));
            } else {
                let code = mentor(&cfg)?.mind_map(&tasks, options);
                if code.is_empty() {
                    bail!("could not generate a mind map right now");
                }
                println!("{code}");
            }
        }

        Command::Chat { message, reset } => {
            if reset {
                state::clear_chat_history()?;
                println!("Conversation cleared.");
            }
            if let Some(message) = message.filter(|m| !m.trim().is_empty()) {
                chat(&cfg, &book, &message)?;
            } else if !reset {
                bail!("nothing to ask; pass a message");
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                if cli.json {
                    print_json(&cfg)?;
                } else {
                    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                }
            }
        },
    }

    Ok(())
}

fn task_command(
    command: TaskCommand,
    book: &mut TaskBook<JsonTaskStore>,
    now: &DateTime<Tz>,
    json: bool,
) -> Result<()> {
    match command {
        TaskCommand::Add {
            subject,
            deadline,
            hours,
            difficulty,
            priority,
            description,
            icon,
        } => {
            let draft = TaskDraft {
                subject,
                description,
                deadline: Some(parse_deadline(&deadline, now.date_naive())?),
                estimated_hours: hours,
                difficulty,
                priority,
                icon,
            };
            let task = book.add(draft)?;
            if json {
                print_json(&task)?;
            } else {
                println!("Added {} ({})", task.subject, render::short_id(&task.id));
            }
        }

        TaskCommand::List {
            search,
            difficulty,
            sort,
        } => {
            let query = TaskQuery {
                search,
                difficulty,
                sort,
            };
            let tasks = query.apply(&book.tasks()?);
            if json {
                print_json(&tasks)?;
            } else {
                print!("{}", render::task_table(&tasks));
            }
        }

        TaskCommand::Remove { id } => {
            let id = resolve_id(book, &id)?;
            let task = book.remove(&id)?;
            println!("Removed {}", task.subject);
        }

        TaskCommand::Done { id } => {
            let id = resolve_id(book, &id)?;
            let task = book.toggle_completion(&id)?;
            if json {
                print_json(&task)?;
            } else if task.is_completed {
                println!("Completed {}", task.subject);
            } else {
                println!("Reopened {}", task.subject);
            }
        }

        TaskCommand::Session { id, duration } => {
            let id = resolve_id(book, &id)?;
            let task = book.set_session_duration(&id, &duration)?;
            if json {
                print_json(&task)?;
            } else {
                println!(
                    "{}: focus sessions of {}",
                    task.subject,
                    task.custom_session_duration.as_deref().unwrap_or("the default length")
                );
            }
        }
    }
    Ok(())
}

/// Full id for an exact id or a unique prefix of one.
fn resolve_id(book: &TaskBook<JsonTaskStore>, prefix: &str) -> Result<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        bail!("task id must not be empty");
    }
    let tasks = book.tasks()?;
    if let Some(t) = tasks.iter().find(|t| t.id == prefix) {
        return Ok(t.id.clone());
    }
    let matches: Vec<&StudyTask> = tasks.iter().filter(|t| t.id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => bail!("no task with id {prefix}"),
        _ => bail!("task id {prefix} is ambiguous ({} matches)", matches.len()),
    }
}

fn find_task(book: &TaskBook<JsonTaskStore>, prefix: &str) -> Result<StudyTask> {
    let id = resolve_id(book, prefix)?;
    book.get(&id)?.with_context(|| format!("no task with id {id}"))
}

fn mentor(cfg: &Config) -> Result<Mentor<LlmClient>> {
    let client = LlmClient::from_config(&cfg.llm)?;
    Ok(Mentor::new(client).with_policy(cfg.planner.scoring_policy()))
}

fn chat(cfg: &Config, book: &TaskBook<JsonTaskStore>, message: &str) -> Result<()> {
    let tasks = book.tasks()?;
    let ctx = ChatContext {
        plan: state::read_guidebook()?.unwrap_or_default(),
        profile: state::read_profile()?,
        task_summary: task_summary(&tasks),
    };
    let mut history = state::read_chat_history()?;

    let reply = mentor(cfg)?.chat(message, &ctx, &history);
    println!("{}", reply.text);

    if !reply.is_fallback() {
        history.push(ChatTurn::student(message.trim()));
        history.push(ChatTurn::mentor(reply.text));
        state::write_chat_history(&history)?;
    }
    Ok(())
}

async fn focus(task: &StudyTask, run: bool, tick_ms: u64, json: bool) -> Result<()> {
    let mut timer = FocusTimer::for_task(task);
    if !run {
        if json {
            print_json(&json!({
                "task_id": task.id,
                "subject": task.subject,
                "focus_seconds": timer.remaining(),
                "clock": timer.format_clock(),
            }))?;
        } else {
            println!("{}: focus for {}", task.subject, timer.format_clock());
        }
        return Ok(());
    }

    println!("Focus on {} for {}", task.subject, timer.format_clock());
    let mut interval = tokio::time::interval(std::time::Duration::from_millis(tick_ms.max(1)));
    interval.tick().await;
    timer.toggle();
    loop {
        interval.tick().await;
        if let Some(finished) = timer.tick() {
            if finished == TimerMode::Focus {
                println!(
                    "Focus block done ({} completed). Take a {} break.",
                    timer.sessions_completed(),
                    format_clock(timer.remaining())
                );
            }
            break;
        }
        if timer.remaining() % 60 == 0 {
            println!("{} left", timer.format_clock());
        }
    }
    Ok(())
}

fn print_profile(profile: &StudentProfile, json: bool) -> Result<()> {
    if json {
        print_json(profile)
    } else {
        print!("{}", render::profile(profile));
        Ok(())
    }
}

fn print_guidebook(markdown: &str, json: bool) -> Result<()> {
    let sections = parse_sections(markdown);
    if json {
        print_json(&sections)
    } else {
        print!("{}", render::guidebook(&sections));
        Ok(())
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
