//! Mentor: prompt building plus a text generator, with fixed fallbacks.
//!
//! The generator is injected (`TextGenerator`); the CLI backs it with an HTTP
//! LLM client and tests back it with canned replies. A failed or empty
//! generation never surfaces as an error to the caller.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::guidebook::extract_mermaid;
use crate::profile::StudentProfile;
use crate::prompts::{
    mentor_chat_prompt, mind_map_prompt, refine_prompt, study_plan_prompt, ChatContext, ChatTurn,
    MindMapOptions, PlanContext,
};
use crate::task::StudyTask;
use crate::wellbeing::ScoringPolicy;

pub const PLAN_BUSY: &str = "The mentor is busy building your personalized strategy. Please try again.";
pub const PLAN_UNREACHABLE: &str =
    "Could not reach the mentor. Check your network connection and API key.";
pub const REFINE_BUSY: &str = "The mentor is busy updating your plan.";
pub const REFINE_UNREACHABLE: &str = "Connection error while updating the plan.";
pub const CHAT_BUSY: &str = "Sorry, I'm still thinking. Could you ask again?";
pub const CHAT_UNREACHABLE: &str = "Lost connection to the mentor. Please check your network.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    Analysis,
    Refine,
    MindMap,
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub kind: GenerationKind,
}

/// Opaque text-in, text-out model.
pub trait TextGenerator {
    fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        (**self).generate(request)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorReply {
    pub text: String,
    pub source: ReplySource,
}

impl MentorReply {
    pub fn is_fallback(&self) -> bool {
        self.source == ReplySource::Fallback
    }
}

#[derive(Debug, Clone)]
pub struct Mentor<G: TextGenerator> {
    generator: G,
    policy: ScoringPolicy,
}

impl<G: TextGenerator> Mentor<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            policy: ScoringPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn ask(&self, kind: GenerationKind, prompt: String, busy: &str, unreachable: &str) -> MentorReply {
        let request = GenerationRequest { prompt, kind };
        match self.generator.generate(&request) {
            Ok(text) if !text.trim().is_empty() => MentorReply {
                text: text.trim().to_string(),
                source: ReplySource::Generated,
            },
            Ok(_) => {
                tracing::warn!(?kind, "generator returned empty output");
                MentorReply {
                    text: busy.to_string(),
                    source: ReplySource::Fallback,
                }
            }
            Err(err) => {
                tracing::warn!(?kind, error = %err, "generator failed");
                MentorReply {
                    text: unreachable.to_string(),
                    source: ReplySource::Fallback,
                }
            }
        }
    }

    /// Full guidebook for the current tasks and profile.
    pub fn study_plan<Z: TimeZone>(
        &self,
        tasks: &[StudyTask],
        profile: &StudentProfile,
        now: &DateTime<Z>,
    ) -> MentorReply {
        let ctx = PlanContext::build(tasks, profile, now, &self.policy);
        tracing::debug!(
            archetype = ctx.archetype.template_key(),
            current = ctx.stats.current,
            projected = ctx.stats.projected,
            "requesting study plan"
        );
        self.ask(GenerationKind::Analysis, study_plan_prompt(&ctx), PLAN_BUSY, PLAN_UNREACHABLE)
    }

    pub fn refine_plan(
        &self,
        tasks: &[StudyTask],
        plan: &str,
        comment: &str,
        profile: &StudentProfile,
    ) -> MentorReply {
        let prompt = refine_prompt(tasks, plan, comment, profile);
        self.ask(GenerationKind::Refine, prompt, REFINE_BUSY, REFINE_UNREACHABLE)
    }

    /// Mermaid source for the task mind map; empty when generation fails.
    pub fn mind_map(&self, tasks: &[StudyTask], options: MindMapOptions) -> String {
        let reply = self.ask(GenerationKind::MindMap, mind_map_prompt(tasks, options), "", "");
        if reply.is_fallback() {
            return String::new();
        }
        extract_mermaid(&reply.text)
    }

    pub fn chat(&self, message: &str, ctx: &ChatContext, history: &[ChatTurn]) -> MentorReply {
        let prompt = mentor_chat_prompt(message, ctx, history);
        self.ask(GenerationKind::Chat, prompt, CHAT_BUSY, CHAT_UNREACHABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use anyhow::anyhow;
    use chrono::{NaiveDate, Utc};

    /// Replies with a fixed string and records the requests it saw.
    struct Canned {
        reply: Result<String, String>,
        seen: RefCell<Vec<GenerationRequest>>,
    }

    impl Canned {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err("network down".to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for Canned {
        fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
            self.seen.borrow_mut().push(request.clone());
            self.reply.clone().map_err(|e| anyhow!(e))
        }
    }

    fn tasks() -> Vec<StudyTask> {
        vec![StudyTask::new("Calculus", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()).with_hours(5.0)]
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn generated_text_is_trimmed_and_tagged() {
        let generator = Canned::ok("  ### Plan\nWork hard \n");
        let mentor = Mentor::new(&generator);
        let reply = mentor.study_plan(&tasks(), &StudentProfile::default(), &now());

        assert_eq!(reply.text, "### Plan\nWork hard");
        assert_eq!(reply.source, ReplySource::Generated);
        let seen = generator.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, GenerationKind::Analysis);
        assert!(seen[0].prompt.contains("Calculus"));
    }

    #[test]
    fn empty_and_failed_generations_fall_back() {
        let mentor = Mentor::new(Canned::ok("   "));
        let reply = mentor.study_plan(&tasks(), &StudentProfile::default(), &now());
        assert_eq!(reply.text, PLAN_BUSY);
        assert!(reply.is_fallback());

        let mentor = Mentor::new(Canned::failing());
        assert_eq!(
            mentor.study_plan(&tasks(), &StudentProfile::default(), &now()).text,
            PLAN_UNREACHABLE
        );
        assert_eq!(
            mentor.refine_plan(&tasks(), "plan", "more breaks", &StudentProfile::default()).text,
            REFINE_UNREACHABLE
        );
        let ctx = ChatContext {
            plan: String::new(),
            profile: StudentProfile::default(),
            task_summary: String::new(),
        };
        assert_eq!(mentor.chat("hi", &ctx, &[]).text, CHAT_UNREACHABLE);
        assert_eq!(mentor.mind_map(&tasks(), MindMapOptions::default()), "");
    }

    #[test]
    fn mind_map_strips_fences() {
        let generator = Canned::ok("```mermaid\ngraph LR\n  A[Calculus]\n```");
        let mentor = Mentor::new(&generator);
        assert_eq!(
            mentor.mind_map(&tasks(), MindMapOptions::default()),
            "graph LR\n  A[Calculus]"
        );
        assert_eq!(generator.seen.borrow()[0].kind, GenerationKind::MindMap);
    }
}
