//! Structure extraction from generated guidebook markdown.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static MERMAID_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```mermaid([\s\S]*?)```").expect("mermaid fence pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Span {
    Plain(String),
    Bold(String),
}

/// Alternating plain/bold pieces of a line split on `**`. Empty pieces are dropped.
pub fn split_bold(line: &str) -> Vec<Span> {
    line.split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            if i % 2 == 1 {
                Span::Bold(part.to_string())
            } else {
                Span::Plain(part.to_string())
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "spans", rename_all = "snake_case")]
pub enum GuideLine {
    Bullet(Vec<Span>),
    Quote(Vec<Span>),
    Paragraph(Vec<Span>),
}

impl GuideLine {
    fn parse(line: &str) -> Option<GuideLine> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(if let Some(rest) = trimmed.strip_prefix("- ") {
            GuideLine::Bullet(split_bold(rest))
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            GuideLine::Quote(split_bold(rest.trim()))
        } else {
            GuideLine::Paragraph(split_bold(trimmed))
        })
    }
}

/// Which part of the guidebook a section is, judged from its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Profile,
    Strategy,
    Roadmap,
    Advice,
    Wellbeing,
    Other,
}

impl SectionKind {
    pub fn from_title(title: &str) -> SectionKind {
        let t = title.to_lowercase();
        if t.contains("profile") {
            SectionKind::Profile
        } else if t.contains("strategy") {
            SectionKind::Strategy
        } else if t.contains("roadmap") || t.contains("schedule") {
            SectionKind::Roadmap
        } else if t.contains("advice") {
            SectionKind::Advice
        } else if t.contains("wellbeing") || t.contains("mentor") {
            SectionKind::Wellbeing
        } else {
            SectionKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuideSection {
    pub title: String,
    pub kind: SectionKind,
    /// Raw content lines after the title, blank lines included.
    pub content: Vec<String>,
}

impl GuideSection {
    pub fn lines(&self) -> Vec<GuideLine> {
        self.content.iter().filter_map(|l| GuideLine::parse(l)).collect()
    }
}

pub fn parse_sections(markdown: &str) -> Vec<GuideSection> {
    markdown
        .split("###")
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| {
            let mut lines = chunk.trim().lines();
            let title = lines
                .next()
                .unwrap_or_default()
                .trim()
                .trim_matches(|c: char| c == '*' || c == '_')
                .trim()
                .to_string();
            GuideSection {
                kind: SectionKind::from_title(&title),
                title,
                content: lines.map(str::to_string).collect(),
            }
        })
        .collect()
}

/// Mermaid source from a model reply: the first fenced mermaid block, or the
/// whole reply with fences removed.
pub fn extract_mermaid(text: &str) -> String {
    if let Some(body) = MERMAID_BLOCK.captures(text).and_then(|c| c.get(1)) {
        let body = body.as_str().trim();
        if !body.is_empty() {
            return body.to_string();
        }
    }
    text.replace("```mermaid", "").replace("```", "").trim().to_string()
}
