use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PipelineError, Result};

/// Headlines must be longer than this many characters...
pub const HEADLINE_MIN_EXCLUSIVE: usize = 20;
/// ...and shorter than this many.
pub const HEADLINE_MAX_EXCLUSIVE: usize = 200;
/// Headlines kept per source.
pub const MAX_HEADLINES_PER_SOURCE: usize = 10;

/// A page to pull headlines from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub url: String,
    pub selector: String,
}

impl SourceDescriptor {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            selector: selector.into(),
        }
    }

    /// Checks the name is non-empty, the URL is absolute http(s), and the
    /// selector is non-empty. Selector syntax is checked at extraction time.
    pub fn validate(&self) -> Result<Url> {
        let invalid = |reason: &str| PipelineError::InvalidSource {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.selector.trim().is_empty() {
            return Err(invalid("selector is empty"));
        }

        let url = Url::parse(&self.url).map_err(|e| invalid(&format!("bad url: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(&format!("unsupported scheme '{other}'"))),
        }
    }
}

/// What a single source produced during bulk ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "headlines", rename_all = "snake_case")]
pub enum ScrapeOutcome {
    Headlines(Vec<String>),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub source: String,
    pub outcome: ScrapeOutcome,
}

impl ScrapeResult {
    pub fn new(source: impl Into<String>, headlines: Vec<String>) -> Self {
        let outcome = if headlines.is_empty() {
            ScrapeOutcome::Empty
        } else {
            ScrapeOutcome::Headlines(headlines)
        };
        Self {
            source: source.into(),
            outcome,
        }
    }

    pub fn headlines(&self) -> &[String] {
        match &self.outcome {
            ScrapeOutcome::Headlines(h) => h,
            ScrapeOutcome::Empty => &[],
        }
    }
}

/// Flatten bulk results into one headline pool, keeping source order.
pub fn pooled_headlines(results: &[ScrapeResult]) -> Vec<String> {
    results
        .iter()
        .flat_map(|r| r.headlines().iter().cloned())
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandContext {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillar {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// A company or brand account.
    Organization,
    /// An individual's own account.
    Personal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
    #[serde(default)]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceProfile {
    pub style_summary: String,
    pub principles: Vec<String>,
    pub do_phrases: Vec<String>,
    pub dont_phrases: Vec<String>,
    pub jargon_blacklist: Vec<String>,
}

/// The planning data the persistence layer hands us, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningContext {
    pub brand: BrandContext,
    pub pillars: Vec<Pillar>,
    pub channels: Vec<Channel>,
    pub voice: Option<VoiceProfile>,
    pub sources: Vec<SourceDescriptor>,
}

impl PlanningContext {
    pub fn pillar(&self, id: &str) -> Option<&Pillar> {
        self.pillars.iter().find(|p| p.id == id)
    }

    pub fn channel(&self, id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }
}

/// Input to draft generation. Built fresh by the caller for every request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: String,
    pub pillar: Pillar,
    pub channel: Option<Channel>,
    pub notes: Option<String>,
    pub voice: Option<VoiceProfile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub title: String,
    pub pillar_id: String,
    pub notes: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub hook: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refinement {
    pub hook: String,
    pub body: String,
    pub changes: String,
}

/// How a draft should be reworked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineInstruction {
    Shorten,
    StrengthenHook,
    SimplifyLanguage,
    AddStory,
    AddSpecificity,
    StrengthenCta,
    Custom(String),
}

impl RefineInstruction {
    /// Parse one of the canned action names used on the command line.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "shorten" => Some(Self::Shorten),
            "hook" => Some(Self::StrengthenHook),
            "simplify" => Some(Self::SimplifyLanguage),
            "story" => Some(Self::AddStory),
            "specific" => Some(Self::AddSpecificity),
            "cta" => Some(Self::StrengthenCta),
            _ => None,
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Self::Shorten => {
                "Make this post shorter and punchier. Cut anything that doesn't earn its place."
            }
            Self::StrengthenHook => {
                "Rewrite the hook so it stops the scroll. Keep it under 15 words."
            }
            Self::SimplifyLanguage => {
                "Simplify the language. Short sentences, plain words, no jargon."
            }
            Self::AddStory => {
                "Add a short personal story or concrete anecdote that illustrates the main point."
            }
            Self::AddSpecificity => {
                "Make it more specific: add concrete numbers, examples, or named situations."
            }
            Self::StrengthenCta => {
                "Strengthen the closing so readers want to reply, with a clear question or call to engage."
            }
            Self::Custom(text) => text,
        }
    }
}

/// Version stamp for saved output files.
pub const OUTPUT_VERSION: &str = "1.0";

/// A generated result wrapped for hand-off to the persistence layer.
#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedOutput {
    pub version: String,
    pub created_at: String,
    pub kind: String,
    pub payload: serde_json::Value,
}

impl GeneratedOutput {
    pub fn new<T: Serialize>(kind: impl Into<String>, payload: &T) -> serde_json::Result<Self> {
        Ok(Self {
            version: OUTPUT_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            kind: kind.into(),
            payload: serde_json::to_value(payload)?,
        })
    }
}
