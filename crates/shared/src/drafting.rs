use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::llm::{TextModel, DEFAULT_MAX_TOKENS, LONG_MAX_TOKENS};
use crate::models::{Draft, GenerationRequest, Idea, RefineInstruction, Refinement, VoiceProfile};
use crate::prompts::{self, IdeaContext};

/// Shape checks that serde can't express on its own.
pub trait Validate {
    fn validate(&self) -> std::result::Result<(), String>;
}

impl Validate for Vec<Idea> {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.is_empty() {
            return Err("model returned no ideas".to_string());
        }
        for (idx, idea) in self.iter().enumerate() {
            if idea.title.trim().is_empty() {
                return Err(format!("idea {idx} has an empty title"));
            }
            if idea.pillar_id.trim().is_empty() {
                return Err(format!("idea {idx} has an empty pillarId"));
            }
        }
        Ok(())
    }
}

impl Validate for Draft {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.body.trim().is_empty() {
            return Err("draft body is empty".to_string());
        }
        Ok(())
    }
}

impl Validate for Refinement {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.body.trim().is_empty() {
            return Err("refined body is empty".to_string());
        }
        Ok(())
    }
}

/// Parse model output as JSON of type `T`.
///
/// The text must be JSON and nothing else. Prose around it or a markdown
/// fence is a `MalformedResponse`; nothing is salvaged.
pub fn parse_response<T>(raw: &str) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T =
        serde_json::from_str(raw).map_err(|e| PipelineError::malformed(e.to_string()))?;
    parsed.validate().map_err(PipelineError::malformed)?;
    Ok(parsed)
}

/// The drafting half of the tool: prompt, call the model, parse the answer.
pub struct Drafter<M> {
    model: M,
}

impl<M: TextModel> Drafter<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Post ideas, seeded by `headlines` when there are any.
    pub async fn generate_ideas(
        &self,
        headlines: Option<&[String]>,
        ctx: &IdeaContext<'_>,
    ) -> Result<Vec<Idea>> {
        let prompt = prompts::idea_prompt(ctx, headlines);
        let raw = self.model.complete(&prompt, LONG_MAX_TOKENS).await?;
        let ideas: Vec<Idea> = parse_response(&raw)?;

        for idea in &ideas {
            if !ctx.pillars.iter().any(|p| p.id == idea.pillar_id) {
                warn!(
                    pillar = %idea.pillar_id,
                    title = %idea.title,
                    "idea references an unknown pillar"
                );
            }
        }

        info!(count = ideas.len(), "generated ideas");
        Ok(ideas)
    }

    pub async fn generate_draft(&self, request: &GenerationRequest) -> Result<Draft> {
        let prompt = prompts::draft_prompt(request);
        let raw = self.model.complete(&prompt, DEFAULT_MAX_TOKENS).await?;
        let draft: Draft = parse_response(&raw)?;

        if let Some(max) = request.channel.as_ref().and_then(|c| c.max_length) {
            let len = draft.hook.chars().count() + draft.body.chars().count();
            if len > max {
                warn!(len, max, "draft is over the channel limit");
            }
        }

        Ok(draft)
    }

    /// Rework a draft. Canned and free-text instructions take the same path.
    pub async fn refine_draft(
        &self,
        hook: Option<&str>,
        body: &str,
        voice: Option<&VoiceProfile>,
        instruction: &RefineInstruction,
    ) -> Result<Refinement> {
        let prompt = prompts::refine_prompt(hook, body, voice, instruction);
        let raw = self.model.complete(&prompt, DEFAULT_MAX_TOKENS).await?;
        parse_response(&raw)
    }
}

#[cfg(test)]
impl<M> Drafter<M> {
    fn model(&self) -> &M {
        &self.model
    }
}
