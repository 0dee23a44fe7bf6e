//! Prompt templates for the drafting pipeline.
//!
//! Every builder is a pure function of its inputs. Each template ends by
//! asking for bare JSON, which `drafting` then parses strictly.

use std::fmt::Write as _;

use crate::models::{
    BrandContext, Channel, ChannelKind, GenerationRequest, Pillar, RefineInstruction, VoiceProfile,
};

/// Ideas requested when the caller doesn't say.
pub const DEFAULT_IDEA_COUNT: usize = 5;

/// Everything idea generation needs besides the optional headlines.
#[derive(Debug, Clone, Copy)]
pub struct IdeaContext<'a> {
    pub brand: &'a BrandContext,
    pub pillars: &'a [Pillar],
    pub voice: Option<&'a VoiceProfile>,
    pub count: usize,
}

const JSON_ONLY: &str =
    "Respond with JSON only. No prose before or after it, and no markdown code fences.";

pub fn idea_prompt(ctx: &IdeaContext<'_>, headlines: Option<&[String]>) -> String {
    let pillars = ctx
        .pillars
        .iter()
        .map(|p| format!("- {} (id: {}): {}", p.label, p.id, p.description))
        .collect::<Vec<_>>()
        .join("\n");

    let source_material = match headlines.filter(|h| !h.is_empty()) {
        Some(headlines) => {
            let numbered = headlines
                .iter()
                .enumerate()
                .map(|(i, h)| format!("{}. {}", i + 1, h))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "Here are today's industry headlines. Use them as springboards: find the angle our audience would care about, don't just restate the news.\n\nHEADLINES:\n{numbered}"
            )
        }
        None => "There are no headlines today. Generate original ideas drawn from the pillars and the brand's expertise.".to_string(),
    };

    let voice = ctx
        .voice
        .map(|v| v.style_summary.trim())
        .filter(|s| !s.is_empty())
        .map(|s| format!("\nVOICE:\n{s}\n"))
        .unwrap_or_default();

    format!(
        r#"You are a content strategist helping a thought-leadership writer plan posts.

BRAND:
{brand}: {description}

CONTENT PILLARS:
{pillars}

{source_material}
{voice}
Suggest {count} post ideas. Each idea must fit exactly one of the pillars above.

Format your response as a JSON array:
[
  {{
    "title": "A specific, opinionated working title",
    "pillarId": "one of the pillar ids above",
    "notes": "Why this matters now and the angle to take",
    "priority": "high" | "medium" | "low"
  }}
]

{json_only}"#,
        brand = ctx.brand.name,
        description = ctx.brand.description,
        count = ctx.count,
        json_only = JSON_ONLY,
    )
}

pub fn draft_prompt(request: &GenerationRequest) -> String {
    let channel = request
        .channel
        .as_ref()
        .map(channel_guidance)
        .unwrap_or_default();

    let notes = request
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| format!("\nAUTHOR NOTES:\n{n}\n"))
        .unwrap_or_default();

    format!(
        r#"You are ghostwriting a post for a thought-leadership writer.

TOPIC:
{topic}

PILLAR:
{label}: {description}
{channel}{notes}{voice}
STRUCTURE:
- Open with a hook under 15 words.
- Follow with 3-5 short paragraphs.
- Close with a question or a call to engage.

Format your response as:
{{"hook": "the opening line", "body": "the rest of the post"}}

{json_only}"#,
        topic = request.topic,
        label = request.pillar.label,
        description = request.pillar.description,
        voice = voice_section(request.voice.as_ref()),
        json_only = JSON_ONLY,
    )
}

pub fn refine_prompt(
    hook: Option<&str>,
    body: &str,
    voice: Option<&VoiceProfile>,
    instruction: &RefineInstruction,
) -> String {
    let hook = hook.map(str::trim).filter(|h| !h.is_empty()).unwrap_or("(none)");

    format!(
        r#"You are editing a draft post for a thought-leadership writer.

CURRENT HOOK:
{hook}

CURRENT BODY:
{body}
{voice}
INSTRUCTION:
{instruction}

Format your response as:
{{"hook": "the revised hook", "body": "the revised body", "changes": "one or two sentences describing what you changed"}}

{json_only}"#,
        voice = voice_section(voice),
        instruction = instruction.as_text(),
        json_only = JSON_ONLY,
    )
}

fn channel_guidance(channel: &Channel) -> String {
    let mut out = format!("\nCHANNEL:\n{}\n", channel.name);
    let tone = match channel.kind {
        ChannelKind::Organization => {
            "This is an organization account. Tone: authoritative and strategic. Speak for the company, lead with the business insight."
        }
        ChannelKind::Personal => {
            "This is an individual's account. Tone: conversational and personal. Write in the first person, as one person talking to peers."
        }
    };
    out.push_str(tone);
    out.push('\n');

    if let Some(max) = channel.max_length {
        let _ = writeln!(out, "Keep the entire post under {max} characters.");
    }
    out
}

fn voice_section(voice: Option<&VoiceProfile>) -> String {
    let Some(voice) = voice else {
        return String::new();
    };

    let mut out = String::from("\nVOICE:\n");
    if !voice.style_summary.trim().is_empty() {
        let _ = writeln!(out, "{}", voice.style_summary.trim());
    }
    write_list(&mut out, "Principles", &voice.principles);
    write_list(&mut out, "Sounds like", &voice.do_phrases);
    write_list(&mut out, "Never sounds like", &voice.dont_phrases);
    if !voice.jargon_blacklist.is_empty() {
        let _ = writeln!(
            out,
            "Never use these words: {}",
            voice.jargon_blacklist.join(", ")
        );
    }
    out
}

fn write_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}:");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pillar() -> Pillar {
        Pillar {
            id: "leadership".into(),
            label: "Leadership".into(),
            description: "How engineering leaders make decisions".into(),
        }
    }

    fn request(channel: Option<Channel>) -> GenerationRequest {
        GenerationRequest {
            topic: "Why we stopped doing quarterly planning".into(),
            pillar: pillar(),
            channel,
            notes: None,
            voice: None,
        }
    }

    fn channel(kind: ChannelKind, max_length: Option<usize>) -> Channel {
        Channel {
            id: "x".into(),
            name: "X".into(),
            kind,
            max_length,
        }
    }

    #[test]
    fn draft_prompt_carries_character_limit() {
        let prompt = draft_prompt(&request(Some(channel(ChannelKind::Personal, Some(280)))));
        assert!(prompt.contains("Keep the entire post under 280 characters."));
    }

    #[test]
    fn draft_prompt_without_limit_has_no_limit_line() {
        let prompt = draft_prompt(&request(Some(channel(ChannelKind::Personal, None))));
        assert!(!prompt.contains("characters."));
        let prompt = draft_prompt(&request(None));
        assert!(!prompt.contains("CHANNEL:"));
    }

    #[test]
    fn tone_follows_channel_kind() {
        let org = draft_prompt(&request(Some(channel(ChannelKind::Organization, None))));
        assert!(org.contains("authoritative and strategic"));
        assert!(!org.contains("conversational"));

        let personal = draft_prompt(&request(Some(channel(ChannelKind::Personal, None))));
        assert!(personal.contains("conversational and personal"));
    }

    #[test]
    fn draft_prompt_has_fixed_structure_and_json_shape() {
        let prompt = draft_prompt(&request(None));
        assert!(prompt.contains("hook under 15 words"));
        assert!(prompt.contains("3-5 short paragraphs"));
        assert!(prompt.contains(r#""hook""#));
        assert!(prompt.contains(r#""body""#));
        assert!(prompt.contains("Leadership: How engineering leaders make decisions"));
    }

    #[test]
    fn voice_blacklist_is_listed() {
        let mut req = request(None);
        req.voice = Some(VoiceProfile {
            style_summary: "Plainspoken, dry humour.".into(),
            principles: vec!["Say the uncomfortable thing".into()],
            jargon_blacklist: vec!["synergy".into(), "leverage".into()],
            ..VoiceProfile::default()
        });

        let prompt = draft_prompt(&req);
        assert!(prompt.contains("Plainspoken, dry humour."));
        assert!(prompt.contains("- Say the uncomfortable thing"));
        assert!(prompt.contains("Never use these words: synergy, leverage"));
    }

    #[test]
    fn idea_prompt_switches_on_headlines() {
        let brand = BrandContext {
            name: "Acme".into(),
            description: "Developer tools".into(),
        };
        let pillars = [pillar()];
        let ctx = IdeaContext {
            brand: &brand,
            pillars: &pillars,
            voice: None,
            count: 3,
        };

        let headlines = vec!["Big cloud vendor raises prices again".to_string()];
        let with = idea_prompt(&ctx, Some(headlines.as_slice()));
        assert!(with.contains("1. Big cloud vendor raises prices again"));
        assert!(!with.contains("There are no headlines today"));

        let without = idea_prompt(&ctx, None);
        assert!(without.contains("There are no headlines today"));

        let empty = idea_prompt(&ctx, Some(&[][..]));
        assert_eq!(empty, without);

        assert!(with.contains("Leadership (id: leadership)"));
        assert!(with.contains("Suggest 3 post ideas"));
        assert!(with.contains(r#""pillarId""#));
    }

    #[test]
    fn prompts_are_deterministic() {
        let req = request(Some(channel(ChannelKind::Organization, Some(3000))));
        assert_eq!(draft_prompt(&req), draft_prompt(&req));
    }

    #[test]
    fn refine_prompt_embeds_instruction_text() {
        let canned = refine_prompt(Some("Hook"), "Body text", None, &RefineInstruction::Shorten);
        assert!(canned.contains(RefineInstruction::Shorten.as_text()));
        assert!(canned.contains(r#""changes""#));

        let custom = refine_prompt(
            None,
            "Body text",
            None,
            &RefineInstruction::Custom("Mention the Q3 launch".into()),
        );
        assert!(custom.contains("INSTRUCTION:\nMention the Q3 launch"));
        assert!(custom.contains("CURRENT HOOK:\n(none)"));
    }
}
