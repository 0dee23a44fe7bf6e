use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::models::PlanningContext;
use shared::prompts::DEFAULT_IDEA_COUNT;
use shared::{
    list_outputs, load_context, save_output, Config, Drafter, GenerationRequest, HeadlineScraper,
    IdeaContext, LazyClaude, PipelineError, RefineInstruction,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "draft-post")]
#[command(about = "Draft, refine and brainstorm posts with Claude")]
struct Args {
    /// Planning context JSON (brand, pillars, channels, voice, sources)
    #[arg(short, long, global = true)]
    context: Option<PathBuf>,

    /// Save the result as JSON for the planner to import
    #[arg(short, long, global = true)]
    save: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a first draft for a topic
    Draft {
        #[arg(short, long)]
        topic: String,
        /// Pillar id from the planning context
        #[arg(short, long)]
        pillar: String,
        /// Channel id from the planning context
        #[arg(long)]
        channel: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Rework an existing draft
    Refine {
        #[arg(short, long)]
        body: String,
        #[arg(long)]
        hook: Option<String>,
        /// shorten, hook, simplify, story, specific or cta
        #[arg(short, long, conflicts_with = "instruction")]
        action: Option<String>,
        /// Free-text instruction
        #[arg(short, long)]
        instruction: Option<String>,
    },
    /// Brainstorm original post ideas without headlines
    Ideas {
        #[arg(short = 'n', long, default_value_t = DEFAULT_IDEA_COUNT)]
        count: usize,
    },
    /// Pull the readable text out of an article
    Article {
        #[arg(short, long)]
        url: String,
    },
    /// List previously saved results
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    match args.command {
        Command::Draft {
            topic,
            pillar,
            channel,
            notes,
        } => {
            let context = require_context(args.context.as_ref())?;
            let pillar = context
                .pillar(&pillar)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Unknown pillar: {}", pillar))?;
            let channel = match channel {
                Some(id) => Some(
                    context
                        .channel(&id)
                        .cloned()
                        .ok_or_else(|| anyhow::anyhow!("Unknown channel: {}", id))?,
                ),
                None => None,
            };

            let request = GenerationRequest {
                topic,
                pillar,
                channel,
                notes,
                voice: context.voice.clone(),
            };

            println!("\n🤖 Drafting with Claude...");
            let drafter = Drafter::new(LazyClaude::new(config.llm));
            let draft = drafter
                .generate_draft(&request)
                .await
                .map_err(generation_failure)?;

            println!("\n{}\n\n{}", draft.hook, draft.body);
            if args.save {
                let path = save_output("draft", &draft).context("Failed to save draft")?;
                println!("\n✅ Draft saved to: {}", path.display());
            }
        }
        Command::Refine {
            body,
            hook,
            action,
            instruction,
        } => {
            let instruction = match (action, instruction) {
                (Some(action), _) => RefineInstruction::from_action(&action).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Invalid action: {}. Use shorten, hook, simplify, story, specific or cta",
                        action
                    )
                })?,
                (None, Some(text)) if !text.trim().is_empty() => RefineInstruction::Custom(text),
                _ => anyhow::bail!("Pass either --action or --instruction"),
            };

            // Voice is optional here, so a missing context file is fine.
            let context = match args.context.as_ref() {
                Some(path) => Some(load(path)?),
                None => None,
            };
            let voice = context.as_ref().and_then(|c| c.voice.as_ref());

            println!("\n✏️  Refining with Claude...");
            let drafter = Drafter::new(LazyClaude::new(config.llm));
            let refinement = drafter
                .refine_draft(hook.as_deref(), &body, voice, &instruction)
                .await
                .map_err(generation_failure)?;

            println!("\n{}\n\n{}", refinement.hook, refinement.body);
            println!("\nWhat changed: {}", refinement.changes);
            if args.save {
                let path =
                    save_output("refinement", &refinement).context("Failed to save refinement")?;
                println!("\n✅ Refinement saved to: {}", path.display());
            }
        }
        Command::Ideas { count } => {
            let context = require_context(args.context.as_ref())?;
            let idea_context = IdeaContext {
                brand: &context.brand,
                pillars: &context.pillars,
                voice: context.voice.as_ref(),
                count,
            };

            println!("\n🤖 Brainstorming with Claude...");
            let drafter = Drafter::new(LazyClaude::new(config.llm));
            let ideas = drafter
                .generate_ideas(None, &idea_context)
                .await
                .map_err(generation_failure)?;

            for (i, idea) in ideas.iter().enumerate() {
                println!(
                    "\n{}. {} [{:?}, {}]",
                    i + 1,
                    idea.title,
                    idea.priority,
                    idea.pillar_id
                );
                println!("   {}", idea.notes);
            }
            if args.save {
                let path = save_output("ideas", &ideas).context("Failed to save ideas")?;
                println!("\n✅ Ideas saved to: {}", path.display());
            }
        }
        Command::Article { url } => {
            println!("\n🌐 Fetching article...");
            let scraper = HeadlineScraper::new(&config.scrape)?;
            let text = scraper
                .fetch_article_text(&url)
                .await
                .map_err(generation_failure)?;

            println!("\n{}", text);
            if args.save {
                let payload = serde_json::json!({ "url": url, "text": text });
                let path = save_output("article", &payload).context("Failed to save article")?;
                println!("\n✅ Article saved to: {}", path.display());
            }
        }
        Command::History => {
            let outputs = list_outputs()?;
            if outputs.is_empty() {
                println!("No saved results yet.");
            }
            for (path, output) in outputs {
                let created = chrono::DateTime::parse_from_rfc3339(&output.created_at)
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or(output.created_at);
                println!("  {} {:<10} {}", created, output.kind, path.display());
            }
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<PlanningContext> {
    load_context(path)
        .with_context(|| format!("Failed to load planning context {}", path.display()))
}

fn require_context(path: Option<&PathBuf>) -> Result<PlanningContext> {
    let path = path.ok_or_else(|| anyhow::anyhow!("This command needs --context <file>"))?;
    load(path)
}

/// Generation and article failures end the run with a plain retry prompt;
/// configuration problems keep their detail so they can be fixed.
fn generation_failure(e: PipelineError) -> anyhow::Error {
    if e.is_retryable() {
        anyhow::anyhow!("{}. Something went wrong, please try again.", e)
    } else {
        anyhow::Error::new(e)
    }
}
