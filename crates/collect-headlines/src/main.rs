use anyhow::{Context, Result};
use clap::Parser;
use shared::prompts::DEFAULT_IDEA_COUNT;
use shared::{
    load_context, pooled_headlines, save_output, Config, Drafter, HeadlineScraper, IdeaContext,
    LazyClaude, ScrapeOutcome,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "collect-headlines")]
#[command(about = "Scrape headlines from your news sources and optionally turn them into post ideas")]
struct Args {
    /// Planning context JSON (brand, pillars, channels, voice, sources)
    #[arg(short, long)]
    context: PathBuf,

    /// Generate post ideas from the scraped headlines
    #[arg(short, long)]
    ideas: bool,

    /// Number of ideas to ask for
    #[arg(short = 'n', long, default_value_t = DEFAULT_IDEA_COUNT)]
    count: usize,

    /// Save results as JSON for the planner to import
    #[arg(short, long)]
    save: bool,
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
    let context = load_context(&args.context)
        .with_context(|| format!("Failed to load planning context {}", args.context.display()))?;

    if context.sources.is_empty() {
        println!("No news sources configured in {}.", args.context.display());
        return Ok(());
    }

    println!(
        "\n🌐 Scraping {} sources (one at a time)...",
        context.sources.len()
    );
    let scraper = HeadlineScraper::new(&config.scrape)?;
    let results = scraper.fetch_headlines_for_all(&context.sources).await;

    for result in &results {
        match &result.outcome {
            ScrapeOutcome::Headlines(headlines) => {
                println!("\n✓ {} ({} headlines)", result.source, headlines.len());
                for headline in headlines {
                    println!("  • {}", headline);
                }
            }
            ScrapeOutcome::Empty => {
                println!("\n⚠ {}: no headlines", result.source);
            }
        }
    }

    let pool = pooled_headlines(&results);
    println!(
        "\n✓ Collected {} headlines from {}/{} sources",
        pool.len(),
        results
            .iter()
            .filter(|r| !r.headlines().is_empty())
            .count(),
        results.len()
    );

    if args.save {
        let path = save_output("headlines", &results).context("Failed to save headlines")?;
        println!("✓ Headlines saved to: {}", path.display());
    }

    if !args.ideas {
        return Ok(());
    }

    println!("\n🤖 Generating post ideas with Claude...");
    let drafter = Drafter::new(LazyClaude::new(config.llm));
    let idea_context = IdeaContext {
        brand: &context.brand,
        pillars: &context.pillars,
        voice: context.voice.as_ref(),
        count: args.count,
    };

    let ideas = match drafter
        .generate_ideas(Some(pool.as_slice()), &idea_context)
        .await
    {
        Ok(ideas) => ideas,
        Err(e) if e.is_retryable() => {
            anyhow::bail!("Idea generation failed ({}). Please try again.", e)
        }
        Err(e) => return Err(e).context("Idea generation failed"),
    };

    for (i, idea) in ideas.iter().enumerate() {
        let pillar = context
            .pillar(&idea.pillar_id)
            .map(|p| p.label.as_str())
            .unwrap_or(idea.pillar_id.as_str());
        println!("\n{}. {} [{:?}, {}]", i + 1, idea.title, idea.priority, pillar);
        println!("   {}", idea.notes);
    }

    if args.save {
        let path = save_output("ideas", &ideas).context("Failed to save ideas")?;
        println!("\n✅ Ideas saved to: {}", path.display());
    }

    Ok(())
}
