// Public modules
pub mod config;
pub mod drafting;
pub mod error;
pub mod extractor;
pub mod html;
pub mod io;
pub mod llm;
pub mod models;
pub mod prompts;

// Re-export commonly used types
pub use config::{Config, LlmConfig, ScrapeConfig};
pub use drafting::Drafter;
pub use error::{PipelineError, Result};
pub use extractor::HeadlineScraper;
pub use io::{list_outputs, load_context, save_output};
pub use llm::{ClaudeClient, LazyClaude, TextModel};
pub use models::{
    pooled_headlines, Channel, Draft, GenerationRequest, Idea, PlanningContext, RefineInstruction,
    Refinement, ScrapeOutcome, ScrapeResult, SourceDescriptor,
};
pub use prompts::IdeaContext;
