use chrono::DateTime;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{PipelineError, Result};
use crate::models::{GeneratedOutput, OUTPUT_VERSION, PlanningContext};

/// Get the default directory for storing generated output files
pub fn get_default_outputs_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| {
            PipelineError::Configuration("could not determine local data directory".to_string())
        })?
        .join("content-studio")
        .join("outputs");

    fs::create_dir_all(&data_dir).map_err(|e| PipelineError::io(&data_dir, e))?;

    Ok(data_dir)
}

/// Load the planning context (brand, pillars, channels, voice, sources)
/// exported by the persistence layer.
pub fn load_context(filepath: &Path) -> Result<PlanningContext> {
    let content = fs::read_to_string(filepath).map_err(|e| PipelineError::io(filepath, e))?;

    let context: PlanningContext =
        serde_json::from_str(&content).map_err(|source| PipelineError::Json {
            path: filepath.to_path_buf(),
            source,
        })?;

    validate_context(&context)?;
    Ok(context)
}

fn validate_context(context: &PlanningContext) -> Result<()> {
    if context.pillars.is_empty() {
        return Err(PipelineError::InvalidContext(
            "at least one content pillar is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for pillar in &context.pillars {
        if !seen.insert(pillar.id.as_str()) {
            return Err(PipelineError::InvalidContext(format!(
                "duplicate pillar id '{}'",
                pillar.id
            )));
        }
    }

    for source in &context.sources {
        source.validate()?;
    }

    Ok(())
}

/// Save a generated result where the persistence layer can pick it up.
pub fn save_output<T: Serialize>(kind: &str, payload: &T) -> Result<PathBuf> {
    save_output_in(&get_default_outputs_dir()?, kind, payload)
}

pub fn save_output_in<T: Serialize>(dir: &Path, kind: &str, payload: &T) -> Result<PathBuf> {
    let output = GeneratedOutput::new(kind, payload).map_err(|source| PipelineError::Json {
        path: dir.to_path_buf(),
        source,
    })?;

    let filename = format!(
        "{}-{}.json",
        kind,
        chrono::Utc::now().format("%Y%m%dT%H%M%S%3f")
    );
    let filepath = dir.join(filename);

    let json = serde_json::to_string_pretty(&output).map_err(|source| PipelineError::Json {
        path: filepath.clone(),
        source,
    })?;
    fs::write(&filepath, json).map_err(|e| PipelineError::io(&filepath, e))?;

    Ok(filepath)
}

fn load_output(filepath: &Path) -> Result<GeneratedOutput> {
    let content = fs::read_to_string(filepath).map_err(|e| PipelineError::io(filepath, e))?;
    let output: GeneratedOutput =
        serde_json::from_str(&content).map_err(|source| PipelineError::Json {
            path: filepath.to_path_buf(),
            source,
        })?;

    if output.version != OUTPUT_VERSION {
        return Err(PipelineError::InvalidContext(format!(
            "unsupported output file version {} in {}",
            output.version,
            filepath.display()
        )));
    }
    Ok(output)
}

/// List saved outputs in `dir`, newest first. Unreadable files are skipped.
pub fn list_outputs_in(dir: &Path) -> Result<Vec<(PathBuf, GeneratedOutput)>> {
    let mut files = Vec::new();

    if dir.exists() {
        for entry in fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))? {
            let path = entry.map_err(|e| PipelineError::io(dir, e))?.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                match load_output(&path) {
                    Ok(output) => files.push((path, output)),
                    Err(e) => warn!(path = %path.display(), error = %e, "could not load output"),
                }
            }
        }
    }

    // Sort by creation date (newest first)
    files.sort_by(|a, b| {
        let time_a = DateTime::parse_from_rfc3339(&a.1.created_at).ok();
        let time_b = DateTime::parse_from_rfc3339(&b.1.created_at).ok();
        time_b.cmp(&time_a)
    });

    Ok(files)
}

pub fn list_outputs() -> Result<Vec<(PathBuf, GeneratedOutput)>> {
    list_outputs_in(&get_default_outputs_dir()?)
}
