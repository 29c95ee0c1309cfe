use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::ReviewError;

#[derive(Deserialize)]
struct PromptFile {
    prompt: String,
}

/// Read the system prompt from the `prompt` key of a YAML file.
pub fn load_prompt(path: &Path) -> Result<String, ReviewError> {
    if !path.exists() {
        return Err(ReviewError::PromptNotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|source| ReviewError::PromptRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file: PromptFile =
        serde_yaml::from_str(&contents).map_err(|source| ReviewError::PromptParse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), prompt_bytes = file.prompt.len(), "loaded review prompt");
    Ok(file.prompt)
}
