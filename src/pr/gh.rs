use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::PrError;

/// Runs GitHub CLI subcommands and returns their trimmed stdout.
#[async_trait]
pub trait GhRunner: Send + Sync {
    async fn run(&self, args: &[&str]) -> Result<String, PrError>;
}

/// The real `gh` executable.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
}

impl GhCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl GhRunner for GhCli {
    #[instrument(skip(self), fields(program = %self.program))]
    async fn run(&self, args: &[&str]) -> Result<String, PrError> {
        let command = format!("{} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .env("GH_PROMPT_DISABLED", "1")
            .env("NO_COLOR", "1")
            .output()
            .await
            .map_err(|source| PrError::CommandSpawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PrError::CommandFailed {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(stdout_bytes = stdout.len(), "gh command succeeded");
        Ok(stdout)
    }
}
