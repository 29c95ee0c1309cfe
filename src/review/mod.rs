pub mod openai;
pub mod prompt;
pub mod types;

pub use openai::OpenAiClient;
pub use prompt::load_prompt;
pub use types::ChatMessage;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::pr::PullRequest;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Prompt file not found: {}", .0.display())]
    PromptNotFound(PathBuf),

    #[error("Failed to read prompt file {}: {source}", .path.display())]
    PromptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse prompt file {}: {source}", .path.display())]
    PromptParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Error calling AI service: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Error calling AI service: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Error calling AI service: response contained no review text")]
    EmptyResponse,
}

/// A chat-completion backend that turns a conversation into review text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the conversation and return the text of the first choice.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ReviewError>;
}

/// Assemble the user message: repository, number, title, body, changed
/// paths and the full diff. Nothing is truncated.
pub fn build_user_message(pr: &PullRequest) -> String {
    let files = pr
        .files
        .iter()
        .map(|f| f.path.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\nRepository: {}\nPull Request Number: {}\nTitle: {}\nBody: {}\n\nFiles Changed:\n{}\n\nDiff:\n{}\n",
        pr.repository(),
        pr.number,
        pr.title,
        pr.body,
        files,
        pr.diff,
    )
}

/// Ask the completion backend for a review of `pr`, using `prompt` as the
/// system message.
#[instrument(skip_all, fields(pr = pr.number))]
pub async fn generate_review<C>(client: &C, prompt: &str, pr: &PullRequest) -> Result<String, ReviewError>
where
    C: CompletionClient + ?Sized,
{
    let messages = [ChatMessage::system(prompt), ChatMessage::user(build_user_message(pr))];
    let review = client.complete(&messages).await?;
    debug!(review_bytes = review.len(), "review generated");
    Ok(review)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pr::ChangedFile;
    use std::sync::Mutex;

    /// Returns a fixed review and records every conversation it receives.
    pub(crate) struct RecordingClient {
        reply: Result<String, u16>,
        pub(crate) requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl RecordingClient {
        pub(crate) fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ReviewError> {
            self.requests.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ReviewError::Status {
                    status: *status,
                    body: "boom".to_string(),
                }),
            }
        }
    }

    fn sample_pr() -> PullRequest {
        PullRequest {
            number: 42,
            title: "Add widgets".to_string(),
            body: "Adds the widget factory.".to_string(),
            url: "https://github.com/acme/widgets/pull/42".to_string(),
            author: "alice".to_string(),
            diff: "+foo\n-bar".to_string(),
            files: vec![
                ChangedFile {
                    path: "src/widget.rs".to_string(),
                    additions: 1,
                    deletions: 1,
                },
                ChangedFile {
                    path: "README.md".to_string(),
                    additions: 0,
                    deletions: 0,
                },
            ],
        }
    }

    #[test]
    fn test_build_user_message() {
        let message = build_user_message(&sample_pr());
        let expected = "
Repository: acme/widgets
Pull Request Number: 42
Title: Add widgets
Body: Adds the widget factory.

Files Changed:
src/widget.rs
README.md

Diff:
+foo
-bar
";
        assert_eq!(message, expected);
    }

    #[test]
    fn test_build_user_message_keeps_large_diff() {
        let mut pr = sample_pr();
        pr.diff = "+x\n".repeat(50_000);
        let message = build_user_message(&pr);
        assert!(message.ends_with(&format!("{}\n", pr.diff)));
    }

    #[tokio::test]
    async fn test_generate_review_sends_system_and_user() {
        let client = RecordingClient::replying("Ship it.");
        let review = generate_review(&client, "You are a reviewer.", &sample_pr())
            .await
            .unwrap();
        assert_eq!(review, "Ship it.");

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let messages = &requests[0];
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::system("You are a reviewer."));
        assert_eq!(messages[1], ChatMessage::user(build_user_message(&sample_pr())));
    }

    #[tokio::test]
    async fn test_generate_review_propagates_failure() {
        let client = RecordingClient::failing(500);
        let err = generate_review(&client, "p", &sample_pr()).await.unwrap_err();
        assert!(matches!(err, ReviewError::Status { status: 500, .. }));
    }
}
