use crate::pr::PullRequest;
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write review file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Print the PR header and the generated review to the terminal.
///
/// PR #42: "Add OAuth2 login flow"
/// Author: alice | Files changed: 7 | +320 -45
///
/// Generated Review (cached):
/// ...
pub fn print_review(pr: &PullRequest, review: &str, from_cache: bool) {
    print!("{}", render_review(pr, review, from_cache));
}

fn render_review(pr: &PullRequest, review: &str, from_cache: bool) -> String {
    let heading = if from_cache {
        "Generated Review (cached):"
    } else {
        "Generated Review:"
    };
    format!(
        "\n{}\n{}\n\n{}\n{}\n\n",
        render_header(pr).bold(),
        render_summary(pr),
        heading.bold(),
        review
    )
}

/// Write the review as a markdown file.
///
/// # PR #42: "Add OAuth2 login flow"
/// **Author:** alice | **Files changed:** 7 | **+320 -45**
///
/// <review text>
#[instrument(skip(pr, review), fields(pr = pr.number, path = %path.display()))]
pub fn write_markdown(pr: &PullRequest, review: &str, path: &Path) -> Result<(), ReportError> {
    std::fs::write(path, render_markdown(pr, review))?;
    debug!("wrote review markdown");
    Ok(())
}

fn render_header(pr: &PullRequest) -> String {
    format!("PR #{}: \"{}\"", pr.number, pr.title)
}

fn render_summary(pr: &PullRequest) -> String {
    format!(
        "Author: {} | Files changed: {} | +{} -{}",
        pr.author,
        pr.files.len(),
        pr.additions(),
        pr.deletions()
    )
}

fn render_markdown(pr: &PullRequest, review: &str) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", render_header(pr)));
    md.push_str(&format!(
        "**Author:** {} | **Files changed:** {} | **+{} -{}**\n\n",
        pr.author,
        pr.files.len(),
        pr.additions(),
        pr.deletions()
    ));
    md.push_str(review.trim_end());
    md.push('\n');
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::ChangedFile;

    fn sample_pr() -> PullRequest {
        PullRequest {
            number: 42,
            title: "Add OAuth2 login flow".to_string(),
            body: String::new(),
            url: "https://github.com/acme/widgets/pull/42".to_string(),
            author: "alice".to_string(),
            diff: String::new(),
            files: vec![ChangedFile {
                path: "src/auth.rs".to_string(),
                additions: 320,
                deletions: 45,
            }],
        }
    }

    #[test]
    fn test_render_summary() {
        assert_eq!(
            render_summary(&sample_pr()),
            "Author: alice | Files changed: 1 | +320 -45"
        );
    }

    #[test]
    fn test_render_markdown() {
        let md = render_markdown(&sample_pr(), "## Verdict\n\nLooks fine.\n\n\n");
        assert!(md.starts_with("# PR #42: \"Add OAuth2 login flow\"\n\n"));
        assert!(md.contains("**Author:** alice | **Files changed:** 1 | **+320 -45**"));
        assert!(md.ends_with("## Verdict\n\nLooks fine.\n"));
    }

    #[test]
    fn test_write_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.md");
        write_markdown(&sample_pr(), "Needs tests.", &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# PR #42"));
        assert!(content.contains("Needs tests."));
    }

    #[test]
    fn test_write_markdown_to_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("review.md");
        assert!(matches!(
            write_markdown(&sample_pr(), "x", &path),
            Err(ReportError::FileWrite(_))
        ));
    }

    #[test]
    fn test_render_review() {
        let fresh = render_review(&sample_pr(), "Looks good.", false);
        assert!(fresh.contains("PR #42: \"Add OAuth2 login flow\""));
        assert!(fresh.contains("Author: alice | Files changed: 1 | +320 -45"));
        assert!(fresh.contains("Generated Review:"));
        assert!(!fresh.contains("(cached)"));
        assert!(fresh.contains("\nLooks good.\n"));

        let cached = render_review(&sample_pr(), "Looks good.", true);
        assert!(cached.contains("Generated Review (cached):"));
        assert!(cached.contains("\nLooks good.\n"));
    }
}
