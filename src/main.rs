mod cache;
mod config;
mod pr;
mod report;
mod review;
mod workflow;

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// PR Review — CLI tool that sends a GitHub Pull Request to an
/// OpenAI-compatible model for review and posts the result as a PR comment.
///
/// Requires OPENAI_BASE_URL; OPENAI_API_KEY is optional.
#[derive(Parser, Debug)]
#[command(name = "pr-review", version, about)]
struct Cli {
    /// GitHub Pull Request URL (e.g., https://github.com/owner/repo/pull/123)
    pr_url: String,

    /// Use cached results if available (default)
    #[arg(long, overrides_with = "no_cache")]
    cache: bool,

    /// Neither read nor write the review cache
    #[arg(long, overrides_with = "cache")]
    no_cache: bool,

    /// Generate the review but don't post it to GitHub
    #[arg(long)]
    dry_run: bool,

    /// Also write the review to a markdown file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn use_cache(&self) -> bool {
        self.cache || !self.no_cache
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    info!("loading configuration");
    let config = config::Config::load()?;
    let gh = pr::GhCli::new(&config.github.cli);

    let outcome = review_pull_request(cli, &config, |name| std::env::var(name).ok(), &gh).await?;
    info!(
        review_bytes = outcome.review.len(),
        from_cache = outcome.from_cache,
        posted = outcome.posted,
        "done"
    );
    Ok(())
}

/// Resolve the completion endpoint, open the cache and run the review.
///
/// The endpoint is resolved first so a missing OPENAI_BASE_URL fails before
/// any `gh` call, HTTP request or cache access.
async fn review_pull_request<F, G>(
    cli: Cli,
    config: &config::Config,
    env: F,
    gh: &G,
) -> Result<workflow::ReviewOutcome, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Option<String>,
    G: pr::GhRunner + ?Sized,
{
    let credentials = config.openai_credentials(env)?;
    debug!(base_url = %credentials.base_url, model = %config.openai.model, "resolved completion endpoint");

    let cache = cache::ReviewCache::open(&config.cache.dir).await?;
    let client = review::OpenAiClient::new(&credentials, &config.openai.model);

    let options = workflow::RunOptions {
        use_cache: cli.use_cache(),
        pr_url: cli.pr_url,
        dry_run: cli.dry_run,
        output: cli.output,
    };

    workflow::run(&options, gh, &client, &cache, &config.prompt.file).await
}
