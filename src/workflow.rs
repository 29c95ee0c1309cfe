use colored::Colorize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, Instrument};

use crate::cache::{self, ReviewCache};
use crate::pr::{self, GhRunner};
use crate::report;
use crate::review::{self, CompletionClient};

/// User-controlled toggles for one review run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pr_url: String,
    pub use_cache: bool,
    pub dry_run: bool,
    pub output: Option<PathBuf>,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub review: String,
    pub from_cache: bool,
    pub posted: bool,
}

/// Fetch, look up or generate, display, and post a review.
///
/// Every step is awaited before the next begins; the first error ends the run.
pub async fn run<G, C>(
    options: &RunOptions,
    gh: &G,
    client: &C,
    cache: &ReviewCache,
    prompt_file: &Path,
) -> Result<ReviewOutcome, Box<dyn Error>>
where
    G: GhRunner + ?Sized,
    C: CompletionClient + ?Sized,
{
    let span = info_span!("pr_review", pr_url = %options.pr_url);
    run_steps(options, gh, client, cache, prompt_file)
        .instrument(span)
        .await
}

async fn run_steps<G, C>(
    options: &RunOptions,
    gh: &G,
    client: &C,
    cache: &ReviewCache,
    prompt_file: &Path,
) -> Result<ReviewOutcome, Box<dyn Error>>
where
    G: GhRunner + ?Sized,
    C: CompletionClient + ?Sized,
{
    info!("parsing PR URL");
    let pr_url = pr::parse_pr_url(&options.pr_url)?;
    debug!(owner = %pr_url.owner, repo = %pr_url.repo, pr = pr_url.pr_number, "parsed PR URL");

    println!("{}", format!("Fetching PR data for {pr_url}").cyan());
    let pull_request = pr::fetch_pull_request(gh, &pr_url).await?;
    info!(files = pull_request.files.len(), diff_bytes = pull_request.diff.len(), "fetched PR data");

    let cache_key = cache::cache_key(pull_request.number, &pull_request.diff);
    debug!(%cache_key, "derived cache key");

    let cached = if options.use_cache {
        cache.load(&cache_key).await?
    } else {
        None
    };

    let from_cache = cached.is_some();
    let review = match cached {
        Some(review) => {
            info!(%cache_key, "using cached review");
            println!("{}", "Using cached review".yellow());
            review
        }
        None => {
            let prompt = review::load_prompt(prompt_file)?;
            println!("{}", "Sending PR for review...".cyan());
            let review = review::generate_review(client, &prompt, &pull_request).await?;
            if options.use_cache {
                cache.save(&cache_key, &review).await?;
            }
            review
        }
    };

    report::print_review(&pull_request, &review, from_cache);

    if let Some(path) = options.output.as_deref() {
        report::write_markdown(&pull_request, &review, path)?;
        info!(path = %path.display(), "review written to file");
    }

    let posted = if options.dry_run {
        println!("{}", "Dry run mode - review not posted".yellow());
        false
    } else {
        println!("{}", "Posting review to GitHub...".cyan());
        pr::post_review(gh, &pr_url, &review, cache.dir()).await?;
        println!("{}", "✓ Review posted successfully!".green());
        true
    };

    Ok(ReviewOutcome {
        review,
        from_cache,
        posted,
    })
}
