mod config;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use repo_seed::{
    CancelFlag, ContentStore, Feedback, ProgressSink, ProjectSpec, SyncOptions, license,
    provision,
};
use repo_seed_github::{GitHubStore, GitHubStoreConfig};

#[derive(Parser)]
#[command(name = "repo-seeder")]
#[command(about = "Create a GitHub repository from a local project directory and upload its files")]
struct Cli {
    /// Project directory to upload
    directory: PathBuf,

    /// Repository name
    #[arg(long)]
    name: String,

    /// Repository description
    #[arg(long, default_value = "")]
    description: String,

    /// License (display name like "MIT License" or key like "mit")
    #[arg(long)]
    license: Option<String>,

    /// Author name for the license and README copyright line
    #[arg(long)]
    author: Option<String>,

    /// Patent notice text, written verbatim to a PATENTS file
    #[arg(long)]
    patent_notice: Option<String>,

    /// Read the patent notice from a file instead
    #[arg(long, conflicts_with = "patent_notice")]
    patent_file: Option<PathBuf>,

    /// Create the repository as private
    #[arg(long)]
    private: bool,

    /// Files uploaded concurrently (1 = strictly sequential)
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Override the GitHub API base URL (GitHub Enterprise, testing)
    #[arg(long)]
    api_base_url: Option<String>,
}

/// Sink that prints progress lines as they happen: info to stdout,
/// warnings and errors to stderr.
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&self, event: Feedback) {
        match &event {
            Feedback::Info(msg) => println!("{msg}"),
            _ => eprintln!("{event}"),
        }
    }
}

fn github_token() -> Result<String> {
    std::env::var("GITHUB_TOKEN")
        .context("GITHUB_TOKEN is not set; create a personal access token with repo scope")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let file_config = config::load_config();
    let sink = ConsoleSink;

    let author = cli
        .author
        .or(file_config.author)
        .context("no author name; pass --author or set `author` in the config file")?;

    let license_key = match cli.license.or(file_config.license) {
        Some(input) => license::key_for_display_name(&input, &sink),
        None => license::DEFAULT_LICENSE,
    };

    let patent_notice = match (cli.patent_notice, cli.patent_file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(
            std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read patent file {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let mut spec = ProjectSpec::new(cli.name, cli.description, license_key, author, cli.directory)?
        .with_private(cli.private || file_config.private);
    if let Some(notice) = patent_notice {
        spec = spec.with_patent_notice(notice);
    }

    let concurrency =
        NonZeroUsize::new(cli.concurrency).context("--concurrency must be at least 1")?;
    let options = SyncOptions { concurrency };

    let store = GitHubStore::new(GitHubStoreConfig {
        token: github_token()?,
        api_base_url: cli.api_base_url.or(file_config.api_base_url),
    });

    // One-shot auth handshake; provisioning never starts if this fails.
    let identity = store
        .identity()
        .await
        .map_err(|e| anyhow::anyhow!("authentication failed: {e}"))?;
    println!("Authenticated as {}", identity.login);

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("cancelling after the current file...");
                cancel.cancel();
            }
        });
    }

    let report = provision(&store, &identity, &spec, &options, &sink, &cancel).await?;

    let sync = &report.sync;
    println!(
        "Done: {} created, {} updated, {} failed.",
        sync.created(),
        sync.updated(),
        sync.failed()
    );
    if sync.cancelled {
        eprintln!("run cancelled before every file was processed");
    }
    if sync.failed() > 0 {
        anyhow::bail!("{} file(s) failed to upload", sync.failed());
    }

    Ok(())
}
