use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use clap::{ArgGroup, Parser};
use hibp_range::{
    BatchOptions, BreachChecker, CancellationToken, ClientConfig, DEFAULT_BASE_URL,
    DEFAULT_CONCURRENCY, FailurePolicy, RangeClient, RetryPolicy,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::error::Error;
use crate::sink::{Color, Format, RenderConfig, append_results};
use crate::source::read_credentials;

#[derive(Parser, Debug)]
#[command(name = "hibp-check")]
#[command(version)]
#[command(about = "Check whether passwords have been leaked, without sending them anywhere")]
#[command(group(ArgGroup::new("input").required(true).args(["password", "file"])))]
pub struct Cli {
    /// Password to check
    #[arg(short, long)]
    pub password: Option<String>,

    /// Newline-delimited file of passwords to check (`-` reads stdin)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Append batch results to this file instead of printing them
    #[arg(short, long, requires = "file", conflicts_with = "password")]
    pub save_file: Option<PathBuf>,

    /// Base URL of the range API
    #[arg(long, env = "HIBP_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Number of concurrent lookups in batch mode
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Retries per lookup on network errors, throttling and 5xx responses
    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Ask the service to pad responses so their size reveals less
    #[arg(long)]
    pub padding: bool,

    /// Stop the batch at the first password that cannot be checked
    #[arg(long)]
    pub fail_fast: bool,

    /// When to color output
    #[arg(long, value_enum, default_value_t = Color::Auto)]
    pub color: Color,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// How a run ended when nothing went wrong outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every password was checked.
    Complete,
    /// At least one password is unknown, or the batch stopped early.
    Incomplete,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            RunStatus::Complete => 0,
            RunStatus::Incomplete => 2,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Run one invocation, writing results to `out`. Diagnostics go to stderr.
pub async fn run(
    cli: &Cli,
    render: &RenderConfig,
    out: &mut impl Write,
) -> Result<RunStatus, Error> {
    let client = RangeClient::new(ClientConfig {
        base_url: cli.api_url.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
        add_padding: cli.padding,
        pool_max_idle_per_host: cli.concurrency,
        ..ClientConfig::default()
    })?;
    let checker = BreachChecker::new(client).with_retry(RetryPolicy::exponential(cli.retries));

    match (&cli.password, &cli.file) {
        (Some(password), None) => {
            let exposure = checker.evaluate(password).await?;
            writeln!(out, "{}", render.single(password.as_bytes(), &exposure)?)?;
            Ok(RunStatus::Complete)
        }
        (None, Some(file)) => check_file(cli, file, &checker, render, out).await,
        _ => unreachable!("clap requires exactly one of --password or --file"),
    }
}

async fn check_file(
    cli: &Cli,
    file: &Path,
    checker: &BreachChecker,
    render: &RenderConfig,
    out: &mut impl Write,
) -> Result<RunStatus, Error> {
    let credentials = read_credentials(file).await?;
    let total = credentials.len() as u64;
    info!(total, concurrency = cli.concurrency, "checking passwords");

    let progress_counter = Arc::new(AtomicU64::new(0));
    let progress_bar = if !cli.no_progress && console::Term::stderr().is_term() {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    // Spawn progress updater task
    let progress_task = progress_bar.clone().map(|pb| {
        let counter = Arc::clone(&progress_counter);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(100)).await;
                let current = counter.load(Ordering::Relaxed);
                pb.set_position(current);
                if current >= total {
                    break;
                }
            }
        })
    });

    // Ctrl-C stops outstanding lookups; whatever finished is still reported
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let options = BatchOptions {
        concurrency: cli.concurrency,
        policy: if cli.fail_fast { FailurePolicy::Abort } else { FailurePolicy::Isolate },
        cancel: Some(cancel),
        progress: Some(Arc::clone(&progress_counter)),
    };
    let result = checker.evaluate_all(credentials, &options).await;

    interrupt.abort();
    if let Some(task) = progress_task {
        task.abort();
    }
    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    match &cli.save_file {
        Some(path) => {
            append_results(path, &result.entries, render).await?;
            writeln!(out, "The results were saved in \"{}\".", path.display())?;
        }
        None => {
            for entry in &result.entries {
                writeln!(out, "{}", render.batch_line(entry)?)?;
            }
        }
    }

    let unknown = result.unknown_count();
    if unknown > 0 {
        warn!(unknown, "some passwords could not be checked");
        eprintln!(
            "{}",
            render.failure(&format!(
                "{unknown} password(s) could not be checked and must not be assumed safe"
            ))
        );
    }
    if let Some(e) = &result.aborted {
        let skipped = total - result.entries.len() as u64;
        eprintln!(
            "{}",
            render.failure(&format!(
                "Batch stopped early ({e}); {skipped} password(s) not checked"
            ))
        );
    }

    if result.is_complete() && unknown == 0 {
        Ok(RunStatus::Complete)
    } else {
        Ok(RunStatus::Incomplete)
    }
}
