use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use regex::RegexBuilder;
use url::Url;

use safarivideos_core::fs_paths::{AppPaths, DesktopPaths};

use crate::core::auth::resolve_credentials;
use crate::core::http_client::build_client;
use crate::core::process::ProcessRunner;
use crate::core::ytdlp;
use crate::models::settings::{AppSettings, Profile};
use crate::models::task::RunSummary;
use crate::platforms::safari::downloader::{run_tasks, ExecutorOptions};
use crate::platforms::safari::planner::{build_plan, PlanOptions};
use crate::platforms::safari::api;
use crate::storage::config::load_settings;

/// Download every video of a course TOC page with youtube-dl / yt-dlp
#[derive(Parser, Debug)]
#[command(name = "safarivideos")]
#[command(version)]
pub struct Args {
    /// Course table-of-contents URL
    pub url: String,

    /// Credentials as <username:password>
    #[arg(short, long)]
    pub login: Option<String>,

    /// Cookie file handed to the downloader instead of a login
    #[arg(short, long)]
    pub cookies: Option<PathBuf>,

    /// Output root directory
    #[arg(short, long)]
    pub prefix: Option<PathBuf>,

    /// Format selector; "best" or "" downloads without one
    #[arg(short, long)]
    pub format: Option<String>,

    /// Print commands instead of running them
    #[arg(long, alias = "dry-run")]
    pub dryrun: bool,

    /// Only download videos whose output path matches (case-insensitive)
    #[arg(short, long)]
    pub regex: Option<String>,

    /// Download profile (default, mobile)
    #[arg(long)]
    pub profile: Option<Profile>,

    /// Path to the youtube-dl / yt-dlp binary
    #[arg(long)]
    pub downloader: Option<PathBuf>,

    /// Proxy URL for the page fetch and the downloader
    #[arg(long)]
    pub proxy: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Everything a run needs, resolved once from CLI, settings and profile.
#[derive(Debug)]
pub struct RunConfig {
    pub url: Url,
    pub prefix: PathBuf,
    pub format: Option<String>,
    pub default_format: String,
    pub downloader: Option<PathBuf>,
    pub proxy: Option<String>,
    pub executor: ExecutorOptions,
}

impl RunConfig {
    pub async fn resolve(
        args: Args,
        settings: AppSettings,
        paths: &dyn AppPaths,
    ) -> anyhow::Result<Self> {
        let url = Url::parse(args.url.trim())
            .with_context(|| format!("invalid course URL '{}'", args.url))?;

        let profile = args.profile.unwrap_or(settings.download.profile);
        let spec = profile.spec();

        let prefix = args
            .prefix
            .or(settings.download.output_prefix)
            .unwrap_or_else(|| PathBuf::from(spec.default_prefix));

        let filter = args
            .regex
            .as_deref()
            .map(|re| RegexBuilder::new(re).case_insensitive(true).build())
            .transpose()
            .context("invalid --regex")?;

        let credentials =
            resolve_credentials(args.login.as_deref(), args.cookies.as_deref(), paths).await?;

        let proxy = args.proxy.or_else(|| settings.proxy.url());

        Ok(Self {
            url,
            prefix,
            format: args.format.map(|f| ytdlp::normalize_format(&f)),
            default_format: spec.default_format.to_string(),
            downloader: args.downloader.or(settings.download.downloader),
            proxy: proxy.clone(),
            executor: ExecutorOptions {
                credentials,
                filter,
                dry_run: args.dryrun,
                extra_flags: settings.download.extra_flags,
                proxy,
            },
        })
    }
}

pub async fn execute(args: Args) -> anyhow::Result<RunSummary> {
    let paths = DesktopPaths;
    let settings = load_settings(&paths).await;
    let config = RunConfig::resolve(args, settings, &paths).await?;
    run(&config).await
}

pub async fn run(config: &RunConfig) -> anyhow::Result<RunSummary> {
    let client = build_client(config.proxy.as_deref())?;
    let tool = ytdlp::resolve_downloader(config.downloader.as_deref()).await;

    let course = api::load_course(&client, &config.url).await?;
    let tasks = build_plan(
        &course,
        &PlanOptions {
            root: &config.prefix,
            tool: &tool,
            format: config.format.as_deref(),
            default_format: &config.default_format,
        },
    );
    tracing::info!(
        "{}: {} lessons, {} videos -> {}",
        course.title,
        course.lessons.len(),
        tasks.len(),
        config.prefix.display()
    );

    let summary = run_tasks(&tasks, &config.executor, &ProcessRunner).await;
    tracing::info!(
        "done: {} downloaded, {} resumed, {} already present, {} filtered, {} failed",
        summary.downloaded,
        summary.resumed,
        summary.existing,
        summary.filtered,
        summary.failed
    );
    if summary.failed > 0 {
        tracing::warn!("{} of {} videos failed", summary.failed, tasks.len());
    }
    Ok(summary)
}
