use regex::Regex;

use crate::core::auth::Credentials;
use crate::core::process::CommandRunner;
use crate::models::task::{DownloadTask, RunSummary, TaskOutcome, ToolCommand};

#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    pub credentials: Credentials,
    /// Tasks whose output path does not match are skipped.
    pub filter: Option<Regex>,
    pub dry_run: bool,
    /// Appended to every fresh download after the credential flags.
    pub extra_flags: Vec<String>,
    /// Passed to both resume and fresh invocations.
    pub proxy: Option<String>,
}

impl ExecutorOptions {
    fn proxy_args(&self) -> Vec<String> {
        match &self.proxy {
            Some(proxy) => vec!["--proxy".to_string(), proxy.clone()],
            None => Vec::new(),
        }
    }

    fn resume_command(&self, task: &DownloadTask) -> ToolCommand {
        task.resume_command.clone().args(self.proxy_args())
    }

    fn fresh_command(&self, task: &DownloadTask) -> ToolCommand {
        task.download_command
            .clone()
            .args(self.credentials.tool_args())
            .args(self.proxy_args())
            .args(self.extra_flags.iter().cloned())
    }
}

/// Runs tasks one after another; a failed task never stops the batch.
pub async fn run_tasks(
    tasks: &[DownloadTask],
    opts: &ExecutorOptions,
    runner: &dyn CommandRunner,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for (i, task) in tasks.iter().enumerate() {
        tracing::debug!("[{}/{}] {}", i + 1, tasks.len(), task.output_file.display());
        let outcome = execute_task(task, opts, runner).await;
        summary.record(outcome);
    }
    summary
}

pub async fn execute_task(
    task: &DownloadTask,
    opts: &ExecutorOptions,
    runner: &dyn CommandRunner,
) -> TaskOutcome {
    let output = task.output_file.to_string_lossy();

    if let Some(filter) = &opts.filter {
        if !filter.is_match(&output) {
            if !opts.dry_run {
                println!("[SKIP]: {}", output);
            }
            return TaskOutcome::Filtered;
        }
    }

    if !opts.dry_run {
        if let Err(e) = tokio::fs::create_dir_all(&task.folder).await {
            tracing::warn!("failed to create {}: {}", task.folder.display(), e);
            return TaskOutcome::Failed;
        }
    }

    if tokio::fs::try_exists(&task.output_file).await.unwrap_or(false) {
        tracing::debug!("already downloaded: {}", output);
        return TaskOutcome::Existing;
    }

    let (cmd, done) = if tokio::fs::try_exists(&task.sidecar_json).await.unwrap_or(false) {
        tracing::info!("resuming {}", output);
        (opts.resume_command(task), TaskOutcome::Resumed)
    } else {
        tracing::info!("downloading {}", output);
        (opts.fresh_command(task), TaskOutcome::Downloaded)
    };

    if opts.dry_run {
        println!("{}\n", cmd);
        return done;
    }

    let outcome = match runner.run(&cmd).await {
        Ok(result) if result.success() => done,
        Ok(result) => {
            let code = result
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            tracing::warn!(
                "{} exited with {} for {}: {}",
                cmd.program,
                code,
                output,
                result.stderr_tail.join(" | ")
            );
            TaskOutcome::Failed
        }
        Err(e) => {
            tracing::warn!("{:#}", e);
            TaskOutcome::Failed
        }
    };

    let _ = tokio::fs::remove_file(&task.sidecar_json).await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::Login;
    use crate::core::process::CommandOutcome;
    use crate::core::ytdlp;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    struct RecordingRunner {
        calls: Mutex<Vec<ToolCommand>>,
        exit_code: Option<i32>,
    }

    impl RecordingRunner {
        fn new(exit_code: Option<i32>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                exit_code,
            }
        }

        fn calls(&self) -> Vec<ToolCommand> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, cmd: &ToolCommand) -> anyhow::Result<CommandOutcome> {
            self.calls.lock().unwrap().push(cmd.clone());
            Ok(CommandOutcome {
                exit_code: self.exit_code,
                stderr_tail: vec!["ERROR: nope".into()],
            })
        }
    }

    struct BrokenRunner;

    #[async_trait]
    impl CommandRunner for BrokenRunner {
        async fn run(&self, _cmd: &ToolCommand) -> anyhow::Result<CommandOutcome> {
            Err(anyhow::anyhow!("failed to start youtube-dl: not found"))
        }
    }

    fn task(root: &Path, name: &str) -> DownloadTask {
        let folder = root.join("Course").join("1. Lesson");
        let output_file = folder.join(format!("{}.mp4", name));
        let sidecar_json = folder.join(format!("{}.info.json", name));
        DownloadTask {
            resume_command: ytdlp::resume_command("youtube-dl", &sidecar_json, &output_file),
            download_command: ytdlp::download_command(
                "youtube-dl",
                "https://example.com/v",
                &output_file,
                None,
                "worstvideo[height=720]",
                None,
            ),
            folder,
            output_file,
            sidecar_json,
        }
    }

    fn login_opts() -> ExecutorOptions {
        ExecutorOptions {
            credentials: Credentials::Login(Login {
                username: "alice".into(),
                password: "secret".into(),
            }),
            filter: None,
            dry_run: false,
            extra_flags: Vec::new(),
            proxy: None,
        }
    }

    #[tokio::test]
    async fn fresh_download_creates_folder_and_appends_login() {
        let dir = tempfile::tempdir().unwrap();
        let task = task(dir.path(), "1. Intro");
        let runner = RecordingRunner::new(Some(0));

        let outcome = execute_task(&task, &login_opts(), &runner).await;

        assert_eq!(outcome, TaskOutcome::Downloaded);
        assert!(task.folder.is_dir());
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].has_arg("--write-info-json"));
        assert_eq!(calls[0].args[calls[0].args.len() - 4..], ["-u", "alice", "-p", "secret"]);
    }

    #[tokio::test]
    async fn fresh_download_uses_cookie_file_proxy_and_extra_flags() {
        let dir = tempfile::tempdir().unwrap();
        let task = task(dir.path(), "1. Intro");
        let runner = RecordingRunner::new(Some(0));
        let opts = ExecutorOptions {
            credentials: Credentials::CookieFile(PathBuf::from("cookies.txt")),
            extra_flags: vec!["--limit-rate".into(), "2M".into()],
            proxy: Some("http://127.0.0.1:3128".into()),
            ..login_opts()
        };

        execute_task(&task, &opts, &runner).await;

        let calls = runner.calls();
        assert_eq!(calls[0].value_of("--cookies"), Some("cookies.txt"));
        assert_eq!(calls[0].value_of("--proxy"), Some("http://127.0.0.1:3128"));
        assert_eq!(calls[0].value_of("--limit-rate"), Some("2M"));
        assert!(!calls[0].has_arg("-u"));
    }

    #[tokio::test]
    async fn resume_goes_through_proxy_without_extra_flags() {
        let dir = tempfile::tempdir().unwrap();
        let task = task(dir.path(), "1. Intro");
        std::fs::create_dir_all(&task.folder).unwrap();
        std::fs::write(&task.sidecar_json, b"{}").unwrap();
        let runner = RecordingRunner::new(Some(0));
        let opts = ExecutorOptions {
            extra_flags: vec!["--limit-rate".into(), "2M".into()],
            proxy: Some("http://127.0.0.1:3128".into()),
            ..login_opts()
        };

        let outcome = execute_task(&task, &opts, &runner).await;

        assert_eq!(outcome, TaskOutcome::Resumed);
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].has_arg("--load-info-json"));
        assert_eq!(calls[0].value_of("--proxy"), Some("http://127.0.0.1:3128"));
        assert!(!calls[0].has_arg("--limit-rate"));
        assert!(!calls[0].has_arg("-u"));
    }

    #[tokio::test]
    async fn existing_output_invokes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let task = task(dir.path(), "1. Intro");
        std::fs::create_dir_all(&task.folder).unwrap();
        std::fs::write(&task.output_file, b"video").unwrap();
        std::fs::write(&task.sidecar_json, b"{}").unwrap();
        let runner = RecordingRunner::new(Some(0));

        let outcome = execute_task(&task, &login_opts(), &runner).await;

        assert_eq!(outcome, TaskOutcome::Existing);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn sidecar_runs_resume_command_only() {
        let dir = tempfile::tempdir().unwrap();
        let task = task(dir.path(), "1. Intro");
        std::fs::create_dir_all(&task.folder).unwrap();
        std::fs::write(&task.sidecar_json, b"{}").unwrap();
        let runner = RecordingRunner::new(Some(0));

        let outcome = execute_task(&task, &login_opts(), &runner).await;

        assert_eq!(outcome, TaskOutcome::Resumed);
        assert_eq!(runner.calls(), vec![task.resume_command.clone()]);
        assert!(!task.sidecar_json.exists());
    }

    #[tokio::test]
    async fn sidecar_is_deleted_after_fresh_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let task = task(dir.path(), "1. Intro");

        struct SidecarWriter(PathBuf);

        #[async_trait]
        impl CommandRunner for SidecarWriter {
            async fn run(&self, _cmd: &ToolCommand) -> anyhow::Result<CommandOutcome> {
                std::fs::write(&self.0, b"{}")?;
                Ok(CommandOutcome {
                    exit_code: Some(0),
                    stderr_tail: Vec::new(),
                })
            }
        }

        let runner = SidecarWriter(task.sidecar_json.clone());
        execute_task(&task, &login_opts(), &runner).await;
        assert!(!task.sidecar_json.exists());
    }

    #[tokio::test]
    async fn failed_tool_is_counted_and_batch_continues() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = vec![task(dir.path(), "1. A"), task(dir.path(), "2. B")];
        let runner = RecordingRunner::new(Some(1));

        let summary = run_tasks(&tasks, &login_opts(), &runner).await;

        assert_eq!(summary.failed, 2);
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn spawn_error_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let task = task(dir.path(), "1. A");
        let outcome = execute_task(&task, &login_opts(), &BrokenRunner).await;
        assert_eq!(outcome, TaskOutcome::Failed);
    }

    #[tokio::test]
    async fn filter_skips_non_matching_paths_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = vec![task(dir.path(), "1. Intro"), task(dir.path(), "2. Closures")];
        let runner = RecordingRunner::new(Some(0));
        let opts = ExecutorOptions {
            filter: Some(
                regex::RegexBuilder::new("closures")
                    .case_insensitive(true)
                    .build()
                    .unwrap(),
            ),
            ..login_opts()
        };

        let summary = run_tasks(&tasks, &opts, &runner).await;

        assert_eq!(summary.filtered, 1);
        assert_eq!(summary.downloaded, 1);
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0]
            .value_of("--output")
            .unwrap()
            .ends_with("2. Closures.mp4"));
    }

    #[tokio::test]
    async fn dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let fresh = task(dir.path(), "1. Intro");
        let runner = RecordingRunner::new(Some(0));
        let opts = ExecutorOptions {
            dry_run: true,
            ..login_opts()
        };

        let outcome = execute_task(&fresh, &opts, &runner).await;

        assert_eq!(outcome, TaskOutcome::Downloaded);
        assert!(runner.calls().is_empty());
        assert!(!fresh.folder.exists());
    }

    #[tokio::test]
    async fn dry_run_keeps_existing_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let partial = task(dir.path(), "1. Intro");
        std::fs::create_dir_all(&partial.folder).unwrap();
        std::fs::write(&partial.sidecar_json, b"{}").unwrap();
        let runner = RecordingRunner::new(Some(0));
        let opts = ExecutorOptions {
            dry_run: true,
            ..login_opts()
        };

        let outcome = execute_task(&partial, &opts, &runner).await;

        assert_eq!(outcome, TaskOutcome::Resumed);
        assert!(runner.calls().is_empty());
        assert!(partial.sidecar_json.exists());
    }
}
