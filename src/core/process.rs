use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::models::task::ToolCommand;

const STDERR_TAIL_LINES: usize = 20;

pub fn managed_bin_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("safarivideos").join("bin"))
}

fn enhanced_path() -> Option<String> {
    let bin_dir = managed_bin_dir()?;
    let sep = if cfg!(windows) { ";" } else { ":" };
    let current = std::env::var("PATH").unwrap_or_default();
    Some(format!("{}{}{}", bin_dir.display(), sep, current))
}

pub fn command<S: AsRef<std::ffi::OsStr>>(program: S) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    #[cfg(target_os = "windows")]
    cmd.creation_flags(0x08000000);
    if let Some(path) = enhanced_path() {
        cmd.env("PATH", path);
    }
    cmd.env("PYTHONIOENCODING", "utf-8");
    cmd.env("PYTHONUTF8", "1");
    cmd
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stderr_tail: Vec<String>,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, cmd: &ToolCommand) -> anyhow::Result<CommandOutcome>;
}

/// Spawns the tool and streams its output into the log.
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, cmd: &ToolCommand) -> anyhow::Result<CommandOutcome> {
        tracing::debug!("spawning: {}", cmd);

        let mut child = command(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| anyhow!("failed to start {}: {}", cmd.program, e))?;

        let stdout = child.stdout.take().ok_or_else(|| anyhow!("no stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| anyhow!("no stderr"))?;

        let stdout_reader = tokio::spawn(forward_lines(stdout, "stdout"));
        let stderr_reader = tokio::spawn(forward_lines(stderr, "stderr"));

        let status = child
            .wait()
            .await
            .map_err(|e| anyhow!("{} process failed: {}", cmd.program, e))?;

        let _ = stdout_reader.await;
        let stderr_tail = stderr_reader.await.map(Vec::from).unwrap_or_default();

        Ok(CommandOutcome {
            exit_code: status.code(),
            stderr_tail,
        })
    }
}

async fn forward_lines<R>(stream: R, name: &'static str) -> VecDeque<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    // The pipe must be drained to EOF or the tool dies of SIGPIPE.
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("{} read failed: {}", name, e);
                break;
            }
        }
        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(['\n', '\r'])
            .to_string();
        tracing::debug!(target: "safarivideos::tool", stream = name, "{}", line);
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    tail
}
