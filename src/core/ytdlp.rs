use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::core::auth::Login;
use crate::models::task::ToolCommand;

/// Used when no downloader can be found, so dry runs still print usable commands.
pub const FALLBACK_TOOL: &str = "youtube-dl";

const CANDIDATES: &[&str] = &["yt-dlp", "youtube-dl"];

fn bin_name(name: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

async fn responds_to_version(program: &Path) -> bool {
    crate::core::process::command(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

pub async fn find_downloader() -> Option<PathBuf> {
    for name in CANDIDATES {
        let bin = PathBuf::from(bin_name(name));
        if responds_to_version(&bin).await {
            return Some(bin);
        }
    }

    let managed = crate::core::process::managed_bin_dir()?;
    CANDIDATES
        .iter()
        .map(|name| managed.join(bin_name(name)))
        .find(|p| p.exists())
}

/// An explicit path is trusted as-is; otherwise the downloader is discovered.
pub async fn resolve_downloader(explicit: Option<&Path>) -> String {
    if let Some(path) = explicit {
        return path.to_string_lossy().to_string();
    }
    match find_downloader().await {
        Some(path) => {
            tracing::debug!("using downloader {}", path.display());
            path.to_string_lossy().to_string()
        }
        None => {
            tracing::warn!(
                "neither yt-dlp nor youtube-dl responded to --version, falling back to {}",
                FALLBACK_TOOL
            );
            FALLBACK_TOOL.to_string()
        }
    }
}

/// Trims a user-supplied selector; `best` means no selector at all.
pub fn normalize_format(raw: &str) -> String {
    let fmt = raw.trim();
    if fmt.eq_ignore_ascii_case("best") {
        String::new()
    } else {
        fmt.to_string()
    }
}

/// `None` selects `default_format`, an empty string omits `-f` entirely.
pub fn format_args(format: Option<&str>, default_format: &str) -> Vec<String> {
    let selector = match format {
        None => default_format,
        Some(f) => f,
    };
    if selector.is_empty() {
        Vec::new()
    } else {
        vec!["-f".to_string(), selector.to_string()]
    }
}

pub fn download_command(
    tool: &str,
    url: &str,
    output: &Path,
    format: Option<&str>,
    default_format: &str,
    login: Option<&Login>,
) -> ToolCommand {
    let mut cmd = ToolCommand::new(tool)
        .args(["-v", "--output"])
        .arg(output.to_string_lossy())
        .args(["--write-info-json", "--write-sub", "--convert-subs", "srt"])
        .args(format_args(format, default_format))
        .arg(url);

    if let Some(login) = login {
        if !login.username.is_empty() {
            cmd = cmd.args(["-u", login.username.as_str()]);
        }
        if !login.password.is_empty() {
            cmd = cmd.args(["-p", login.password.as_str()]);
        }
    }
    cmd
}

pub fn resume_command(tool: &str, sidecar: &Path, output: &Path) -> ToolCommand {
    ToolCommand::new(tool)
        .args(["-v", "--output"])
        .arg(output.to_string_lossy())
        .arg("--load-info-json")
        .arg(sidecar.to_string_lossy())
}
