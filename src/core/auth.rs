use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

use safarivideos_core::fs_paths::AppPaths;

#[derive(Clone, PartialEq, Eq)]
pub struct Login {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

impl Login {
    /// Parses `username:password`, splitting on the first colon.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let (username, password) = raw
            .split_once(':')
            .ok_or_else(|| anyhow!("login must be given as <username:password>"))?;
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// How the external tool authenticates fresh downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    CookieFile(PathBuf),
    Login(Login),
}

impl Credentials {
    pub fn tool_args(&self) -> Vec<String> {
        match self {
            Credentials::CookieFile(path) => {
                vec!["--cookies".to_string(), path.to_string_lossy().to_string()]
            }
            Credentials::Login(login) => vec![
                "-u".to_string(),
                login.username.clone(),
                "-p".to_string(),
                login.password.clone(),
            ],
        }
    }
}

/// Reads whitespace-separated username and password.
pub async fn load_credentials_file(path: &Path) -> anyhow::Result<Login> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read credentials file {}", path.display()))?;
    parse_credentials(&text)
        .with_context(|| format!("malformed credentials file {}", path.display()))
}

fn parse_credentials(text: &str) -> anyhow::Result<Login> {
    let mut tokens = text.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(username), Some(password)) => Ok(Login {
            username: username.to_string(),
            password: password.to_string(),
        }),
        _ => Err(anyhow!("expected a username and a password")),
    }
}

/// Cookie file wins over an explicit login; with neither, the home credentials file is read.
pub async fn resolve_credentials(
    login: Option<&str>,
    cookies: Option<&Path>,
    paths: &dyn AppPaths,
) -> anyhow::Result<Credentials> {
    if let Some(cookies) = cookies {
        return Ok(Credentials::CookieFile(cookies.to_path_buf()));
    }
    if let Some(raw) = login {
        return Ok(Credentials::Login(Login::parse(raw)?));
    }

    let path = paths
        .credentials_file()
        .ok_or_else(|| anyhow!("could not determine home directory for credentials"))?;
    tracing::debug!("reading credentials from {}", path.display());
    Ok(Credentials::Login(load_credentials_file(&path).await?))
}
