use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// An external tool invocation as an argv list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Value following `flag`, if present.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(|s| s.as_str())
    }
}

const SECRET_FLAGS: &[&str] = &["-p", "--password"];

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Renders a copy-pasteable command line with passwords masked.
impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                write!(f, " ****")?;
            } else {
                write!(f, " {}", shell_quote(arg))?;
            }
            mask_next = SECRET_FLAGS.contains(&arg.as_str());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    pub folder: PathBuf,
    pub output_file: PathBuf,
    pub sidecar_json: PathBuf,
    pub resume_command: ToolCommand,
    pub download_command: ToolCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskOutcome {
    Filtered,
    Existing,
    Resumed,
    Downloaded,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub filtered: usize,
    pub existing: usize,
    pub resumed: usize,
    pub downloaded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Filtered => self.filtered += 1,
            TaskOutcome::Existing => self.existing += 1,
            TaskOutcome::Resumed => self.resumed += 1,
            TaskOutcome::Downloaded => self.downloaded += 1,
            TaskOutcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.filtered + self.existing + self.resumed + self.downloaded + self.failed
    }
}
