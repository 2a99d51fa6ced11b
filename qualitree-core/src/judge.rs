//! The external judge seam: configuration, request payloads and response handling.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{QualitreeError, Result};

/// Program invoked when no judge command is configured.
pub const DEFAULT_JUDGE_PROGRAM: &str = "claude";

/// Arguments passed to [`DEFAULT_JUDGE_PROGRAM`].
pub const DEFAULT_JUDGE_ARGS: &[&str] = &["--print"];

/// Default per-file evaluation budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Instructions sent ahead of every file when no prompt file is configured.
pub const DEFAULT_PROMPT: &str = "\
You are reviewing a single source file for overall code quality.
Consider readability, naming, structure, error handling, test coverage and
architectural fit. Explain your reasoning briefly, then finish with a line of
the exact form

Verdict: <Level>

where <Level> is one of: Critical, Poor, Fair, Good, Very Good, Excellent.";

/// Produces the raw judge response for one file.
///
/// This is the blocking seam used by [`TreeBuilder::build`](crate::TreeBuilder::build)
/// for library callers that evaluate one file at a time. Any
/// `Fn(&Path) -> Result<String>` closure is a judge. The `qualitree` binary
/// runs judge processes concurrently and feeds their responses to
/// [`TreeBuilder::assemble`](crate::TreeBuilder::assemble) instead.
#[cfg_attr(test, mockall::automock)]
pub trait Judge {
    /// Evaluate a single file, returning the judge's raw text.
    fn evaluate(&self, path: &Path) -> Result<String>;
}

impl<F> Judge for F
where
    F: Fn(&Path) -> Result<String>,
{
    fn evaluate(&self, path: &Path) -> Result<String> {
        self(path)
    }
}

/// How to invoke the external judge process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeConfig {
    /// Executable to run.
    pub program: String,
    /// Arguments placed before the file path.
    pub args: Vec<String>,
    /// Instructions written to the judge's stdin ahead of the file.
    pub prompt: String,
    /// Per-file evaluation budget.
    pub timeout: Duration,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_JUDGE_PROGRAM.to_string(),
            args: DEFAULT_JUDGE_ARGS.iter().map(|arg| arg.to_string()).collect(),
            prompt: DEFAULT_PROMPT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl JudgeConfig {
    /// Full argument list for evaluating `path`.
    pub fn args_for(&self, path: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(path.display().to_string());
        args
    }

    /// Stdin payload for evaluating `path` with the given contents.
    pub fn request_for(&self, path: &Path, source: &str) -> String {
        let mut request = String::with_capacity(self.prompt.len() + source.len() + 64);
        request.push_str(self.prompt.trim_end());
        request.push_str("\n\nFile: ");
        request.push_str(&path.display().to_string());
        request.push_str("\n\n```\n");
        request.push_str(source);
        if !source.ends_with('\n') {
            request.push('\n');
        }
        request.push_str("```\n");
        request
    }
}

/// Captured result of one judge process run.
#[derive(Debug, Clone)]
pub struct JudgeOutput {
    /// Path of the evaluated file.
    pub path: PathBuf,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Human-readable exit status.
    pub status: String,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

impl JudgeOutput {
    /// Convert the captured output into the judge response.
    ///
    /// A failing exit status is an error carrying whatever the process printed.
    pub fn into_response(self) -> Result<String> {
        if self.success {
            return Ok(self.stdout);
        }
        let merged = self.merged_output();
        let detail = if merged.is_empty() {
            self.status
        } else {
            format!("{}: {merged}", self.status)
        };
        Err(QualitreeError::Judge(format!(
            "{} exited with {detail}",
            self.path.display()
        )))
    }

    fn merged_output(&self) -> String {
        let mut merged = String::new();
        if !self.stdout.trim().is_empty() {
            merged.push_str(self.stdout.trim());
        }
        if !self.stderr.trim().is_empty() {
            if !merged.is_empty() {
                merged.push('\n');
            }
            merged.push_str(self.stderr.trim());
        }
        merged
    }
}
