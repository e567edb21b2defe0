use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use serde::Serialize;
use tokio::process::Command;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    Status,
    Add,
    Commit,
    Push,
    Pull,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::Status => "status",
            SyncStage::Add => "add",
            SyncStage::Commit => "commit",
            SyncStage::Push => "push",
            SyncStage::Pull => "pull",
        };
        write!(f, "{}", name)
    }
}

/// Which git step failed and what the subprocess said. Commit succeeding
/// while push fails is therefore distinguishable from any other partial
/// state.
#[derive(Debug, Clone, Serialize)]
pub struct SyncError {
    pub stage: SyncStage,
    pub message: String,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {} failed: {}", self.stage, self.message)
    }
}

impl std::error::Error for SyncError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Clean tree, nothing staged or committed.
    NoChanges,
    Pushed,
}

/// Publishes the data directory by shelling out to git, one subprocess per
/// step.
pub struct GitSync {
    repo_path: PathBuf,
    data_dir: String,
    remote: String,
    branch: String,
}

impl GitSync {
    pub fn new(config: &Config) -> GitSync {
        GitSync {
            repo_path: PathBuf::from(&config.repo_path),
            data_dir: config.data_dir.clone(),
            remote: config.git_remote.clone(),
            branch: config.git_branch.clone(),
        }
    }

    async fn git(&self, stage: SyncStage, args: &[&str]) -> Result<String, SyncError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SyncError {
                stage,
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(SyncError { stage, message });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Stage, commit and push the data directory as one intent. A clean
    /// tree short-circuits without committing. On failure the work tree is
    /// left exactly where the failed step left it; the caller retries.
    pub async fn sync(&self, message: &str) -> Result<SyncOutcome, SyncError> {
        let status = self
            .git(
                SyncStage::Status,
                &["status", "--porcelain", "--", &self.data_dir],
            )
            .await?;
        if status.trim().is_empty() {
            return Ok(SyncOutcome::NoChanges);
        }

        self.git(SyncStage::Add, &["add", "--all", "--", &self.data_dir])
            .await?;
        self.git(SyncStage::Commit, &["commit", "-m", message])
            .await?;
        self.git(SyncStage::Push, &["push", &self.remote, &self.branch])
            .await?;

        Ok(SyncOutcome::Pushed)
    }

    pub async fn pull_latest(&self) -> Result<(), SyncError> {
        self.git(SyncStage::Pull, &["pull", &self.remote, &self.branch])
            .await?;
        Ok(())
    }
}
