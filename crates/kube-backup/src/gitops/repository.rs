//! The git checkout the backup is written into.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::error::{classify_git_error, GitOpsError, Result};
use super::parse::{format_git_error, git_host, known_hosts_contains};
use crate::config::GitSettings;
use crate::sanitize::redact_repo_url;

/// Clone depth used for the backup checkout.
pub const CLONE_DEPTH: &str = "10";

/// A shallow clone of the backup repository at `target`.
pub struct BackupRepository {
    repo_path: PathBuf,
    settings: GitSettings,
    known_hosts: Option<PathBuf>,
}

impl BackupRepository {
    pub fn new(repo_path: impl Into<PathBuf>, settings: GitSettings) -> Self {
        Self {
            repo_path: repo_path.into(),
            settings,
            known_hosts: dirs::home_dir().map(|home| home.join(".ssh").join("known_hosts")),
        }
    }

    /// Overrides the `known_hosts` file consulted before cloning.
    pub fn with_known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts = Some(path.into());
        self
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Directory below the checkout that holds the backup tree.
    pub fn prefix_path(&self) -> PathBuf {
        self.repo_path.join(&self.settings.prefix)
    }

    pub fn branch(&self) -> &str {
        &self.settings.branch
    }

    pub fn is_git_repo(&self) -> bool {
        self.repo_path.join(".git").exists()
    }

    /// Registers the remote host key and clones the branch. An existing
    /// checkout is reset to the remote branch instead.
    pub fn init(&self) -> Result<()> {
        if self.is_git_repo() {
            return self.refresh();
        }
        self.ensure_known_host()?;
        self.clone_branch()
    }

    /// Resets an existing checkout to the tip of the remote branch.
    pub fn refresh(&self) -> Result<()> {
        log::info!("Reusing checkout at {}", self.repo_path.display());
        self.run_checked(&["fetch", "--depth", CLONE_DEPTH, "origin", &self.settings.branch])?;
        self.run_checked(&["reset", "--hard", "FETCH_HEAD"])?;
        std::fs::create_dir_all(self.prefix_path())?;
        Ok(())
    }

    /// Runs `git clone -b <branch> --depth 10 <url> <target>` and makes sure
    /// the prefix directory exists afterwards.
    pub fn clone_branch(&self) -> Result<()> {
        let target = self.repo_path.to_string_lossy().to_string();
        log::info!(
            "Cloning {} (branch {}) into {}",
            redact_repo_url(&self.settings.repository),
            self.settings.branch,
            target
        );

        let output = Command::new("git")
            .args([
                "clone",
                "-b",
                &self.settings.branch,
                "--depth",
                CLONE_DEPTH,
                &self.settings.repository,
                &target,
            ])
            .output()
            .map_err(|e| GitOpsError::GitOperation(e.to_string()))?;

        std::fs::create_dir_all(self.prefix_path())?;

        if output.status.success() {
            Ok(())
        } else {
            let message = format_git_error(&output);
            log::error!("{}", message);
            Err(classify_git_error(&message))
        }
    }

    /// Appends the remote host key to `known_hosts` with `ssh-keyscan`
    /// unless the host is already listed. Entries are written unhashed so
    /// [`known_hosts_contains`] finds them on the next run. URLs without a
    /// recognizable host are skipped.
    pub fn ensure_known_host(&self) -> Result<()> {
        let Some(host) = git_host(&self.settings.repository) else {
            log::warn!("Can't parse git url, skip ssh-keyscan");
            return Ok(());
        };
        let Some(known_hosts) = &self.known_hosts else {
            log::warn!("No home directory, skip ssh-keyscan for {}", host);
            return Ok(());
        };

        if known_hosts.exists() {
            let content =
                std::fs::read_to_string(known_hosts).map_err(|e| GitOpsError::KnownHosts {
                    path: known_hosts.clone(),
                    source: e,
                })?;
            if known_hosts_contains(&content, &host) {
                log::info!("File {} already contains {}", known_hosts.display(), host);
                return Ok(());
            }
        }

        let output = keyscan_command(&host)
            .output()
            .map_err(|e| GitOpsError::KeyScan {
                host: host.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let message = format_git_error(&output);
            log::error!("{}", message);
            return Err(GitOpsError::KeyScan { host, message });
        }

        let io_error = |e| GitOpsError::KnownHosts {
            path: known_hosts.clone(),
            source: e,
        };
        if let Some(dir) = known_hosts.parent() {
            std::fs::create_dir_all(dir).map_err(io_error)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(known_hosts)
            .and_then(|mut file| file.write_all(&output.stdout))
            .map_err(io_error)?;

        log::info!("Added {} to {}", host, known_hosts.display());
        Ok(())
    }

    /// Porcelain status of the backup tree, including untracked files.
    /// Paths are relative to the repository root.
    pub fn changes(&self) -> Result<String> {
        self.require_repo()?;

        let output = self.run_git(&[
            "status",
            "--porcelain",
            &self.settings.prefix,
            "--untracked-files=all",
        ])?;

        if !output.status.success() {
            let message = format_git_error(&output);
            log::error!("{}", message);
            return Err(GitOpsError::GitOperation(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Commits everything below the prefix as the configured author and pushes
    /// the branch.
    pub fn push_changes(&self, message: &str) -> Result<()> {
        self.require_repo()?;

        self.run_checked(&["config", "user.email", &self.settings.user_email])?;
        self.run_checked(&["config", "user.name", &self.settings.user_name])?;
        self.run_checked(&["add", &self.settings.prefix])?;
        self.run_checked(&["commit", "-m", message])?;

        let output = self.run_checked(&["push", "origin", &self.settings.branch])?;
        for stream in [&output.stdout, &output.stderr] {
            let text = String::from_utf8_lossy(stream);
            if !text.trim().is_empty() {
                log::info!("{}", text.trim());
            }
        }

        Ok(())
    }

    /// Discards working tree changes below `<prefix>/<subtree>`, untracked
    /// files included. A subtree that was never committed is removed instead.
    pub fn restore(&self, subtree: &str) -> Result<()> {
        self.require_repo()?;

        let pathspec = self.pathspec(subtree);

        let committed = self
            .run_git(&["cat-file", "-e", &format!("HEAD:{}", pathspec)])?
            .status
            .success();

        if !committed {
            let path = self.repo_path.join(&pathspec);
            if path.exists() {
                std::fs::remove_dir_all(&path)?;
            }
            log::info!("Removed {}, it is not in HEAD", pathspec);
            return Ok(());
        }

        self.run_checked(&["checkout", "-f", "HEAD", "--", &pathspec])?;
        self.run_checked(&["clean", "-fdq", "--", &pathspec])?;
        log::info!("Restored {} from HEAD", pathspec);
        Ok(())
    }

    /// `<prefix>/<subtree>` relative to the repository root, without a
    /// leading `./`.
    fn pathspec(&self, subtree: &str) -> String {
        let prefix = self.settings.prefix.trim_end_matches('/');
        let prefix = prefix.strip_prefix("./").unwrap_or(prefix);
        if prefix.is_empty() || prefix == "." {
            subtree.to_string()
        } else {
            format!("{}/{}", prefix, subtree)
        }
    }

    fn require_repo(&self) -> Result<()> {
        if self.is_git_repo() {
            Ok(())
        } else {
            Err(GitOpsError::GitNotInitialized(self.repo_path.clone()))
        }
    }

    /// Runs a git command and turns a non-zero exit into an error.
    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run_git(args)?;
        if output.status.success() {
            Ok(output)
        } else {
            let message = format_git_error(&output);
            log::error!("git {}: {}", args.first().unwrap_or(&""), message);
            Err(classify_git_error(&message))
        }
    }

    /// Runs a git command in the repository directory.
    fn run_git(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new("git")
            .current_dir(&self.repo_path)
            .args(args)
            .output()
            .map_err(|e| GitOpsError::GitOperation(e.to_string()))?;

        Ok(output)
    }
}

fn keyscan_command(host: &str) -> Command {
    let mut command = Command::new("ssh-keyscan");
    command.arg(host);
    command
}
