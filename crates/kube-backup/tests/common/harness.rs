//! Test harness for isolated backup runs.
//!
//! Each `TestHarness` owns a temp directory holding:
//! - `remote.git`: a bare repository with one commit on `master`
//! - `checkout`: where backups clone the remote
//! - `known_hosts`: an isolated known-hosts file

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use kube_backup::config::BackupConfig;
use kube_backup::plugins::Plugin;
use kube_backup::{BackupReport, BackupRepository, ChangeSummary, ClusterClient};

use super::builders::ConfigBuilder;

pub struct TestHarness {
    temp_dir: TempDir,
    pub remote: PathBuf,
    pub target: PathBuf,
    pub known_hosts: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let remote = base.join("remote.git");
        let seed = base.join("seed");
        std::fs::create_dir_all(&remote).expect("Failed to create remote dir");
        std::fs::create_dir_all(&seed).expect("Failed to create seed dir");

        git(&remote, &["init", "--bare", "-q"]);
        git(&seed, &["init", "-q"]);
        git(&seed, &["checkout", "-q", "-b", "master"]);
        std::fs::write(seed.join(".gitkeep"), "").expect("Failed to write seed file");
        git(&seed, &["add", "."]);
        git(
            &seed,
            &["-c", "user.name=seed", "-c", "user.email=seed@test", "commit", "-q", "-m", "init"],
        );
        git(&seed, &["push", "-q", remote.to_str().expect("utf-8 path"), "master"]);

        Self {
            target: base.join("checkout"),
            known_hosts: base.join("known_hosts"),
            remote,
            temp_dir,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Config builder pointed at this harness' remote and checkout.
    pub fn config(&self) -> ConfigBuilder {
        ConfigBuilder::new(
            &self.remote.to_string_lossy(),
            &self.target.to_string_lossy(),
        )
    }

    pub fn repository(&self, config: &BackupConfig) -> BackupRepository {
        BackupRepository::new(&config.target_path, config.git.clone())
            .with_known_hosts(&self.known_hosts)
    }

    pub fn backup(
        &self,
        config: &BackupConfig,
        cluster: &dyn ClusterClient,
        plugins: &[Box<dyn Plugin>],
    ) -> kube_backup::Result<BackupReport> {
        kube_backup::backup(config, cluster, &self.repository(config), plugins)
    }

    pub fn push(&self, config: &BackupConfig) -> kube_backup::Result<Option<ChangeSummary>> {
        kube_backup::push(&self.repository(config), &config.git.prefix)
    }

    /// Removes the checkout, as a fresh CronJob pod would start without one.
    pub fn discard_checkout(&self) {
        if self.target.exists() {
            std::fs::remove_dir_all(&self.target).expect("Failed to remove checkout");
        }
    }

    pub fn checkout_file(&self, relative: &str) -> PathBuf {
        self.target.join(relative)
    }

    pub fn read_checkout(&self, relative: &str) -> String {
        std::fs::read_to_string(self.checkout_file(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    /// Subject of the newest commit on the remote `master`.
    pub fn remote_head_subject(&self) -> String {
        self.remote_git(&["log", "-1", "--format=%s", "master"])
    }

    pub fn remote_commit_count(&self) -> usize {
        self.remote_git(&["rev-list", "--count", "master"])
            .parse()
            .expect("numeric commit count")
    }

    /// A file as committed on the remote `master`.
    pub fn remote_file(&self, relative: &str) -> Option<String> {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.remote)
            .args(["show", &format!("master:{}", relative)])
            .output()
            .expect("Failed to run git");
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn remote_git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.remote)
            .args(args)
            .output()
            .expect("Failed to run git");
        assert!(output.status.success(), "git {:?} failed", args);
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}
