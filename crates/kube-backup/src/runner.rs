use serde::Serialize;
use tracing::{error, info, info_span, warn};

use crate::cluster::ClusterClient;
use crate::config::BackupConfig;
use crate::error::Result;
use crate::filter::{check_derived, NamespaceFilter, PatternSet, SkipReason};
use crate::gitops::{BackupRepository, GitOpsError};
use crate::plugins::Plugin;
use crate::resource::{sanitize, ResourceRecord};
use crate::selection::{Scope, TypeSet};
use crate::storage::TreeWriter;
use crate::summary::{summarize, ChangeSummary};

/// Resets a plugin subtree after a failed plugin run.
pub trait SubtreeRestore {
    fn restore(&self, subtree: &str) -> std::result::Result<(), GitOpsError>;
}

impl SubtreeRestore for BackupRepository {
    fn restore(&self, subtree: &str) -> std::result::Result<(), GitOpsError> {
        BackupRepository::restore(self, subtree)
    }
}

/// Counts for one capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub written: usize,
    pub skipped: usize,
    pub failed_plugins: Vec<String>,
}

/// Captures cluster objects into the backup tree.
pub struct BackupRunner<'a> {
    types: TypeSet,
    patterns: PatternSet,
    namespaces: NamespaceFilter,
    cluster: &'a dyn ClusterClient,
    writer: TreeWriter,
}

impl<'a> BackupRunner<'a> {
    pub fn from_config(config: &BackupConfig, cluster: &'a dyn ClusterClient) -> Self {
        Self {
            types: TypeSet::from_settings(&config.selection),
            patterns: PatternSet::from_option(config.selection.skip_objects.as_deref()),
            namespaces: NamespaceFilter::from_settings(&config.selection),
            cluster,
            writer: TreeWriter::new(&config.target_path, &config.git.prefix),
        }
    }

    pub fn types(&self) -> &TypeSet {
        &self.types
    }

    pub fn writer(&self) -> &TreeWriter {
        &self.writer
    }

    /// Logs the selection when it differs from the defaults.
    pub fn log_selection(&self) {
        if !self.types.global_is_default() {
            info!("Global types: {}", self.types.global.join(", "));
        }
        if !self.types.namespaced_is_default() {
            info!("Types: {}", self.types.namespaced.join(", "));
        }
        if !self.namespaces.is_empty() {
            info!("Namespace filter: {:?}", self.namespaces);
        }
        if !self.patterns.is_empty() {
            let global: Vec<&str> = self.patterns.global.iter().map(|p| p.as_str()).collect();
            let namespaced: Vec<&str> =
                self.patterns.namespaced.iter().map(|p| p.as_str()).collect();
            info!(
                "Skip patterns: global [{}], namespaced [{}]",
                global.join(", "),
                namespaced.join(", ")
            );
        }
    }

    /// Lists every selected type and writes the objects that pass the filters.
    pub fn capture(&self) -> Result<BackupReport> {
        let mut report = BackupReport::default();

        for resource in &self.types.global {
            let _span = info_span!("capture", resource = %resource, scope = "global").entered();
            let records = self.cluster.list(resource, Scope::Global)?;
            info!("Got {} {}s", records.len(), resource);
            for record in records {
                self.keep_or_skip(record, Scope::Global, &mut report)?;
            }
        }

        for resource in &self.types.namespaced {
            let _span =
                info_span!("capture", resource = %resource, scope = "namespaced").entered();
            let records = self.cluster.list(resource, Scope::Namespaced)?;
            info!("Got {} {}s", records.len(), resource);
            for record in records {
                self.keep_or_skip(record, Scope::Namespaced, &mut report)?;
            }
        }

        info!(written = report.written, skipped = report.skipped, "Capture finished");
        Ok(report)
    }

    /// Why an object is left out, or `None` to keep it. Namespaced objects go
    /// through the derived-object check, then the namespace filter, then the
    /// skip patterns; cluster-scoped objects only through the patterns.
    pub fn skip_reason(&self, record: &ResourceRecord, scope: Scope) -> Result<Option<SkipReason>> {
        let pattern = match scope {
            Scope::Global => self.patterns.global_match(record),
            Scope::Namespaced => {
                if let Some(reason) = check_derived(record)? {
                    return Ok(Some(reason));
                }
                if !self.namespaces.allows(record.namespace()) {
                    return Ok(Some(SkipReason::Namespace));
                }
                self.patterns.namespaced_match(record)
            }
        };

        Ok(pattern.map(|p| SkipReason::Pattern(p.as_str().to_string())))
    }

    fn keep_or_skip(
        &self,
        record: ResourceRecord,
        scope: Scope,
        report: &mut BackupReport,
    ) -> Result<()> {
        if let Some(reason) = self.skip_reason(&record, scope)? {
            info!("skip resource {} ({})", record.display_id(), reason);
            report.skipped += 1;
            return Ok(());
        }

        let record = sanitize(record);
        self.writer.write_resource(&record, scope)?;
        report.written += 1;
        Ok(())
    }

    /// Runs each plugin. A failing plugin is logged and its subtree restored;
    /// only a failed restore aborts.
    pub fn run_plugins(
        &self,
        plugins: &[Box<dyn Plugin>],
        restore: &dyn SubtreeRestore,
        report: &mut BackupReport,
    ) -> Result<()> {
        for plugin in plugins {
            let _span = info_span!("plugin", name = plugin.name()).entered();

            if let Err(e) = plugin.run(&self.writer) {
                error!("{} plugin failed: {}", plugin.name(), e);
                report.failed_plugins.push(plugin.name().to_string());
                restore.restore(plugin.subtree())?;
            }
        }
        Ok(())
    }
}

/// Clones (or refreshes) the repository, clears the backup tree, captures the
/// cluster and runs the plugins. Nothing is committed.
pub fn backup(
    config: &BackupConfig,
    cluster: &dyn ClusterClient,
    repository: &BackupRepository,
    plugins: &[Box<dyn Plugin>],
) -> Result<BackupReport> {
    repository.init()?;

    let runner = BackupRunner::from_config(config, cluster);
    runner.writer().clear()?;
    runner.log_selection();

    let mut report = runner.capture()?;
    runner.run_plugins(plugins, repository, &mut report)?;

    let status = repository.changes()?;
    if status.trim().is_empty() {
        info!("No changes");
    } else {
        info!("Changes:\n{}", status.trim_end());
    }

    Ok(report)
}

/// Commits and pushes the backup tree with a generated message. Returns
/// `None` when the tree matches the last commit.
pub fn push(repository: &BackupRepository, prefix: &str) -> Result<Option<ChangeSummary>> {
    let status = repository.changes()?;

    let Some(summary) = summarize(&status, Some(prefix)) else {
        info!("No changes");
        return Ok(None);
    };

    info!("{}", status.trim_end());
    if summary.kinds.is_empty() {
        warn!("Changed files outside the <namespace>/<kind>/ layout");
    }
    info!(message = %summary.message, "Pushing changes");
    repository.push_changes(&summary.message)?;

    Ok(Some(summary))
}
