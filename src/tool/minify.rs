//! Minifies the compiled outputs named by a TOML configuration file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::notify::{Channel, LifecycleEvent, Notifier, ObservesArtifacts};
use crate::pipeline::{ArtifactWriter, BuildResult, BuildUnit};
use crate::proc::{MinifiesAssets, Severity};
use crate::tool::{DEFAULT_CONFIG_FILE, load_config};

/// Observer logging every artifact lifecycle notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingObserver;

impl ObservesArtifacts for LoggingObserver {
    fn notify(&self, channel: Channel, event: &LifecycleEvent) {
        match (channel, event.changed) {
            (Channel::AfterWriteMinified | Channel::AfterWriteGzip, true) => {
                tracing::info!("Wrote {}", event.derived.display());
            }
            (Channel::AfterWriteMinified | Channel::AfterWriteGzip, false) => {
                tracing::debug!("Unchanged: {}", event.derived.display());
            }
            (channel, changed) => {
                tracing::trace!(
                    "{:?}: {} -> {} (changed: {})",
                    channel,
                    event.subject.display(),
                    event.derived.display(),
                    changed
                );
            }
        }
    }
}

/// Counts of build units by how they ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Units whose minified artifact was written.
    pub written: usize,

    /// Units whose minified artifact was already up to date.
    pub unchanged: usize,

    /// Units that were disabled, of an unrecognized
    /// kind, or minified to nothing.
    pub skipped: usize,

    /// Units that failed with an error or error diagnostics.
    pub failed: usize,
}

/// Runs the minify command with the given configuration file and optional profile.
///
/// If `config_file` is `None`, looks for `Minify.toml` in the current directory.
/// If `files` is empty, the profile's outputs are minified; otherwise,
/// `files` are minified with the profile's settings.
pub async fn run(
    config_file: Option<&Path>,
    profile: Option<&str>,
    files: &[PathBuf],
) -> io::Result<()> {
    let config_path = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    let loaded = load_config(config_path, profile).await?;
    let config = loaded.profile.minify_configuration()?;

    let outputs = if files.is_empty() {
        loaded.output_paths()
    } else {
        files.to_vec()
    };
    tracing::info!("Minifying {} outputs", outputs.len());

    let units = outputs
        .into_iter()
        .map(|output| BuildUnit::new(output, config.clone()))
        .collect();

    let notifier = Arc::new(Notifier::new());
    notifier.subscribe_all(Arc::new(LoggingObserver));
    let writer = Arc::new(ArtifactWriter::new(notifier));

    let summary = minify_units(writer, units).await;
    if summary.failed > 0 {
        return Err(io::Error::other(format!(
            "{} outputs failed to minify",
            summary.failed
        )));
    }

    Ok(())
}

/// Runs every unit in `units` through `writer` in parallel.
pub async fn minify_units<M: MinifiesAssets + 'static>(
    writer: Arc<ArtifactWriter<M>>,
    units: Vec<BuildUnit>,
) -> RunSummary {
    let mut summary = RunSummary::default();

    let handles: Vec<_> = units
        .into_iter()
        .filter(|unit| {
            let enabled = unit.config.is_enabled();
            if !enabled {
                tracing::debug!("Minification disabled: {}", unit.output_file.display());
                summary.skipped += 1;
            }
            enabled
        })
        .map(|unit| {
            let writer = Arc::clone(&writer);
            tokio::task::spawn_blocking(move || {
                let result = writer.minify_file(&unit);
                (unit, result)
            })
        })
        .collect();

    for handle in handles {
        match handle.await {
            Ok((unit, Ok(result))) => {
                let failed = log_diagnostics(&result);
                match result {
                    _ if failed => summary.failed += 1,
                    BuildResult::Minified {
                        artifacts: Some(report),
                        ..
                    } if report.changed => summary.written += 1,
                    BuildResult::Minified {
                        artifacts: Some(_), ..
                    } => summary.unchanged += 1,
                    _ => {
                        tracing::debug!("Nothing to write for {}", unit.output_file.display());
                        summary.skipped += 1;
                    }
                }
            }
            Ok((_, Err(e))) => {
                tracing::error!("Error minifying {}: {}", e.path().display(), e);
                summary.failed += 1;
            }
            Err(e) => {
                tracing::error!("Task panicked: {}", e);
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        "Minified {} outputs ({} unchanged, {} skipped, {} errors)",
        summary.written,
        summary.unchanged,
        summary.skipped,
        summary.failed
    );

    summary
}

/// Logs the diagnostics in `result`, returning true if any is an error.
fn log_diagnostics(result: &BuildResult) -> bool {
    let Some(outcome) = result.outcome() else {
        return false;
    };

    for diagnostic in &outcome.diagnostics {
        match diagnostic.severity {
            Severity::Error => tracing::error!("{}", diagnostic),
            Severity::Warning => tracing::warn!("{}", diagnostic),
        }
    }

    outcome.has_errors()
}
