//! The change-gated artifact pipeline.
//!
//! An [ArtifactWriter] runs one [BuildUnit] at a time: It reads
//! a compiled script or stylesheet, minifies it, and writes the
//! minified (and optionally gzipped) artifacts next to it, but
//! only when their content actually changed. Observers registered
//! with the writer's [Notifier] are told about every artifact,
//! written or not.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::asset::{ArtifactPaths, AssetKind};
use crate::notify::{Channel, LifecycleEvent, Notifier};
use crate::proc::{
    MinificationOutcome, MinifiesAssets, MinifyConfiguration, MinifyOptions, StandardMinifier,
};

pub mod change;
mod error;
pub mod gzip;
pub use error::MinifyError;

use change::{UTF8_BOM, has_changed, strip_bom};

/// One compiled output file, and the configuration to minify it with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildUnit {
    /// The compiled output file to minify.
    pub output_file: PathBuf,

    pub config: MinifyConfiguration,
}

impl BuildUnit {
    pub fn new(output_file: impl Into<PathBuf>, config: MinifyConfiguration) -> Self {
        Self {
            output_file: output_file.into(),
            config,
        }
    }
}

/// The result of running a [BuildUnit].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildResult {
    /// The output file isn't a script or stylesheet;
    /// nothing was read, written, or notified.
    Skipped,

    /// The output file was minified.
    Minified {
        /// The minified text and its diagnostics.
        outcome: MinificationOutcome,

        /// The artifacts the pipeline considered writing, or
        /// [None] if minification yielded nothing to persist.
        artifacts: Option<ArtifactReport>,
    },
}

impl BuildResult {
    /// Returns the minification outcome, if any.
    pub fn outcome(&self) -> Option<&MinificationOutcome> {
        match self {
            BuildResult::Skipped => None,
            BuildResult::Minified { outcome, .. } => Some(outcome),
        }
    }

    /// Returns the artifact report, if any.
    pub fn artifacts(&self) -> Option<&ArtifactReport> {
        match self {
            BuildResult::Skipped => None,
            BuildResult::Minified { artifacts, .. } => artifacts.as_ref(),
        }
    }
}

/// What happened to the artifacts of one [BuildUnit].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactReport {
    pub paths: ArtifactPaths,

    /// Iff true, the minified file was written.
    pub changed: bool,

    /// [None] if gzip is disabled; otherwise,
    /// whether the gzip file was written.
    pub gzipped: Option<bool>,
}

/// Minifies compiled output files into change-gated artifacts.
pub struct ArtifactWriter<M = StandardMinifier> {
    minifier: M,
    notifier: Arc<Notifier>,
}

impl ArtifactWriter<StandardMinifier> {
    /// Returns a writer using the [StandardMinifier],
    /// notifying observers registered with `notifier`.
    pub fn new(notifier: Arc<Notifier>) -> Self {
        Self::with_minifier(StandardMinifier, notifier)
    }
}

impl<M: MinifiesAssets> ArtifactWriter<M> {
    /// Returns a writer using `minifier`, notifying
    /// observers registered with `notifier`.
    pub fn with_minifier(minifier: M, notifier: Arc<Notifier>) -> Self {
        Self { minifier, notifier }
    }

    /// Returns the notifier observers can subscribe to.
    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    /// Runs `unit` through the pipeline.
    ///
    /// The minified artifact `name.min.ext` is written (as UTF-8
    /// with a byte-order mark) only if its content changed, and
    /// gzipped to `name.min.ext.gz` only if gzip is enabled.
    /// [Channel::BeforeWriteMinified] and [Channel::AfterWriteMinified]
    /// fire whether or not the artifact changed, unless
    /// minification yielded no text at all.
    pub fn minify_file(&self, unit: &BuildUnit) -> Result<BuildResult, MinifyError> {
        let source_path = unit.output_file.as_path();

        let kind = AssetKind::from_path(source_path);
        if !kind.is_recognized() {
            tracing::debug!("skipping {}: not a script or stylesheet", source_path.display());
            return Ok(BuildResult::Skipped);
        }

        let source = read_source(source_path)?;

        let options = MinifyOptions::resolve(kind, &unit.config);
        let mut outcome = self.minifier.minify(kind, &source, &options);
        outcome.diagnostics = outcome
            .diagnostics
            .into_iter()
            .map(|diagnostic| diagnostic.in_file(source_path))
            .collect();

        // Never replace an artifact with nothing.
        let Some(text) = outcome.persistable_text() else {
            tracing::debug!("skipping {}: minified to nothing", source_path.display());
            return Ok(BuildResult::Minified {
                outcome,
                artifacts: None,
            });
        };

        let paths = ArtifactPaths::for_source(source_path);
        let changed = has_changed(&paths.minified, text);
        let event = LifecycleEvent::new(&paths.source, &paths.minified, changed);

        self.notifier.fire(Channel::BeforeWriteMinified, &event);

        if changed {
            tracing::trace!("minify: {}", paths.minified.display());
            write_with_bom(&paths.minified, text).map_err(|source| {
                MinifyError::WriteArtifact {
                    path: paths.minified.clone(),
                    source,
                }
            })?;
        }

        self.notifier.fire(Channel::AfterWriteMinified, &event);

        let gzipped = gzip::maybe_gzip(&self.notifier, &options, &paths.minified, changed)?;

        Ok(BuildResult::Minified {
            outcome,
            artifacts: Some(ArtifactReport {
                paths,
                changed,
                gzipped,
            }),
        })
    }
}

/// Reads the UTF-8 text of the compiled output file at `path`,
/// without any leading byte-order mark.
fn read_source(path: &Path) -> Result<String, MinifyError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => MinifyError::MissingSource {
            path: path.to_path_buf(),
        },
        _ => MinifyError::ReadSource {
            path: path.to_path_buf(),
            source,
        },
    })?;

    String::from_utf8(strip_bom(&bytes).to_vec()).map_err(|_| MinifyError::NonTextualSource {
        path: path.to_path_buf(),
    })
}

/// Writes `text` to `path` as UTF-8 with a byte-order mark.
fn write_with_bom(path: &Path, text: &str) -> io::Result<()> {
    let mut contents = Vec::with_capacity(UTF8_BOM.len() + text.len());
    contents.extend_from_slice(UTF8_BOM);
    contents.extend_from_slice(text.as_bytes());
    fs::write(path, contents)
}
