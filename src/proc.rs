//! Minifiers for in-memory asset text, like
//! JavaScript and CSS minifiers.

use std::path::{Path, PathBuf};

use codas::types::Text;

use crate::asset::AssetKind;

pub mod minify_css;
pub mod minify_js;
pub mod options;
pub use options::{
    CommentMode, MinifyConfiguration, MinifyOptions, OutputMode, ScriptOptions, StylesheetOptions,
};

/// A thing that minifies asset text.
///
/// Implementations must be pure: the same `kind`, `source`,
/// and `options` always yield the same outcome. Malformed
/// input is reported through [MinificationOutcome::diagnostics],
/// never by panicking.
pub trait MinifiesAssets: Send + Sync {
    /// Minifies `source`, which contains an asset of `kind`.
    fn minify(&self, kind: AssetKind, source: &str, options: &MinifyOptions) -> MinificationOutcome;
}

/// Minifies scripts with [minify_js] and stylesheets with [minify_css].
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardMinifier;

impl MinifiesAssets for StandardMinifier {
    fn minify(&self, kind: AssetKind, source: &str, options: &MinifyOptions) -> MinificationOutcome {
        match kind {
            AssetKind::Script => minify_js::minify(source, options),
            AssetKind::Stylesheet => minify_css::minify(source, options),
            AssetKind::Unrecognized => {
                tracing::debug!("not minifying text of an unrecognized kind");
                MinificationOutcome::default()
            }
        }
    }
}

/// The result of minifying some asset text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MinificationOutcome {
    /// The minified text.
    ///
    /// [None] if minification failed; an empty
    /// text is possible when nothing survived.
    pub text: Option<Text>,

    /// Messages emitted while minifying, in source order.
    pub diagnostics: Vec<Diagnostic>,
}

impl MinificationOutcome {
    /// Returns an outcome containing `text` and no diagnostics.
    pub fn minified(text: impl Into<Text>) -> Self {
        Self {
            text: Some(text.into()),
            diagnostics: vec![],
        }
    }

    /// Returns an outcome with no text, failed due to `diagnostics`.
    pub fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            text: None,
            diagnostics,
        }
    }

    /// Returns the minified text iff it's present and non-empty.
    pub fn persistable_text(&self) -> Option<&str> {
        self.text
            .as_ref()
            .map(|text| text.as_str())
            .filter(|text| !text.is_empty())
    }

    /// Returns true if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }
}

/// Severity of a [Diagnostic].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A message about a defect in minified source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file containing the defect, once known.
    pub file: Option<PathBuf>,

    pub severity: Severity,

    /// 1-based line of the defect, or `0` if unknown.
    pub line: u32,

    /// 1-based column of the defect, or `0` if unknown.
    pub column: u32,

    pub message: Text,
}

impl Diagnostic {
    /// Returns a new error at `line` and `column`.
    pub fn error(line: u32, column: u32, message: impl Into<Text>) -> Self {
        Self {
            file: None,
            severity: Severity::Error,
            line,
            column,
            message: message.into(),
        }
    }

    /// Returns a new warning at `line` and `column`.
    pub fn warning(line: u32, column: u32, message: impl Into<Text>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(line, column, message)
        }
    }

    /// Returns this diagnostic, attributed to `file`.
    pub fn in_file(mut self, file: &Path) -> Self {
        self.file = Some(file.to_path_buf());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:", file.display())?;
        }
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Returns the 1-based `(line, column)` of `offset` bytes into `source`.
///
/// Columns count characters, not bytes. Offsets past the end
/// of `source` are clamped to its end.
pub(crate) fn line_and_column(source: &str, offset: usize) -> (u32, u32) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }

    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;

    (line as u32, column as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_offsets() {
        let source = "let a;\nlet bé = 1;\n";
        assert_eq!((1, 1), line_and_column(source, 0));
        assert_eq!((1, 5), line_and_column(source, 4));
        assert_eq!((2, 1), line_and_column(source, 7));

        // Multi-byte characters count as one column.
        let after_e = source.find(" =").unwrap();
        assert_eq!((2, 7), line_and_column(source, after_e));

        // Past-the-end offsets clamp.
        assert_eq!((3, 1), line_and_column(source, 1000));
    }

    #[test]
    fn filters_empty_text() {
        assert_eq!(None, MinificationOutcome::minified("").persistable_text());
        assert_eq!(None, MinificationOutcome::failed(vec![]).persistable_text());
        assert_eq!(
            Some("a{b:c}"),
            MinificationOutcome::minified("a{b:c}").persistable_text()
        );
    }

    #[test]
    fn formats_diagnostics() {
        let diagnostic = Diagnostic::warning(3, 9, "unexpected token").in_file(Path::new("app.js"));
        assert!(diagnostic.is_warning());
        assert_eq!("app.js:3:9: unexpected token", diagnostic.to_string());

        let diagnostic = Diagnostic::error(1, 2, "oops");
        assert!(!diagnostic.is_warning());
        assert_eq!("1:2: oops", diagnostic.to_string());
    }

    #[test]
    fn skips_unrecognized_kinds() {
        let outcome = StandardMinifier.minify(
            AssetKind::Unrecognized,
            "<p>hi</p>",
            &MinifyOptions::default(),
        );
        assert_eq!(MinificationOutcome::default(), outcome);
    }
}
