//! Resolution of stringly-typed minify configurations
//! into strongly-typed [MinifyOptions].

use std::collections::BTreeMap;

use codas::types::Text;

use crate::asset::AssetKind;

/// Disables minification entirely when set to anything but `"true"`.
pub const ENABLED_KEY: &str = "enabled";

/// Enables gzip compression of minified artifacts.
pub const GZIP_KEY: &str = "gzip";

/// Selects single-line or multi-line output.
pub const OUTPUT_MODE_KEY: &str = "outputMode";

/// Ensures minified scripts end with a semicolon.
pub const TERM_SEMICOLONS_KEY: &str = "termSemicolons";

/// Enables mangling of local script identifiers.
pub const RENAME_LOCALS_KEY: &str = "renameLocals";

/// Keeps `/*! ... */` comments in minified scripts.
pub const PRESERVE_IMPORTANT_COMMENTS_KEY: &str = "preserveImportantComments";

/// Selects which comments survive in minified stylesheets.
pub const COMMENT_MODE_KEY: &str = "commentMode";

/// Per-asset minify configuration, as option names mapped to values.
///
/// Option names are case-sensitive; [MinifyConfiguration::is_true]
/// compares values case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MinifyConfiguration {
    options: BTreeMap<String, Text>,
}

impl MinifyConfiguration {
    /// Returns an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets option `key` to `value`, returning any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Text>) -> Option<Text> {
        self.options.insert(key.into(), value.into())
    }

    /// Returns the value of option `key`.
    pub fn get(&self, key: &str) -> Option<&Text> {
        self.options.get(key)
    }

    /// Returns true iff option `key` is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// Returns true iff option `key` is set to `"true"`, ignoring ASCII case.
    ///
    /// No other spelling (`"1"`, `"yes"`, ...) counts as true.
    pub fn is_true(&self, key: &str) -> bool {
        self.value_is(key, "true")
    }

    /// Returns true iff option `key` is set to `expected`, ignoring ASCII case.
    pub fn value_is(&self, key: &str, expected: &str) -> bool {
        self.get(key)
            .is_some_and(|value| value.as_str().eq_ignore_ascii_case(expected))
    }

    /// Returns true unless [ENABLED_KEY] is set to
    /// something other than `"true"`, ignoring ASCII case.
    pub fn is_enabled(&self) -> bool {
        !self.contains_key(ENABLED_KEY) || self.is_true(ENABLED_KEY)
    }

    /// Returns the value of boolean option `key`, or `default` if the
    /// option is absent or is neither `"true"` nor `"false"`.
    fn flag_or(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(value) if value.as_str().eq_ignore_ascii_case("true") => true,
            Some(value) if value.as_str().eq_ignore_ascii_case("false") => false,
            Some(value) => {
                tracing::debug!("ignoring non-boolean value for {key}: {value}");
                default
            }
        }
    }

    /// Returns an iterator over all options, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Text)> {
        self.options.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Text>> FromIterator<(K, V)> for MinifyConfiguration {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            options: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Layout of minified output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// As compact as possible.
    #[default]
    SingleLine,

    /// Pretty-printed across multiple lines.
    MultipleLines,
}

/// Comments kept in minified stylesheets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommentMode {
    /// Only `/*! ... */` license comments, wherever they appear;
    /// they're printed ahead of the minified rules.
    #[default]
    Important,

    /// No comments at all.
    None,
}

/// Options applying only to scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Iff true, local identifiers are mangled.
    pub rename_locals: bool,

    /// Iff true, `/*! ... */` comments are kept.
    pub preserve_important_comments: bool,

    /// Iff true, the output always ends with a `;`.
    pub term_semicolons: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            rename_locals: true,
            preserve_important_comments: true,
            term_semicolons: false,
        }
    }
}

/// Options applying only to stylesheets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StylesheetOptions {
    pub comment_mode: CommentMode,
}

/// Strongly-typed options for minifying one asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MinifyOptions {
    /// Iff true, minified artifacts are also gzipped.
    pub gzip: bool,

    pub output_mode: OutputMode,

    pub script: ScriptOptions,

    pub stylesheet: StylesheetOptions,
}

impl MinifyOptions {
    /// Resolves the options for an asset of `kind` from `config`.
    ///
    /// Only options relevant to `kind` are read; the rest keep their
    /// defaults. Unrecognized options and values are ignored, so
    /// resolution never fails.
    pub fn resolve(kind: AssetKind, config: &MinifyConfiguration) -> Self {
        let mut options = MinifyOptions {
            gzip: config.is_true(GZIP_KEY),
            ..Default::default()
        };

        if config.value_is(OUTPUT_MODE_KEY, "multipleLines") {
            options.output_mode = OutputMode::MultipleLines;
        }

        match kind {
            AssetKind::Script => {
                let defaults = ScriptOptions::default();
                options.script = ScriptOptions {
                    rename_locals: config.flag_or(RENAME_LOCALS_KEY, defaults.rename_locals),
                    preserve_important_comments: config.flag_or(
                        PRESERVE_IMPORTANT_COMMENTS_KEY,
                        defaults.preserve_important_comments,
                    ),
                    term_semicolons: config.flag_or(TERM_SEMICOLONS_KEY, defaults.term_semicolons),
                };
            }
            AssetKind::Stylesheet => {
                if config.value_is(COMMENT_MODE_KEY, "none") {
                    options.stylesheet.comment_mode = CommentMode::None;
                }
            }
            AssetKind::Unrecognized => {}
        }

        options
    }
}
