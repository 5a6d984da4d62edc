use std::fmt::Display;

use lightningcss::error::Error;
use lightningcss::stylesheet::{
    MinifyOptions as RuleMinifyOptions, ParserOptions, PrinterOptions, StyleSheet,
};

use super::{CommentMode, Diagnostic, MinificationOutcome, MinifyOptions, OutputMode};

/// Minifies CSS by compacting rules, selectors, and values,
/// and by removing unnecessary whitespace and comments.
///
/// Stylesheets are parsed strictly: any syntax error fails
/// minification instead of silently dropping rules.
pub fn minify(source: &str, options: &MinifyOptions) -> MinificationOutcome {
    let mut stylesheet = match StyleSheet::parse(source, ParserOptions::default()) {
        Ok(stylesheet) => stylesheet,
        Err(error) => {
            tracing::debug!("CSS parse failed: {}", error);
            return MinificationOutcome::failed(vec![to_diagnostic(&error)]);
        }
    };

    // Only leading license comments are parsed; hoist the rest above the rules.
    stylesheet.license_comments = match options.stylesheet.comment_mode {
        CommentMode::Important => license_comments(source)
            .into_iter()
            .map(Into::into)
            .collect(),
        CommentMode::None => vec![],
    };

    // Merge and compact rules.
    if let Err(error) = stylesheet.minify(RuleMinifyOptions::default()) {
        return MinificationOutcome::failed(vec![to_diagnostic(&error)]);
    }

    let printed = stylesheet.to_css(PrinterOptions {
        minify: options.output_mode == OutputMode::SingleLine,
        ..PrinterOptions::default()
    });

    match printed {
        Ok(result) => MinificationOutcome::minified(result.code),
        Err(error) => MinificationOutcome::failed(vec![to_diagnostic(&error)]),
    }
}

/// Returns the text between the delimiters of every
/// `/*! ... */` comment in `source`, in source order.
fn license_comments(source: &str) -> Vec<&str> {
    let bytes = source.as_bytes();
    let mut comments = vec![];
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote && bytes[i] != b'\n' {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let start = i + 2;
                let end = source[start..]
                    .find("*/")
                    .map_or(source.len(), |offset| start + offset);
                if source[start..end].starts_with('!') {
                    comments.push(&source[start..end]);
                }
                i = end + 2;
            }
            _ => i += 1,
        }
    }

    comments
}

/// Returns a diagnostic describing `error`.
fn to_diagnostic<T: Display>(error: &Error<T>) -> Diagnostic {
    // Locations have 0-based lines and 1-based columns.
    let (line, column) = error
        .loc
        .as_ref()
        .map(|loc| (loc.line + 1, loc.column))
        .unwrap_or((0, 0));

    Diagnostic::error(line, column, error.kind.to_string())
}
