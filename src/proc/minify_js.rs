use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions, CommentOptions, LegalComment};
use oxc_mangler::MangleOptions;
use oxc_minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;

use super::{Diagnostic, MinificationOutcome, MinifyOptions, OutputMode, line_and_column};

/// Minifies JavaScript by removing unnecessary whitespace and
/// comments, and by mangling local identifiers.
///
/// `source` is parsed as a classic script, so top-level
/// declarations are globals and survive minification.
pub fn minify(source: &str, options: &MinifyOptions) -> MinificationOutcome {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_script(true);

    // Parse the JavaScript source.
    let ret = Parser::new(&allocator, source, source_type).parse();

    // Report parse errors instead of minifying a partial program.
    if !ret.errors.is_empty() {
        let diagnostics = ret
            .errors
            .iter()
            .map(|error| {
                let (line, column) = error
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.first())
                    .map(|label| line_and_column(source, label.offset()))
                    .unwrap_or((0, 0));
                Diagnostic::error(line, column, error.message.to_string())
            })
            .collect::<Vec<_>>();

        tracing::debug!("JS parse failed with {} errors", diagnostics.len());
        return MinificationOutcome::failed(diagnostics);
    }

    // Minify the AST.
    let mut program = ret.program;
    let minifier_options = MinifierOptions {
        mangle: options.script.rename_locals.then(MangleOptions::default),
        compress: Some(CompressOptions::default()),
    };
    let ret = Minifier::new(minifier_options).minify(&allocator, &mut program);

    // Generate the output, keeping only legal comments if requested.
    let comments = if options.script.preserve_important_comments {
        CommentOptions {
            legal: LegalComment::Inline,
            ..CommentOptions::disabled()
        }
    } else {
        CommentOptions::disabled()
    };
    let mut code = Codegen::new()
        .with_options(CodegenOptions {
            minify: options.output_mode == OutputMode::SingleLine,
            comments,
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;

    if options.script.term_semicolons {
        terminate_with_semicolon(&mut code);
    }

    MinificationOutcome::minified(code)
}

/// Ensures non-empty `code` ends with a `;`, ignoring trailing
/// whitespace and trailing line comments.
fn terminate_with_semicolon(code: &mut String) {
    let mut end = code.trim_end().len();

    // A `;` after a line comment would be part of the comment.
    loop {
        let line_start = code[..end].rfind('\n').map_or(0, |i| i + 1);
        if !code[line_start..end].trim_start().starts_with("//") {
            break;
        }
        if line_start == 0 {
            return;
        }
        end = code[..line_start].trim_end().len();
    }

    if end > 0 && !code[..end].ends_with(';') {
        code.insert(end, ';');
    }
}
