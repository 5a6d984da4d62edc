use std::path::Path;

use codas::types::Text;

// Definitions for all asset kinds the pipeline minifies.
//
// Each kind is a tuple of `(name, mime_type, [extensions])`.
// Extensions are matched case-insensitively and should be
// ordered, roughly, in terms of how common they are.
macros::asset_kinds! {
    (Script, "text/javascript", ["js"]),
    (Stylesheet, "text/css", ["css"]),
}

impl AssetKind {
    /// Returns the kind of the file at `path`, based on its extension.
    pub fn from_path(path: &Path) -> AssetKind {
        path.extension()
            .and_then(|extension| extension.to_str())
            .map(AssetKind::from_extension)
            .unwrap_or(AssetKind::Unrecognized)
    }

    /// Returns true iff this kind can be minified.
    pub fn is_recognized(&self) -> bool {
        *self != AssetKind::Unrecognized
    }
}

mod macros {

    /// Creates the [super::AssetKind] enum.
    macro_rules! asset_kinds {
        (
            $(
                ($variant:ident, $mime:expr, [$($ext:expr),+ $(,)?])
            ),+ $(,)?
        ) => {

            /// Kinds of compiled web assets.
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum AssetKind {
                $($variant,)+

                /// A file the pipeline doesn't minify.
                Unrecognized,
            }

            impl AssetKind {
                /// Returns the MIME type of this kind.
                pub fn name(&self) -> Text {
                    match self {
                        $(AssetKind::$variant => Text::from($mime),)+
                        AssetKind::Unrecognized => Text::from("application/octet-stream"),
                    }
                }

                /// Returns the known extensions of this kind.
                pub fn extensions(&self) -> &[Text] {
                    match self {
                        $(
                            AssetKind::$variant => &[
                                $(Text::Static($ext),)+
                            ],
                        )+
                        AssetKind::Unrecognized => &[],
                    }
                }

                /// Returns the kind corresponding to `extension`, ignoring
                /// ASCII case, or [AssetKind::Unrecognized].
                pub fn from_extension(extension: &str) -> AssetKind {
                    $(
                        $(
                            if extension.eq_ignore_ascii_case($ext) {
                                return AssetKind::$variant;
                            }
                        )+
                    )+

                    AssetKind::Unrecognized
                }
            }
        };
    }

    // Re-export macros for use in outer module.
    pub(crate) use asset_kinds;
}
