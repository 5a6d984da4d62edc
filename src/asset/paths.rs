use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Infix inserted before a minified file's extension.
const MINIFIED_INFIX: &str = ".min";

/// Suffix appended to a gzip-compressed artifact.
const GZIP_SUFFIX: &str = ".gz";

/// Paths of every artifact derived from one compiled output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// The compiled output file being minified.
    pub source: PathBuf,

    /// The minified artifact, like `app.min.js`.
    pub minified: PathBuf,

    /// The gzip-compressed minified artifact, like `app.min.js.gz`.
    pub gzip: PathBuf,
}

impl ArtifactPaths {
    /// Returns the artifact paths derived from `source`.
    pub fn for_source(source: &Path) -> Self {
        let minified = minified_path_for(source);
        let gzip = gzip_path_for(&minified);

        Self {
            source: source.to_path_buf(),
            minified,
            gzip,
        }
    }
}

/// Returns the path of the minified artifact for `source`.
///
/// `.min` is inserted before the file's extension, so that
/// `dir/app.js` becomes `dir/app.min.js`. Files without an
/// extension (or with an empty one, like `app.`) become `app.min`.
pub fn minified_path_for(source: &Path) -> PathBuf {
    let mut name = OsString::new();

    match (source.file_stem(), source.extension()) {
        (Some(stem), Some(extension)) if !extension.is_empty() => {
            name.push(stem);
            name.push(MINIFIED_INFIX);
            name.push(".");
            name.push(extension);
        }
        (Some(stem), _) => {
            name.push(stem);
            name.push(MINIFIED_INFIX);
        }
        (None, _) => name.push(MINIFIED_INFIX),
    }

    source.with_file_name(name)
}

/// Returns the path of the gzip artifact for `minified`.
pub fn gzip_path_for(minified: &Path) -> PathBuf {
    let mut path = minified.as_os_str().to_owned();
    path.push(GZIP_SUFFIX);
    PathBuf::from(path)
}
