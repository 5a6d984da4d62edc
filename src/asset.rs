//! Compiled web assets: their kinds, and the names
//! of the artifacts derived from them.

mod kind;
pub use kind::AssetKind;

pub mod paths;
pub use paths::ArtifactPaths;
