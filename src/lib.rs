//! Change-gated minification and gzip of compiled scripts and stylesheets.

pub mod asset;
pub mod notify;
pub mod pipeline;
pub mod proc;
pub mod tool;
