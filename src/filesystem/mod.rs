//! Reconstruction of a directory tree from a flat archive listing.
//!
//! Records arrive as JSON lines in arbitrary order. [`TreeBuilder`] attaches
//! each one to its parent, creating missing directories according to the
//! chosen [`AddressingMode`], and [`write_ncdu_document`] turns the finished
//! [`FileTree`] into an ncdu export.

mod builder;
mod entry;
mod ncdu_export;
mod record;

pub use builder::{AddressingMode, BuildError, TreeBuilder, build};
pub use entry::FileTree;
pub use ncdu_export::{ExportError, write_ncdu_document};
