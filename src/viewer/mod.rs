//! Handing the finished tree to ncdu.

mod ncdu_viewer;

pub use ncdu_viewer::{NcduViewer, ViewerError, write_export};
