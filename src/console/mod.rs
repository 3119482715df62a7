//! User-facing terminal output that is not logging.

mod progress;
mod status;

pub use progress::Progress;
pub use status::{setup_colors, status};
