mod prompt;
mod tracker;

pub use prompt::confirm;
pub use tracker::{RowTracker, RowTrackerBuilder, Tracker};
