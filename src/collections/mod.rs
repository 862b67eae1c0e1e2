pub mod epoch;
pub mod status_tree;

pub use epoch::EpochSlots;
pub use status_tree::StatusTree;
