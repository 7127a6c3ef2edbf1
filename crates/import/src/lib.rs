pub mod categorize;
pub mod csv;
pub mod matcher;

pub use categorize::{apply_incremental, reapply_all};
pub use csv::parse;
pub use matcher::{matching_groups, MatchPolicy};
